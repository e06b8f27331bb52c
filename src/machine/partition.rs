/*!

  Table-driven dispatch wants a single list of disjoint character classes such
  that every explicit transition key anywhere in the machine is a union of
  classes. The `Partition` computes the coarsest such list by incremental set
  refinement: keys are drawn in declaration order, and each incoming key
  either slots in unchanged, is absorbed by classes that already cover it, or
  splits the classes it straddles.

  When a class is split, the portion the incoming key does not cover keeps the
  class's slot and the newly distinguished portion is appended at the end of
  the list; any part of the key no class covered is appended last. The
  resulting positions are the stable class numbering the emitters use.

*/

use super::*;


#[derive(Clone, Debug, Default)]
pub struct Partition {
  classes: Vec<CodeSet>
}

impl Partition {

  pub fn new() -> Partition {
    Partition {
      classes: Vec::new()
    }
  }


  /// Refines over every explicit key of every state, in declaration order.
  pub fn of(machine: &Automaton) -> Partition {
    let mut partition = Partition::new();

    for state in machine.states() {
      for (key, _) in state.explicit.iter() {
        partition.refine(key);
      }
    }

    partition
  }


  pub fn refine(&mut self, key: &CodeSet) {
    if key.is_empty() {
      return;
    }

    let mut remainder = key.clone();
    let mut appended: Vec<CodeSet> = Vec::new();

    for index in 0..self.classes.len() {
      if remainder.is_empty() {
        break;
      }

      let class = self.classes[index].clone();
      let overlap = class.clone() & remainder.clone();
      if overlap.is_empty() {
        continue;
      }

      if overlap == class {
        // The class lies wholly inside the key and already partitions this
        // portion of it.
        remainder -= class;
      } else {
        // The key straddles the class: split it.
        self.classes[index] = class - overlap.clone();
        remainder -= overlap.clone();
        appended.push(overlap);
      }
    }

    self.classes.extend(appended);
    if !remainder.is_empty() {
      self.classes.push(remainder);
    }
  }


  /// The containing class of `code_point`, or `None` for "any other character".
  pub fn classify(&self, code_point: CodePoint) -> Option<ClassIndex> {
    self.classes.iter().position(|class| class.contains(code_point))
  }


  pub fn classes(&self) -> &[CodeSet] {
    &self.classes
  }


  pub fn len(&self) -> usize {
    self.classes.len()
  }


  pub fn is_empty(&self) -> bool {
    self.classes.is_empty()
  }

}


#[cfg(test)]
mod test {
  use super::*;

  fn refined(keys: &[CodeSet]) -> Partition {
    let mut partition = Partition::new();
    for key in keys {
      partition.refine(key);
    }
    partition
  }

  fn range(lo: CodePoint, hi: CodePoint) -> CodeSet {
    let mut set = CodeSet::new();
    set.insert_pair(lo, hi);
    set
  }

  #[test]
  fn disjoint_keys_append() {
    let partition = refined(&[range(0x2B, 0x2B), range(0x30, 0x39)]);
    assert_eq!(partition.classes(), &[range(0x2B, 0x2B), range(0x30, 0x39)][..]);
  }

  #[test]
  fn equal_key_is_absorbed() {
    let partition = refined(&[range(0x30, 0x39), range(0x30, 0x39)]);
    assert_eq!(partition.len(), 1);
  }

  #[test]
  fn contained_key_splits_its_class() {
    let partition = refined(&[range(0, 9), range(3, 5)]);
    assert_eq!(partition.classes(), &[range(0, 9) - range(3, 5), range(3, 5)][..]);
  }

  #[test]
  fn straddling_key_splits_and_appends() {
    let partition = refined(&[range(0, 9), range(5, 14)]);
    assert_eq!(
      partition.classes(),
      &[range(0, 4), range(5, 9), range(10, 14)][..]
    );
  }

  #[test]
  fn key_covering_whole_classes_leaves_them_intact() {
    let partition = refined(&[range(0, 4), range(10, 14), range(0, 20)]);
    assert_eq!(
      partition.classes(),
      &[range(0, 4), range(10, 14), range(5, 9) | range(15, 20)][..]
    );
  }

  #[test]
  fn partition_stays_coarse() {
    // The third key is exactly covered by the first two, so nothing splits.
    let partition = refined(&[range(0, 4), range(5, 9), range(0, 9)]);
    assert_eq!(partition.classes(), &[range(0, 4), range(5, 9)][..]);
  }

  #[test]
  fn members_are_pairwise_disjoint() {
    let partition = refined(&[range(0, 9), range(5, 14), range(7, 30), range(0, 2)]);
    let classes = partition.classes();
    for i in 0..classes.len() {
      assert!(!classes[i].is_empty());
      for j in (i + 1)..classes.len() {
        assert!(!classes[i].intersects(&classes[j]), "classes {} and {} overlap", i, j);
      }
    }
  }

  #[test]
  fn every_key_is_a_union_of_classes() {
    let keys = [range(0, 9), range(5, 14), range(7, 30), range(0, 2)];
    let partition = refined(&keys);

    for key in keys.iter() {
      let mut covered = CodeSet::new();
      for class in partition.classes() {
        if class.is_subset(key) {
          covered |= class.clone();
        }
      }
      assert_eq!(&covered, key);
    }
  }

  #[test]
  fn classify_finds_the_containing_class() {
    let partition = refined(&[range(0, 9), range(5, 14)]);
    assert_eq!(partition.classify(2), Some(0));
    assert_eq!(partition.classify(7), Some(1));
    assert_eq!(partition.classify(12), Some(2));
    assert_eq!(partition.classify(99), None);
  }
}
