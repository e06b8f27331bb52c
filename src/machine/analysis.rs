/*!

  Analysis is the bridge between a defined machine and its emitters. It
  freezes the machine, resolves every (state, class) pair to a concrete next
  state and action mask, and validates the two properties only visible once
  the whole machine exists: that every named end state was actually declared,
  and that no two names collapse to the same sanitized identifier.

  Resolution per state and class, by precedence: an explicit key containing
  the class's representative code point; the state's own default; the
  machine-wide default; the error sink with no actions. A state named `error`
  is the caller's to define; only when absent is a synthetic, non-final,
  transitionless `error` state appended after the declared states.

*/

use defaultmap::DefaultHashMap;
use quanta::Clock;

use crate::debug_logln;

use super::*;
use automaton::ERROR_STATE;
use error::MachineError;


/// One cell of the transition table.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct TableEntry {
  pub next: StateIndex,
  pub actions: ActionMask,
}


#[derive(Clone, Debug)]
pub struct StateInfo {
  pub name: String,
  pub sanitized: String,
  pub is_final: bool,
}


#[derive(Clone, Debug)]
pub struct ActionInfo {
  pub name: String,
  pub sanitized: String,
  pub order_key: usize,
  pub char_var: Option<String>,
  pub code: CodeFragment,
}


pub struct Analysis {
  machine_name: String,
  states: Vec<StateInfo>,     //< registration order, `error` appended if not declared
  actions: Vec<ActionInfo>,   //< ordered by order key
  partition: Partition,
  table: DefaultHashMap<(StateIndex, ClassIndex), TableEntry>,
  error_state: StateIndex,
}

impl Analysis {

  pub fn of(machine: &mut Automaton) -> Result<Analysis, MachineError> {
    let timer: Clock = Clock::new();
    let start_time = timer.start();

    machine.freeze();
    let partition = machine.partition();

    // The state list, with the error sink appended when the caller did not
    // declare one.
    let mut states: Vec<StateInfo> = machine.states().iter().map(|state| {
      StateInfo {
        name: state.name.clone(),
        sanitized: sanitize(&state.name),
        is_final: state.is_final,
      }
    }).collect();

    let error_state = match machine.state_index(ERROR_STATE) {
      Some(index) => index,
      None        => {
        states.push(StateInfo {
          name: ERROR_STATE.to_string(),
          sanitized: ERROR_STATE.to_string(),
          is_final: false,
        });
        states.len() - 1
      }
    };

    let actions: Vec<ActionInfo> = machine.actions().iter().map(|action| {
      ActionInfo {
        name: action.name.clone(),
        sanitized: sanitize(&action.name),
        order_key: action.order_key,
        char_var: action.config.char_var.clone(),
        code: action.code.clone(),
      }
    }).collect();

    check_targets(machine)?;
    check_collisions(states.iter().map(|state| (state.name.as_str(), state.sanitized.as_str())))?;
    check_collisions(actions.iter().map(|action| (action.name.as_str(), action.sanitized.as_str())))?;

    // Lay out the table. Only resolved cells are stored; everything else
    // defaults to the error sink with no actions.
    let class_count = partition.len();
    let mut table: DefaultHashMap<(StateIndex, ClassIndex), TableEntry> =
      DefaultHashMap::new(TableEntry { next: error_state, actions: 0 });

    for (index, state) in machine.states().iter().enumerate() {
      for column in 0..=class_count {
        let resolved =
        if column < class_count {
          let representative = partition.classes()[column].lo();
          state.explicit.iter()
               .find(|(key, _)| key.contains(representative))
               .map(|(_, transition)| transition)
               .or_else(|| state.default.as_ref())
               .or_else(|| machine.machine_default())
        } else {
          // The `other` column: no explicit key can match.
          state.default.as_ref().or_else(|| machine.machine_default())
        };

        if let Some(transition) = resolved {
          let next = match machine.state_index(&transition.end_state) {
            Some(target) => target,
            None         => error_state,  // validated above, so this is `error`
          };
          table[(index, column)] = TableEntry { next, actions: transition.action_mask };
        }
      }
    }

    let elapsed = timer.delta(start_time, timer.end());
    debug_logln!(
      "analysis of {}: {} states, {} classes, {} actions in {}us",
      machine.name(),
      states.len(),
      class_count,
      actions.len(),
      elapsed.as_micros()
    );

    Ok(Analysis {
      machine_name: machine.name().to_string(),
      states,
      actions,
      partition,
      table,
      error_state,
    })
  }


  pub fn machine_name(&self) -> &str {
    &self.machine_name
  }


  pub fn states(&self) -> &[StateInfo] {
    &self.states
  }


  pub fn actions(&self) -> &[ActionInfo] {
    &self.actions
  }


  pub fn final_states(&self) -> Vec<StateIndex> {
    self.states.iter().enumerate()
        .filter(|(_, state)| state.is_final)
        .map(|(index, _)| index)
        .collect()
  }


  pub fn classes(&self) -> &[CodeSet] {
    self.partition.classes()
  }


  pub fn class_count(&self) -> usize {
    self.partition.len()
  }


  pub fn classify(&self, code_point: CodePoint) -> Option<ClassIndex> {
    self.partition.classify(code_point)
  }


  pub fn start_state(&self) -> StateIndex {
    0
  }


  pub fn error_state(&self) -> StateIndex {
    self.error_state
  }


  /**
    The resolved table cell for a state and class, `None` meaning the `other`
    class. Total: every pair resolves, if only to the error sink.
  */
  pub fn transition_of(&self, state: StateIndex, class: Option<ClassIndex>) -> TableEntry {
    let column = class.unwrap_or_else(|| self.class_count());
    self.table[(state, column)]
  }

}


/// Replaces every code point outside `[A-Za-z0-9_]` with `_`.
pub fn sanitize(name: &str) -> String {
  name.chars()
      .map(|c| {
        if c.is_ascii_alphanumeric() || c == '_' {
          c
        } else {
          '_'
        }
      })
      .collect()
}


fn check_targets(machine: &Automaton) -> Result<(), MachineError> {
  let mut targets: Vec<&str> = Vec::new();

  for state in machine.states() {
    for (_, transition) in state.explicit.iter() {
      targets.push(&transition.end_state);
    }
    if let Some(transition) = &state.default {
      targets.push(&transition.end_state);
    }
  }
  if let Some(transition) = machine.machine_default() {
    targets.push(&transition.end_state);
  }

  for target in targets {
    if target != ERROR_STATE && machine.state_index(target).is_none() {
      return Err(MachineError::UnknownState(target.to_string()));
    }
  }

  Ok(())
}


fn check_collisions<'a, I>(names: I) -> Result<(), MachineError>
  where I: Iterator<Item = (&'a str, &'a str)>
{
  let mut seen: std::collections::HashMap<&str, &str> = std::collections::HashMap::new();

  for (name, sanitized) in names {
    if let Some(existing) = seen.insert(sanitized, name) {
      if existing != name {
        return Err(MachineError::NameCollision(sanitized.to_string()));
      }
    }
  }

  Ok(())
}
