/*!

  The `Automaton` is the machine under definition: an ordered action registry,
  an ordered state registry, and the builder surface through which both are
  populated. Definition-time invariants are enforced here, at the first point
  they can be violated:

    * actions are declared before any state, with unique names;
    * state names are unique, and the first state declared is the start state;
    * the action sequence of a transition is strictly increasing by order key;
    * explicit keys within one state are pairwise disjoint;
    * a state takes at most one default transition, the machine at most one
      machine-wide default.

  Once analysis begins the machine freezes and every further mutation fails.

*/

use std::cell::RefCell;

use super::*;
use error::MachineError;
use state::ActionNames;


/// The reserved name of the terminal sink state.
pub const ERROR_STATE: &str = "error";


/// A transition key as the caller wrote it, before normalization.
#[derive(Clone, Debug)]
pub enum Key {
  Explicit(CodeSet),
  Spec(String),              //< string key, `a-b` spans expanded
  Bytes(Vec<u8>),            //< byte-string key, decoded with the machine encoding
  Range(CodePoint, CodePoint),
}

impl Key {

  /// Normalizes to a code-point set. Expansion happens here, before any
  /// disjointness checking.
  fn resolve(self, encoding: Encoding) -> Result<CodeSet, MachineError> {
    match self {
      Key::Explicit(set)   => Ok(set),
      Key::Spec(spec)      => CodeSet::from_spec(&spec),
      Key::Bytes(bytes)    => CodeSet::from_bytes(&bytes, encoding),
      Key::Range(lo, hi)   => {
        if lo > hi {
          return Err(MachineError::InvalidKey(format!("reversed range {}-{}", lo, hi)));
        }
        let mut set = CodeSet::new();
        set.insert_pair(lo, hi);
        Ok(set)
      }
    }
  }

}

impl From<&str> for Key {
  fn from(spec: &str) -> Self {
    Key::Spec(spec.to_string())
  }
}

impl From<&[u8]> for Key {
  fn from(bytes: &[u8]) -> Self {
    Key::Bytes(bytes.to_vec())
  }
}

impl From<CodeSet> for Key {
  fn from(set: CodeSet) -> Self {
    Key::Explicit(set)
  }
}

impl From<char> for Key {
  fn from(c: char) -> Self {
    Key::Range(c as CodePoint, c as CodePoint)
  }
}

impl From<std::ops::RangeInclusive<CodePoint>> for Key {
  fn from(range: std::ops::RangeInclusive<CodePoint>) -> Self {
    Key::Range(*range.start(), *range.end())
  }
}


pub struct Automaton {
  name: String,
  encoding: Encoding,
  actions: Vec<Action>,
  states: Vec<State>,
  machine_default: Option<Transition>,
  frozen: bool,
  partition_cache: RefCell<Option<Partition>>,
}

impl Automaton {

  pub fn new(name: &str, encoding: Encoding) -> Automaton {
    Automaton {
      name: name.to_string(),
      encoding,
      actions: Vec::new(),
      states: Vec::new(),
      machine_default: None,
      frozen: false,
      partition_cache: RefCell::new(None),
    }
  }


  // region Builder surface

  /**
    Registers an action. All actions precede the first state; the order of
    registration fixes each action's `order_key` and thereby its bit in every
    action mask.
  */
  pub fn declare_action(&mut self, name: &str, config: ActionConfig, code: CodeFragment)
    -> Result<(), MachineError>
  {
    self.check_mutable()?;

    if !self.states.is_empty() {
      return Err(MachineError::LateAction(name.to_string()));
    }
    if self.action_index(name).is_some() {
      return Err(MachineError::DuplicateAction(name.to_string()));
    }
    if self.actions.len() >= limits::MAX_ACTIONS {
      return Err(MachineError::ExceedsLimits(
        format!("more than {} actions", limits::MAX_ACTIONS)
      ));
    }

    self.actions.push(Action {
      name: name.to_string(),
      order_key: self.actions.len(),
      config,
      code,
    });
    self.invalidate_partition();

    Ok(())
  }


  /// Registers a state. The first state registered is the start state.
  pub fn declare_state(&mut self, name: &str, is_final: bool)
    -> Result<StateHandle<'_>, MachineError>
  {
    self.check_mutable()?;

    if self.state_index(name).is_some() {
      return Err(MachineError::DuplicateState(name.to_string()));
    }

    self.states.push(State::new(name, is_final));
    self.invalidate_partition();

    let state = self.states.len() - 1;
    Ok(StateHandle { machine: self, state })
  }


  /// Reopens a declared state for further transition registration.
  pub fn state(&mut self, name: &str) -> Result<StateHandle<'_>, MachineError> {
    match self.state_index(name) {
      Some(state) => Ok(StateHandle { machine: self, state }),
      None        => Err(MachineError::UnknownState(name.to_string()))
    }
  }


  /// Fires when a state has neither a matching explicit key nor its own default.
  pub fn set_machine_default(&mut self, end_state: &str, actions: &[&str])
    -> Result<(), MachineError>
  {
    self.check_mutable()?;

    if self.machine_default.is_some() {
      return Err(MachineError::DuplicateMachineDefault);
    }

    let transition = self.make_transition(end_state, actions)?;
    self.machine_default = Some(transition);
    self.invalidate_partition();

    Ok(())
  }

  // endregion


  // region Registration internals

  fn add_explicit(&mut self, state: StateIndex, key: Key, end_state: &str, actions: &[&str])
    -> Result<(), MachineError>
  {
    self.check_mutable()?;

    let set = key.resolve(self.encoding)?;
    if set.is_empty() {
      return Err(MachineError::InvalidKey("empty character set".to_string()));
    }

    let transition = self.make_transition(end_state, actions)?;

    for (prior, _) in self.states[state].explicit.iter() {
      let overlap = prior.clone() & set.clone();
      if !overlap.is_empty() {
        return Err(MachineError::OverlappingTransition(
          self.states[state].name.clone(),
          overlap
        ));
      }
    }

    self.states[state].explicit.push((set, transition));
    self.invalidate_partition();

    Ok(())
  }


  fn add_default(&mut self, state: StateIndex, end_state: &str, actions: &[&str])
    -> Result<(), MachineError>
  {
    self.check_mutable()?;

    if self.states[state].default.is_some() {
      return Err(MachineError::DuplicateDefault(self.states[state].name.clone()));
    }

    let transition = self.make_transition(end_state, actions)?;
    self.states[state].default = Some(transition);
    self.invalidate_partition();

    Ok(())
  }


  /**
    Builds a transition record from an ordered action-name list, validating
    that every name is declared and that order keys strictly increase.
  */
  fn make_transition(&self, end_state: &str, actions: &[&str])
    -> Result<Transition, MachineError>
  {
    let mut mask: ActionMask = 0;
    let mut names = ActionNames::new();
    let mut previous: Option<usize> = None;

    for name in actions {
      let order_key = match self.action_index(name) {
        Some(index) => index,
        None        => {
          return Err(MachineError::UndefinedAction(name.to_string()));
        }
      };

      if let Some(previous) = previous {
        if order_key <= previous {
          return Err(MachineError::ActionOutOfOrder(name.to_string()));
        }
      }
      previous = Some(order_key);

      mask |= 1 << order_key;
      names.push(name.to_string());
    }

    Ok(Transition {
      end_state: end_state.to_string(),
      actions: names,
      action_mask: mask,
    })
  }


  fn check_mutable(&self) -> Result<(), MachineError> {
    match self.frozen {
      true  => Err(MachineError::Frozen),
      false => Ok(())
    }
  }


  fn invalidate_partition(&mut self) {
    self.partition_cache.replace(None);
  }

  // endregion


  // region Read access

  pub fn name(&self) -> &str {
    &self.name
  }


  pub fn encoding(&self) -> Encoding {
    self.encoding
  }


  pub fn actions(&self) -> &[Action] {
    &self.actions
  }


  pub fn states(&self) -> &[State] {
    &self.states
  }


  /// The first state registered, if any.
  pub fn start_state(&self) -> Option<&State> {
    self.states.first()
  }


  pub fn machine_default(&self) -> Option<&Transition> {
    self.machine_default.as_ref()
  }


  pub fn action_index(&self, name: &str) -> Option<usize> {
    self.actions.iter().position(|action| action.name == name)
  }


  pub fn state_index(&self, name: &str) -> Option<StateIndex> {
    self.states.iter().position(|state| state.name == name)
  }


  pub fn is_frozen(&self) -> bool {
    self.frozen
  }


  /// Marks the machine read-only. Every later mutation fails `Frozen`.
  pub fn freeze(&mut self) {
    self.frozen = true;
  }


  /**
    The character-class partition induced by every explicit key in the
    machine. The computation is cached per machine; any successful mutation
    invalidates the cache.
  */
  pub fn partition(&self) -> Partition {
    let mut cache = self.partition_cache.borrow_mut();
    if cache.is_none() {
      *cache = Some(Partition::of(self));
    }
    cache.as_ref().unwrap().clone()
  }

  // endregion

}


/// Registration surface for one state's transitions.
pub struct StateHandle<'a> {
  machine: &'a mut Automaton,
  state: StateIndex,
}

impl StateHandle<'_> {

  pub fn name(&self) -> &str {
    &self.machine.states[self.state].name
  }


  /**
    Registers an explicit transition. The key normalizes to a code-point set
    before the disjointness check against this state's prior keys.
  */
  pub fn transition<K: Into<Key>>(&mut self, key: K, end_state: &str, actions: &[&str])
    -> Result<(), MachineError>
  {
    self.machine.add_explicit(self.state, key.into(), end_state, actions)
  }


  /// Registers this state's default transition.
  pub fn default_transition(&mut self, end_state: &str, actions: &[&str])
    -> Result<(), MachineError>
  {
    self.machine.add_default(self.state, end_state, actions)
  }

}
