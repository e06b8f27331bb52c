/*!
  Every failure the crate reports passes through `MachineError`. Errors are
  raised at the first point an invariant is violated, carry the names or
  characters needed to diagnose the violation, and are never retried or
  recovered internally.
*/

use std::fmt::{Display, Formatter};

use super::charset::CodeSet;


#[derive(Clone, Eq, PartialEq, Debug)]
pub enum MachineError {
  // Definition errors
  DuplicateAction(String),            //< an action with this name already exists
  DuplicateState(String),             //< a state with this name already exists
  LateAction(String),                 //< action declared after the first state
  UndefinedAction(String),            //< transition names an action never declared
  ActionOutOfOrder(String),           //< action sequence not strictly increasing at this name
  OverlappingTransition(String, CodeSet), //< state name and the overlapping characters
  DuplicateDefault(String),           //< state already has a default transition
  DuplicateMachineDefault,            //< machine already has a default transition
  InvalidKey(String),                 //< empty or malformed character-set key
  Frozen,                             //< mutation attempted after analysis began
  ExceedsLimits(String),              //< a capacity limit was exceeded

  // Analysis errors
  UnknownState(String),               //< transition targets a state never declared
  NameCollision(String),              //< two names sanitize to the same identifier

  // Encoding errors
  InvalidEncoding(String),

  // Boundary errors
  Io(String),
  ExternalToolFailed(String),
}


impl MachineError {
  /// Prints the error to `stderr` and exits.
  pub fn emit(&self) -> ! {
    eprintln!("Error: {}", self);
    std::process::exit(1);
  }
}


impl Display for MachineError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      MachineError::DuplicateAction(name)       => {
        write!(f, "{}: {}", "Duplicate Action", name)
      }
      MachineError::DuplicateState(name)        => {
        write!(f, "{}: {}", "Duplicate State", name)
      }
      MachineError::LateAction(name)            => {
        write!(f, "{} declared after the first state: {}", "Action", name)
      }
      MachineError::UndefinedAction(name)       => {
        write!(f, "{}: {}", "Undefined Action", name)
      }
      MachineError::ActionOutOfOrder(name)      => {
        write!(f, "{} at action: {}", "Action Out Of Order", name)
      }
      MachineError::OverlappingTransition(state, chars) => {
        write!(f, "{} in state {} on {}", "Overlapping Transition", state, chars.pretty())
      }
      MachineError::DuplicateDefault(state)     => {
        write!(f, "{} in state: {}", "Duplicate Default Transition", state)
      }
      MachineError::DuplicateMachineDefault     => {
        write!(f, "{}", "Duplicate Machine Default Transition")
      }
      MachineError::InvalidKey(what)            => {
        write!(f, "{}: {}", "Invalid Key", what)
      }
      MachineError::Frozen                      => {
        write!(f, "{}", "Machine is frozen once analysis begins")
      }
      MachineError::ExceedsLimits(what)         => {
        write!(f, "{}: {}", "Exceeds Limits", what)
      }
      MachineError::UnknownState(name)          => {
        write!(f, "{}: {}", "Unknown State", name)
      }
      MachineError::NameCollision(sanitized)    => {
        write!(f, "{}: {}", "Name Collision", sanitized)
      }
      MachineError::InvalidEncoding(what)       => {
        write!(f, "{}: {}", "Invalid Encoding", what)
      }
      MachineError::Io(what)                    => {
        write!(f, "{}: {}", "I/O Error", what)
      }
      MachineError::ExternalToolFailed(what)    => {
        write!(f, "{}: {}", "External Tool Failed", what)
      }
    }
  }
}


impl From<std::io::Error> for MachineError {
  fn from(error: std::io::Error) -> Self {
    MachineError::Io(error.to_string())
  }
}
