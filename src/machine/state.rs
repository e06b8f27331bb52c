use std::fmt::{Display, Formatter};

use smallvec::SmallVec;

use super::*;


// Most transitions fire only a couple of actions.
pub type ActionNames = SmallVec<[String; 4]>;


/**
  A transition out of a state. The end state is a name rather than an index
  because forward references are legal at definition time; they resolve during
  analysis. The ordered action names are strictly increasing by order key, a
  property the machine validates at registration and bakes into `action_mask`.
*/
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Transition {
  pub end_state: String,
  pub actions: ActionNames,
  pub action_mask: ActionMask,
}


#[derive(Clone, Debug)]
pub struct State {
  pub name: String,
  pub is_final: bool,
  /// Explicit transitions in registration order. Keys are pairwise disjoint.
  pub explicit: Vec<(CodeSet, Transition)>,
  /// Fires on any code point no explicit key covers.
  pub default: Option<Transition>,
}

impl State {

  pub fn new(name: &str, is_final: bool) -> State {
    State {
      name: name.to_string(),
      is_final,
      explicit: Vec::new(),
      default: None,
    }
  }

}

impl Display for State {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "state<{}>", self.name)
  }
}
