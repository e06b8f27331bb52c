/*!
  Actions are the named side effects of a machine. Each is registered before
  any state, receives a dense `order_key`, and optionally carries the C++
  source fragment emitted as its body.
*/

use std::fmt::{Display, Formatter};


/// Everything an emitted action body may need to know about its surroundings.
#[derive(Copy, Clone, Debug)]
pub struct GeneratorContext<'a> {
  pub char_type: &'a str,        //< character type of the generated parser
  pub class_name: &'a str,       //< name of the generated class
  pub char_var: Option<&'a str>, //< identifier receiving the current code point, when configured
}


/// The body of a generated action member function.
#[derive(Clone, Debug)]
pub enum CodeFragment {
  /// No body.
  Empty,
  /// Literal source text emitted verbatim.
  Source(String),
  /// A function producing source text from the generator context.
  Builder(fn(&GeneratorContext) -> String),
}

impl CodeFragment {

  pub fn render(&self, context: &GeneratorContext) -> String {
    match self {
      CodeFragment::Empty            => String::new(),
      CodeFragment::Source(source)   => source.clone(),
      CodeFragment::Builder(builder) => builder(context),
    }
  }


  pub fn is_empty(&self) -> bool {
    matches!(self, CodeFragment::Empty)
  }

}

impl Default for CodeFragment {
  fn default() -> Self {
    CodeFragment::Empty
  }
}


/// Per-action options recognized at registration.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct ActionConfig {
  /// Identifier through which the current code point is delivered to the
  /// action body. Absent means the action takes no character argument.
  pub char_var: Option<String>,
}

impl ActionConfig {

  pub fn with_char(identifier: &str) -> ActionConfig {
    ActionConfig {
      char_var: Some(identifier.to_string())
    }
  }

}


#[derive(Clone, Debug)]
pub struct Action {
  pub name: String,         //< unique within the machine
  pub order_key: usize,     //< dense registration index, also the mask bit position
  pub config: ActionConfig,
  pub code: CodeFragment,
}

impl Action {

  pub fn mask_bit(&self) -> super::ActionMask {
    1 << self.order_key
  }

}

impl Display for Action {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "action<{}>", self.name)
  }
}
