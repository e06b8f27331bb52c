/*!
  A data structure that holds the C++ generator's configuration.
*/

use std::fmt::{Display, Formatter};


/// A user field of the generated parser's nested `Fields` struct.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FieldDecl {
  pub cpp_type : String, //< C++ type of the field
  pub name     : String, //< field name
  pub init     : String, //< initializer expression assigned by reset_fields()
}


/// Emitter configuration for one generated parser class.
#[derive(Clone, Debug)]
pub struct GeneratorOptions {
  pub class_name      : String,         //< name of the emitted class
  pub namespace       : String,         //< `outer::inner` wrapping namespace, empty for none
  pub char_type       : String,         //< character type `Ch`, `wchar_t` unless overridden
  pub message         : String,         //< comment placed at the top of each emitted file
  pub fields          : Vec<FieldDecl>, //< user fields of the nested Fields struct
  pub reset_each_char : bool,           //< call reset_fields() at the top of processChar
}

impl Default for GeneratorOptions {
  fn default() -> Self {
    Self {
      class_name: "Machine".to_string(),
      namespace: "".to_string(),
      char_type: "wchar_t".to_string(),
      message: "".to_string(),
      fields: vec![],
      reset_each_char: false,
    }
  }
}

impl Display for GeneratorOptions {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f,
      "class_name: {}
      namespace: {}
      char_type: {}
      message: {}
      fields: {}
      reset_each_char: {}",
      self.class_name,
      self.namespace,
      self.char_type,
      self.message,
      self.fields.iter().map(|field| field.name.clone()).collect::<Vec<_>>().join(", "),
      self.reset_each_char,
    )
  }
}

impl GeneratorOptions {

  /// The wrapping namespace components, outermost first.
  pub fn namespace_parts(&self) -> Vec<&str> {
    match self.namespace.is_empty() {
      true  => vec![],
      false => self.namespace.split("::").collect()
    }
  }

}
