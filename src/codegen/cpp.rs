/*!

  Emits the C++ rendition of an analyzed machine: a header declaring the
  parser class and an implementation holding the dispatch machinery in an
  anonymous namespace. The contract of the emitted class is small: construct
  it, call `processChar` once per input code point, query `final()` at the
  end. `processChar` returns `false` exactly when the machine has fallen into
  the error sink.

  Everything here is string assembly over the `Analysis`; emission over a
  validated machine cannot fail except at the byte sink.

*/

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::machine::{ActionMask, CodePoint};
use crate::machine::action::GeneratorContext;
use crate::machine::analysis::{ActionInfo, Analysis};
use crate::machine::error::MachineError;

use super::options::GeneratorOptions;


/// Where the generated header and implementation go.
pub enum CppOutput<'a> {
  /// Writes `<base>.h` and `<base>.cpp`, the latter including the former.
  FileBase(&'a Path),
  /// Header followed by implementation into one sink.
  Single(&'a mut dyn Write),
  /// Separate header and implementation sinks.
  Split {
    header: &'a mut dyn Write,
    source: &'a mut dyn Write,
  },
}


pub struct CppGenerator<'a> {
  analysis: &'a Analysis,
  options: &'a GeneratorOptions,
}

impl<'a> CppGenerator<'a> {

  pub fn new(analysis: &'a Analysis, options: &'a GeneratorOptions) -> CppGenerator<'a> {
    CppGenerator { analysis, options }
  }


  pub fn generate(&self, output: CppOutput) -> Result<(), MachineError> {
    match output {

      CppOutput::FileBase(base) => {
        let header_path = base.with_extension("h");
        let source_path = base.with_extension("cpp");

        let include = header_path
          .file_name()
          .map(|name| name.to_string_lossy().into_owned());

        let mut header = File::create(&header_path)?;
        self.write_header(&mut header)?;

        let mut source = File::create(&source_path)?;
        self.write_source(&mut source, include.as_deref())?;
      }

      CppOutput::Single(sink) => {
        self.write_header(sink)?;
        writeln!(sink)?;
        self.write_source(sink, None)?;
      }

      CppOutput::Split { header, source } => {
        self.write_header(header)?;
        self.write_source(source, Some(&format!("{}.h", self.options.class_name)))?;
      }

    }

    Ok(())
  }


  // region Header

  pub fn write_header(&self, w: &mut dyn Write) -> Result<(), MachineError> {
    let class_name = &self.options.class_name;
    let guard = format!("{}_H", crate::machine::analysis::sanitize(class_name).to_uppercase());

    self.write_message(w)?;
    writeln!(w, "#ifndef {}", guard)?;
    writeln!(w, "#define {}", guard)?;
    writeln!(w)?;

    for name in self.options.namespace_parts() {
      writeln!(w, "namespace {} {{", name)?;
    }
    if !self.options.namespace.is_empty() {
      writeln!(w)?;
    }

    writeln!(w, "class {} {{", class_name)?;
    writeln!(w, "public:")?;
    writeln!(w, "  typedef {} Ch;", self.options.char_type)?;
    writeln!(w)?;
    writeln!(w, "  struct Fields {{")?;
    for field in self.options.fields.iter() {
      writeln!(w, "    {} {};", field.cpp_type, field.name)?;
    }
    writeln!(w, "  }};")?;
    writeln!(w)?;
    writeln!(w, "  {}();", class_name)?;
    writeln!(w)?;
    writeln!(w, "  bool processChar(Ch ch);")?;
    writeln!(w, "  bool final() const;")?;
    writeln!(w, "  const Fields& fields() const;")?;
    writeln!(w)?;
    writeln!(w, "private:")?;
    writeln!(w, "  struct Actions : Fields {{")?;
    for action in self.analysis.actions() {
      match &action.char_var {
        Some(var) => writeln!(w, "    void do_{}(Ch {});", action.sanitized, var)?,
        None      => writeln!(w, "    void do_{}();", action.sanitized)?,
      }
    }
    writeln!(w, "    void reset_fields();")?;
    writeln!(w, "  }};")?;
    writeln!(w)?;
    writeln!(w, "  int state_;")?;
    writeln!(w, "  Actions actions_;")?;
    writeln!(w, "}};")?;
    writeln!(w)?;

    for name in self.options.namespace_parts().iter().rev() {
      writeln!(w, "}} // namespace {}", name)?;
    }
    if !self.options.namespace.is_empty() {
      writeln!(w)?;
    }

    writeln!(w, "#endif")?;
    Ok(())
  }

  // endregion


  // region Implementation

  pub fn write_source(&self, w: &mut dyn Write, include: Option<&str>)
    -> Result<(), MachineError>
  {
    self.write_message(w)?;
    if let Some(include) = include {
      writeln!(w, "#include \"{}\"", include)?;
      writeln!(w)?;
    }

    for name in self.options.namespace_parts() {
      writeln!(w, "namespace {} {{", name)?;
    }
    if !self.options.namespace.is_empty() {
      writeln!(w)?;
    }

    writeln!(w, "namespace {{")?;
    writeln!(w)?;
    self.write_enums(w)?;
    self.write_tables(w)?;
    self.write_classifier(w)?;
    self.write_final_predicate(w)?;
    writeln!(w, "}} // namespace")?;
    writeln!(w)?;

    self.write_members(w)?;

    for name in self.options.namespace_parts().iter().rev() {
      writeln!(w, "}} // namespace {}", name)?;
    }
    Ok(())
  }


  fn write_enums(&self, w: &mut dyn Write) -> Result<(), MachineError> {
    writeln!(w, "enum StateType {{")?;
    let states = self.analysis.states();
    for (index, state) in states.iter().enumerate() {
      let comma = if index + 1 < states.len() { "," } else { "" };
      writeln!(w, "  s_{}{}", state.sanitized, comma)?;
    }
    writeln!(w, "}};")?;
    writeln!(w)?;

    writeln!(w, "enum CharacterClass {{")?;
    for index in 0..self.analysis.class_count() {
      writeln!(w, "  cc_{},", index)?;
    }
    writeln!(w, "  cc_other")?;
    writeln!(w, "}};")?;
    writeln!(w)?;

    let actions = self.analysis.actions();
    if !actions.is_empty() {
      writeln!(w, "enum ActionType : unsigned long long {{")?;
      for (index, action) in actions.iter().enumerate() {
        let comma = if index + 1 < actions.len() { "," } else { "" };
        writeln!(w, "  a_{} = 1ULL << {}{}", action.sanitized, action.order_key, comma)?;
      }
      writeln!(w, "}};")?;
      writeln!(w)?;
    }

    Ok(())
  }


  fn write_tables(&self, w: &mut dyn Write) -> Result<(), MachineError> {
    let states = self.analysis.states();
    let columns = self.analysis.class_count() + 1;

    writeln!(w, "static const int parserTransitions[{}][{}] = {{", states.len(), columns)?;
    for (index, state) in states.iter().enumerate() {
      let row: Vec<String> = self.columns(index)
        .map(|entry| format!("s_{}", states[entry.next].sanitized))
        .collect();
      let comma = if index + 1 < states.len() { "," } else { "" };
      writeln!(w, "  {{ {} }}{} // s_{}", row.join(", "), comma, state.sanitized)?;
    }
    writeln!(w, "}};")?;
    writeln!(w)?;

    writeln!(
      w,
      "static const unsigned long long parserActions[{}][{}] = {{",
      states.len(),
      columns
    )?;
    for (index, state) in states.iter().enumerate() {
      let row: Vec<String> = self.columns(index)
        .map(|entry| self.mask_expression(entry.actions))
        .collect();
      let comma = if index + 1 < states.len() { "," } else { "" };
      writeln!(w, "  {{ {} }}{} // s_{}", row.join(", "), comma, state.sanitized)?;
    }
    writeln!(w, "}};")?;
    writeln!(w)?;

    Ok(())
  }


  /// The table cells of one state's row, `cc_other` last.
  fn columns(&self, state: usize)
    -> impl Iterator<Item = crate::machine::analysis::TableEntry> + '_
  {
    let class_count = self.analysis.class_count();
    (0..=class_count).map(move |column| {
      match column < class_count {
        true  => self.analysis.transition_of(state, Some(column)),
        false => self.analysis.transition_of(state, None)
      }
    })
  }


  /// An action mask as an or-expression over the `ActionType` members.
  fn mask_expression(&self, mask: ActionMask) -> String {
    if mask == 0 {
      return "0".to_string();
    }

    let names: Vec<String> = self.analysis.actions().iter()
      .filter(|action| mask & (1 << action.order_key) != 0)
      .map(|action| format!("a_{}", action.sanitized))
      .collect();
    names.join(" | ")
  }


  fn write_classifier(&self, w: &mut dyn Write) -> Result<(), MachineError> {
    writeln!(
      w,
      "CharacterClass classifyChar({}::Ch ch) {{",
      self.options.class_name
    )?;
    writeln!(w, "  switch (static_cast<unsigned long>(ch)) {{")?;

    for (index, class) in self.analysis.classes().iter().enumerate() {
      for code_point in class.iter() {
        writeln!(w, "    case 0x{:X}:{}", code_point, case_comment(code_point))?;
      }
      writeln!(w, "      return cc_{};", index)?;
    }

    writeln!(w, "    default:")?;
    writeln!(w, "      return cc_other;")?;
    writeln!(w, "  }}")?;
    writeln!(w, "}}")?;
    writeln!(w)?;
    Ok(())
  }


  fn write_final_predicate(&self, w: &mut dyn Write) -> Result<(), MachineError> {
    writeln!(w, "bool isFinal(int state) {{")?;
    writeln!(w, "  switch (state) {{")?;
    for index in self.analysis.final_states() {
      writeln!(w, "    case s_{}:", self.analysis.states()[index].sanitized)?;
    }
    if !self.analysis.final_states().is_empty() {
      writeln!(w, "      return true;")?;
    }
    writeln!(w, "    default:")?;
    writeln!(w, "      return false;")?;
    writeln!(w, "  }}")?;
    writeln!(w, "}}")?;
    writeln!(w)?;
    Ok(())
  }


  fn write_members(&self, w: &mut dyn Write) -> Result<(), MachineError> {
    let class_name = &self.options.class_name;
    let start = self.analysis.states()[self.analysis.start_state()].sanitized.clone();
    let error = self.analysis.states()[self.analysis.error_state()].sanitized.clone();

    writeln!(w, "{}::{}()", class_name, class_name)?;
    writeln!(w, "  : state_(s_{}),", start)?;
    writeln!(w, "    actions_() {{")?;
    writeln!(w, "  actions_.reset_fields();")?;
    writeln!(w, "}}")?;
    writeln!(w)?;

    writeln!(w, "const {}::Fields& {}::fields() const {{", class_name, class_name)?;
    writeln!(w, "  return actions_;")?;
    writeln!(w, "}}")?;
    writeln!(w)?;

    writeln!(w, "bool {}::final() const {{", class_name)?;
    writeln!(w, "  return isFinal(state_);")?;
    writeln!(w, "}}")?;
    writeln!(w)?;

    writeln!(w, "bool {}::processChar(Ch ch) {{", class_name)?;
    if self.options.reset_each_char {
      writeln!(w, "  actions_.reset_fields();")?;
    }
    writeln!(w, "  const CharacterClass cls = classifyChar(ch);")?;
    writeln!(w, "  const int next = parserTransitions[state_][cls];")?;
    if !self.analysis.actions().is_empty() {
      writeln!(w, "  const unsigned long long actions = parserActions[state_][cls];")?;
      for action in self.analysis.actions() {
        writeln!(w, "  if (actions & a_{}) {{", action.sanitized)?;
        match &action.char_var {
          Some(_) => writeln!(w, "    actions_.do_{}(ch);", action.sanitized)?,
          None    => writeln!(w, "    actions_.do_{}();", action.sanitized)?,
        }
        writeln!(w, "  }}")?;
      }
    }
    writeln!(w, "  state_ = next;")?;
    writeln!(w, "  return state_ != s_{};", error)?;
    writeln!(w, "}}")?;
    writeln!(w)?;

    for action in self.analysis.actions() {
      self.write_action_body(w, action)?;
    }

    writeln!(w, "void {}::Actions::reset_fields() {{", class_name)?;
    for field in self.options.fields.iter() {
      if !field.init.is_empty() {
        writeln!(w, "  {} = {};", field.name, field.init)?;
      }
    }
    writeln!(w, "}}")?;
    writeln!(w)?;

    Ok(())
  }


  fn write_action_body(&self, w: &mut dyn Write, action: &ActionInfo)
    -> Result<(), MachineError>
  {
    let class_name = &self.options.class_name;
    let context = GeneratorContext {
      char_type: &self.options.char_type,
      class_name,
      char_var: action.char_var.as_deref(),
    };

    match &action.char_var {
      Some(var) => {
        writeln!(w, "void {}::Actions::do_{}(Ch {}) {{", class_name, action.sanitized, var)?
      }
      None      => {
        writeln!(w, "void {}::Actions::do_{}() {{", class_name, action.sanitized)?
      }
    }

    let body = action.code.render(&context);
    for line in body.lines() {
      writeln!(w, "  {}", line)?;
    }
    writeln!(w, "}}")?;
    writeln!(w)?;
    Ok(())
  }


  fn write_message(&self, w: &mut dyn Write) -> Result<(), MachineError> {
    if self.options.message.is_empty() {
      return Ok(());
    }

    for line in self.options.message.lines() {
      writeln!(w, "// {}", line)?;
    }
    writeln!(w)?;
    Ok(())
  }

  // endregion

}


/// A trailing comment showing the printable character behind a case label.
fn case_comment(code_point: CodePoint) -> String {
  if !(0x20..=0x7E).contains(&code_point) {
    return "".to_string();
  }

  let c = code_point as u8 as char;
  if c == '\'' || c == '\\' {
    format!(" // '\\{}'", c)
  } else {
    format!(" // '{}'", c)
  }
}


#[cfg(test)]
mod test {
  use super::*;
  use crate::codegen::options::FieldDecl;
  use crate::machine::action::{ActionConfig, CodeFragment};
  use crate::machine::automaton::Automaton;
  use crate::machine::encoding::Encoding;

  fn integer_analysis() -> Analysis {
    let mut machine = Automaton::new("Integer", Encoding::Utf8);
    machine.declare_action(
      "set_sign",
      ActionConfig::with_char("ch"),
      CodeFragment::Source("sign = (ch == '-') ? -1 : 1;".to_string())
    ).unwrap();
    machine.declare_action(
      "accumulate",
      ActionConfig::with_char("ch"),
      CodeFragment::Source("value = value * 10 + (ch - '0');".to_string())
    ).unwrap();

    let mut start = machine.declare_state("start", false).unwrap();
    start.transition("+-", "start", &["set_sign"]).unwrap();
    start.transition("0-9", "digits", &["accumulate"]).unwrap();
    let mut digits = machine.declare_state("digits", true).unwrap();
    digits.transition("0-9", "digits", &["accumulate"]).unwrap();

    Analysis::of(&mut machine).unwrap()
  }

  fn integer_options() -> GeneratorOptions {
    let mut options = GeneratorOptions::default();
    options.class_name = "Integer".to_string();
    options.fields = vec![
      FieldDecl { cpp_type: "int".to_string(), name: "sign".to_string(), init: "1".to_string() },
      FieldDecl { cpp_type: "long".to_string(), name: "value".to_string(), init: "0".to_string() },
    ];
    options
  }

  fn generated(options: &GeneratorOptions) -> String {
    let analysis = integer_analysis();
    let generator = CppGenerator::new(&analysis, options);
    let mut buffer: Vec<u8> = Vec::new();
    generator.generate(CppOutput::Single(&mut buffer)).unwrap();
    String::from_utf8(buffer).unwrap()
  }

  #[test]
  fn header_declares_the_public_surface() {
    let text = generated(&integer_options());

    assert!(text.contains("#ifndef INTEGER_H"));
    assert!(text.contains("class Integer {"));
    assert!(text.contains("typedef wchar_t Ch;"));
    assert!(text.contains("bool processChar(Ch ch);"));
    assert!(text.contains("bool final() const;"));
    assert!(text.contains("const Fields& fields() const;"));
    assert!(text.contains("struct Actions : Fields {"));
    assert!(text.contains("void do_set_sign(Ch ch);"));
    assert!(text.contains("int sign;"));
  }

  #[test]
  fn enums_cover_states_classes_and_actions() {
    let text = generated(&integer_options());

    assert!(text.contains("enum StateType {"));
    assert!(text.contains("  s_start,"));
    assert!(text.contains("  s_digits,"));
    assert!(text.contains("  s_error"));
    assert!(text.contains("  cc_0,"));
    assert!(text.contains("  cc_1,"));
    assert!(text.contains("  cc_other"));
    assert!(text.contains("a_set_sign = 1ULL << 0"));
    assert!(text.contains("a_accumulate = 1ULL << 1"));
  }

  #[test]
  fn tables_are_laid_out_per_state_and_class() {
    let text = generated(&integer_options());

    assert!(text.contains("static const int parserTransitions[3][3] = {"));
    assert!(text.contains("{ s_start, s_digits, s_error }, // s_start"));
    assert!(text.contains("{ s_error, s_digits, s_error }, // s_digits"));
    assert!(text.contains("{ s_error, s_error, s_error } // s_error"));
    assert!(text.contains("static const unsigned long long parserActions[3][3] = {"));
    assert!(text.contains("{ a_set_sign, a_accumulate, 0 }, // s_start"));
    assert!(text.contains("{ 0, a_accumulate, 0 }, // s_digits"));
  }

  #[test]
  fn classifier_switches_over_code_points() {
    let text = generated(&integer_options());

    assert!(text.contains("CharacterClass classifyChar(Integer::Ch ch) {"));
    assert!(text.contains("    case 0x2B: // '+'"));
    assert!(text.contains("    case 0x2D: // '-'"));
    assert!(text.contains("    case 0x30: // '0'"));
    assert!(text.contains("    case 0x39: // '9'"));
    assert!(text.contains("      return cc_other;"));
  }

  #[test]
  fn process_char_dispatches_in_registration_order() {
    let text = generated(&integer_options());

    assert!(text.contains("bool Integer::processChar(Ch ch) {"));
    let set_sign = text.find("  if (actions & a_set_sign) {").unwrap();
    let accumulate = text.find("  if (actions & a_accumulate) {").unwrap();
    assert!(set_sign < accumulate);
    assert!(text.contains("  return state_ != s_error;"));
    assert!(!text.contains("actions_.reset_fields();\n  const CharacterClass"));
  }

  #[test]
  fn reset_each_char_is_honored() {
    let mut options = integer_options();
    options.reset_each_char = true;
    let text = generated(&options);
    assert!(text.contains("bool Integer::processChar(Ch ch) {\n  actions_.reset_fields();"));
  }

  #[test]
  fn action_bodies_and_field_resets_are_emitted() {
    let text = generated(&integer_options());

    assert!(text.contains("void Integer::Actions::do_set_sign(Ch ch) {\n  sign = (ch == '-') ? -1 : 1;\n}"));
    assert!(text.contains("void Integer::Actions::reset_fields() {\n  sign = 1;\n  value = 0;\n}"));
    assert!(text.contains("  actions_.reset_fields();\n}"));
  }

  #[test]
  fn final_predicate_covers_final_states() {
    let text = generated(&integer_options());
    assert!(text.contains("bool isFinal(int state) {"));
    assert!(text.contains("    case s_digits:\n      return true;"));
  }

  #[test]
  fn namespaces_wrap_both_files() {
    let mut options = integer_options();
    options.namespace = "num::gen".to_string();
    let text = generated(&options);

    assert!(text.contains("namespace num {\nnamespace gen {"));
    assert!(text.contains("} // namespace gen\n} // namespace num"));
  }

  #[test]
  fn message_heads_the_output() {
    let mut options = integer_options();
    options.message = "machine-written, edit the definition instead".to_string();
    let text = generated(&options);
    assert!(text.starts_with("// machine-written, edit the definition instead\n"));
  }

  #[test]
  fn split_output_includes_the_header() {
    let analysis = integer_analysis();
    let options = integer_options();
    let generator = CppGenerator::new(&analysis, &options);

    let mut header: Vec<u8> = Vec::new();
    let mut source: Vec<u8> = Vec::new();
    generator.generate(CppOutput::Split {
      header: &mut header,
      source: &mut source,
    }).unwrap();

    let header = String::from_utf8(header).unwrap();
    let source = String::from_utf8(source).unwrap();
    assert!(header.contains("#ifndef INTEGER_H"));
    assert!(source.contains("#include \"Integer.h\""));
    assert!(source.contains("parserTransitions"));
  }

  #[test]
  fn builder_fragments_see_the_generator_context() {
    fn body(context: &GeneratorContext) -> String {
      format!("// emitted for {}", context.class_name)
    }

    let mut machine = Automaton::new("M", Encoding::Utf8);
    machine.declare_action("tick", ActionConfig::default(), CodeFragment::Builder(body))
           .unwrap();
    let mut state = machine.declare_state("s", false).unwrap();
    state.transition("a", "s", &["tick"]).unwrap();
    let analysis = Analysis::of(&mut machine).unwrap();

    let mut options = GeneratorOptions::default();
    options.class_name = "M".to_string();
    let generator = CppGenerator::new(&analysis, &options);
    let mut buffer: Vec<u8> = Vec::new();
    generator.generate(CppOutput::Single(&mut buffer)).unwrap();
    let text = String::from_utf8(buffer).unwrap();

    assert!(text.contains("void do_tick();"));
    assert!(text.contains("void M::Actions::do_tick() {\n  // emitted for M\n}"));
    assert!(text.contains("    actions_.do_tick();"));
  }
}
