use std::path::PathBuf;

use structopt::StructOpt;

use statec::codegen::cpp::{CppGenerator, CppOutput};
use statec::codegen::dot::{DotGenerator, DotOptions};
use statec::codegen::options::{FieldDecl, GeneratorOptions};
use statec::machine::action::{ActionConfig, CodeFragment};
use statec::machine::analysis::Analysis;
use statec::machine::automaton::Automaton;
use statec::machine::encoding::Encoding;
use statec::machine::error::MachineError;


#[derive(Debug, StructOpt)]
#[structopt(name = "statec", about = "A state machine parser generator.")]
struct Options {
  #[structopt(short, long, default_value = "Integer")]
  /// Class and graph name for the generated parser
  name: String,

  #[structopt(short, long, parse(from_os_str))]
  /// write the generated parser to BASE.h and BASE.cpp instead of stdout
  output_base: Option<PathBuf>,

  #[structopt(short, long, parse(from_os_str))]
  /// write the machine's state diagram in Graphviz format to FILE
  graph_file: Option<PathBuf>,

  #[structopt(long)]
  /// wrap the generated parser in C++ namespace NAME1::NAME2
  namespace: Option<String>,

  #[structopt(long, default_value = "wchar_t")]
  /// character type of the generated parser
  char_type: String,
}


/// The built-in demonstration machine: a signed-integer recognizer.
fn integer_machine(name: &str) -> Result<Automaton, MachineError> {
  let mut machine = Automaton::new(name, Encoding::Utf8);

  machine.declare_action(
    "set_sign",
    ActionConfig::with_char("ch"),
    CodeFragment::Source("sign = (ch == '-') ? -1 : 1;".to_string())
  )?;
  machine.declare_action(
    "accumulate",
    ActionConfig::with_char("ch"),
    CodeFragment::Source("value = value * 10 + (ch - '0');".to_string())
  )?;

  let mut start = machine.declare_state("start", false)?;
  start.transition("+-", "start", &["set_sign"])?;
  start.transition("0-9", "digits", &["accumulate"])?;

  let mut digits = machine.declare_state("digits", true)?;
  digits.transition("0-9", "digits", &["accumulate"])?;

  Ok(machine)
}


fn run(options: &Options) -> Result<(), MachineError> {
  let mut machine = integer_machine(&options.name)?;

  if let Some(path) = &options.graph_file {
    let dot_options = DotOptions::default();
    let generator = DotGenerator::new(&machine, &dot_options);
    let mut file = std::fs::File::create(path)?;
    generator.write(&mut file)?;
  }

  let analysis = Analysis::of(&mut machine)?;

  let generator_options = GeneratorOptions {
    class_name: options.name.clone(),
    namespace: options.namespace.clone().unwrap_or_default(),
    char_type: options.char_type.clone(),
    message: "Generated by statec. Edit the machine definition instead.".to_string(),
    fields: vec![
      FieldDecl {
        cpp_type: "int".to_string(),
        name: "sign".to_string(),
        init: "1".to_string()
      },
      FieldDecl {
        cpp_type: "long".to_string(),
        name: "value".to_string(),
        init: "0".to_string()
      },
    ],
    reset_each_char: false,
  };

  let generator = CppGenerator::new(&analysis, &generator_options);
  match &options.output_base {
    Some(base) => {
      generator.generate(CppOutput::FileBase(base))?;
    }
    None       => {
      let stdout = std::io::stdout();
      let mut lock = stdout.lock();
      generator.generate(CppOutput::Single(&mut lock))?;
    }
  }

  Ok(())
}


fn main() {
  let options = Options::from_args();

  if let Err(error) = run(&options) {
    error.emit();
  }

  println!("Done!")
}
