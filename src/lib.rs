/*!

  `statec` turns a declarative description of a deterministic character-driven
  state machine into (a) a C++ class implementing a streaming
  character-by-character parser for that machine and (b) a Graphviz `dot`
  rendering of its state diagram.

  A machine is described programmatically: actions first, then states, then
  character-triggered transitions between them. Analysis collapses every
  character set mentioned anywhere in the machine into a minimal disjoint
  partition of character classes and lays out total transition tables over
  (state, class) pairs. The emitters consume the analyzed machine.

*/

pub mod codegen;
pub mod machine;

pub use machine::automaton::Automaton;
pub use machine::analysis::Analysis;
pub use machine::charset::CodeSet;
pub use machine::encoding::Encoding;
pub use machine::error::MachineError;
