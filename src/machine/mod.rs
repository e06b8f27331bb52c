
pub mod limits;
pub mod debug;
pub mod error;
pub mod encoding;
pub mod charset;
pub mod action;
pub mod state;
pub mod automaton;
pub mod partition;
pub mod analysis;


// We alias types to enforce size restrictions on their values.
pub type CodePoint  = u32;   //< A Unicode code point (or raw byte value in narrow encodings)
pub type ActionMask = u64;   //< Bit `1 << order_key` is set iff that action fires
pub type StateIndex = usize; //< An index into the ordered state registry
pub type ClassIndex = usize; //< An index into the character-class partition

pub use action::{Action, ActionConfig, CodeFragment, GeneratorContext};
pub use analysis::{Analysis, TableEntry};
pub use automaton::{Automaton, Key, StateHandle};
pub use charset::CodeSet;
pub use encoding::Encoding;
pub use error::MachineError;
pub use partition::Partition;
pub use state::{State, Transition};
