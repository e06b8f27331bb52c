
pub mod options;
pub mod cpp;
pub mod dot;

pub use cpp::{CppGenerator, CppOutput};
pub use dot::{DotGenerator, DotOptions};
pub use options::{FieldDecl, GeneratorOptions};
