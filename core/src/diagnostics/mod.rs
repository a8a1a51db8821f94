pub mod fixer;
pub mod source_map;
pub mod stack_trace;

pub use fixer::{Fix, FixKind, LineFixer, Preprocessor, apply_fixes};
pub use source_map::SourceMap;
pub use stack_trace::StackTrace;
