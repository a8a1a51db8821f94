mod chunk;
mod disassemble;
pub mod format;
mod opcode;
mod table;
mod value;

pub use chunk::{Chunk, MAX_CONSTANTS};
pub use opcode::Opcode;
pub use table::{Interner, Table};
pub use value::{Animation, Command, Function, Value};
