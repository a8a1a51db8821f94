pub mod diagnostics;
pub mod engine;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod vm;

pub use engine::Engine;
pub use errors::IberyError;
pub use vm::bytecode::{Chunk, Value};
pub use vm::machine::{Vm, VmConfig};
pub use vm::{Status, compile_source, interpret};

/// Convenience function to run Ibery++ source end-to-end, returning the VM
/// so its globals can be inspected.
pub fn run(source: &str) -> Result<Vm, IberyError> {
    let mut vm = Vm::new();
    vm.interpret(source)?;
    Ok(vm)
}
