use std::rc::Rc;

use crate::vm::bytecode::Function;

/// An active call. `slot` is the stack index holding the callee; its locals
/// start right above it.
#[derive(Clone)]
pub struct CallFrame {
    pub function: Rc<Function>,
    pub ip: usize,
    pub slot: usize,
}

impl CallFrame {
    pub fn new(function: Rc<Function>, slot: usize) -> Self {
        Self {
            function,
            ip: 0,
            slot,
        }
    }

    /// Line of the instruction most recently fetched.
    pub fn current_line(&self) -> usize {
        self.function.chunk.line_at(self.ip.saturating_sub(1))
    }
}
