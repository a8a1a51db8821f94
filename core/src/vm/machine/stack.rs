use crate::errors::RuntimeErrorKind;
use crate::vm::bytecode::Value;

/// Bounded operand stack.
pub struct Stack {
    values: Vec<Value>,
    limit: usize,
}

impl Stack {
    pub fn new(limit: usize) -> Self {
        Self {
            values: Vec::with_capacity(limit.min(256)),
            limit,
        }
    }

    pub fn push(&mut self, value: Value) -> Result<(), RuntimeErrorKind> {
        if self.values.len() >= self.limit {
            return Err(RuntimeErrorKind::StackOverflow { limit: self.limit });
        }
        self.values.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Value, RuntimeErrorKind> {
        self.values.pop().ok_or(RuntimeErrorKind::StackUnderflow)
    }

    /// The value `offset` slots below the top.
    pub fn peek(&self, offset: usize) -> Result<&Value, RuntimeErrorKind> {
        let idx = self
            .values
            .len()
            .checked_sub(offset + 1)
            .ok_or(RuntimeErrorKind::StackUnderflow)?;
        Ok(&self.values[idx])
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn set(&mut self, idx: usize, value: Value) -> bool {
        match self.values.get_mut(idx) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
