mod call_frame;
mod config;
pub mod intrinsics;
mod stack;
mod terminal;

use std::rc::Rc;

use crate::diagnostics::stack_trace::{StackTrace, TraceFrame};
use crate::errors::{IberyError, RuntimeError, RuntimeErrorKind};
use crate::vm::Status;
use crate::vm::bytecode::{Chunk, Function, Interner, Opcode, Table, Value};

use call_frame::CallFrame;
pub use config::VmConfig;
pub use intrinsics::{Intrinsics, RecordingIntrinsics, StdIntrinsics};
use stack::Stack;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmState {
    Ready,
    Running,
    Halted(Status),
}

enum Flow {
    Continue,
    Halt,
}

/// Stack-based bytecode interpreter.
///
/// Globals persist across [`Vm::run`] calls; the operand stack and call
/// frames are rebuilt for each run.
pub struct Vm<I: Intrinsics = StdIntrinsics> {
    config: VmConfig,
    stack: Stack,
    frames: Vec<CallFrame>,
    globals: Table,
    strings: Interner,
    intrinsics: I,
    state: VmState,
}

impl Vm<StdIntrinsics> {
    pub fn new() -> Self {
        Self::with_config(VmConfig::default(), StdIntrinsics::new())
    }
}

impl Default for Vm<StdIntrinsics> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Intrinsics> Vm<I> {
    pub fn with_intrinsics(intrinsics: I) -> Self {
        Self::with_config(VmConfig::default(), intrinsics)
    }

    pub fn with_config(config: VmConfig, intrinsics: I) -> Self {
        Self {
            config,
            stack: Stack::new(config.max_stack),
            frames: Vec::new(),
            globals: Table::new(),
            strings: Interner::new(),
            intrinsics,
            state: VmState::Ready,
        }
    }

    pub fn config(&self) -> VmConfig {
        self.config
    }

    pub fn state(&self) -> VmState {
        self.state
    }

    pub fn intrinsics(&self) -> &I {
        &self.intrinsics
    }

    pub fn intrinsics_mut(&mut self) -> &mut I {
        &mut self.intrinsics
    }

    /// Bind a host value, such as a [`Value::Command`], before running.
    pub fn define_global(&mut self, name: &str, value: Value) {
        let key = self.strings.intern(name);
        self.globals.set(key, value);
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn globals(&self) -> &Table {
        &self.globals
    }

    /// Drop all globals and return to the ready state.
    pub fn reset(&mut self) {
        self.globals = Table::new();
        self.stack.clear();
        self.frames.clear();
        self.state = VmState::Ready;
    }

    /// Compile and run `source`.
    pub fn interpret(&mut self, source: &str) -> Result<(), IberyError> {
        let chunk = match super::compile_source(source) {
            Ok(chunk) => chunk,
            Err(err) => {
                self.state = VmState::Halted(Status::CompileError);
                return Err(err.into());
            }
        };
        self.run(chunk)?;
        Ok(())
    }

    /// Execute a top-level chunk until it returns or faults.
    pub fn run(&mut self, chunk: Chunk) -> Result<(), RuntimeError> {
        self.stack.clear();
        self.frames.clear();
        self.state = VmState::Running;

        let script = Rc::new(Function {
            name: chunk.name.clone(),
            arity: 0,
            chunk,
        });
        let result = match self.stack.push(Value::Function(Rc::clone(&script))) {
            Ok(()) => {
                self.frames.push(CallFrame::new(script, 0));
                self.execute()
            }
            Err(kind) => Err(RuntimeError::new(kind, 0)),
        };

        self.stack.clear();
        self.frames.clear();
        match &result {
            Ok(()) => self.state = VmState::Halted(Status::Ok),
            Err(err) => {
                tracing::debug!(line = err.line, "runtime error: {}", err.kind);
                self.state = VmState::Halted(Status::RuntimeError);
            }
        }
        result
    }

    fn execute(&mut self) -> Result<(), RuntimeError> {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                return Ok(());
            };
            let ip = frame.ip;
            let op = match frame.function.chunk.instructions.get(ip).copied() {
                Some(op) => {
                    frame.ip += 1;
                    op
                }
                None => {
                    // running off the end returns null
                    if let Err(kind) = self.stack.push(Value::Null) {
                        return Err(self.fault(kind));
                    }
                    Opcode::Return
                }
            };

            if self.config.trace {
                tracing::trace!(
                    target: "ibery::vm",
                    depth = self.frames.len(),
                    stack = self.stack.len(),
                    "{ip:04} {op}"
                );
            }

            match self.step(op) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Halt) => return Ok(()),
                Err(kind) => return Err(self.fault(kind)),
            }
        }
    }

    fn step(&mut self, op: Opcode) -> Result<Flow, RuntimeErrorKind> {
        match op {
            Opcode::Constant(idx) => {
                let value = self.constant(idx)?;
                self.stack.push(value)?;
            }
            Opcode::Null => self.stack.push(Value::Null)?,
            Opcode::True => self.stack.push(Value::Boolean(true))?,
            Opcode::False => self.stack.push(Value::Boolean(false))?,
            Opcode::Pop => {
                self.stack.pop()?;
            }

            Opcode::GetLocal(slot) => {
                let idx = self.local_index(slot)?;
                let value = self
                    .stack
                    .get(idx)
                    .cloned()
                    .ok_or(RuntimeErrorKind::BadLocal { slot })?;
                self.stack.push(value)?;
            }
            Opcode::SetLocal(slot) => {
                let idx = self.local_index(slot)?;
                let value = self.stack.peek(0)?.clone();
                if !self.stack.set(idx, value) {
                    return Err(RuntimeErrorKind::BadLocal { slot });
                }
            }
            Opcode::GetGlobal(idx) => {
                let name = self.global_name(idx)?;
                let value = self.globals.get(&name).cloned().ok_or_else(|| {
                    RuntimeErrorKind::UndefinedVariable {
                        name: name.to_string(),
                    }
                })?;
                self.stack.push(value)?;
            }
            Opcode::DefineGlobal(idx) => {
                let name = self.global_name(idx)?;
                let value = self.stack.pop()?;
                self.globals.set(name, value);
            }
            Opcode::SetGlobal(idx) => {
                let name = self.global_name(idx)?;
                let value = self.stack.peek(0)?.clone();
                if !self.globals.assign(&name, value) {
                    return Err(RuntimeErrorKind::UndefinedVariable {
                        name: name.to_string(),
                    });
                }
            }

            Opcode::Equal => {
                let rhs = self.stack.pop()?;
                let lhs = self.stack.pop()?;
                self.stack.push(Value::Boolean(lhs == rhs))?;
            }
            Opcode::Greater => self.binary_op(">", |a, b| Value::Boolean(a > b))?,
            Opcode::Less => self.binary_op("<", |a, b| Value::Boolean(a < b))?,
            Opcode::Add => self.binary_op("+", |a, b| Value::Number(a + b))?,
            Opcode::Subtract => self.binary_op("-", |a, b| Value::Number(a - b))?,
            Opcode::Multiply => self.binary_op("*", |a, b| Value::Number(a * b))?,
            Opcode::Divide => self.binary_op("/", |a, b| Value::Number(a / b))?,
            Opcode::Not => {
                let value = self.stack.pop()?;
                self.stack.push(Value::Boolean(value.is_falsey()))?;
            }
            Opcode::Negate => match self.stack.pop()? {
                Value::Number(n) => self.stack.push(Value::Number(-n))?,
                other => {
                    return Err(RuntimeErrorKind::OperandTypeMismatch {
                        op: "negate",
                        expected: "a number",
                        found: other.type_name(),
                    });
                }
            },

            Opcode::Print => {
                let value = self.stack.pop()?;
                self.intrinsics.print(&value.to_string());
            }
            Opcode::Jump(offset) => self.jump_forward(offset)?,
            Opcode::JumpIfFalse(offset) => {
                if self.stack.peek(0)?.is_falsey() {
                    self.jump_forward(offset)?;
                }
            }
            Opcode::Loop(offset) => {
                let frame = self.frame_mut()?;
                frame.ip = frame
                    .ip
                    .checked_sub(usize::from(offset))
                    .ok_or(RuntimeErrorKind::BadJump)?;
            }
            Opcode::Call(argc) => self.call_value(argc)?,
            Opcode::Return => return self.return_from_frame(),

            Opcode::Input => {
                let prompt = self.stack.pop()?;
                let line = self.intrinsics.read_line(&prompt.to_string()).map_err(|err| {
                    RuntimeErrorKind::Intrinsic {
                        intrinsic: "input",
                        message: err.to_string(),
                    }
                })?;
                let line = self.strings.intern(&line);
                self.stack.push(Value::String(line))?;
            }
            Opcode::ToNumber => {
                let value = self.stack.pop()?;
                self.stack.push(Value::Number(value.to_number()))?;
            }
            Opcode::Scene => {
                let title = self.stack.pop()?;
                self.intrinsics.begin_scene(&title);
            }
            Opcode::Animate => match self.stack.pop()? {
                Value::Animation(animation) => self.intrinsics.render(&animation),
                other => {
                    return Err(RuntimeErrorKind::OperandTypeMismatch {
                        op: "animate",
                        expected: "an animation",
                        found: other.type_name(),
                    });
                }
            },
        }
        Ok(Flow::Continue)
    }

    fn binary_op(
        &mut self,
        op: &'static str,
        apply: fn(f64, f64) -> Value,
    ) -> Result<(), RuntimeErrorKind> {
        let rhs = self.stack.pop()?;
        let lhs = self.stack.pop()?;
        match (&lhs, &rhs) {
            (Value::Number(a), Value::Number(b)) => self.stack.push(apply(*a, *b)),
            (Value::Number(_), other) | (other, _) => {
                Err(RuntimeErrorKind::OperandTypeMismatch {
                    op,
                    expected: "two numbers",
                    found: other.type_name(),
                })
            }
        }
    }

    fn call_value(&mut self, argc: u8) -> Result<(), RuntimeErrorKind> {
        let args = usize::from(argc);
        match self.stack.peek(args)?.clone() {
            Value::Function(function) => {
                if function.arity != argc {
                    return Err(RuntimeErrorKind::ArityMismatch {
                        expected: function.arity,
                        got: argc,
                    });
                }
                if self.frames.len() >= self.config.max_frames {
                    return Err(RuntimeErrorKind::FrameOverflow {
                        limit: self.config.max_frames,
                    });
                }
                tracing::trace!(function = %function.name, depth = self.frames.len() + 1, "call");
                let slot = self.stack.len() - args - 1;
                self.frames.push(CallFrame::new(function, slot));
                Ok(())
            }
            Value::Command(command) => {
                self.stack.truncate(self.stack.len() - args - 1);
                let status = self.intrinsics.shell(&command).map_err(|err| {
                    RuntimeErrorKind::Intrinsic {
                        intrinsic: "shell",
                        message: err.to_string(),
                    }
                })?;
                if status != 0 {
                    tracing::warn!(command = %command.line, status, "command exited with a failure status");
                }
                self.stack.push(Value::Number(f64::from(status)))
            }
            other => Err(RuntimeErrorKind::NotCallable {
                type_name: other.type_name(),
            }),
        }
    }

    fn return_from_frame(&mut self) -> Result<Flow, RuntimeErrorKind> {
        let result = self.stack.pop()?;
        let Some(frame) = self.frames.pop() else {
            return Ok(Flow::Halt);
        };
        self.stack.truncate(frame.slot);
        if self.frames.is_empty() {
            return Ok(Flow::Halt);
        }
        self.stack.push(result)?;
        Ok(Flow::Continue)
    }

    fn frame(&self) -> Result<&CallFrame, RuntimeErrorKind> {
        self.frames.last().ok_or(RuntimeErrorKind::StackUnderflow)
    }

    fn frame_mut(&mut self) -> Result<&mut CallFrame, RuntimeErrorKind> {
        self.frames.last_mut().ok_or(RuntimeErrorKind::StackUnderflow)
    }

    fn jump_forward(&mut self, offset: u16) -> Result<(), RuntimeErrorKind> {
        let frame = self.frame_mut()?;
        let target = frame.ip + usize::from(offset);
        if target > frame.function.chunk.len() {
            return Err(RuntimeErrorKind::BadJump);
        }
        frame.ip = target;
        Ok(())
    }

    fn local_index(&self, slot: u8) -> Result<usize, RuntimeErrorKind> {
        Ok(self.frame()?.slot + 1 + usize::from(slot))
    }

    fn constant(&self, index: u16) -> Result<Value, RuntimeErrorKind> {
        self.frame()?
            .function
            .chunk
            .constants
            .get(usize::from(index))
            .cloned()
            .ok_or(RuntimeErrorKind::BadConstant { index })
    }

    fn global_name(&self, index: u16) -> Result<Rc<str>, RuntimeErrorKind> {
        match self.constant(index)? {
            Value::String(name) => Ok(name),
            _ => Err(RuntimeErrorKind::BadGlobalName { index }),
        }
    }

    /// Locate `kind` at the faulting instruction and snapshot the call stack.
    fn fault(&self, kind: RuntimeErrorKind) -> RuntimeError {
        let line = self.frames.last().map_or(0, CallFrame::current_line);
        let mut trace = StackTrace::default();
        for frame in &self.frames {
            trace.push_frame(TraceFrame {
                function: frame.function.name.clone(),
                line: frame.current_line(),
            });
        }
        RuntimeError::new(kind, line).with_trace(trace)
    }
}
