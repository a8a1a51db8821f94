/// One active call at the moment a runtime error was raised.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceFrame {
    pub function: String,
    pub line: usize,
}

/// Snapshot of the VM call stack, outermost frame first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackTrace {
    frames: Vec<TraceFrame>,
}

impl StackTrace {
    pub fn push_frame(&mut self, frame: TraceFrame) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[TraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Innermost call first.
    pub fn format_trace(&self) -> String {
        let mut out = String::new();
        for frame in self.frames.iter().rev() {
            out.push_str(&format!("    at {} (line {})\n", frame.function, frame.line));
        }
        out
    }
}
