/// Resource limits and tracing for one VM instance.
///
/// Call depth is unbounded by default; deep chains are still limited by the
/// operand stack, which holds one callee per active frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    pub max_stack: usize,
    pub max_frames: usize,
    pub trace: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_stack: 65_536,
            max_frames: usize::MAX,
            trace: false,
        }
    }
}

impl VmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_stack(mut self, max: usize) -> Self {
        self.max_stack = max;
        self
    }

    /// Cap call depth. Calls past the cap fail with `call stack overflow`.
    pub fn with_max_frames(mut self, max: usize) -> Self {
        self.max_frames = max;
        self
    }

    /// Log every executed instruction at `trace` level.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}
