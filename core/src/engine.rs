use crate::diagnostics::fixer::{Fix, LineFixer, Preprocessor, apply_fixes};
use crate::vm::machine::{Intrinsics, StdIntrinsics, Vm, VmConfig};

/// Source text after preprocessing, with the fixes that were suggested.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub source: String,
    pub fixes: Vec<Fix>,
    pub applied: bool,
}

/// Builder for configured VMs and the preprocessing step in front of them.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: VmConfig,
    apply_fixes: bool,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_stack(mut self, max: usize) -> Self {
        self.config = self.config.with_max_stack(max);
        self
    }

    pub fn with_max_frames(mut self, max: usize) -> Self {
        self.config = self.config.with_max_frames(max);
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.config = self.config.with_trace(trace);
        self
    }

    /// Apply suggested fixes to the source instead of only reporting them.
    pub fn with_fixes(mut self, apply: bool) -> Self {
        self.apply_fixes = apply;
        self
    }

    pub fn config(&self) -> VmConfig {
        self.config
    }

    pub fn prepare(&self, source: &str) -> Prepared {
        let fixes = LineFixer.suggest(source);
        for fix in &fixes {
            tracing::debug!(line = fix.line, column = fix.column, kind = ?fix.kind, "{}", fix.message);
        }

        let applicable = fixes.iter().any(|fix| fix.replacement.is_some());
        if self.apply_fixes && applicable {
            tracing::info!(count = fixes.len(), "applying source fixes");
            Prepared {
                source: apply_fixes(source, &fixes),
                fixes,
                applied: true,
            }
        } else {
            Prepared {
                source: source.to_string(),
                fixes,
                applied: false,
            }
        }
    }

    pub fn new_vm(&self) -> Vm {
        Vm::with_config(self.config, StdIntrinsics::new())
    }

    pub fn new_vm_with<I: Intrinsics>(&self, intrinsics: I) -> Vm<I> {
        Vm::with_config(self.config, intrinsics)
    }
}
