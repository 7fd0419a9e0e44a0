//! # Compilation Status & Branch State
//!
//! Two small pieces of state, deliberately kept separate:
//! [`CompilationStatus`] is shared across every branch of one `compile()`
//! call (a visited-offset bitmap plus a cumulative success flag);
//! [`BranchState`] is local to one traversal of the driver and is *copied*,
//! never shared, across the two successors of a conditional branch.

use crate::error::CompileWarning;

/// State shared across every branch of a single `compile()` call.
///
/// `visited[offset]` is the single source of truth for "has this offset
/// already been emitted":
/// the driver marks an offset visited before emitting its label, and
/// anything that would walk onto an already-visited offset emits a `goto`
/// instead of a duplicate body.
pub struct CompilationStatus {
    success: bool,
    visited: Vec<bool>,
    diagnostics: Vec<CompileWarning>,
}

impl CompilationStatus {
    /// Allocates the `visited` bitmap for a stream of `encoded_size` words.
    /// `success` starts `true`.
    pub fn new(encoded_size: usize) -> Self {
        Self {
            success: true,
            visited: vec![false; encoded_size],
            diagnostics: Vec::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn is_visited(&self, offset: usize) -> bool {
        self.visited.get(offset).copied().unwrap_or(false)
    }

    pub fn mark_visited(&mut self, offset: usize) {
        if let Some(slot) = self.visited.get_mut(offset) {
            *slot = true;
        }
    }

    /// Record a diagnosed problem and permanently flip `success` to `false`.
    /// Logs one `tracing::warn!` line unless [`crate::config::Verbosity::Silent`]
    /// is in effect.
    pub fn fail(&mut self, warning: CompileWarning) {
        self.success = false;
        if crate::config::verbosity() != crate::config::Verbosity::Silent {
            tracing::warn!(%warning, "JIT compile warning");
        }
        self.diagnostics.push(warning);
    }

    pub fn diagnostics(&self) -> &[CompileWarning] {
        &self.diagnostics
    }
}

/// State local to one traversal of the driver; copied by value at every
/// conditional fork so that mutations in one successor never leak into the
/// other.
#[derive(Clone, Copy, Debug)]
pub struct BranchState {
    /// Number of logical operand-stack slots live at the current offset of
    /// the current branch. Mirrors YARV's `sp` without any real stack
    /// pointer maintenance inside the compiled body.
    pub stack_size: u32,
    /// Set once this branch reaches a terminal instruction (`leave`,
    /// `throw`); the driver stops walking this branch when it is `true`.
    pub finish_p: bool,
}

impl BranchState {
    pub fn entry(stack_size: u32) -> Self {
        Self { stack_size, finish_p: false }
    }
}
