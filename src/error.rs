//! # Diagnostics for the JIT Translator
//!
//! This module defines [`CompileWarning`], the structured form of the two
//! kinds of problem a compile can diagnose (unsupported opcode, stack-model
//! violation). Unlike a VM's own runtime errors, a `CompileWarning` never
//! aborts anything by itself — compilation always finishes and always
//! leaves a syntactically closed procedure behind. It only ever flips
//! [`crate::status::CompilationStatus::success`] to `false` and gets
//! appended to the status's diagnostic list.
//!
//! `CompileWarning` derives [`thiserror::Error`] rather than hand-writing
//! `Display`.

use thiserror::Error;

/// A single diagnosed problem encountered while compiling one method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileWarning {
    /// Opcode not in the translator's dispatch, or deliberately excluded
    /// (`getblockparam`, `setblockparam`, `defineclass`, `once`).
    #[error("unsupported opcode at offset {offset}: {mnemonic}")]
    UnsupportedOpcode {
        offset: usize,
        mnemonic: &'static str,
    },

    /// Simulated stack depth exceeded the method's declared `stack_max`.
    #[error("JIT stack exceeded its max at offset {offset}: stack_size={stack_size} stack_max={stack_max}")]
    StackExceeded {
        offset: usize,
        stack_size: u32,
        stack_max: u32,
    },

    /// `leave` was reached with a simulated stack depth other than 1.
    #[error("unexpected JIT stack_size on leave: {stack_size}")]
    UnexpectedLeaveDepth { stack_size: u32 },
}
