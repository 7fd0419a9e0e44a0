//! # Emitter
//!
//! An append-only sink of native-source text, plus the small formatting
//! helpers that the per-opcode translator (`crate::translate`) calls into
//! so that recurring idioms —
//! local load/store, argument blits, cached call sites, case dispatch —
//! read as one line of text at the call site rather than a hand-written
//! `write!` block repeated in every opcode arm.
//!
//! Emission is synchronous and infallible from the translator's point of
//! view: [`Emitter`] implements [`std::fmt::Write`] over an in-memory
//! `String`, so helpers use ordinary `writeln!`/`write!` and `.unwrap()`
//! the (never-failing) result, matching "append-only,
//! synchronous sink" resource model.

mod calls;
mod dispatch;
mod locals;
mod aggregates;

pub use calls::*;
pub use dispatch::*;
pub use locals::*;
pub use aggregates::*;

use std::fmt::{self, Write as _};

use crate::config::{verbosity, AbiNames, Verbosity};

/// Reserved label the cancel epilogue lives at; no real offset ever
/// collides with it since offsets are instruction indices.
pub const CANCEL_LABEL: &str = "cancel";

/// Append-only native-source text sink for one `compile()` call.
pub struct Emitter {
    buf: String,
    abi: AbiNames,
}

impl Emitter {
    pub fn new(abi: AbiNames) -> Self {
        Self { buf: String::new(), abi }
    }

    pub fn abi(&self) -> &AbiNames {
        &self.abi
    }

    /// Consumes the emitter, returning the accumulated native source.
    pub fn into_source(self) -> String {
        self.buf
    }

    /// Emits a `label_<offset>:` with the opcode mnemonic as a trailing
    /// comment, matching "emit a label `label_<pos>:`". At [`Verbosity::Verbose`]
    /// also logs one `tracing::debug!` per label.
    pub fn label(&mut self, offset: usize, mnemonic: &str) {
        writeln!(self, "\nlabel_{offset}: /* {mnemonic} */").unwrap();
        if verbosity() == Verbosity::Verbose {
            tracing::debug!(offset, mnemonic, "emitting label");
        }
    }

    /// Emits the `cfp->pc = <literal>` assignment every opcode arm starts
    /// with, keeping catch-table lookup and
    /// cancellation-time `cfp->pc` consistent with the current offset.
    pub fn set_pc(&mut self, offset: usize) {
        writeln!(self, "  cfp->pc = (void *)0x{offset:x};").unwrap();
    }

    /// Emits an unconditional `goto label_<target>;`.
    pub fn goto(&mut self, target: usize) {
        writeln!(self, "  goto label_{target};").unwrap();
    }

    /// Emits an unconditional `goto cancel;` to the shared bailout epilogue.
    pub fn goto_cancel(&mut self) {
        writeln!(self, "  goto {CANCEL_LABEL};").unwrap();
    }

    /// Emits one indented statement line, terminated with `;`.
    pub fn stmt(&mut self, text: impl fmt::Display) {
        writeln!(self, "  {text};").unwrap();
    }

    /// Emits one raw line, with no indentation or trailing `;` added —
    /// for braces, `if`/`case` headers, and other structural lines.
    pub fn raw_line(&mut self, text: impl fmt::Display) {
        writeln!(self, "{text}").unwrap();
    }
}

impl fmt::Write for Emitter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.push_str(s);
        Ok(())
    }
}
