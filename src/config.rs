//! # Configuration
//!
//! Two independent knobs, both read-only once compilation starts:
//!
//! - [`Verbosity`]: whether/how loudly [`crate::error::CompileWarning`]s are
//!   logged. Backed by a process-wide [`once_cell::sync::OnceCell`].
//! - [`AbiNames`]: the concrete identifiers the emitted procedure uses for
//!   the thread-context type, frame type, and value-type placeholders in the
//!   procedure's signature. This isn't a wire-format choice — it's how this
//!   core's text lines up with whatever the target native compiler's
//!   headers actually call those types.

use once_cell::sync::OnceCell;

static VERBOSITY: OnceCell<Verbosity> = OnceCell::new();

/// How loudly [`crate::error::CompileWarning`]s are surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Diagnostics are still collected on [`crate::status::CompilationStatus`]
    /// but nothing is logged.
    Silent,
    /// One `tracing::warn!` per diagnosed problem (the default).
    Warnings,
    /// Warnings plus one `tracing::debug!` per label emitted.
    Verbose,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Warnings
    }
}

/// Set the process-wide verbosity once. Returns `Err(())` if it was already
/// initialised (by a previous call, or by [`verbosity`]'s first read).
pub fn init(level: Verbosity) -> Result<(), ()> {
    VERBOSITY.set(level).map_err(|_| ())
}

/// Current verbosity, defaulting from the `VMJIT_VERBOSE` environment
/// variable (`"quiet"`, `"warn"`/unset, `"verbose"`) the first time it's
/// read, then fixed for the remainder of the process.
pub fn verbosity() -> Verbosity {
    *VERBOSITY.get_or_init(|| match std::env::var("VMJIT_VERBOSE").as_deref() {
        Ok("quiet") => Verbosity::Silent,
        Ok("verbose") => Verbosity::Verbose,
        _ => Verbosity::Warnings,
    })
}

/// Names substituted for the generic thread-context, frame, and value-type
/// placeholders in the emitted procedure's signature.
#[derive(Debug, Clone)]
pub struct AbiNames {
    pub thread_ctx_type: String,
    pub frame_type: String,
    pub value_type: String,
    /// Sentinel meaning "no value" (`Qnil`).
    pub nil_literal: String,
    /// Sentinel meaning "fast path declined, fall back" (`Qundef`).
    pub undef_literal: String,
}

impl Default for AbiNames {
    fn default() -> Self {
        Self {
            thread_ctx_type: "rb_thread_t".to_string(),
            frame_type: "rb_control_frame_t".to_string(),
            value_type: "VALUE".to_string(),
            nil_literal: "Qnil".to_string(),
            undef_literal: "Qundef".to_string(),
        }
    }
}
