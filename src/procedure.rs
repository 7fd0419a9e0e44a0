//! # Procedure Assembly
//!
//! Wraps the branch driver with the function-level shell `mjit_compile`
//! itself emits around `compile_insns`: a signature, the simulated-stack
//! declaration, the driver's walk from offset 0, and the cancel epilogue
//! every compiled procedure falls through to if the fast-path native code
//! can't finish the method.

use crate::config::{self, AbiNames, Verbosity};
use crate::emitter::{Emitter, CANCEL_LABEL};
use crate::status::{BranchState, CompilationStatus};
use crate::stream::MethodBody;

/// Compile one method body into a single native-source procedure.
///
/// Returns the emitted source text and the [`CompilationStatus`] recording
/// whether every opcode translated cleanly. A `false` status never means
/// the returned text is malformed — the procedure is
/// always syntactically complete, just possibly not worth feeding to the
/// native compiler.
pub fn compile(body: &MethodBody, funcname: &str, abi: &AbiNames) -> (String, CompilationStatus) {
    let mut status = CompilationStatus::new(body.encoded_size());
    let mut e = Emitter::new(abi.clone());

    emit_prologue(&mut e, body, funcname);

    let entry = BranchState::entry(0);
    crate::driver::compile_insns(&mut e, &mut status, body, entry, 0);

    emit_cancel_epilogue(&mut e, body);
    e.raw_line("}");

    if config::verbosity() != Verbosity::Silent {
        tracing::debug!(funcname, success = status.success(), "compiled method body");
    }

    (e.into_source(), status)
}

/// Emits the function signature and the `stack[stack_max]` local that
/// backs every simulated slot the translator writes into.
fn emit_prologue(e: &mut Emitter, body: &MethodBody, funcname: &str) {
    let value_type = e.abi().value_type.clone();
    let thread_ctx_type = e.abi().thread_ctx_type.clone();
    let frame_type = e.abi().frame_type.clone();
    e.raw_line(format_args!(
        "{value_type}\n{funcname}({thread_ctx_type} *th, {frame_type} *cfp)\n{{"
    ));
    e.stmt(format_args!("{value_type} stack[{}]", body.stack_max.max(1)));
}

/// Emits the shared bailout path: every simulated slot is spilled back to
/// the real VM stack through the environment pointer, and the sentinel
/// meaning "re-enter the interpreter here" is returned
/// (`mjit_compile.c`'s `compile_cancel_handler`).
fn emit_cancel_epilogue(e: &mut Emitter, body: &MethodBody) {
    e.raw_line(format_args!("\n{CANCEL_LABEL}:"));
    for i in 0..body.stack_max {
        e.stmt(format_args!("*(cfp->ep + {i} + 1) = stack[{i}]"));
    }
    let undef = e.abi().undef_literal.clone();
    e.stmt(format_args!("return {undef}"));
}
