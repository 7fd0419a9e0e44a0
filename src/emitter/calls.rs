//! Call-site emitter helpers: argument blit, full method dispatch, and the
//! optimized-operator fast path with interpreter fallback. Grounded on
//! `mjit_compile.c`'s `fprint_args`, `fprint_call_method`, and
//! `fprint_opt_call`/`fprint_opt_call_with_key` — the latter pair is why
//! `crate::stream::OptOp`/`OptOpWithKey` carry an `argc()`/`helper()`
//! method apiece instead of being matched opcode-by-opcode here.

use super::Emitter;
use crate::stream::{CallSite, LiteralKey, OptOp, OptOpWithKey};

/// Copies `argc` live stack slots starting at `base` into the call's
/// argument array, the same blit every `send`-family opcode performs
/// before invoking the real dispatcher.
pub fn emit_arg_blit(e: &mut Emitter, base: u32, argc: u32) {
    if argc == 0 {
        e.stmt("argv = NULL");
        return;
    }
    e.stmt(format_args!("argv = ALLOCA_N(VALUE, {argc})"));
    e.stmt(format_args!(
        "MEMCPY(argv, &stack[{base}], VALUE, {argc})"
    ));
}

/// Emits a full method call site: argument blit, the dispatcher call
/// keyed by the cached call info, and the result landing in `stack[base]`
/// (the receiver's slot, now overwritten with the return value). When the
/// dispatcher declines (returns the ABI's "undef" sentinel — a block call
/// that needs the interpreter loop to drive it) the frame is marked
/// `FINISH` and `vm_exec` is re-entered in its place, mirroring
/// `fprint_call_method`.
pub fn emit_call_site(e: &mut Emitter, base: u32, site: &CallSite, helper: &str, undef_literal: &str) {
    emit_arg_blit(e, base + 1, site.ci.argc);
    e.stmt(format_args!(
        "stack[{base}] = {helper}(th, cfp, &calls[{cache}])",
        cache = site.cache_id,
    ));
    e.raw_line(format_args!("  if (stack[{base}] == {undef_literal}) {{"));
    e.stmt("cfp->flags |= VM_FRAME_FLAG_FINISH");
    e.stmt(format_args!("stack[{base}] = vm_exec(th, TRUE)"));
    e.raw_line("  }");
}

/// Emits the fast path for one of the `opt_*` binary/unary operators,
/// guarded by a cached inline cache. `stack_size` is the simulated stack
/// depth as it stood just before this opcode (receiver and operands still
/// live). On the ABI's "declined" sentinel, `cfp->sp` is restored to that
/// depth and control bails all the way out to the shared cancel epilogue —
/// mirroring `fprint_opt_call`'s `if (stack[...] == Qundef) goto cancel;`.
pub fn emit_opt_call(
    e: &mut Emitter,
    base: u32,
    op: OptOp,
    site: &CallSite,
    stack_size: u32,
    undef_literal: &str,
) {
    let argc = op.argc();
    let recv = base;
    let args = if argc > 1 {
        format!(", stack[{}]", base + 1)
    } else {
        String::new()
    };
    e.stmt(format_args!(
        "stack[{recv}] = {helper}(stack[{recv}]{args}, &calls[{cache}])",
        helper = op.helper(),
        cache = site.cache_id,
    ));
    e.raw_line(format_args!(
        "  if (stack[{recv}] == {undef_literal}) {{"
    ));
    e.stmt(format_args!("cfp->sp = cfp->ep + {stack_size} + 1"));
    e.goto_cancel();
    e.raw_line("  }");
}

/// Emits the keyed variant (`opt_aref_with` / `opt_aset_with`), whose
/// extra operand is a literal string key rather than a popped stack slot.
/// Same cancel-on-`Qundef` bailout as [`emit_opt_call`].
pub fn emit_opt_call_with_key(
    e: &mut Emitter,
    base: u32,
    op: OptOpWithKey,
    key: &LiteralKey,
    site: &CallSite,
    stack_size: u32,
    undef_literal: &str,
) {
    let extra = if op.argc() > 1 {
        format!(", stack[{}]", base + 1)
    } else {
        String::new()
    };
    e.stmt(format_args!(
        "stack[{base}] = {helper}(stack[{base}], {key}{extra}, &calls[{cache}])",
        helper = op.helper(),
        cache = site.cache_id,
    ));
    e.raw_line(format_args!("  if (stack[{base}] == {undef_literal}) {{"));
    e.stmt(format_args!("cfp->sp = cfp->ep + {stack_size} + 1"));
    e.goto_cancel();
    e.raw_line("  }");
}
