//! Translator arms for method dispatch: full `send`/`invokesuper`/
//! `invokeblock`, and the optimized-operator family with its inline-cache
//! fast path. An `opt_*` opcode has no inline fallback dispatch of its
//! own — when its fast-path helper declines, `cfp->sp` is restored to the
//! opcode's pre-call stack depth and control bails all the way out to the
//! shared cancel epilogue, exactly as `fprint_opt_call`'s
//! `if (... == Qundef) goto cancel;` does.

use crate::emitter::{self, Emitter};
use crate::status::{BranchState, CompilationStatus};
use crate::stream::Instr;

use super::{stack_effect, Control};

pub(super) fn translate(
    e: &mut Emitter,
    status: &mut CompilationStatus,
    branch: &mut BranchState,
    stack_max: u32,
    offset: usize,
    instr: &Instr,
) -> Control {
    match instr {
        Instr::Send { site } => {
            let undef = e.abi().undef_literal.clone();
            let base = stack_effect(branch, status, offset, stack_max, site.ci.argc + 1, 1);
            emitter::emit_call_site(e, base, site, "vm_sendish", &undef);
            Control::Fallthrough
        }

        Instr::OptSendWithoutBlock { site } => {
            let undef = e.abi().undef_literal.clone();
            let base = stack_effect(branch, status, offset, stack_max, site.ci.argc + 1, 1);
            emitter::emit_call_site(e, base, site, "vm_sendish", &undef);
            Control::Fallthrough
        }

        Instr::InvokeSuper { site, .. } => {
            let undef = e.abi().undef_literal.clone();
            let base = stack_effect(branch, status, offset, stack_max, site.ci.argc + 1, 1);
            emitter::emit_call_site(e, base, site, "vm_invokesuper", &undef);
            Control::Fallthrough
        }

        Instr::InvokeBlock { site } => {
            let undef = e.abi().undef_literal.clone();
            let base = stack_effect(branch, status, offset, stack_max, site.ci.argc, 1);
            emitter::emit_call_site(e, base, site, "vm_invokeblock", &undef);
            Control::Fallthrough
        }

        Instr::OptCall { op, site } => {
            let stack_size = branch.stack_size;
            let base = stack_effect(branch, status, offset, stack_max, op.argc(), 1);
            let undef = e.abi().undef_literal.clone();
            emitter::emit_opt_call(e, base, *op, site, stack_size, &undef);
            Control::Fallthrough
        }

        Instr::OptCallWithKey { op, key, site } => {
            let stack_size = branch.stack_size;
            let base = stack_effect(branch, status, offset, stack_max, op.argc(), 1);
            let undef = e.abi().undef_literal.clone();
            emitter::emit_opt_call_with_key(e, base, *op, key, site, stack_size, &undef);
            Control::Fallthrough
        }

        Instr::OptStrFreeze { literal } => {
            let push_index = stack_effect(branch, status, offset, stack_max, 0, 1);
            e.stmt(format_args!(
                "stack[{push_index}] = vm_opt_str_freeze_literal({literal:?})"
            ));
            Control::Fallthrough
        }

        Instr::OptStrUminus { literal } => {
            let push_index = stack_effect(branch, status, offset, stack_max, 0, 1);
            e.stmt(format_args!(
                "stack[{push_index}] = vm_opt_str_uminus_literal({literal:?})"
            ));
            Control::Fallthrough
        }

        Instr::OptRegexpMatch1 { literal } => {
            let slot = stack_effect(branch, status, offset, stack_max, 1, 1);
            e.stmt(format_args!(
                "stack[{slot}] = vm_opt_regexpmatch1((VALUE){literal}, stack[{slot}])"
            ));
            Control::Fallthrough
        }

        Instr::OptNewArrayMax { n } => {
            let base = stack_effect(branch, status, offset, stack_max, *n, 1);
            e.stmt(format_args!(
                "stack[{base}] = vm_opt_newarray_max({n}, &stack[{base}])"
            ));
            Control::Fallthrough
        }

        Instr::OptNewArrayMin { n } => {
            let base = stack_effect(branch, status, offset, stack_max, *n, 1);
            e.stmt(format_args!(
                "stack[{base}] = vm_opt_newarray_min({n}, &stack[{base}])"
            ));
            Control::Fallthrough
        }

        _ => unreachable!("translate::calls dispatched a non-call instr"),
    }
}
