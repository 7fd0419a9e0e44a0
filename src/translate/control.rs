//! Translator arms for control flow: unconditional/conditional branches,
//! `leave`/`throw`, the `defined?`/pattern-match support opcodes, trace
//! hooks, case dispatch, and inline-cache guards. This is the one family
//! whose [`Control`] return value is not always [`Control::Fallthrough`] —
//! it is the sole source of the forks [`crate::driver`] walks.

use crate::emitter::{self, Emitter};
use crate::error::CompileWarning;
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
        Instr::Jump { target } => Control::Jump(*target),

        Instr::BranchIf { target } => {
            let cond = stack_effect(branch, status, offset, stack_max, 1, 0);
            e.raw_line(format_args!("  if (RTEST(stack[{cond}])) {{"));
            e.goto(*target);
            e.raw_line("  }");
            Control::Branch { taken: *target, fallthrough: offset + 1 }
        }

        Instr::BranchUnless { target } => {
            let cond = stack_effect(branch, status, offset, stack_max, 1, 0);
            e.raw_line(format_args!("  if (!RTEST(stack[{cond}])) {{"));
            e.goto(*target);
            e.raw_line("  }");
            Control::Branch { taken: *target, fallthrough: offset + 1 }
        }

        Instr::BranchNil { target } => {
            let cond = stack_effect(branch, status, offset, stack_max, 1, 0);
            let nil = e.abi().nil_literal.clone();
            e.raw_line(format_args!("  if (stack[{cond}] == {nil}) {{"));
            e.goto(*target);
            e.raw_line("  }");
            Control::Branch { taken: *target, fallthrough: offset + 1 }
        }

        Instr::BranchIfType { type_tag, target } => {
            let cond = stack_effect(branch, status, offset, stack_max, 0, 0);
            e.raw_line(format_args!(
                "  if (TYPE(stack[{cond}]) == {type_tag}) {{"
            ));
            e.goto(*target);
            e.raw_line("  }");
            Control::Branch { taken: *target, fallthrough: offset + 1 }
        }

        Instr::Leave => {
            if branch.stack_size != 1 {
                status.fail(CompileWarning::UnexpectedLeaveDepth { stack_size: branch.stack_size });
            }
            e.stmt("return stack[0]");
            branch.finish_p = true;
            Control::Finish
        }

        Instr::Throw { throw_state } => {
            let slot = stack_effect(branch, status, offset, stack_max, 1, 0);
            e.stmt(format_args!(
                "return vm_throw(th, cfp, stack[{slot}], {throw_state})"
            ));
            branch.finish_p = true;
            Control::Finish
        }

        Instr::Defined { expr_type, obj, needstr } => {
            let slot = stack_effect(branch, status, offset, stack_max, 1, 1);
            e.stmt(format_args!(
                "stack[{slot}] = vm_defined(th, cfp, {expr_type}, (VALUE){obj}, stack[{slot}], {needstr})"
            ));
            Control::Fallthrough
        }

        Instr::CheckMatch { flag } => {
            let base = stack_effect(branch, status, offset, stack_max, 2, 1);
            e.stmt(format_args!(
                "stack[{base}] = vm_check_match(th, stack[{base}], stack[{snd}], {flag})",
                snd = base + 1,
            ));
            Control::Fallthrough
        }

        Instr::CheckKeyword { kw_bits_index, keyword_index } => {
            let push_index = stack_effect(branch, status, offset, stack_max, 0, 1);
            e.stmt(format_args!(
                "stack[{push_index}] = vm_check_keyword({kw_bits_index}, {keyword_index}, cfp->ep)"
            ));
            Control::Fallthrough
        }

        Instr::Trace { flag } => {
            e.stmt(format_args!("rb_exec_event_hooks(ec, {flag}, Qundef)"));
            Control::Fallthrough
        }

        Instr::Trace2 { flag, val } => {
            e.stmt(format_args!(
                "rb_exec_event_hooks(ec, {flag}, (VALUE){val})"
            ));
            Control::Fallthrough
        }

        Instr::GetInlineCache { skip_target, cache_id } => {
            emitter::emit_get_inline_cache(e, *cache_id, *skip_target);
            Control::Branch { taken: *skip_target, fallthrough: offset + 1 }
        }

        Instr::SetInlineCache { cache_id } => {
            emitter::emit_set_inline_cache(e, *cache_id);
            Control::Fallthrough
        }

        Instr::OptCaseDispatch { case_map } => {
            let top = stack_effect(branch, status, offset, stack_max, 1, 0);
            emitter::emit_case_dispatch(e, top, case_map, offset + 1);
            Control::Switch {
                targets: case_map.values().copied().collect(),
                fallthrough: offset + 1,
            }
        }

        _ => unreachable!("translate::control dispatched a non-control instr"),
    }
}
