//! Translator arms for aggregate construction (array/hash/range/string) and
//! pure stack-shuffling opcodes (`dup`, `swap`, `reverse`, `topn`, `setn`,
//! `adjuststack`, `pop`). The shuffle family never calls into the emitter's
//! aggregate helpers — their whole job is moving slots around, which reads
//! more clearly as one `stmt` per opcode here than as a helper indirection.

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
        Instr::NewArray { n } => {
            let base = stack_effect(branch, status, offset, stack_max, *n, 1);
            emitter::emit_newarray(e, base, *n);
        }
        Instr::DupArray { literal } => {
            let push_index = stack_effect(branch, status, offset, stack_max, 0, 1);
            emitter::emit_duparray(e, push_index, *literal);
        }
        Instr::ExpandArray { num, flags } => {
            let base = stack_effect(branch, status, offset, stack_max, 1, *num);
            emitter::emit_expandarray(e, base, *num, *flags);
        }
        Instr::ConcatArray => {
            let base = stack_effect(branch, status, offset, stack_max, 2, 1);
            emitter::emit_concatarray(e, base);
        }
        Instr::SplatArray { flags } => {
            let slot = stack_effect(branch, status, offset, stack_max, 1, 1);
            emitter::emit_splatarray(e, slot, *flags);
        }
        Instr::NewHash { n } => {
            let base = stack_effect(branch, status, offset, stack_max, *n, 1);
            emitter::emit_newhash(e, base, *n);
        }
        Instr::NewRange { exclude_end } => {
            let base = stack_effect(branch, status, offset, stack_max, 2, 1);
            emitter::emit_newrange(e, base, *exclude_end);
        }
        Instr::ConcatStrings { n } => {
            let base = stack_effect(branch, status, offset, stack_max, *n, 1);
            emitter::emit_concatstrings(e, base, *n);
        }
        Instr::ToString => {
            let slot = stack_effect(branch, status, offset, stack_max, 1, 1);
            emitter::emit_tostring(e, slot);
        }
        Instr::FreezeString { debug_info } => {
            let slot = stack_effect(branch, status, offset, stack_max, 1, 1);
            emitter::emit_freezestring(e, slot, *debug_info);
        }
        Instr::ToRegexp { options, n } => {
            let base = stack_effect(branch, status, offset, stack_max, *n, 1);
            emitter::emit_toregexp(e, base, *options, *n);
        }
        Instr::Intern => {
            let slot = stack_effect(branch, status, offset, stack_max, 1, 1);
            emitter::emit_intern(e, slot);
        }
        Instr::Pop => {
            stack_effect(branch, status, offset, stack_max, 1, 0);
        }
        Instr::Dup => {
            let top = stack_effect(branch, status, offset, stack_max, 0, 1) - 1;
            let push_index = top + 1;
            e.stmt(format_args!("stack[{push_index}] = stack[{top}]"));
        }
        Instr::DupN { n } => {
            let base = stack_effect(branch, status, offset, stack_max, 0, *n);
            for i in 0..*n {
                e.stmt(format_args!(
                    "stack[{dst}] = stack[{src}]",
                    dst = base + i,
                    src = base - n + i,
                ));
            }
        }
        Instr::Swap => {
            let base = branch.stack_size.saturating_sub(2);
            e.raw_line(format_args!("  {{ VALUE tmp = stack[{base}];"));
            e.stmt(format_args!("stack[{base}] = stack[{top}]", top = base + 1));
            e.stmt(format_args!("stack[{top}] = tmp", top = base + 1));
            e.raw_line("  }");
        }
        Instr::Reverse { n } => {
            let base = branch.stack_size.saturating_sub(*n);
            e.raw_line(format_args!(
                "  reverse_stack(&stack[{base}], {n});"
            ));
        }
        Instr::Reput => {
            // No-op: re-asserts the top value is still live without moving it.
        }
        Instr::TopN { n } => {
            let src = branch.stack_size.saturating_sub(*n);
            let push_index = stack_effect(branch, status, offset, stack_max, 0, 1);
            e.stmt(format_args!("stack[{push_index}] = stack[{src}]"));
        }
        Instr::SetN { n } => {
            let top = branch.stack_size.saturating_sub(1);
            let dst = top.saturating_sub(*n);
            e.stmt(format_args!("stack[{dst}] = stack[{top}]"));
        }
        Instr::AdjustStack { n } => {
            stack_effect(branch, status, offset, stack_max, *n, 0);
        }
        _ => unreachable!("translate::aggregates dispatched an unhandled instr"),
    }
    Control::Fallthrough
}
