//! # Branch Traversal Driver
//!
//! Walks a [`MethodBody`] offset by offset, translating each instruction
//! and following where its [`Control`] result says execution goes next.
//! Grounded directly on `mjit_compile.c`'s `compile_insns`: a conditional
//! branch is handled by recursing into the fall-through successor with a
//! *copy* of the current stack-depth state — so its body is emitted
//! textually right after the branch, matching the `if (...) goto taken;`
//! shape the translator arms emit — then continuing the same walk at the
//! taken successor, so neither successor's stack bookkeeping can leak into
//! the other.
//!
//! At-most-once translation falls out of checking
//! [`CompilationStatus::is_visited`] before emitting anything: an offset
//! already walked by an earlier branch gets a `goto` instead of a second
//! copy of its body.

use crate::emitter::Emitter;
use crate::status::{BranchState, CompilationStatus};
use crate::stream::MethodBody;
use crate::translate::{translate, Control};

/// Walk `body` starting at `entry` with `branch` as the starting stack
/// state, translating every reachable offset exactly once.
pub fn compile_insns(
    e: &mut Emitter,
    status: &mut CompilationStatus,
    body: &MethodBody,
    mut branch: BranchState,
    entry: usize,
) {
    let mut pos = entry;
    loop {
        if pos >= body.code.len() {
            return;
        }
        if status.is_visited(pos) {
            e.goto(pos);
            return;
        }
        status.mark_visited(pos);

        let instr = &body.code[pos];
        match translate(e, status, &mut branch, body.stack_max, pos, instr) {
            Control::Fallthrough => {
                pos += 1;
            }
            Control::Jump(target) => {
                pos = target;
            }
            Control::Branch { taken, fallthrough } => {
                compile_insns(e, status, body, branch, fallthrough);
                pos = taken;
            }
            Control::Switch { targets, fallthrough } => {
                for target in targets {
                    compile_insns(e, status, body, branch, target);
                }
                pos = fallthrough;
            }
            Control::Finish => {
                return;
            }
        }
    }
}
