//! # Per-Opcode Translator
//!
//! The central dispatch: for each decoded [`crate::stream::Instr`]
//! at a given offset, emit its native-source body into an [`Emitter`],
//! advance the branch's simulated stack depth, and report how control
//! leaves this instruction so [`crate::driver`] knows what to walk next.
//!
//! Every arm performs the same three things `mjit_compile.c`'s `compile_insn`
//! switch performs per case: emit `cfp->pc = ...`, emit the opcode's body,
//! and account for the opcode's net stack effect before returning control
//! to the offset-walking driver.

mod aggregates;
mod calls;
mod control;
mod literals;
mod vars;

use crate::emitter::Emitter;
use crate::error::CompileWarning;
use crate::status::{BranchState, CompilationStatus};
use crate::stream::Instr;

/// Where control goes after one instruction has been translated.
pub enum Control {
    /// Execution continues at the very next offset in the stream.
    Fallthrough,
    /// Unconditional transfer to `target` (`jump`).
    Jump(usize),
    /// A conditional branch: the driver must walk `fallthrough` first, then
    /// fork a copy of the current [`BranchState`] to walk `taken`
    ///.
    Branch { taken: usize, fallthrough: usize },
    /// An N-way case dispatch: the driver walks `fallthrough` first (the
    /// `default` arm shares it), then forks a copy of the current
    /// [`BranchState`] for each entry in `targets`, same isolation rule as
    /// [`Control::Branch`] but for more than two successors.
    Switch { targets: Vec<usize>, fallthrough: usize },
    /// This branch of the traversal is complete (`leave`, `throw`).
    Finish,
}

/// Pops `pops` live slots and reserves `pushes` new ones, returning the
/// base index the instruction should read/write at (`stack_size` before the
/// pop, i.e. where the lowest popped operand lives). Flags
/// [`CompileWarning::StackExceeded`] without panicking if the net effect
/// would exceed `stack_max` — translation still proceeds so the rest of the
/// method can still be scanned.
fn stack_effect(
    branch: &mut BranchState,
    status: &mut CompilationStatus,
    offset: usize,
    stack_max: u32,
    pops: u32,
    pushes: u32,
) -> u32 {
    let base = branch.stack_size.saturating_sub(pops);
    let new_size = base + pushes;
    if new_size > stack_max {
        status.fail(CompileWarning::StackExceeded {
            offset,
            stack_size: new_size,
            stack_max,
        });
    }
    branch.stack_size = new_size;
    base
}

/// Translate one instruction at `offset`. Emits `cfp->pc = ...` up front
/// then dispatches to the opcode family's own
/// submodule, returning how control leaves it.
pub fn translate(
    e: &mut Emitter,
    status: &mut CompilationStatus,
    branch: &mut BranchState,
    stack_max: u32,
    offset: usize,
    instr: &Instr,
) -> Control {
    e.label(offset, instr.opcode().mnemonic());
    e.set_pc(offset);

    if instr.is_unsupported() {
        let mnemonic = instr.opcode().mnemonic();
        status.fail(CompileWarning::UnsupportedOpcode { offset, mnemonic });
        return Control::Fallthrough;
    }

    match instr {
        Instr::Nop => Control::Fallthrough,

        Instr::PutNil
        | Instr::PutSelf
        | Instr::PutObjectLiteral { .. }
        | Instr::PutObjectFixnum { .. }
        | Instr::PutSpecialObject { .. }
        | Instr::PutIseq { .. }
        | Instr::PutString { .. } => literals::translate(e, status, branch, stack_max, offset, instr),

        Instr::GetLocal { .. }
        | Instr::SetLocal { .. }
        | Instr::GetSpecial { .. }
        | Instr::SetSpecial { .. }
        | Instr::GetInstanceVariable { .. }
        | Instr::SetInstanceVariable { .. }
        | Instr::GetClassVariable { .. }
        | Instr::SetClassVariable { .. }
        | Instr::GetConstant { .. }
        | Instr::SetConstant { .. }
        | Instr::GetGlobal { .. }
        | Instr::SetGlobal { .. } => vars::translate(e, status, branch, stack_max, offset, instr),

        Instr::ConcatStrings { .. }
        | Instr::ToString
        | Instr::FreezeString { .. }
        | Instr::ToRegexp { .. }
        | Instr::Intern
        | Instr::NewArray { .. }
        | Instr::DupArray { .. }
        | Instr::ExpandArray { .. }
        | Instr::ConcatArray
        | Instr::SplatArray { .. }
        | Instr::NewHash { .. }
        | Instr::NewRange { .. }
        | Instr::Pop
        | Instr::Dup
        | Instr::DupN { .. }
        | Instr::Swap
        | Instr::Reverse { .. }
        | Instr::Reput
        | Instr::TopN { .. }
        | Instr::SetN { .. }
        | Instr::AdjustStack { .. } => {
            aggregates::translate(e, status, branch, stack_max, offset, instr)
        }

        Instr::Defined { .. }
        | Instr::CheckMatch { .. }
        | Instr::CheckKeyword { .. }
        | Instr::Trace { .. }
        | Instr::Trace2 { .. }
        | Instr::Leave
        | Instr::Throw { .. }
        | Instr::Jump { .. }
        | Instr::BranchIf { .. }
        | Instr::BranchUnless { .. }
        | Instr::BranchNil { .. }
        | Instr::BranchIfType { .. }
        | Instr::GetInlineCache { .. }
        | Instr::SetInlineCache { .. }
        | Instr::OptCaseDispatch { .. } => {
            control::translate(e, status, branch, stack_max, offset, instr)
        }

        Instr::Send { .. }
        | Instr::OptSendWithoutBlock { .. }
        | Instr::InvokeSuper { .. }
        | Instr::InvokeBlock { .. }
        | Instr::OptCall { .. }
        | Instr::OptCallWithKey { .. }
        | Instr::OptStrFreeze { .. }
        | Instr::OptStrUminus { .. }
        | Instr::OptRegexpMatch1 { .. }
        | Instr::OptNewArrayMax { .. }
        | Instr::OptNewArrayMin { .. } => {
            calls::translate(e, status, branch, stack_max, offset, instr)
        }

        Instr::Unsupported { .. } => unreachable!("handled above"),
    }
}
