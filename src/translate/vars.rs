//! Translator arms for local/instance/class/global-variable, constant, and
//! special-variable load/store. Stack effect is uniform within each
//! direction (loads push one, stores pop one); the emitter helpers in
//! [`crate::emitter`] carry the actual per-opcode native-source shape.

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
        Instr::GetLocal { local_index, env_level } => {
            let push_index = stack_effect(branch, status, offset, stack_max, 0, 1);
            emitter::emit_getlocal(e, push_index, *local_index, *env_level);
        }
        Instr::SetLocal { local_index, env_level } => {
            let pop_index = stack_effect(branch, status, offset, stack_max, 1, 0);
            emitter::emit_setlocal(e, pop_index, *local_index, *env_level);
        }
        Instr::GetSpecial { key, kind } => {
            let push_index = stack_effect(branch, status, offset, stack_max, 0, 1);
            emitter::emit_getspecial(e, push_index, *key, *kind);
        }
        Instr::SetSpecial { key } => {
            let pop_index = stack_effect(branch, status, offset, stack_max, 1, 0);
            emitter::emit_setspecial(e, pop_index, *key);
        }
        Instr::GetInstanceVariable { name } => {
            let push_index = stack_effect(branch, status, offset, stack_max, 0, 1);
            emitter::emit_getinstancevariable(e, push_index, name);
        }
        Instr::SetInstanceVariable { name } => {
            let pop_index = stack_effect(branch, status, offset, stack_max, 1, 0);
            emitter::emit_setinstancevariable(e, pop_index, name);
        }
        Instr::GetClassVariable { name } => {
            let push_index = stack_effect(branch, status, offset, stack_max, 0, 1);
            emitter::emit_getclassvariable(e, push_index, name);
        }
        Instr::SetClassVariable { name } => {
            let pop_index = stack_effect(branch, status, offset, stack_max, 1, 0);
            emitter::emit_setclassvariable(e, pop_index, name);
        }
        Instr::GetConstant { name } => {
            // Pops the receiver namespace, pushes the resolved constant: net zero.
            let slot = stack_effect(branch, status, offset, stack_max, 1, 1);
            emitter::emit_getconstant(e, slot, name);
        }
        Instr::SetConstant { name } => {
            let namespace_slot = stack_effect(branch, status, offset, stack_max, 2, 0);
            emitter::emit_setconstant(e, namespace_slot, namespace_slot + 1, name);
        }
        Instr::GetGlobal { name } => {
            let push_index = stack_effect(branch, status, offset, stack_max, 0, 1);
            emitter::emit_getglobal(e, push_index, name);
        }
        Instr::SetGlobal { name } => {
            let pop_index = stack_effect(branch, status, offset, stack_max, 1, 0);
            emitter::emit_setglobal(e, pop_index, name);
        }
        _ => unreachable!("translate::vars dispatched a non-variable instr"),
    }
    Control::Fallthrough
}
