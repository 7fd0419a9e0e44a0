//! Translator arms for the literal/self/special-object push family
//! (`putnil`, `putself`, `putobject`, `putiseq`, `putstring`). All of these
//! share one stack effect — push exactly one slot — so the only thing that
//! varies opcode to opcode is which native-source expression gets written
//! into that slot.

use crate::emitter::Emitter;
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
    let push_index = stack_effect(branch, status, offset, stack_max, 0, 1);
    match instr {
        Instr::PutNil => {
            let nil = e.abi().nil_literal.clone();
            e.stmt(format_args!("stack[{push_index}] = {nil}"));
        }
        Instr::PutSelf => {
            e.stmt(format_args!("stack[{push_index}] = cfp->self"));
        }
        Instr::PutObjectLiteral { literal } => {
            let value_type = e.abi().value_type.clone();
            e.stmt(format_args!("stack[{push_index}] = ({value_type}){literal}"));
        }
        Instr::PutObjectFixnum { value } => {
            e.stmt(format_args!("stack[{push_index}] = INT2FIX({value})"));
        }
        Instr::PutSpecialObject { kind } => {
            e.stmt(format_args!(
                "stack[{push_index}] = vm_get_special_object(cfp->ep, {kind})"
            ));
        }
        Instr::PutIseq { literal } => {
            let value_type = e.abi().value_type.clone();
            e.stmt(format_args!(
                "stack[{push_index}] = ({value_type})0x{literal:x} /* iseq */"
            ));
        }
        Instr::PutString { literal } => {
            e.stmt(format_args!(
                "stack[{push_index}] = rb_fstring_cstr({literal:?})"
            ));
        }
        _ => unreachable!("translate::literals dispatched a non-literal instr"),
    }
    Control::Fallthrough
}
