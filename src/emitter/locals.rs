//! Local-variable, instance/class/global-variable, constant, and special
//! variable load/store emitter helpers.

use super::Emitter;

/// Emit a local-variable read through the captured environment chain,
/// `env_level` hops up, landing in `stack[push_index]`. Increments the
/// "dynamic" debug counter when `env_level > 0`
pub fn emit_getlocal(e: &mut Emitter, push_index: u32, local_index: u32, env_level: u32) {
    e.stmt(format_args!(
        "stack[{push_index}] = *(vm_get_ep(cfp->ep, {env_level}) - {local_index})"
    ));
    e.stmt("RB_DEBUG_COUNTER_INC(lvar_get)");
    if env_level > 0 {
        e.stmt("RB_DEBUG_COUNTER_INC(lvar_get_dynamic)");
    }
}

/// Emit a local-variable write through the captured environment chain.
pub fn emit_setlocal(e: &mut Emitter, pop_index: u32, local_index: u32, env_level: u32) {
    e.stmt(format_args!(
        "vm_env_write(vm_get_ep(cfp->ep, {env_level}), -(int){local_index}, stack[{pop_index}])"
    ));
    e.stmt("RB_DEBUG_COUNTER_INC(lvar_set)");
    if env_level > 0 {
        e.stmt("RB_DEBUG_COUNTER_INC(lvar_set_dynamic)");
    }
}

pub fn emit_getinstancevariable(e: &mut Emitter, push_index: u32, name: &str) {
    e.stmt(format_args!(
        "stack[{push_index}] = vm_getinstancevariable(cfp->self, {name:?})"
    ));
}

pub fn emit_setinstancevariable(e: &mut Emitter, pop_index: u32, name: &str) {
    e.stmt(format_args!(
        "vm_setinstancevariable(cfp->self, {name:?}, stack[{pop_index}])"
    ));
}

pub fn emit_getclassvariable(e: &mut Emitter, push_index: u32, name: &str) {
    e.stmt(format_args!(
        "stack[{push_index}] = rb_cvar_get(vm_get_cvar_base(rb_vm_get_cref(cfp->ep), cfp), {name:?})"
    ));
}

pub fn emit_setclassvariable(e: &mut Emitter, pop_index: u32, name: &str) {
    e.stmt("vm_ensure_not_refinement_module(cfp->self)");
    e.stmt(format_args!(
        "rb_cvar_set(vm_get_cvar_base(rb_vm_get_cref(cfp->ep), cfp), {name:?}, stack[{pop_index}])"
    ));
}

pub fn emit_getglobal(e: &mut Emitter, push_index: u32, name: &str) {
    e.stmt(format_args!("stack[{push_index}] = GET_GLOBAL({name:?})"));
}

pub fn emit_setglobal(e: &mut Emitter, pop_index: u32, name: &str) {
    e.stmt(format_args!("SET_GLOBAL({name:?}, stack[{pop_index}])"));
}

/// `getconstant` reads and writes the same slot (the receiver namespace is
/// popped and the resolved constant pushed in its place).
pub fn emit_getconstant(e: &mut Emitter, slot: u32, name: &str) {
    e.stmt(format_args!(
        "stack[{slot}] = vm_get_ev_const(th, stack[{slot}], {name:?}, 0)"
    ));
}

pub fn emit_setconstant(e: &mut Emitter, namespace_slot: u32, value_slot: u32, name: &str) {
    e.stmt(format_args!("vm_check_if_namespace(stack[{namespace_slot}])"));
    e.stmt("vm_ensure_not_refinement_module(cfp->self)");
    e.stmt(format_args!(
        "rb_const_set(stack[{namespace_slot}], {name:?}, stack[{value_slot}])"
    ));
}

pub fn emit_getspecial(e: &mut Emitter, push_index: u32, key: i64, kind: i64) {
    e.stmt(format_args!(
        "stack[{push_index}] = vm_getspecial(th, VM_EP_LEP(cfp->ep), {key}, {kind})"
    ));
}

pub fn emit_setspecial(e: &mut Emitter, pop_index: u32, key: i64) {
    e.stmt(format_args!(
        "lep_svar_set(th, VM_EP_LEP(cfp->ep), {key}, stack[{pop_index}])"
    ));
}
