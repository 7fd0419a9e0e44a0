//! Aggregate-construction emitter helpers: arrays, hashes, ranges, and the
//! string/regexp concatenation family. Each opcode in this group pops a
//! contiguous run of `n` stack slots and pushes back a single built value
//! in the lowest of those slots, mirroring `mjit_compile.c`'s direct
//! `rb_ary_new_from_values(num, stack + base)`-style calls.

use super::Emitter;

pub fn emit_newarray(e: &mut Emitter, base: u32, n: u32) {
    e.stmt(format_args!(
        "stack[{base}] = rb_ary_new4({n}, &stack[{base}])"
    ));
}

pub fn emit_duparray(e: &mut Emitter, push_index: u32, literal: i64) {
    e.stmt(format_args!(
        "stack[{push_index}] = rb_ary_resurrect((VALUE){literal})"
    ));
}

pub fn emit_concatarray(e: &mut Emitter, first_slot: u32) {
    e.stmt(format_args!(
        "stack[{first_slot}] = vm_concat_array(stack[{first_slot}], stack[{first}])",
        first = first_slot + 1
    ));
}

pub fn emit_splatarray(e: &mut Emitter, slot: u32, flags: i64) {
    e.stmt(format_args!(
        "stack[{slot}] = vm_splat_array((VALUE){flags}, stack[{slot}])"
    ));
}

pub fn emit_expandarray(e: &mut Emitter, base: u32, num: u32, flags: i64) {
    e.stmt(format_args!(
        "vm_expandarray(GET_SP() + {base}, stack[{base}], {num}, (int){flags})"
    ));
}

pub fn emit_newhash(e: &mut Emitter, base: u32, n: u32) {
    e.stmt(format_args!(
        "stack[{base}] = rb_hash_new_with_size({pairs})",
        pairs = n / 2
    ));
    if n > 0 {
        e.stmt(format_args!(
            "rb_hash_bulk_insert({n}, &stack[{base}], stack[{base}])"
        ));
    }
}

pub fn emit_newrange(e: &mut Emitter, base: u32, exclude_end: bool) {
    e.stmt(format_args!(
        "stack[{base}] = rb_range_new(stack[{base}], stack[{next}], {excl})",
        next = base + 1,
        excl = exclude_end as u8,
    ));
}

pub fn emit_concatstrings(e: &mut Emitter, base: u32, n: u32) {
    e.stmt(format_args!(
        "stack[{base}] = rb_str_concat_literals({n}, &stack[{base}])"
    ));
}

pub fn emit_tostring(e: &mut Emitter, slot: u32) {
    e.stmt(format_args!(
        "stack[{slot}] = rb_obj_as_string_result(stack[{slot}], stack[{slot}])"
    ));
}

pub fn emit_freezestring(e: &mut Emitter, slot: u32, debug_info: i64) {
    e.stmt(format_args!(
        "vm_freezestring(stack[{slot}], (VALUE){debug_info})"
    ));
}

pub fn emit_toregexp(e: &mut Emitter, base: u32, options: i64, n: u32) {
    e.stmt(format_args!(
        "stack[{base}] = rb_reg_new_ary(rb_ary_tmp_new_from_values(0, {n}, &stack[{base}]), (int){options})"
    ));
}

pub fn emit_intern(e: &mut Emitter, slot: u32) {
    e.stmt(format_args!(
        "stack[{slot}] = rb_str_intern(stack[{slot}])"
    ));
}
