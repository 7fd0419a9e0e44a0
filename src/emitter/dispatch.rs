//! Case-dispatch expansion and inline-cache guard emitter helpers.
//! Grounded on `mjit_compile.c`'s `compile_case_dispatch_each` (a `switch`
//! generated from the case-map's literal keys, each `case` a `goto` to the
//! matching label) and the `getinlinecache`/`setinlinecache` pair that
//! brackets an inline-cache-guarded constant lookup.

use std::collections::BTreeMap;

use super::Emitter;
use crate::stream::LiteralKey;

/// Emits a `switch (stack[top]) { case <key>: goto label_<target>; ... }`
/// over the case map, falling through to `default_label` — the opcode's
/// own successor offset — for any value none of the keys match.
pub fn emit_case_dispatch(
    e: &mut Emitter,
    top: u32,
    case_map: &BTreeMap<LiteralKey, usize>,
    default_label: usize,
) {
    e.raw_line(format_args!("  switch (FIX2LONG(stack[{top}])) {{"));
    for (key, target) in case_map {
        e.raw_line(format_args!("  case {key}:"));
        e.goto(*target);
    }
    e.raw_line("  default:");
    e.goto(default_label);
    e.raw_line("  }");
}

/// Emits the inline-cache guard that opens a cached constant/ivar lookup:
/// if the cache is already populated, skip straight to `skip_target`
/// instead of re-resolving it.
pub fn emit_get_inline_cache(e: &mut Emitter, cache_id: u64, skip_target: usize) {
    e.raw_line(format_args!(
        "  if (vm_ic_hit_p(&ic_{cache_id}, cfp->ep)) {{"
    ));
    e.goto(skip_target);
    e.raw_line("  }");
}

/// Emits the matching cache-population point the guarded lookup falls
/// through to when the cache missed.
pub fn emit_set_inline_cache(e: &mut Emitter, cache_id: u64) {
    e.stmt(format_args!("vm_ic_update(&ic_{cache_id}, cfp)"));
}
