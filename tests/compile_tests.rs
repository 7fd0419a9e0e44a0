//! End-to-end coverage: build a small [`MethodBody`] by hand (standing in
//! for an assembler's output) and check the emitted procedure's shape and
//! the [`CompilationStatus`] it reports, mirroring the worked examples this
//! translator's contract is specified against.

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;

use vmjit_core::{
    compile, AbiNames, CallInfo, CallSite, Instr, MethodBody, OptOp,
};

fn body(code: Vec<Instr>, stack_max: u32) -> MethodBody {
    MethodBody { code, stack_max }
}

#[test]
fn putnil_then_leave_succeeds() {
    let m = body(vec![Instr::PutNil, Instr::Leave], 1);
    let (src, status) = compile(&m, "jit_putnil", &AbiNames::default());

    assert!(status.success());
    assert!(status.diagnostics().is_empty());
    assert!(src.contains("stack[0] = Qnil"));
    assert!(src.contains("return stack[0]"));
    assert!(src.trim_end().ends_with('}'));
}

#[test]
fn opt_plus_falls_back_on_undef() {
    let site = CallSite {
        ci: CallInfo { argc: 2, selector: "+".to_string(), has_block_arg: false },
        cache_id: 1,
    };
    let m = body(
        vec![
            Instr::PutObjectFixnum { value: 1 },
            Instr::PutObjectFixnum { value: 2 },
            Instr::OptCall { op: OptOp::Plus, site },
            Instr::Leave,
        ],
        2,
    );
    let (src, status) = compile(&m, "jit_opt_plus", &AbiNames::default());

    assert!(status.success());
    assert!(src.contains("vm_opt_plus"));
    assert!(src.contains("== Qundef"));
    // A declined fast path restores cfp->sp and bails all the way to cancel,
    // not to a local fallback label.
    assert!(src.contains("cfp->sp = cfp->ep + 2 + 1"));
    assert!(src.contains("goto cancel;"));
}

#[test]
fn branchunless_walks_both_arms_and_joins_once() {
    let m = body(
        vec![
            Instr::GetLocal { local_index: 1, env_level: 0 },
            Instr::BranchUnless { target: 4 },
            Instr::PutObjectFixnum { value: 1 },
            Instr::Jump { target: 5 },
            Instr::PutObjectFixnum { value: 0 },
            Instr::Leave,
        ],
        1,
    );
    let (src, status) = compile(&m, "jit_branch", &AbiNames::default());

    assert!(status.success());
    assert!(src.contains("label_2: /* putobject */"));
    assert!(src.contains("label_4: /* putobject */"));
    assert_eq!(src.matches("label_5: /* leave */").count(), 1);
    assert_eq!(src.matches("goto label_5;").count(), 1);

    // The fall-through arm (label_2, reached when the branch is not taken)
    // must be emitted immediately after the branch, before the taken arm
    // (label_4) — matching the implicit-fallthrough `if (...) goto label_4;`
    // the branch itself emits.
    let branch_pos = src.find("if (!RTEST(stack[0]))").expect("branchunless emitted");
    let fallthrough_pos = src.find("label_2: /* putobject */").expect("fallthrough arm emitted");
    let taken_pos = src.find("label_4: /* putobject */").expect("taken arm emitted");
    assert!(branch_pos < fallthrough_pos);
    assert!(fallthrough_pos < taken_pos);
}

#[test]
fn opt_send_without_block_emits_dispatch() {
    let site = CallSite {
        ci: CallInfo { argc: 1, selector: "foo".to_string(), has_block_arg: false },
        cache_id: 7,
    };
    let m = body(
        vec![
            Instr::PutSelf,
            Instr::PutObjectFixnum { value: 5 },
            Instr::OptSendWithoutBlock { site },
            Instr::Leave,
        ],
        2,
    );
    let (src, status) = compile(&m, "jit_send", &AbiNames::default());

    assert!(status.success());
    assert!(src.contains("vm_sendish"));
}

#[test]
fn unsupported_opcode_fails_without_aborting() {
    let m = body(
        vec![Instr::Unsupported { mnemonic: "getblockparam" }, Instr::PutNil, Instr::Leave],
        1,
    );
    let (src, status) = compile(&m, "jit_unsupported", &AbiNames::default());

    assert!(!status.success());
    assert_eq!(status.diagnostics().len(), 1);
    // The procedure is still syntactically complete.
    assert!(src.contains("return stack[0]"));
    assert!(src.trim_end().ends_with('}'));
}

#[test]
fn unexpected_leave_depth_fails_without_aborting() {
    let m = body(
        vec![
            Instr::PutObjectFixnum { value: 1 },
            Instr::PutObjectFixnum { value: 2 },
            Instr::Leave,
        ],
        2,
    );
    let (src, status) = compile(&m, "jit_bad_leave", &AbiNames::default());

    assert!(!status.success());
    assert!(src.trim_end().ends_with('}'));
    assert!(status
        .diagnostics()
        .iter()
        .any(|w| matches!(w, vmjit_core::CompileWarning::UnexpectedLeaveDepth { .. })));
}

#[test]
fn case_dispatch_visits_every_target_once() {
    let mut case_map = BTreeMap::new();
    case_map.insert(vmjit_core::LiteralKey::Int(0), 4usize);
    case_map.insert(vmjit_core::LiteralKey::Int(1), 6usize);

    let m = body(
        vec![
            Instr::GetLocal { local_index: 1, env_level: 0 }, // 0
            Instr::OptCaseDispatch { case_map },               // 1, default falls to 2
            Instr::PutObjectFixnum { value: -1 },              // 2: default arm
            Instr::Jump { target: 7 },                         // 3
            Instr::PutObjectFixnum { value: 100 },             // 4: case 0
            Instr::Jump { target: 7 },                         // 5
            Instr::PutObjectFixnum { value: 200 },             // 6: case 1
            Instr::Leave,                                      // 7
        ],
        1,
    );
    let (src, status) = compile(&m, "jit_case", &AbiNames::default());

    assert!(status.success());
    assert!(src.contains("switch (FIX2LONG(stack["));
    assert_eq!(src.matches("label_4: /* putobject */").count(), 1);
    assert_eq!(src.matches("label_6: /* putobject */").count(), 1);
    assert_eq!(src.matches("label_7: /* leave */").count(), 1);
}
