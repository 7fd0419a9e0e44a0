//! Minimal end-to-end demonstration: build a tiny method body by hand
//! (standing in for an assembler's output) and print the native-source
//! procedure this crate compiles it into.

use vmjit_core::{compile, AbiNames, CallInfo, CallSite, Instr, MethodBody, OptOp};

fn main() {
    tracing_subscriber::fmt::init();

    let site = CallSite {
        ci: CallInfo { argc: 2, selector: "+".to_string(), has_block_arg: false },
        cache_id: 0x1,
    };
    let method = MethodBody {
        code: vec![
            Instr::GetLocal { local_index: 1, env_level: 0 },
            Instr::GetLocal { local_index: 2, env_level: 0 },
            Instr::OptCall { op: OptOp::Plus, site },
            Instr::Leave,
        ],
        stack_max: 2,
    };

    let (source, status) = compile(&method, "jit_add_two_locals", &AbiNames::default());

    println!("{source}");
    println!("/* compiled cleanly: {} */", status.success());
    for warning in status.diagnostics() {
        eprintln!("warning: {warning}");
    }
}
