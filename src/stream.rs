//! # Instruction Stream, Opcode Table & Decoder
//!
//! This module defines the **opcode table** (mnemonic, word length, operand
//! kinds), the **decoded instruction set** (`Instr`) the rest of the crate
//! translates, and the **raw-word decoder** that turns a method's linear
//! bytecode body (`RawStream`, an "ordered array of opaque words") into a
//! `MethodBody` (`Vec<Instr>` + `stack_max`) that the [`crate::driver`] and
//! [`crate::translate`] modules walk.
//!
//! ## Two representations, one reason
//! `RawStream` models the wire-level input exactly as the translator's
//! contract describes it: a flat word array plus a declared `stack_max`.
//! `Instr` is the ergonomic, typed form the rest of the crate actually
//! operates on — each variant carries its own already-decoded operands, so
//! the driver and translator never index into a word array by hand. Turning
//! one into the other is [`decode`]'s only job, mirroring how a bytecode
//! parser turns raw bytes into a typed instruction vector before a VM ever
//! touches it.
//!
//! ## Threaded-code indirection
//! A real VM may store *handler addresses* rather than raw opcode ids in
//! its instruction words (computed-goto / threaded dispatch). [`decode`]
//! is resolver-agnostic: it asks an [`OpcodeResolver`] to turn each leading
//! word back into an [`Opcode`], so the rest of decoding is identical either
//! way. [`RawOpcodeResolver`] treats the word as the opcode id directly;
//! [`ThreadedOpcodeResolver`] reverses a handler-address table back to ids.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::CompileWarning;

/// One opaque word of the raw instruction stream (opcode id, operand, or
/// literal payload — the decoder interprets it per [`OperandKind`]).
pub type Word = i64;

/// Coarse category of what an operand word means, used only for
/// diagnostics (the decoder itself consumes operands positionally).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// An opaque literal value (object id, hash key count, etc).
    Literal,
    /// Index of a local variable within its frame.
    LocalIndex,
    /// Number of lexical-scope hops to walk via the environment pointer.
    EnvLevel,
    /// A signed offset to add to the instruction's own position.
    BranchOffset,
    /// An argument count.
    Argc,
    /// An inline-cache identity.
    InlineCache,
    /// A call-info / call-cache pair describing a send site.
    CallSite,
    /// An [`crate::error::ErrorKind`] discriminant for `raise`.
    ErrorKindOperand,
    /// An associative literal-key -> offset table for `opt_case_dispatch`.
    CaseMap,
}

/// Coarse opcode identity, independent of its operands. Used for the
/// frozen opcode table and for diagnostics naming an unsupported opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Nop,
    GetLocal,
    SetLocal,
    GetSpecial,
    SetSpecial,
    GetInstanceVariable,
    SetInstanceVariable,
    GetClassVariable,
    SetClassVariable,
    GetConstant,
    SetConstant,
    GetGlobal,
    SetGlobal,
    PutNil,
    PutSelf,
    PutObject,
    PutSpecialObject,
    PutIseq,
    PutString,
    ConcatStrings,
    ToString,
    FreezeString,
    ToRegexp,
    Intern,
    NewArray,
    DupArray,
    ExpandArray,
    ConcatArray,
    SplatArray,
    NewHash,
    NewRange,
    Pop,
    Dup,
    DupN,
    Swap,
    Reverse,
    Reput,
    TopN,
    SetN,
    AdjustStack,
    Defined,
    CheckMatch,
    CheckKeyword,
    Trace,
    Trace2,
    Send,
    OptSendWithoutBlock,
    InvokeSuper,
    InvokeBlock,
    Leave,
    Throw,
    Jump,
    BranchIf,
    BranchUnless,
    BranchNil,
    BranchIfType,
    GetInlineCache,
    SetInlineCache,
    OptCaseDispatch,
    OptCall,
    OptCallWithKey,
    OptStrFreeze,
    OptStrUminus,
    OptRegexpMatch1,
    OptNewArrayMax,
    OptNewArrayMin,
    /// Excluded by design; always translates to an "unsupported" diagnostic.
    Unsupported(&'static str),
}

impl Opcode {
    /// Printable mnemonic, as logged in diagnostics and `label_N: /* mnemonic */` comments.
    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            Nop => "nop",
            GetLocal => "getlocal",
            SetLocal => "setlocal",
            GetSpecial => "getspecial",
            SetSpecial => "setspecial",
            GetInstanceVariable => "getinstancevariable",
            SetInstanceVariable => "setinstancevariable",
            GetClassVariable => "getclassvariable",
            SetClassVariable => "setclassvariable",
            GetConstant => "getconstant",
            SetConstant => "setconstant",
            GetGlobal => "getglobal",
            SetGlobal => "setglobal",
            PutNil => "putnil",
            PutSelf => "putself",
            PutObject => "putobject",
            PutSpecialObject => "putspecialobject",
            PutIseq => "putiseq",
            PutString => "putstring",
            ConcatStrings => "concatstrings",
            ToString => "tostring",
            FreezeString => "freezestring",
            ToRegexp => "toregexp",
            Intern => "intern",
            NewArray => "newarray",
            DupArray => "duparray",
            ExpandArray => "expandarray",
            ConcatArray => "concatarray",
            SplatArray => "splatarray",
            NewHash => "newhash",
            NewRange => "newrange",
            Pop => "pop",
            Dup => "dup",
            DupN => "dupn",
            Swap => "swap",
            Reverse => "reverse",
            Reput => "reput",
            TopN => "topn",
            SetN => "setn",
            AdjustStack => "adjuststack",
            Defined => "defined",
            CheckMatch => "checkmatch",
            CheckKeyword => "checkkeyword",
            Trace => "trace",
            Trace2 => "trace2",
            Send => "send",
            OptSendWithoutBlock => "opt_send_without_block",
            InvokeSuper => "invokesuper",
            InvokeBlock => "invokeblock",
            Leave => "leave",
            Throw => "throw",
            Jump => "jump",
            BranchIf => "branchif",
            BranchUnless => "branchunless",
            BranchNil => "branchnil",
            BranchIfType => "branchiftype",
            GetInlineCache => "getinlinecache",
            SetInlineCache => "setinlinecache",
            OptCaseDispatch => "opt_case_dispatch",
            OptCall => "opt_call",
            OptCallWithKey => "opt_call_with_key",
            OptStrFreeze => "opt_str_freeze",
            OptStrUminus => "opt_str_uminus",
            OptRegexpMatch1 => "opt_regexpmatch1",
            OptNewArrayMax => "opt_newarray_max",
            OptNewArrayMin => "opt_newarray_min",
            Unsupported(name) => name,
        }
    }
}

/// A literal case-dispatch / `_with` key, printed verbatim as native-source
/// literal syntax. Kept intentionally small: the translator only ever needs
/// to reproduce the key as text, never to evaluate it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LiteralKey {
    Int(i64),
    Str(String),
}

impl fmt::Display for LiteralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralKey::Int(v) => write!(f, "{v}"),
            LiteralKey::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// Call metadata for a `send`-family instruction.
#[derive(Debug, Clone)]
pub struct CallInfo {
    pub argc: u32,
    pub selector: String,
    pub has_block_arg: bool,
}

/// A call site: call-info plus the opaque inline-cache identity the
/// emitted code dispatches through.
#[derive(Debug, Clone)]
pub struct CallSite {
    pub ci: CallInfo,
    /// Opaque call-cache id, printed as a hex literal pointer constant.
    pub cache_id: u64,
}

/// The fixed-arity "optimised operator" families that share the
/// inline-cache fast-path-with-`Qundef`-fallback shape (`fprint_opt_call`
/// in the translator this crate is modeled on). Each knows its own arity
/// and the runtime helper it calls on the fast path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptOp {
    Plus,
    Minus,
    Mult,
    Div,
    Mod,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    LtLt,
    Aref,
    Aset,
    Length,
    Size,
    EmptyP,
    Succ,
    Not,
    RegexpMatch2,
}

impl OptOp {
    /// Number of stack operands the fast path consumes (`recv`, `obj`, `obj2`).
    pub fn argc(self) -> u32 {
        use OptOp::*;
        match self {
            Aset => 3,
            Length | Size | EmptyP | Succ | Not => 1,
            _ => 2,
        }
    }

    /// Name of the runtime helper invoked on the fast path.
    pub fn helper(self) -> &'static str {
        use OptOp::*;
        match self {
            Plus => "vm_opt_plus",
            Minus => "vm_opt_minus",
            Mult => "vm_opt_mult",
            Div => "vm_opt_div",
            Mod => "vm_opt_mod",
            Eq => "vm_opt_eq",
            Neq => "vm_opt_neq",
            Lt => "vm_opt_lt",
            Le => "vm_opt_le",
            Gt => "vm_opt_gt",
            Ge => "vm_opt_ge",
            LtLt => "vm_opt_ltlt",
            Aref => "vm_opt_aref",
            Aset => "vm_opt_aset",
            Length => "vm_opt_length",
            Size => "vm_opt_size",
            EmptyP => "vm_opt_empty_p",
            Succ => "vm_opt_succ",
            Not => "vm_opt_not",
            RegexpMatch2 => "vm_opt_regexpmatch2",
        }
    }
}

/// The `_with`-keyed fixed-arity optimised ops (`aref`/`aset` against a
/// resurrected literal key rather than a stack operand).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptOpWithKey {
    ArefWith,
    AsetWith,
}

impl OptOpWithKey {
    pub fn argc(self) -> u32 {
        match self {
            OptOpWithKey::ArefWith => 1,
            OptOpWithKey::AsetWith => 2,
        }
    }

    pub fn helper(self) -> &'static str {
        match self {
            OptOpWithKey::ArefWith => "vm_opt_aref_with",
            OptOpWithKey::AsetWith => "vm_opt_aset_with",
        }
    }
}

/// A decoded instruction, carrying its own typed operands. This is the
/// input the [`crate::driver`] walks and the [`crate::translate`] dispatch
/// consumes; nothing downstream of [`decode`] indexes into a raw word array.
#[derive(Debug, Clone)]
pub enum Instr {
    Nop,
    GetLocal { local_index: u32, env_level: u32 },
    SetLocal { local_index: u32, env_level: u32 },
    GetSpecial { key: i64, kind: i64 },
    SetSpecial { key: i64 },
    GetInstanceVariable { name: String },
    SetInstanceVariable { name: String },
    GetClassVariable { name: String },
    SetClassVariable { name: String },
    GetConstant { name: String },
    SetConstant { name: String },
    GetGlobal { name: String },
    SetGlobal { name: String },
    PutNil,
    PutSelf,
    PutObjectLiteral { literal: i64 },
    PutObjectFixnum { value: i64 },
    PutSpecialObject { kind: i64 },
    PutIseq { literal: i64 },
    PutString { literal: String },
    ConcatStrings { n: u32 },
    ToString,
    FreezeString { debug_info: i64 },
    ToRegexp { options: i64, n: u32 },
    Intern,
    NewArray { n: u32 },
    DupArray { literal: i64 },
    ExpandArray { num: u32, flags: i64 },
    ConcatArray,
    SplatArray { flags: i64 },
    NewHash { n: u32 },
    NewRange { exclude_end: bool },
    Pop,
    Dup,
    DupN { n: u32 },
    Swap,
    Reverse { n: u32 },
    Reput,
    TopN { n: u32 },
    SetN { n: u32 },
    AdjustStack { n: u32 },
    Defined { expr_type: i64, obj: i64, needstr: i64 },
    CheckMatch { flag: i64 },
    CheckKeyword { kw_bits_index: i64, keyword_index: i64 },
    Trace { flag: i64 },
    Trace2 { flag: i64, val: i64 },
    Send { site: CallSite },
    OptSendWithoutBlock { site: CallSite },
    InvokeSuper { site: CallSite, has_block_arg: bool },
    InvokeBlock { site: CallSite },
    Leave,
    Throw { throw_state: i64 },
    Jump { target: usize },
    BranchIf { target: usize },
    BranchUnless { target: usize },
    BranchNil { target: usize },
    BranchIfType { type_tag: i64, target: usize },
    GetInlineCache { skip_target: usize, cache_id: u64 },
    SetInlineCache { cache_id: u64 },
    OptCaseDispatch { case_map: BTreeMap<LiteralKey, usize> },
    OptCall { op: OptOp, site: CallSite },
    OptCallWithKey { op: OptOpWithKey, key: LiteralKey, site: CallSite },
    OptStrFreeze { literal: String },
    OptStrUminus { literal: String },
    OptRegexpMatch1 { literal: i64 },
    OptNewArrayMax { n: u32 },
    OptNewArrayMin { n: u32 },
    /// Opcode the translator deliberately does not support
    /// (`getblockparam`, `setblockparam`, `defineclass`, `once`) or does
    /// not recognise at all.
    Unsupported { mnemonic: &'static str },
}

impl Instr {
    /// Coarse opcode identity, used for diagnostics and the opcode table.
    pub fn opcode(&self) -> Opcode {
        use Instr::*;
        match self {
            Nop => Opcode::Nop,
            GetLocal { .. } => Opcode::GetLocal,
            SetLocal { .. } => Opcode::SetLocal,
            GetSpecial { .. } => Opcode::GetSpecial,
            SetSpecial { .. } => Opcode::SetSpecial,
            GetInstanceVariable { .. } => Opcode::GetInstanceVariable,
            SetInstanceVariable { .. } => Opcode::SetInstanceVariable,
            GetClassVariable { .. } => Opcode::GetClassVariable,
            SetClassVariable { .. } => Opcode::SetClassVariable,
            GetConstant { .. } => Opcode::GetConstant,
            SetConstant { .. } => Opcode::SetConstant,
            GetGlobal { .. } => Opcode::GetGlobal,
            SetGlobal { .. } => Opcode::SetGlobal,
            PutNil => Opcode::PutNil,
            PutSelf => Opcode::PutSelf,
            PutObjectLiteral { .. } | PutObjectFixnum { .. } => Opcode::PutObject,
            PutSpecialObject { .. } => Opcode::PutSpecialObject,
            PutIseq { .. } => Opcode::PutIseq,
            PutString { .. } => Opcode::PutString,
            ConcatStrings { .. } => Opcode::ConcatStrings,
            ToString => Opcode::ToString,
            FreezeString { .. } => Opcode::FreezeString,
            ToRegexp { .. } => Opcode::ToRegexp,
            Intern => Opcode::Intern,
            NewArray { .. } => Opcode::NewArray,
            DupArray { .. } => Opcode::DupArray,
            ExpandArray { .. } => Opcode::ExpandArray,
            ConcatArray => Opcode::ConcatArray,
            SplatArray { .. } => Opcode::SplatArray,
            NewHash { .. } => Opcode::NewHash,
            NewRange { .. } => Opcode::NewRange,
            Pop => Opcode::Pop,
            Dup => Opcode::Dup,
            DupN { .. } => Opcode::DupN,
            Swap => Opcode::Swap,
            Reverse { .. } => Opcode::Reverse,
            Reput => Opcode::Reput,
            TopN { .. } => Opcode::TopN,
            SetN { .. } => Opcode::SetN,
            AdjustStack { .. } => Opcode::AdjustStack,
            Defined { .. } => Opcode::Defined,
            CheckMatch { .. } => Opcode::CheckMatch,
            CheckKeyword { .. } => Opcode::CheckKeyword,
            Trace { .. } => Opcode::Trace,
            Trace2 { .. } => Opcode::Trace2,
            Send { .. } => Opcode::Send,
            OptSendWithoutBlock { .. } => Opcode::OptSendWithoutBlock,
            InvokeSuper { .. } => Opcode::InvokeSuper,
            InvokeBlock { .. } => Opcode::InvokeBlock,
            Leave => Opcode::Leave,
            Throw { .. } => Opcode::Throw,
            Jump { .. } => Opcode::Jump,
            BranchIf { .. } => Opcode::BranchIf,
            BranchUnless { .. } => Opcode::BranchUnless,
            BranchNil { .. } => Opcode::BranchNil,
            BranchIfType { .. } => Opcode::BranchIfType,
            GetInlineCache { .. } => Opcode::GetInlineCache,
            SetInlineCache { .. } => Opcode::SetInlineCache,
            OptCaseDispatch { .. } => Opcode::OptCaseDispatch,
            OptCall { .. } => Opcode::OptCall,
            OptCallWithKey { .. } => Opcode::OptCallWithKey,
            OptStrFreeze { .. } => Opcode::OptStrFreeze,
            OptStrUminus { .. } => Opcode::OptStrUminus,
            OptRegexpMatch1 { .. } => Opcode::OptRegexpMatch1,
            OptNewArrayMax { .. } => Opcode::OptNewArrayMax,
            OptNewArrayMin { .. } => Opcode::OptNewArrayMin,
            Unsupported { mnemonic } => Opcode::Unsupported(mnemonic),
        }
    }

    /// `true` for instructions this core deliberately never translates
    /// (excluded opcode families, plus truly unrecognised words).
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Instr::Unsupported { .. })
    }
}

/// A method body ready for compilation: the decoded instruction stream plus
/// its declared maximum simulated stack depth.
#[derive(Debug, Clone)]
pub struct MethodBody {
    pub code: Vec<Instr>,
    pub stack_max: u32,
}

impl MethodBody {
    pub fn encoded_size(&self) -> usize {
        self.code.len()
    }
}

/// Resolves a raw leading word of an instruction into an [`Opcode`]
/// identity. See the module docs for why this indirection exists.
pub trait OpcodeResolver {
    fn resolve(&self, word: Word) -> Option<Opcode>;
}

/// The word *is* the opcode id (no threaded-code indirection).
pub struct RawOpcodeResolver;

impl OpcodeResolver for RawOpcodeResolver {
    fn resolve(&self, word: Word) -> Option<Opcode> {
        RAW_OPCODE_TABLE.get(word as usize).copied()
    }
}

/// The word is a handler address; resolve it back to an opcode id through
/// a reverse lookup table supplied by the host VM.
pub struct ThreadedOpcodeResolver {
    handler_to_opcode: BTreeMap<Word, Opcode>,
}

impl ThreadedOpcodeResolver {
    pub fn new(handler_to_opcode: BTreeMap<Word, Opcode>) -> Self {
        Self { handler_to_opcode }
    }
}

impl OpcodeResolver for ThreadedOpcodeResolver {
    fn resolve(&self, word: Word) -> Option<Opcode> {
        self.handler_to_opcode.get(&word).copied()
    }
}

/// Opcode ids in table order, used by [`RawOpcodeResolver`]. This is
/// deliberately the subset of opcodes whose operands are all plain words
/// (literals, indices, offsets) — the rest carry data (names, string
/// literals, call sites, case maps) no flat word array can hold without an
/// auxiliary constant pool, and arrive as already-typed [`Instr`] values
/// from an assembler instead (see the module docs).
static RAW_OPCODE_TABLE: &[Opcode] = &[
    Opcode::Nop,
    Opcode::GetLocal,
    Opcode::SetLocal,
    Opcode::PutNil,
    Opcode::PutSelf,
    Opcode::PutObject,
    Opcode::Pop,
    Opcode::Dup,
    Opcode::Swap,
    Opcode::Leave,
    Opcode::Jump,
    Opcode::BranchIf,
    Opcode::BranchUnless,
];

/// Number of trailing operand words each decodable opcode consumes.
fn operand_word_count(op: Opcode) -> usize {
    use Opcode::*;
    match op {
        Nop | PutNil | PutSelf | Pop | Dup | Swap | Leave => 0,
        GetLocal | SetLocal => 2,
        PutObject => 1,
        Jump | BranchIf | BranchUnless => 1,
        _ => 0,
    }
}

/// Build an [`Instr`] for a decodable opcode from its already-consumed
/// operand words. Branch opcodes get a placeholder `target` of `0`; the
/// real target is a word offset, not an instruction index, and can only be
/// resolved to the latter once the whole stream has been decoded (see
/// [`decode`]'s fixup pass).
fn build_instr(op: Opcode, operands: &[Word]) -> Instr {
    use Opcode::*;
    match op {
        Nop => Instr::Nop,
        PutNil => Instr::PutNil,
        PutSelf => Instr::PutSelf,
        Pop => Instr::Pop,
        Dup => Instr::Dup,
        Swap => Instr::Swap,
        Leave => Instr::Leave,
        GetLocal => Instr::GetLocal { local_index: operands[0] as u32, env_level: operands[1] as u32 },
        SetLocal => Instr::SetLocal { local_index: operands[0] as u32, env_level: operands[1] as u32 },
        PutObject => Instr::PutObjectLiteral { literal: operands[0] },
        Jump => Instr::Jump { target: 0 },
        BranchIf => Instr::BranchIf { target: 0 },
        BranchUnless => Instr::BranchUnless { target: 0 },
        _ => unreachable!("build_instr called for a non-decodable opcode"),
    }
}

/// Word offset a branch opcode's target operand resolves to (`pos` is the
/// opcode word's own position). `None` for opcodes that don't branch.
fn branch_word_target(op: Opcode, operands: &[Word], pos: usize) -> Option<usize> {
    use Opcode::*;
    match op {
        Jump | BranchIf | BranchUnless => Some((pos as i64 + 1 + operands[0]) as usize),
        _ => None,
    }
}

/// Overwrites the placeholder `target` set by [`build_instr`] with the
/// resolved instruction index.
fn set_branch_target(instr: &mut Instr, target: usize) {
    match instr {
        Instr::Jump { target: t } => *t = target,
        Instr::BranchIf { target: t } => *t = target,
        Instr::BranchUnless { target: t } => *t = target,
        _ => unreachable!("set_branch_target called on a non-branch instr"),
    }
}

/// The raw, pre-decode instruction stream: an opaque word array plus a
/// declared maximum stack depth. Each instruction is one opcode word
/// followed by [`operand_word_count`] operand words.
#[derive(Debug, Clone)]
pub struct RawStream {
    pub words: Vec<Word>,
    pub stack_max: u32,
}

/// Decode a [`RawStream`] into a [`MethodBody`] using `resolver` to turn
/// each leading word into an [`Opcode`] (see [`RawOpcodeResolver`] and
/// [`ThreadedOpcodeResolver`]). An unrecognised word, or an opcode outside
/// the decodable subset in [`RAW_OPCODE_TABLE`], is pushed onto `warnings`
/// and decoded as a zero-operand [`Instr::Unsupported`] so the scan can
/// still make progress; it's up to the caller whether that should fail the
/// whole compile (see [`crate::status::CompilationStatus`]).
///
/// Opcodes carrying non-word data (names, string literals, call sites,
/// case maps) cannot come from a flat word array and never appear in
/// [`RAW_OPCODE_TABLE`]; production pipelines construct [`MethodBody`]
/// directly from an assembler's typed output instead (see `demos/`).
///
/// Branch targets are encoded in the raw stream as word offsets, but
/// everything downstream ([`crate::driver`], [`crate::translate`]) indexes
/// [`MethodBody::code`] by instruction, not by word — the two only agree
/// when every instruction before the target is exactly one word wide.
/// `decode` resolves this in two passes: the first records each
/// instruction's own starting word offset as it is produced, leaving any
/// branch's target as a pending `(instr_index, word_offset)` fixup; the
/// second turns each pending word offset into the instruction index
/// whose body actually starts there.
pub fn decode(
    stream: &RawStream,
    resolver: &dyn OpcodeResolver,
    warnings: &mut Vec<CompileWarning>,
) -> MethodBody {
    let mut code = Vec::new();
    let mut word_offsets = Vec::new();
    let mut pending_branches = Vec::new();
    let mut pos = 0usize;
    while pos < stream.words.len() {
        let word = stream.words[pos];
        match resolver.resolve(word).filter(|op| RAW_OPCODE_TABLE.contains(op)) {
            Some(op) => {
                let n = operand_word_count(op);
                let start = pos + 1;
                if start + n > stream.words.len() {
                    warnings.push(CompileWarning::UnsupportedOpcode {
                        offset: pos,
                        mnemonic: "<truncated>",
                    });
                    word_offsets.push(pos);
                    code.push(Instr::Unsupported { mnemonic: "<truncated>" });
                    break;
                }
                let operands = &stream.words[start..start + n];
                if let Some(word_target) = branch_word_target(op, operands, pos) {
                    pending_branches.push((code.len(), word_target));
                }
                word_offsets.push(pos);
                code.push(build_instr(op, operands));
                pos = start + n;
            }
            None => {
                warnings.push(CompileWarning::UnsupportedOpcode {
                    offset: pos,
                    mnemonic: "<unknown>",
                });
                word_offsets.push(pos);
                code.push(Instr::Unsupported { mnemonic: "<unknown>" });
                pos += 1;
            }
        }
    }

    for (instr_index, word_target) in pending_branches {
        let resolved = word_offsets
            .iter()
            .position(|&w| w == word_target)
            .unwrap_or_else(|| {
                warnings.push(CompileWarning::UnsupportedOpcode {
                    offset: instr_index,
                    mnemonic: "<bad-branch-target>",
                });
                code.len()
            });
        set_branch_target(&mut code[instr_index], resolved);
    }

    MethodBody { code, stack_max: stream.stack_max }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A `getlocal` is 3 words wide (opcode + 2 operands). A branch target
    /// landing after one must resolve to that instruction's index, not to
    /// its opcode word's raw position — the two diverge as soon as any
    /// multi-word instruction precedes the target.
    #[test]
    fn branch_target_resolves_across_multi_word_instruction() {
        let words = vec![
            0, // 0: nop
            1, 0, 1, // 1: getlocal 0, 1 (3 words: opcode @1, operands @2,3)
            11, 2, // 4: branchif +2 -> word 4+1+2 = 7
            0, // 6: nop
            0, // 7: nop  <- branch target word offset
        ];
        let stream = RawStream { words, stack_max: 1 };
        let mut warnings = Vec::new();
        let body = decode(&stream, &RawOpcodeResolver, &mut warnings);

        assert!(warnings.is_empty());
        // Instructions: [0]=nop [1]=getlocal [2]=branchif [3]=nop [4]=nop
        assert_eq!(body.code.len(), 5);
        match &body.code[2] {
            Instr::BranchIf { target } => assert_eq!(*target, 4),
            other => panic!("expected BranchIf, got {other:?}"),
        }
    }
}
