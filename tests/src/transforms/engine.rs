use stackmut_core::decoder::{decode_code, parse_assembly};
use stackmut_core::encoder::encode;
use stackmut_core::stack::simulate;
use stackmut_core::{HexBytes, Instruction, Label, Location, Method, Opcode};
use stackmut_transform::{MutationContext, MutationEngine, Mutator, apply, enumerate};
use std::collections::BTreeSet;

/// `static long sum(int n) { long s = 0; for (int i = 0; i < n; i++) s += i; return s; }`
const SUM_CODE: [u8; 22] = [
    0x09, 0x40, 0x03, 0x3e, 0x1d, 0x1a, 0xa2, 0x00, 0x0e, 0x1f, 0x1d, 0x85, 0x61, 0x40, 0x84,
    0x03, 0x01, 0xa7, 0xff, 0xf3, 0x1f, 0xad,
];

const LADD_INDEX: usize = 11;
const BRANCH_INDEX: usize = 7;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .try_init();
}

fn sum() -> Method {
    Method::new(
        Location::new("com.example.Series", "sum", "(I)J"),
        decode_code(&SUM_CODE, &[]).unwrap(),
    )
}

fn add() -> Method {
    Method::new(
        Location::new("com.example.Calc", "add", "(II)I"),
        vec![
            Instruction::Var(Opcode::ILOAD, 0),
            Instruction::Var(Opcode::ILOAD, 1),
            Instruction::Insn(Opcode::IADD),
            Instruction::Insn(Opcode::IRETURN),
        ],
    )
}

#[test]
fn decoded_loop_has_expected_shape() {
    let method = sum();
    assert_eq!(method.instructions.len(), 18);
    assert_eq!(method.instructions[4], Instruction::Label(Label(0)));
    assert_eq!(
        method.instructions[BRANCH_INDEX],
        Instruction::Jump(Opcode::IF_ICMPGE, Label(1))
    );
    assert_eq!(method.instructions[LADD_INDEX], Instruction::Insn(Opcode::LADD));
}

#[test]
fn enumeration_orders_by_catalog_then_position() {
    init_tracing();
    let ids = enumerate(&sum());
    let summary: Vec<(&str, usize)> = ids
        .iter()
        .map(|id| (id.mutator.as_str(), id.index))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("aor.subtraction", LADD_INDEX),
            ("aor.multiplication", LADD_INDEX),
            ("aor.division", LADD_INDEX),
            ("aor.modulus", LADD_INDEX),
            ("ror.equals", BRANCH_INDEX),
            ("ror.not_equal", BRANCH_INDEX),
            ("ror.greater", BRANCH_INDEX),
            ("ror.less_or_equal", BRANCH_INDEX),
            ("ror.less", BRANCH_INDEX),
            ("aod.delete_first_operand", LADD_INDEX),
            ("aod.delete_second_operand", LADD_INDEX),
        ]
    );
}

#[test]
fn identification_is_idempotent() {
    let method = sum();
    let first = enumerate(&method);
    let second = enumerate(&method.clone());
    assert_eq!(first, second);

    let mut unique = BTreeSet::new();
    assert!(first.iter().all(|id| unique.insert(id.clone())));
}

#[test]
fn enumeration_context_selects_every_candidate() {
    let method = add();
    let ids = enumerate(&method);
    let ctx = MutationContext::new(method.location.clone());
    assert!(!ids.is_empty());
    assert!(ids.iter().all(|id| ctx.should_mutate(id)));
}

#[test]
fn substitutions_change_exactly_one_instruction() {
    let method = sum();
    for (id, mutant) in MutationEngine::default().mutants(&method) {
        if id.mutator.starts_with("aod.") {
            continue;
        }
        assert_eq!(mutant.len(), method.instructions.len(), "{id}");
        let changed: Vec<usize> = (0..mutant.len())
            .filter(|&i| mutant[i] != method.instructions[i])
            .collect();
        assert_eq!(changed, vec![id.index], "{id}");
        assert_eq!(
            simulate(&mutant, 0).unwrap(),
            simulate(&method.instructions, 0).unwrap(),
            "{id}"
        );
    }
}

#[test]
fn scenario_subtraction_on_int_add() {
    let method = add();
    let target = enumerate(&method)
        .into_iter()
        .find(|id| id.mutator == Mutator::Subtraction.global_id())
        .unwrap();
    assert_eq!(
        apply(&method, &target),
        vec![
            Instruction::Var(Opcode::ILOAD, 0),
            Instruction::Var(Opcode::ILOAD, 1),
            Instruction::Insn(Opcode::ISUB),
            Instruction::Insn(Opcode::IRETURN),
        ]
    );
    // The original is untouched.
    assert_eq!(method.instructions[2], Instruction::Insn(Opcode::IADD));
}

#[test]
fn deletion_mutant_reencodes_with_shifted_branches() {
    let method = sum();
    let target = enumerate(&method)
        .into_iter()
        .find(|id| id.mutator == Mutator::DeleteFirstOperand.global_id())
        .unwrap();
    let mutant = apply(&method, &target);
    assert_eq!(mutant.len(), method.instructions.len() + 2);

    let encoded = encode(&mutant).unwrap();
    assert_eq!(
        encoded.code.0,
        vec![
            0x09, 0x40, 0x03, 0x3e, 0x1d, 0x1a, 0xa2, 0x00, 0x10, 0x1f, 0x1d, 0x85, 0x5e, 0x58,
            0x58, 0x40, 0x84, 0x03, 0x01, 0xa7, 0xff, 0xf1, 0x1f, 0xad,
        ]
    );
    assert_eq!(decode_code(&encoded.code, &[]).unwrap(), mutant);

    let before = simulate(&method.instructions, 0).unwrap();
    let after = simulate(&mutant, 0).unwrap();
    assert_eq!(before.last(), after.last());
    assert_eq!(before[LADD_INDEX], after[LADD_INDEX + 2]);
}

#[test]
fn skipped_branch_keeps_other_indices() {
    let method = sum();
    let engine = MutationEngine::default();
    let skip = BTreeSet::from([BRANCH_INDEX]);
    let ids = engine.enumerate_skipping(&method, &skip);
    assert_eq!(ids.len(), 6);
    assert!(ids.iter().all(|id| id.index == LADD_INDEX));

    let full: Vec<_> = engine
        .enumerate(&method)
        .into_iter()
        .filter(|id| id.index == LADD_INDEX)
        .collect();
    assert_eq!(ids, full);
}

#[test]
fn identifiers_survive_serialization() {
    let method = sum();
    let ids = enumerate(&method);
    let json = serde_json::to_string(&ids).unwrap();
    let back: Vec<stackmut_transform::MutationIdentifier> = serde_json::from_str(&json).unwrap();
    for (id, restored) in ids.iter().zip(&back) {
        assert_eq!(apply(&method, id), apply(&method, restored));
    }
}

#[test]
fn opaque_instructions_pass_through_every_mutant() {
    let unknown = Instruction::Insn(Opcode::UNKNOWN(0xcb));
    let call = Instruction::Raw(Opcode::INVOKESTATIC, HexBytes(vec![0x00, 0x05]));
    let method = Method::new(
        Location::new("com.example.Calc", "addThenLog", "(II)I"),
        vec![
            unknown.clone(),
            Instruction::Var(Opcode::ILOAD, 0),
            Instruction::Var(Opcode::ILOAD, 1),
            Instruction::Insn(Opcode::IADD),
            call.clone(),
            Instruction::Insn(Opcode::IRETURN),
        ],
    );

    let ids = enumerate(&method);
    assert_eq!(ids.len(), 6);
    assert!(ids.iter().all(|id| id.index == 3), "{ids:?}");

    for id in &ids {
        let mutant = apply(&method, id);
        assert_eq!(mutant.first(), Some(&unknown), "{id}");
        assert_eq!(mutant[mutant.len() - 2], call, "{id}");
        assert_eq!(mutant.iter().filter(|insn| **insn == call).count(), 1, "{id}");

        let code = encode(&mutant).unwrap().code.0;
        assert_eq!(code[0], 0xcb, "{id}");
        assert_eq!(code[code.len() - 4..], [0xb8u8, 0x00, 0x05, 0xac], "{id}");
    }
}

#[test]
fn switch_methods_mutate_and_reencode() {
    // static int pick(int k, int i) { switch (k) { case 1: i += 200; case 2: return i * k; } return 0; }
    let asm = "
        ILOAD 0
        TABLESWITCH 1 L0 L1 default:L2
    L0:
        IINC 1 200
    L1:
        ILOAD 1
        ILOAD 0
        IMUL
        IRETURN
    L2:
        ICONST_0
        IRETURN
    ";
    let method = Method::new(
        Location::new("com.example.Picker", "pick", "(II)I"),
        parse_assembly(asm).unwrap(),
    );
    let original = encode(&method.instructions).unwrap();
    assert_eq!(decode_code(&original.code, &[]).unwrap(), method.instructions);

    let ids = enumerate(&method);
    assert_eq!(ids.len(), 6);
    assert!(ids.iter().all(|id| id.index == 7), "{ids:?}");

    let target = ids
        .iter()
        .find(|id| id.mutator == Mutator::DeleteFirstOperand.global_id())
        .unwrap();
    let mutant = apply(&method, target);
    let encoded = encode(&mutant).unwrap();
    assert_eq!(encoded.code.len(), original.code.len() + 1);
    assert_eq!(decode_code(&encoded.code, &[]).unwrap(), mutant);
    assert_eq!(simulate(&mutant, 0).unwrap().last(), Some(&0));
}
