use stackmut_core::opcode::OperandSize;
use stackmut_core::stack::{shuffle, simulate};
use stackmut_core::{Instruction, Location, Method, Opcode};
use stackmut_transform::{MutationEngine, Mutator};

fn binary(load: Opcode, second_slot: u16, op: Opcode, ret: Opcode) -> Method {
    Method::new(
        Location::new("com.example.Calc", "op", "()V"),
        vec![
            Instruction::Var(load, 0),
            Instruction::Var(load, second_slot),
            Instruction::Insn(op),
            Instruction::Insn(ret),
        ],
    )
}

fn int_add() -> Method {
    binary(Opcode::ILOAD, 1, Opcode::IADD, Opcode::IRETURN)
}

fn double_add() -> Method {
    binary(Opcode::DLOAD, 2, Opcode::DADD, Opcode::DRETURN)
}

fn mutant(method: &Method, mutator: Mutator) -> Vec<Instruction> {
    let engine = MutationEngine::new(vec![mutator]);
    let ids = engine.enumerate(method);
    assert_eq!(ids.len(), 1, "{mutator}");
    engine.apply(method, &ids[0])
}

/// Runs loads and stack shuffles on symbolic words and returns what is left when the
/// method returns.
fn returned_words(instructions: &[Instruction]) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for instruction in instructions {
        match instruction {
            Instruction::Var(Opcode::ILOAD, slot) => words.push(format!("v{slot}")),
            Instruction::Var(Opcode::DLOAD, slot) => {
                words.push(format!("v{slot}.hi"));
                words.push(format!("v{slot}.lo"));
            }
            Instruction::Insn(op) if op.is_return() => break,
            Instruction::Insn(op) => shuffle(*op, &mut words).unwrap(),
            other => panic!("unexpected {other}"),
        }
    }
    words
}

#[test]
fn delete_first_single_swaps_and_pops() {
    let out = mutant(&int_add(), Mutator::DeleteFirstOperand);
    assert_eq!(
        out,
        vec![
            Instruction::Var(Opcode::ILOAD, 0),
            Instruction::Var(Opcode::ILOAD, 1),
            Instruction::Insn(Opcode::SWAP),
            Instruction::Insn(Opcode::POP),
            Instruction::Insn(Opcode::IRETURN),
        ]
    );
    assert_eq!(returned_words(&out), vec!["v1"]);
}

#[test]
fn delete_first_double_uses_two_word_shuffle() {
    let out = mutant(&double_add(), Mutator::DeleteFirstOperand);
    assert_eq!(
        out[2..5],
        [
            Instruction::Insn(Opcode::DUP2_X2),
            Instruction::Insn(Opcode::POP2),
            Instruction::Insn(Opcode::POP2),
        ]
    );
    assert_eq!(returned_words(&out), vec!["v2.hi", "v2.lo"]);
}

#[test]
fn delete_second_keeps_first_operand() {
    let single = mutant(&int_add(), Mutator::DeleteSecondOperand);
    assert_eq!(single[2], Instruction::Insn(Opcode::POP));
    assert_eq!(returned_words(&single), vec!["v0"]);

    let double = mutant(&double_add(), Mutator::DeleteSecondOperand);
    assert_eq!(double[2], Instruction::Insn(Opcode::POP2));
    assert_eq!(returned_words(&double), vec!["v0.hi", "v0.lo"]);
}

#[test]
fn length_deltas_match_operand_width() {
    let cases = [
        (int_add(), Mutator::DeleteFirstOperand, OperandSize::Single, 1),
        (int_add(), Mutator::DeleteSecondOperand, OperandSize::Single, 0),
        (double_add(), Mutator::DeleteFirstOperand, OperandSize::Double, 2),
        (double_add(), Mutator::DeleteSecondOperand, OperandSize::Double, 0),
    ];
    for (method, mutator, size, delta) in cases {
        let out = mutant(&method, mutator);
        assert_eq!(out.len(), method.instructions.len() + delta, "{mutator} {size:?}");
        assert_eq!(out[..2], method.instructions[..2]);
        assert_eq!(out.last(), method.instructions.last());

        // Same depth before the return as the arithmetic instruction left behind.
        let before = simulate(&method.instructions, 0).unwrap();
        let after = simulate(&out, 0).unwrap();
        assert_eq!(after[after.len() - 2], before[2], "{mutator} {size:?}");
        assert_eq!(after.last(), Some(&0));
    }
}

#[test]
fn every_arithmetic_width_is_a_deletion_site() {
    let ops = [
        (Opcode::ISUB, OperandSize::Single),
        (Opcode::FMUL, OperandSize::Single),
        (Opcode::LDIV, OperandSize::Double),
        (Opcode::DREM, OperandSize::Double),
    ];
    for (op, size) in ops {
        assert_eq!(op.arithmetic_size(), Some(size));
        let method = Method::new(
            Location::new("T", "m", "()V"),
            vec![Instruction::Insn(op)],
        );
        let ids = MutationEngine::new(vec![Mutator::DeleteFirstOperand]).enumerate(&method);
        assert_eq!(ids.len(), 1, "{op}");
        assert_eq!(
            ids[0].description,
            "AOD: Removed the first operand from an arithmetic expression"
        );
    }
    let not_binary = Method::new(
        Location::new("T", "m", "()V"),
        vec![Instruction::Insn(Opcode::INEG), Instruction::Insn(Opcode::IAND)],
    );
    assert!(MutationEngine::new(vec![Mutator::DeleteSecondOperand])
        .enumerate(&not_binary)
        .is_empty());
}
