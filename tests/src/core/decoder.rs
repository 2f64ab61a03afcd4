use stackmut_core::decoder::{LineEntry, decode_code, parse_assembly};
use stackmut_core::encoder::encode;
use stackmut_core::{Error, HexBytes, Instruction, Label, Opcode, input_to_bytes};

/// `static int clamp(int x) { if (x > 10) return 10; return x; }`
const CLAMP_CODE: &str = "0x1a100aa40006100aac1aac";

fn clamp_bytes() -> Vec<u8> {
    input_to_bytes(CLAMP_CODE, false).unwrap()
}

fn clamp_lines() -> Vec<LineEntry> {
    vec![
        LineEntry { start_pc: 0, line: 3 },
        LineEntry { start_pc: 6, line: 4 },
        LineEntry { start_pc: 9, line: 5 },
    ]
}

#[test]
fn decodes_clamp_with_labels_and_lines() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .try_init();

    let instructions = decode_code(&clamp_bytes(), &clamp_lines()).unwrap();
    assert_eq!(
        instructions,
        vec![
            Instruction::Line(3),
            Instruction::Var(Opcode::ILOAD, 0),
            Instruction::Int(Opcode::BIPUSH, 10),
            Instruction::Jump(Opcode::IF_ICMPLE, Label(0)),
            Instruction::Line(4),
            Instruction::Int(Opcode::BIPUSH, 10),
            Instruction::Insn(Opcode::IRETURN),
            Instruction::Label(Label(0)),
            Instruction::Line(5),
            Instruction::Var(Opcode::ILOAD, 0),
            Instruction::Insn(Opcode::IRETURN),
        ]
    );
}

#[test]
fn listing_and_bytes_agree() {
    let asm = "
        LINE 3
        ILOAD 0
        BIPUSH 10
        IF_ICMPLE L0
        LINE 4
        BIPUSH 10
        IRETURN
    L0:
        LINE 5
        ILOAD 0
        IRETURN
    ";
    let parsed = parse_assembly(asm).unwrap();
    let encoded = encode(&parsed).unwrap();
    assert_eq!(encoded.code.0, clamp_bytes());
    assert_eq!(encoded.line_numbers, clamp_lines());
}

#[test]
fn constant_pool_operands_pass_through() {
    // getstatic #12; ldc #3; invokevirtual #20; return
    let code = [0xb2, 0x00, 0x0c, 0x12, 0x03, 0xb6, 0x00, 0x14, 0xb1];
    let instructions = decode_code(&code, &[]).unwrap();
    assert_eq!(instructions.len(), 4);
    assert_eq!(instructions[1].to_string(), "LDC 03");
    assert_eq!(instructions[2].to_string(), "INVOKEVIRTUAL 0014");
    assert_eq!(encode(&instructions).unwrap().code.0, code.to_vec());
}

#[test]
fn wide_locals_round_trip_and_branch_errors_surface() {
    // `i += 200` on local 1, then a load of local 256
    let wide = [0xc4, 0x84, 0x00, 0x01, 0x00, 0xc8, 0xc4, 0x15, 0x01, 0x00, 0xac];
    let instructions = decode_code(&wide, &[]).unwrap();
    assert_eq!(
        instructions,
        vec![
            Instruction::Iinc(1, 200),
            Instruction::Var(Opcode::ILOAD, 256),
            Instruction::Insn(Opcode::IRETURN),
        ]
    );
    assert_eq!(encode(&instructions).unwrap().code.0, wide.to_vec());
    let listed = parse_assembly("IINC 1 200\nILOAD 256\nIRETURN").unwrap();
    assert_eq!(encode(&listed).unwrap().code.0, wide.to_vec());

    assert!(matches!(
        decode_code(&[0xa7, 0x00, 0x09, 0xb1], &[]),
        Err(Error::InvalidBranchTarget { offset: 0, target: 9 })
    ));

    let far = vec![
        Instruction::Jump(Opcode::GOTO, Label(0)),
        Instruction::Raw(Opcode::LDC_W, HexBytes(vec![0, 1])),
    ];
    let mut body = far.clone();
    body.extend(std::iter::repeat_n(Instruction::Insn(Opcode::NOP), 40_000));
    body.push(Instruction::Label(Label(0)));
    body.push(Instruction::Insn(Opcode::RETURN));
    assert!(matches!(
        encode(&body),
        Err(Error::BranchOutOfRange { offset: 0, .. })
    ));

    let mut wide_goto = body.clone();
    wide_goto[0] = Instruction::Jump(Opcode::GOTO_W, Label(0));
    assert!(encode(&wide_goto).is_ok());
}
