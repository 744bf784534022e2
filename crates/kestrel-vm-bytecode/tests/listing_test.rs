//! Golden listing tests
//!
//! These tests pin the exact text produced for small hand-built modules.

use kestrel_vm_bytecode::{
    CodeUnit, Emitter, JumpOffset, Line, Module, Opcode, Slot, SpecialInstruction,
    disassemble, disassemble_to_string,
};

#[test]
fn test_add_jump_stop() {
    let mut e = Emitter::new();
    e.addr3(Opcode::Addition, 1, 2, 3).unwrap();
    e.special(SpecialInstruction::Jump {
        offset: JumpOffset(4),
    });
    e.addr0(Opcode::Stop).unwrap();
    let code = e.into_code();
    let module = Module::single(&code);

    let lines: Vec<String> = disassemble(&module).map(|l| l.to_string()).collect();
    assert_eq!(
        lines,
        vec![
            "ADD               0001 0002 0003",
            "JUMP              +4",
            "STOP",
        ]
    );
}

#[test]
fn test_unknown_then_return() {
    let mut e = Emitter::new();
    e.raw(&[0xFF]);
    e.addr1(Opcode::Return, 0).unwrap();
    let code = e.into_code();
    let module = Module::single(&code);

    let lines: Vec<Line> = disassemble(&module).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].to_string(), "UNKNOWN           0xFF");
    assert_eq!(lines[1].to_string(), "RETURN            0000");

    match &lines[1] {
        Line::Instruction {
            offset,
            instruction,
            ..
        } => assert_eq!(offset + instruction.size(), code.len()),
        other => panic!("unexpected line {other:?}"),
    }
}

#[test]
fn test_function_with_every_special_form() {
    let mut e = Emitter::new();
    e.begin_unit();
    e.special(SpecialInstruction::Array {
        retval: Slot(1),
        length: 3,
    });
    e.special(SpecialInstruction::CondJumpTrue {
        cond: Slot(2),
        offset: JumpOffset(18),
    });
    e.special(SpecialInstruction::EqualJump {
        value1: Slot(3),
        value2: Slot(4),
        offset: JumpOffset(-9),
    });
    e.special(SpecialInstruction::TestJumpFalse {
        retval: Slot(5),
        value: Slot(6),
        offset: JumpOffset(13),
    });
    e.special(SpecialInstruction::FunctionFrame {
        name: Slot(0x20),
        nargs: 1,
        ctor: true,
    });
    e.special(SpecialInstruction::PropertyForeach {
        next: Slot(7),
        object: Slot(8),
        offset: JumpOffset(30),
    });
    e.special(SpecialInstruction::PropertyNext {
        retval: Slot(9),
        object: Slot(8),
        next: Slot(7),
        offset: JumpOffset(-17),
    });
    e.special(SpecialInstruction::TryStart {
        value: Slot(0xA),
        offset: JumpOffset(14),
    });
    e.special(SpecialInstruction::Catch {
        exception: Slot(0xB),
        offset: JumpOffset(5),
    });
    e.special(SpecialInstruction::TryEnd {
        offset: JumpOffset(5),
    });
    e.addr1(Opcode::Throw, 0xB).unwrap();
    e.addr1(Opcode::Finally, 0xA).unwrap();
    let (code, units) = e.finish();
    let module = Module::new(&code, units).unwrap();

    let expected = "\
ARRAY             0001 3
JUMP IF TRUE      0002 +18
JUMP IF EQUAL     0003 0004 -9
TEST IF FALSE     0005 0006 +13
FUNCTION FRAME    0020 1 CTOR
PROPERTY FOREACH  0007 0008 +30
PROPERTY NEXT     0009 0008 0007 -17
TRY START         000A +14
CATCH             000B +5
TRY END           +5
THROW             000B
FINALLY           000A
";
    assert_eq!(disassemble_to_string(&module), expected);
}

#[test]
fn test_units_listed_in_module_order() {
    let mut e = Emitter::new();
    e.begin_unit();
    e.addr2(Opcode::Move, 1, 2).unwrap();
    e.begin_unit();
    e.addr3(Opcode::StrictNotEqual, 3, 4, 5).unwrap();
    let (code, units) = e.finish();

    let reversed: Vec<CodeUnit> = units.iter().rev().copied().collect();
    let module = Module::new(&code, reversed).unwrap();

    assert_eq!(
        disassemble_to_string(&module),
        "STRICT NOT EQUAL  0003 0004 0005\nMOVE              0001 0002\n"
    );
}

#[test]
fn test_truncated_tail_reported_once() {
    let mut e = Emitter::new();
    e.addr0(Opcode::Stop).unwrap();
    e.raw(&[Opcode::MethodFrame.to_byte(), 1, 2, 3]);
    let code = e.into_code();
    let module = Module::single(&code);

    let lines: Vec<Line> = disassemble(&module).collect();
    assert_eq!(lines.len(), 2);
    assert!(matches!(
        lines[1],
        Line::Truncated {
            offset: 1,
            needed: 14,
            available: 4,
            ..
        }
    ));
}
