//! Decoder property tests

use kestrel_vm_bytecode::catalog::{AddressingShape, CATALOG};
use kestrel_vm_bytecode::{
    BytecodeError, Decoder, Emitter, Instruction, Line, Module, Operands, Slot, TAG_SIZE,
    decode_one, disassemble,
};
use proptest::prelude::*;

fn operands_for(shape: AddressingShape, a: u32, b: u32, c: u32) -> Operands {
    match shape {
        AddressingShape::Addr0 => Operands::Addr0,
        AddressingShape::Addr1 => Operands::Addr1 { index: Slot(a) },
        AddressingShape::Addr2 => Operands::Addr2 {
            dst: Slot(a),
            src: Slot(b),
        },
        AddressingShape::Addr3 => Operands::Addr3 {
            dst: Slot(a),
            src1: Slot(b),
            src2: Slot(c),
        },
    }
}

proptest! {
    #[test]
    fn prop_catalog_entries_decode_what_was_emitted(
        index in 0..CATALOG.len(),
        a in any::<u32>(),
        b in any::<u32>(),
        c in any::<u32>(),
    ) {
        let entry = &CATALOG[index];
        let operands = operands_for(entry.shape, a, b, c);

        let mut e = Emitter::new();
        e.simple(entry.opcode, operands).unwrap();
        let code = e.into_code();

        let (decoded, next) = decode_one(&code, 0, code.len()).unwrap();
        prop_assert_eq!(next, entry.size);
        prop_assert_eq!(decoded.mnemonic(), entry.name);
        match decoded {
            Instruction::Simple { entry: got, operands: got_operands } => {
                prop_assert_eq!(got.opcode, entry.opcode);
                prop_assert_eq!(got_operands, operands);
            }
            other => prop_assert!(false, "decoded as {:?}", other),
        }
    }

    #[test]
    fn prop_cursor_strictly_advances(code in proptest::collection::vec(any::<u8>(), 0..256)) {
        let mut decoder = Decoder::new(&code, 0, code.len());
        let mut last: Option<usize> = None;
        let mut steps = 0usize;

        while let Some(item) = decoder.next() {
            steps += 1;
            prop_assert!(steps <= code.len());
            match item {
                Ok((offset, instruction)) => {
                    if let Some(prev) = last {
                        prop_assert!(offset > prev);
                    }
                    prop_assert!(instruction.size() >= TAG_SIZE);
                    prop_assert!(offset + instruction.size() <= code.len());
                    last = Some(offset);
                }
                Err(BytecodeError::Truncated { offset, needed, available }) => {
                    prop_assert!(needed > available);
                    prop_assert_eq!(offset + available, code.len());
                }
                Err(other) => prop_assert!(false, "unexpected error {}", other),
            }
        }
    }

    #[test]
    fn prop_decoder_stays_inside_unit(
        code in proptest::collection::vec(any::<u8>(), 1..128),
        cut in any::<prop::sample::Index>(),
    ) {
        // Bytes after `end` are poisoned with a tag that would decode if read.
        let end = cut.index(code.len());
        let mut buffer = code[..end].to_vec();
        buffer.extend(std::iter::repeat_n(0x24u8, 32));

        let module = Module::new(&buffer, [kestrel_vm_bytecode::CodeUnit::new(0, end)]).unwrap();
        for line in disassemble(&module) {
            match line {
                Line::Instruction { offset, instruction, .. } => {
                    prop_assert!(offset + instruction.size() <= end);
                }
                Line::Truncated { offset, available, .. } => {
                    prop_assert_eq!(offset + available, end);
                }
                Line::UnitHeader { .. } => {}
            }
        }
    }

    #[test]
    fn prop_unknown_only_buffers_terminate(len in 0usize..512) {
        let code = vec![0xFFu8; len];
        let module = Module::single(&code);
        prop_assert_eq!(disassemble(&module).count(), len);
    }
}
