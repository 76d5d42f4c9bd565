//! Z80 test suite

use crate::arch::z80::{
    decode, lookup, IndexRegister, JumpClass, Operand, Timing, Truncated, OPCODES,
};
use crate::maths::Base;

macro_rules! assert_z80 {
    ($data: expr, $text: expr, $length: expr) => {
        assert_z80!($data, 0x4000, $text, $length)
    };
    ($data: expr, $address: expr, $text: expr, $length: expr) => {{
        let instr = decode(&$data, $address, Base::Hex).unwrap();
        assert_eq!((instr.text.as_str(), instr.len()), ($text, $length));
    }};
}

/// Disassembly tests
#[test]
fn z80_disasm() {
    assert_z80!([0x00], "NOP", 1);
    assert_z80!([0x01, 0x23, 0x01], "LD BC,#0123", 3);
    assert_z80!([0x08], "EX AF,AF'", 1);
    assert_z80!([0x18, 0xFE], "JR #4000", 2);
    assert_z80!([0x10, 0x00], "DJNZ #4002", 2);
    assert_z80!([0x20, 0x10], 0x8000, "JR NZ,#8012", 2);
    assert_z80!([0x22, 0x00, 0x5C], "LD (#5C00),HL", 3);
    assert_z80!([0x36, 0x12], "LD (HL),#12", 2);
    assert_z80!([0x76], "HALT", 1);
    assert_z80!([0x7E], "LD A,(HL)", 1);
    assert_z80!([0x96], "SUB (HL)", 1);
    assert_z80!([0xC3, 0x00, 0x40], "JP #4000", 3);
    assert_z80!([0xCD, 0xC2, 0x04], "CALL #04C2", 3);
    assert_z80!([0xD3, 0xFE], "OUT (#FE),A", 2);
    assert_z80!([0xE6, 0x07], "AND #07", 2);
    assert_z80!([0xFF], "RST #38", 1);
}

#[test]
fn z80_disasm_prefixed() {
    assert_z80!([0xCB, 0x37], "SLL A", 2);
    assert_z80!([0xCB, 0x7E], "BIT 7,(HL)", 2);
    assert_z80!([0xED, 0xB0], "LDIR", 2);
    assert_z80!([0xED, 0x70], "IN F,(C)", 2);
    assert_z80!([0xED, 0x71], "OUT (C),0", 2);
    assert_z80!([0xED, 0x43, 0x34, 0x12], "LD (#1234),BC", 4);
    assert_z80!([0xED, 0x00], "NOP", 2);
    assert_z80!([0xDD, 0x21, 0x00, 0x40], "LD IX,#4000", 4);
    assert_z80!([0xDD, 0x36, 0x05, 0x12], "LD (IX+#05),#12", 4);
    assert_z80!([0xFD, 0x7E, 0xFE], "LD A,(IY-#02)", 3);
    assert_z80!([0xDD, 0x66, 0x01], "LD H,(IX+#01)", 3);
    assert_z80!([0xDD, 0x24], "INC IXH", 2);
    assert_z80!([0xFD, 0x6F], "LD IYL,A", 2);
    assert_z80!([0xDD, 0xE9], "JP (IX)", 2);
    assert_z80!([0xDD, 0xE3], "EX (SP),IX", 2);
    assert_z80!([0xDD, 0x09], "ADD IX,BC", 2);
    assert_z80!([0xDD, 0xCB, 0x01, 0x06], "RLC (IX+#01)", 4);
    assert_z80!([0xDD, 0xCB, 0x01, 0x01], "RLC (IX+#01),C", 4);
    assert_z80!([0xFD, 0xCB, 0xFF, 0x46], "BIT 0,(IY-#01)", 4);
    assert_z80!([0xFD, 0xCB, 0x02, 0xD8], "SET 3,(IY+#02),B", 4);
}

#[test]
fn z80_passthrough() {
    let instr = decode(&[0xDD, 0x00], 0, Base::Hex).unwrap();
    assert_eq!(instr.text, "NOP");
    assert_eq!(instr.len(), 1);
    assert!(instr.entry.undocumented);

    assert_eq!(decode(&[0xDD, 0xDD, 0x21, 0, 0], 0, Base::Hex).unwrap().len(), 1);
    assert_eq!(decode(&[0xFD, 0xED, 0xB0], 0, Base::Hex).unwrap().len(), 1);
    assert_eq!(decode(&[0xDD, 0xEB], 0, Base::Hex).unwrap().len(), 1);
}

#[test]
fn z80_undocumented() {
    let instr = decode(&[0xDD, 0xCB, 0x01, 0x01], 0x4000, Base::Hex).unwrap();
    assert!(instr.entry.undocumented);
    assert_eq!(
        instr.operands,
        vec![Operand::Displacement(IndexRegister::IX, 1)]
    );

    assert!(!decode(&[0xDD, 0xCB, 0x01, 0x06], 0, Base::Hex).unwrap().entry.undocumented);
    assert!(decode(&[0xED, 0x4C], 0, Base::Hex).unwrap().entry.undocumented);
    assert!(decode(&[0xED, 0x6B, 0, 0], 0, Base::Hex).unwrap().entry.undocumented);
    assert!(!decode(&[0xED, 0x44], 0, Base::Hex).unwrap().entry.undocumented);
}

#[test]
fn z80_operands() {
    let instr = decode(&[0x18, 0xFE], 0x4000, Base::Hex).unwrap();
    assert_eq!(instr.operands, vec![Operand::Relative(0x4000)]);

    let instr = decode(&[0x21, 0x03, 0x40], 0, Base::Hex).unwrap();
    assert_eq!(instr.operands, vec![Operand::Number(0x4003)]);

    let instr = decode(&[0x3A, 0x00, 0x5C], 0, Base::Decimal).unwrap();
    assert_eq!(instr.text, "LD A,(23552)");
    assert_eq!(instr.operands, vec![Operand::Address(0x5C00)]);
}

#[test]
fn z80_timing_and_flags() {
    let jr = decode(&[0x20, 0x00], 0, Base::Hex).unwrap();
    assert_eq!(jr.entry.jump, JumpClass::Conditional);
    assert_eq!(jr.entry.timing.describe_total(), "12/7");
    assert_eq!(jr.entry.timing.describe_states(), "4,3,5/4,3");

    let ld = decode(&[0xDD, 0x36, 0x00, 0x00], 0, Base::Hex).unwrap();
    assert_eq!(ld.entry.timing.total(), 19);

    let ldir = decode(&[0xED, 0xB0], 0, Base::Hex).unwrap();
    assert_eq!(ldir.entry.timing.describe_total(), "21/16");
    assert_eq!(ldir.entry.describe_flags(), "--000-");

    let add = decode(&[0x80], 0, Base::Hex).unwrap();
    assert_eq!(add.entry.describe_flags(), "***V0*");
    assert!(!decode(&[0x00], 0, Base::Hex).unwrap().entry.has_flags());

    let bit = decode(&[0xFD, 0xCB, 0x00, 0x46], 0, Base::Hex).unwrap();
    assert_eq!(bit.entry.timing.total(), 20);

    assert_eq!(
        decode(&[0xC9], 0, Base::Hex).unwrap().entry.timing,
        Timing::States {
            primary: vec![4, 3, 3],
            alternate: None
        }
    );
}

/// Prefix bytes have no unprefixed entry of their own, and jump classes
/// survive table construction.
#[test]
fn z80_prefixes_and_jumps() {
    for prefix in [0xCBu32, 0xDD, 0xED, 0xFD].iter() {
        assert!(lookup(*prefix).unwrap().prefix, "prefix {:X}", prefix);
    }

    assert_eq!(lookup(0xC3).unwrap().jump, JumpClass::Unconditional);
    assert_eq!(lookup(0xC9).unwrap().jump, JumpClass::Unconditional);
    assert_eq!(lookup(0xC2).unwrap().jump, JumpClass::Conditional);
    assert_eq!(lookup(0x10).unwrap().jump, JumpClass::Conditional);
    assert_eq!(lookup(0xCD).unwrap().jump, JumpClass::None);
    assert_eq!(lookup(0xED4D).unwrap().jump, JumpClass::Unconditional);
}

#[test]
fn z80_truncated() {
    assert_eq!(
        decode(&[0xC3, 0x00], 0x4000, Base::Hex).unwrap_err(),
        Truncated {
            address: 0x4000,
            needed: 3,
            available: 2
        }
    );
    assert!(decode(&[0xDD, 0xCB, 0x01], 0, Base::Hex).is_err());
    assert!(decode(&[0xED], 0, Base::Hex).is_err());
    assert!(decode(&[], 0, Base::Hex).is_err());
}

/// Every table key decodes from its minimal byte sequence with all operand
/// placeholders substituted.
#[test]
fn z80_table_complete() {
    for (key, entry) in OPCODES.iter() {
        if entry.prefix {
            continue;
        }

        let bytes: Vec<u8> = if *key > 0xFFFF {
            vec![(key >> 16) as u8, 0xCB, 0x00, *key as u8]
        } else if *key > 0xFF {
            let mut bytes = vec![(key >> 8) as u8, *key as u8];
            bytes.resize(entry.length as usize, 0);
            bytes
        } else {
            let mut bytes = vec![*key as u8];
            bytes.resize(entry.length as usize, 0);
            bytes
        };

        let instr = decode(&bytes, 0x8000, Base::Hex).unwrap();
        assert_eq!(instr.len(), entry.length as usize, "key {:X}", key);
        assert_eq!(instr.len(), bytes.len(), "key {:X}", key);
        assert!(
            !instr.text.chars().any(|c| c.is_ascii_lowercase()),
            "key {:X} gave {}",
            key,
            instr.text
        );
    }

    assert_eq!(OPCODES.keys().filter(|k| **k >> 8 == 0xED).count(), 256);
    assert_eq!(OPCODES.keys().filter(|k| **k >> 16 == 0xDD).count(), 256);
}
