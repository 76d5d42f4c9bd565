//! Opcode tables, generated once from the fields of the Z80 encoding.
//!
//! Opcodes are decomposed the usual way: `x` is bits 6-7, `y` bits 3-5, `z`
//! bits 0-2, and `y` splits further into `p` (bits 4-5) and `q` (bit 3).

use crate::arch::z80::{FlagEffect, FlagSet, IndexRegister, JumpClass, OpcodeEntry, Timing};
use std::collections::HashMap;

/// 8-bit operand field.
static REGS: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];

/// 16-bit operand field for loads and arithmetic.
static PAIRS: [&str; 4] = ["BC", "DE", "HL", "SP"];

/// 16-bit operand field for stack operations.
static STACK_PAIRS: [&str; 4] = ["BC", "DE", "HL", "AF"];

static CONDITIONS: [&str; 8] = ["NZ", "Z", "NC", "C", "PO", "PE", "P", "M"];

static ALU_OPS: [&str; 8] = [
    "ADD A,", "ADC A,", "SUB ", "SBC A,", "AND ", "XOR ", "OR ", "CP ",
];

static ALU_FLAGS: [&str; 8] = [
    "***V0*", "***V0*", "***V1*", "***V1*", "**1P00", "**0P00", "**0P00", "***V1*",
];

static ACCUMULATOR_OPS: [&str; 8] = ["RLCA", "RRCA", "RLA", "RRA", "DAA", "CPL", "SCF", "CCF"];

static ACCUMULATOR_FLAGS: [&str; 8] = [
    "--0-0*", "--0-0*", "--0-0*", "--0-0*", "***P-*", "--1-1-", "--0-01", "--*-0*",
];

static ROTATIONS: [&str; 8] = ["RLC", "RRC", "RL", "RR", "SLA", "SRA", "SLL", "SRL"];

static IM_MODES: [u8; 8] = [0, 0, 1, 2, 0, 0, 1, 2];

static BLOCK_OPS: [[&str; 4]; 4] = [
    ["LDI", "CPI", "INI", "OUTI"],
    ["LDD", "CPD", "IND", "OUTD"],
    ["LDIR", "CPIR", "INIR", "OTIR"],
    ["LDDR", "CPDR", "INDR", "OTDR"],
];

/// An entry under construction.
struct Proto {
    template: String,
    flags: &'static str,
    primary: Vec<u8>,
    alternate: Option<Vec<u8>>,
    jump: JumpClass,
    undocumented: bool,
}

impl Proto {
    fn new<T: Into<String>>(template: T, primary: &[u8]) -> Self {
        Proto {
            template: template.into(),
            flags: "------",
            primary: primary.to_vec(),
            alternate: None,
            jump: JumpClass::None,
            undocumented: false,
        }
    }

    fn flags(mut self, flags: &'static str) -> Self {
        self.flags = flags;
        self
    }

    fn alternate(mut self, states: &[u8]) -> Self {
        self.alternate = Some(states.to_vec());
        self
    }

    fn jump(mut self, jump: JumpClass) -> Self {
        self.jump = jump;
        self
    }

    fn undocumented_if(mut self, undocumented: bool) -> Self {
        self.undocumented |= undocumented;
        self
    }

    /// Seal the entry. Every lower-case placeholder letter is one operand
    /// byte on top of the prefix and opcode bytes.
    fn finish(self, prefix_bytes: u8) -> OpcodeEntry {
        let operand_bytes = self.template.chars().filter(|c| c.is_ascii_lowercase()).count();

        OpcodeEntry {
            length: prefix_bytes + 1 + operand_bytes as u8,
            flags: flag_set(self.flags),
            timing: Timing::States {
                primary: self.primary,
                alternate: self.alternate,
            },
            undocumented: self.undocumented,
            jump: self.jump,
            prefix: false,
            template: self.template,
        }
    }
}

fn flag_set(symbols: &str) -> FlagSet {
    let mut set = [FlagEffect::Unaffected; 6];

    for (slot, c) in set.iter_mut().zip(symbols.chars()) {
        *slot = FlagEffect::from_symbol(c).unwrap_or(FlagEffect::Undefined);
    }

    set
}

fn fields(op: u8) -> (usize, usize, usize, usize, usize) {
    let x = (op >> 6) as usize;
    let y = ((op >> 3) & 7) as usize;
    let z = (op & 7) as usize;

    (x, y, z, y >> 1, y & 1)
}

/// Unprefixed opcodes. Yields `None` for the prefix bytes.
fn base(op: u8) -> Option<Proto> {
    use JumpClass::{Conditional, Unconditional};

    let (x, y, z, p, q) = fields(op);
    let memory = |r: usize| r == 6;

    Some(match (x, z) {
        (0, 0) => match y {
            0 => Proto::new("NOP", &[4]),
            1 => Proto::new("EX AF,AF'", &[4]).flags("******"),
            2 => Proto::new("DJNZ j", &[5, 3, 5]).alternate(&[5, 3]).jump(Conditional),
            3 => Proto::new("JR j", &[4, 3, 5]).jump(Unconditional),
            _ => Proto::new(format!("JR {},j", CONDITIONS[y - 4]), &[4, 3, 5])
                .alternate(&[4, 3])
                .jump(Conditional),
        },
        (0, 1) if q == 0 => Proto::new(format!("LD {},nn", PAIRS[p]), &[4, 3, 3]),
        (0, 1) => Proto::new(format!("ADD HL,{}", PAIRS[p]), &[4, 4, 3]).flags("--*-0*"),
        (0, 2) => match (p, q) {
            (0, 0) => Proto::new("LD (BC),A", &[4, 3]),
            (1, 0) => Proto::new("LD (DE),A", &[4, 3]),
            (2, 0) => Proto::new("LD (aa),HL", &[4, 3, 3, 3, 3]),
            (3, 0) => Proto::new("LD (aa),A", &[4, 3, 3, 3]),
            (0, _) => Proto::new("LD A,(BC)", &[4, 3]),
            (1, _) => Proto::new("LD A,(DE)", &[4, 3]),
            (2, _) => Proto::new("LD HL,(aa)", &[4, 3, 3, 3, 3]),
            _ => Proto::new("LD A,(aa)", &[4, 3, 3, 3]),
        },
        (0, 3) if q == 0 => Proto::new(format!("INC {}", PAIRS[p]), &[6]),
        (0, 3) => Proto::new(format!("DEC {}", PAIRS[p]), &[6]),
        (0, 4) | (0, 5) => {
            let (name, flags) = if z == 4 {
                ("INC", "***V0-")
            } else {
                ("DEC", "***V1-")
            };
            let timing: &[u8] = if memory(y) { &[4, 4, 3] } else { &[4] };

            Proto::new(format!("{} {}", name, REGS[y]), timing).flags(flags)
        }
        (0, 6) => {
            let timing: &[u8] = if memory(y) { &[4, 3, 3] } else { &[4, 3] };

            Proto::new(format!("LD {},n", REGS[y]), timing)
        }
        (0, _) => Proto::new(ACCUMULATOR_OPS[y], &[4]).flags(ACCUMULATOR_FLAGS[y]),
        (1, _) if memory(y) && memory(z) => Proto::new("HALT", &[4]),
        (1, _) => {
            let timing: &[u8] = if memory(y) || memory(z) { &[4, 3] } else { &[4] };

            Proto::new(format!("LD {},{}", REGS[y], REGS[z]), timing)
        }
        (2, _) => {
            let timing: &[u8] = if memory(z) { &[4, 3] } else { &[4] };

            Proto::new(format!("{}{}", ALU_OPS[y], REGS[z]), timing).flags(ALU_FLAGS[y])
        }
        (_, 0) => Proto::new(format!("RET {}", CONDITIONS[y]), &[5, 3, 3])
            .alternate(&[5])
            .jump(Conditional),
        (_, 1) if q == 0 => {
            let pop = Proto::new(format!("POP {}", STACK_PAIRS[p]), &[4, 3, 3]);

            if p == 3 {
                pop.flags("******")
            } else {
                pop
            }
        }
        (_, 1) => match p {
            0 => Proto::new("RET", &[4, 3, 3]).jump(Unconditional),
            1 => Proto::new("EXX", &[4]),
            2 => Proto::new("JP (HL)", &[4]).jump(Unconditional),
            _ => Proto::new("LD SP,HL", &[6]),
        },
        (_, 2) => Proto::new(format!("JP {},aa", CONDITIONS[y]), &[4, 3, 3])
            .alternate(&[4, 3, 3])
            .jump(Conditional),
        (_, 3) => match y {
            0 => Proto::new("JP aa", &[4, 3, 3]).jump(Unconditional),
            1 => return None,
            2 => Proto::new("OUT (n),A", &[4, 3, 4]),
            3 => Proto::new("IN A,(n)", &[4, 3, 4]),
            4 => Proto::new("EX (SP),HL", &[4, 3, 4, 3, 5]),
            5 => Proto::new("EX DE,HL", &[4]),
            6 => Proto::new("DI", &[4]),
            _ => Proto::new("EI", &[4]),
        },
        (_, 4) => Proto::new(format!("CALL {},aa", CONDITIONS[y]), &[4, 3, 4, 3, 3])
            .alternate(&[4, 3, 3]),
        (_, 5) if q == 0 => Proto::new(format!("PUSH {}", STACK_PAIRS[p]), &[5, 3, 3]),
        (_, 5) if p == 0 => Proto::new("CALL aa", &[4, 3, 4, 3, 3]),
        (_, 5) => return None,
        (_, 6) => Proto::new(format!("{}n", ALU_OPS[y]), &[4, 3]).flags(ALU_FLAGS[y]),
        _ => Proto::new(format!("RST #{:02X}", y * 8), &[5, 3, 3]),
    })
}

/// Rewrite the operands of a template through `f`.
fn map_operands<F>(template: &str, f: F) -> String
where
    F: Fn(&str) -> String,
{
    let mut parts = template.splitn(2, ' ');
    let mnemonic = parts.next().unwrap_or("");

    match parts.next() {
        Some(operands) => {
            let operands: Vec<String> = operands.split(',').map(|o| f(o)).collect();
            format!("{} {}", mnemonic, operands.join(","))
        }
        None => mnemonic.to_string(),
    }
}

fn has_operand(template: &str, operand: &str) -> bool {
    template
        .splitn(2, ' ')
        .nth(1)
        .map(|ops| ops.split(',').any(|o| o == operand))
        .unwrap_or(false)
}

/// `DD`/`FD` prefixed opcodes: the unprefixed table seen through an index
/// register. Yields `None` where the prefix has no effect.
fn indexed(op: u8, ix: IndexRegister) -> Option<Proto> {
    let mut proto = base(op)?;
    let name = ix.to_string();

    if op == 0xE9 {
        proto.template = format!("JP ({})", name);
        proto.primary = vec![4, 4];
    } else if has_operand(&proto.template, "(HL)") {
        let displaced = format!("({}+d)", name);
        proto.template = map_operands(&proto.template, |o| {
            if o == "(HL)" {
                displaced.clone()
            } else {
                o.to_string()
            }
        });
        proto.primary = if op == 0x36 {
            vec![4, 4, 3, 5, 3]
        } else {
            [4, 4, 3, 5]
                .iter()
                .chain(proto.primary.iter().skip(1))
                .copied()
                .collect()
        };
    } else if op != 0xEB && has_operand(&proto.template, "HL") {
        proto.template = map_operands(&proto.template, |o| {
            if o == "HL" {
                name.clone()
            } else {
                o.to_string()
            }
        });
        proto.primary.insert(0, 4);
    } else if has_operand(&proto.template, "H") || has_operand(&proto.template, "L") {
        proto.template = map_operands(&proto.template, |o| match o {
            "H" => format!("{}H", name),
            "L" => format!("{}L", name),
            _ => o.to_string(),
        });
        proto.primary.insert(0, 4);
        proto.undocumented = true;
    } else {
        return None;
    }

    Some(proto)
}

/// `CB` prefixed opcodes.
fn bits(op: u8) -> Proto {
    let (x, y, z, _, _) = fields(op);
    let memory = z == 6;

    match x {
        0 => {
            let timing: &[u8] = if memory { &[4, 4, 4, 3] } else { &[4, 4] };

            Proto::new(format!("{} {}", ROTATIONS[y], REGS[z]), timing)
                .flags("**0P0*")
                .undocumented_if(y == 6)
        }
        1 => {
            let timing: &[u8] = if memory { &[4, 4, 4] } else { &[4, 4] };

            Proto::new(format!("BIT {},{}", y, REGS[z]), timing).flags("?*1?0-")
        }
        _ => {
            let timing: &[u8] = if memory { &[4, 4, 4, 3] } else { &[4, 4] };
            let name = if x == 2 { "RES" } else { "SET" };

            Proto::new(format!("{} {},{}", name, y, REGS[z]), timing)
        }
    }
}

/// `DDCB`/`FDCB` prefixed opcodes. Forms that do not address `(IX+d)` alone
/// also copy the result into a register and are undocumented.
fn indexed_bits(op: u8, ix: IndexRegister) -> Proto {
    let (x, y, z, _, _) = fields(op);
    let target = format!("({}+d)", ix);
    let copy = if z == 6 {
        String::new()
    } else {
        format!(",{}", REGS[z])
    };

    match x {
        0 => Proto::new(
            format!("{} {}{}", ROTATIONS[y], target, copy),
            &[4, 4, 3, 5, 4, 3],
        )
        .flags("**0P0*")
        .undocumented_if(y == 6 || z != 6),
        1 => Proto::new(format!("BIT {},{}", y, target), &[4, 4, 3, 5, 4])
            .flags("?*1?0-")
            .undocumented_if(z != 6),
        _ => {
            let name = if x == 2 { "RES" } else { "SET" };

            Proto::new(
                format!("{} {},{}{}", name, y, target, copy),
                &[4, 4, 3, 5, 4, 3],
            )
            .undocumented_if(z != 6)
        }
    }
}

/// `ED` prefixed opcodes. Every unassigned slot is an undocumented `NOP`.
fn extended(op: u8) -> Proto {
    use JumpClass::Unconditional;

    let (x, y, z, p, q) = fields(op);
    let nop = || Proto::new("NOP", &[4, 4]).undocumented_if(true);

    match x {
        1 => match z {
            0 if y == 6 => Proto::new("IN F,(C)", &[4, 4, 4])
                .flags("**0P0-")
                .undocumented_if(true),
            0 => Proto::new(format!("IN {},(C)", REGS[y]), &[4, 4, 4]).flags("**0P0-"),
            1 if y == 6 => Proto::new("OUT (C),0", &[4, 4, 4]).undocumented_if(true),
            1 => Proto::new(format!("OUT (C),{}", REGS[y]), &[4, 4, 4]),
            2 if q == 0 => Proto::new(format!("SBC HL,{}", PAIRS[p]), &[4, 4, 4, 3]).flags("***V1*"),
            2 => Proto::new(format!("ADC HL,{}", PAIRS[p]), &[4, 4, 4, 3]).flags("***V0*"),
            3 if q == 0 => Proto::new(format!("LD (aa),{}", PAIRS[p]), &[4, 4, 3, 3, 3, 3])
                .undocumented_if(p == 2),
            3 => Proto::new(format!("LD {},(aa)", PAIRS[p]), &[4, 4, 3, 3, 3, 3])
                .undocumented_if(p == 2),
            4 => Proto::new("NEG", &[4, 4])
                .flags("***V1*")
                .undocumented_if(y != 0),
            5 if y == 1 => Proto::new("RETI", &[4, 4, 3, 3]).jump(Unconditional),
            5 => Proto::new("RETN", &[4, 4, 3, 3])
                .jump(Unconditional)
                .undocumented_if(y != 0),
            6 => Proto::new(format!("IM {}", IM_MODES[y]), &[4, 4])
                .undocumented_if(y == 1 || y >= 4),
            _ => match y {
                0 => Proto::new("LD I,A", &[4, 5]),
                1 => Proto::new("LD R,A", &[4, 5]),
                2 => Proto::new("LD A,I", &[4, 5]).flags("**0*0-"),
                3 => Proto::new("LD A,R", &[4, 5]).flags("**0*0-"),
                4 => Proto::new("RRD", &[4, 4, 3, 4, 3]).flags("**0P0-"),
                5 => Proto::new("RLD", &[4, 4, 3, 4, 3]).flags("**0P0-"),
                _ => nop(),
            },
        },
        2 if z <= 3 && y >= 4 => {
            let repeat = y >= 6;
            let single: &[u8] = if z <= 1 { &[4, 4, 3, 5] } else { &[4, 5, 3, 4] };
            let flags = match (z, repeat) {
                (0, false) => "--0*0-",
                (0, true) => "--000-",
                (1, _) => "****1-",
                (_, false) => "?*??1-",
                (_, true) => "?1??1-",
            };
            let name = BLOCK_OPS[y - 4][z];

            if repeat {
                let mut primary = single.to_vec();
                primary.push(5);

                Proto::new(name, &primary).alternate(single).flags(flags)
            } else {
                Proto::new(name, single).flags(flags)
            }
        }
        _ => nop(),
    }
}

fn sentinel(length: u8) -> OpcodeEntry {
    OpcodeEntry {
        template: String::new(),
        flags: [FlagEffect::Unaffected; 6],
        timing: Timing::Total(0),
        undocumented: false,
        length,
        jump: JumpClass::None,
        prefix: true,
    }
}

fn build() -> HashMap<u32, OpcodeEntry> {
    let mut table = HashMap::new();

    for op in 0..=0xFFu8 {
        if let Some(proto) = base(op) {
            table.insert(op as u32, proto.finish(0));
        }

        table.insert(0xCB00 | op as u32, bits(op).finish(1));
        table.insert(0xED00 | op as u32, extended(op).finish(1));

        for &(prefix, ix) in [(0xDDu32, IndexRegister::IX), (0xFDu32, IndexRegister::IY)].iter() {
            if let Some(proto) = indexed(op, ix) {
                table.insert(prefix << 8 | op as u32, proto.finish(1));
            }

            table.insert(
                prefix << 16 | 0xCB00 | op as u32,
                indexed_bits(op, ix).finish(2),
            );
        }
    }

    for prefix in [0xCBu32, 0xDD, 0xED, 0xFD].iter() {
        table.insert(*prefix, sentinel(1));
    }

    table.insert(0xDDCB, sentinel(2));
    table.insert(0xFDCB, sentinel(2));

    table
}

lazy_static! {
    /// Every opcode, keyed by its prefix and opcode bytes: `op`, `CBop`,
    /// `EDop`, `DDop`, `FDop`, `DDCBop` and `FDCBop`.
    pub static ref OPCODES: HashMap<u32, OpcodeEntry> = build();

    /// What a `DD` or `FD` prefix decodes to when the next byte has no
    /// indexed form.
    pub static ref PASSTHROUGH: OpcodeEntry = OpcodeEntry {
        template: "NOP".to_string(),
        flags: [FlagEffect::Unaffected; 6],
        timing: Timing::Total(4),
        undocumented: true,
        length: 1,
        jump: JumpClass::None,
        prefix: false,
    };
}

pub fn lookup(key: u32) -> Option<&'static OpcodeEntry> {
    OPCODES.get(&key)
}
