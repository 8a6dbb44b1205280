//! Static decode tables for the unprefixed and CB-prefixed instruction sets.
//!
//! The unprefixed table is indexed by opcode. A `None` entry is one of the
//! documented opcode holes; dispatching it halts the CPU.

/// Opcode that selects the extended (CB-prefixed) instruction table.
pub const PREFIX_CB: u8 = 0xCB;

/// Decode result for a single unprefixed opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Assembly form with operand placeholders (`d8`, `d16`, `a8`, `a16`, `r8`).
    pub mnemonic: &'static str,
    /// Number of operand bytes following the opcode.
    pub width: u8,
    /// Clock ticks when the instruction runs sequentially.
    pub cycles: u8,
    /// Clock ticks when a conditional control transfer is taken.
    pub cycles_taken: Option<u8>,
}

impl Instruction {
    /// Bytes occupied by the instruction, opcode included.
    #[inline]
    pub const fn len(&self) -> u16 {
        1 + self.width as u16
    }
}

const fn op(mnemonic: &'static str, width: u8, cycles: u8) -> Option<Instruction> {
    Some(Instruction {
        mnemonic,
        width,
        cycles,
        cycles_taken: None,
    })
}

const fn branch(mnemonic: &'static str, width: u8, cycles: u8, taken: u8) -> Option<Instruction> {
    Some(Instruction {
        mnemonic,
        width,
        cycles,
        cycles_taken: Some(taken),
    })
}

#[rustfmt::skip]
static INSTRUCTIONS: [Option<Instruction>; 256] = [
    /* 0x00 */ op("NOP", 0, 4),
    /* 0x01 */ op("LD BC,d16", 2, 12),
    /* 0x02 */ op("LD (BC),A", 0, 8),
    /* 0x03 */ op("INC BC", 0, 8),
    /* 0x04 */ op("INC B", 0, 4),
    /* 0x05 */ op("DEC B", 0, 4),
    /* 0x06 */ op("LD B,d8", 1, 8),
    /* 0x07 */ op("RLCA", 0, 4),
    /* 0x08 */ op("LD (a16),SP", 2, 20),
    /* 0x09 */ op("ADD HL,BC", 0, 8),
    /* 0x0A */ op("LD A,(BC)", 0, 8),
    /* 0x0B */ op("DEC BC", 0, 8),
    /* 0x0C */ op("INC C", 0, 4),
    /* 0x0D */ op("DEC C", 0, 4),
    /* 0x0E */ op("LD C,d8", 1, 8),
    /* 0x0F */ op("RRCA", 0, 4),
    /* 0x10 */ op("STOP", 1, 4),
    /* 0x11 */ op("LD DE,d16", 2, 12),
    /* 0x12 */ op("LD (DE),A", 0, 8),
    /* 0x13 */ op("INC DE", 0, 8),
    /* 0x14 */ op("INC D", 0, 4),
    /* 0x15 */ op("DEC D", 0, 4),
    /* 0x16 */ op("LD D,d8", 1, 8),
    /* 0x17 */ op("RLA", 0, 4),
    /* 0x18 */ op("JR r8", 1, 12),
    /* 0x19 */ op("ADD HL,DE", 0, 8),
    /* 0x1A */ op("LD A,(DE)", 0, 8),
    /* 0x1B */ op("DEC DE", 0, 8),
    /* 0x1C */ op("INC E", 0, 4),
    /* 0x1D */ op("DEC E", 0, 4),
    /* 0x1E */ op("LD E,d8", 1, 8),
    /* 0x1F */ op("RRA", 0, 4),
    /* 0x20 */ branch("JR NZ,r8", 1, 8, 12),
    /* 0x21 */ op("LD HL,d16", 2, 12),
    /* 0x22 */ op("LD (HL+),A", 0, 8),
    /* 0x23 */ op("INC HL", 0, 8),
    /* 0x24 */ op("INC H", 0, 4),
    /* 0x25 */ op("DEC H", 0, 4),
    /* 0x26 */ op("LD H,d8", 1, 8),
    /* 0x27 */ op("DAA", 0, 4),
    /* 0x28 */ branch("JR Z,r8", 1, 8, 12),
    /* 0x29 */ op("ADD HL,HL", 0, 8),
    /* 0x2A */ op("LD A,(HL+)", 0, 8),
    /* 0x2B */ op("DEC HL", 0, 8),
    /* 0x2C */ op("INC L", 0, 4),
    /* 0x2D */ op("DEC L", 0, 4),
    /* 0x2E */ op("LD L,d8", 1, 8),
    /* 0x2F */ op("CPL", 0, 4),
    /* 0x30 */ branch("JR NC,r8", 1, 8, 12),
    /* 0x31 */ op("LD SP,d16", 2, 12),
    /* 0x32 */ op("LD (HL-),A", 0, 8),
    /* 0x33 */ op("INC SP", 0, 8),
    /* 0x34 */ op("INC (HL)", 0, 12),
    /* 0x35 */ op("DEC (HL)", 0, 12),
    /* 0x36 */ op("LD (HL),d8", 1, 12),
    /* 0x37 */ op("SCF", 0, 4),
    /* 0x38 */ branch("JR C,r8", 1, 8, 12),
    /* 0x39 */ op("ADD HL,SP", 0, 8),
    /* 0x3A */ op("LD A,(HL-)", 0, 8),
    /* 0x3B */ op("DEC SP", 0, 8),
    /* 0x3C */ op("INC A", 0, 4),
    /* 0x3D */ op("DEC A", 0, 4),
    /* 0x3E */ op("LD A,d8", 1, 8),
    /* 0x3F */ op("CCF", 0, 4),
    /* 0x40 */ op("LD B,B", 0, 4),
    /* 0x41 */ op("LD B,C", 0, 4),
    /* 0x42 */ op("LD B,D", 0, 4),
    /* 0x43 */ op("LD B,E", 0, 4),
    /* 0x44 */ op("LD B,H", 0, 4),
    /* 0x45 */ op("LD B,L", 0, 4),
    /* 0x46 */ op("LD B,(HL)", 0, 8),
    /* 0x47 */ op("LD B,A", 0, 4),
    /* 0x48 */ op("LD C,B", 0, 4),
    /* 0x49 */ op("LD C,C", 0, 4),
    /* 0x4A */ op("LD C,D", 0, 4),
    /* 0x4B */ op("LD C,E", 0, 4),
    /* 0x4C */ op("LD C,H", 0, 4),
    /* 0x4D */ op("LD C,L", 0, 4),
    /* 0x4E */ op("LD C,(HL)", 0, 8),
    /* 0x4F */ op("LD C,A", 0, 4),
    /* 0x50 */ op("LD D,B", 0, 4),
    /* 0x51 */ op("LD D,C", 0, 4),
    /* 0x52 */ op("LD D,D", 0, 4),
    /* 0x53 */ op("LD D,E", 0, 4),
    /* 0x54 */ op("LD D,H", 0, 4),
    /* 0x55 */ op("LD D,L", 0, 4),
    /* 0x56 */ op("LD D,(HL)", 0, 8),
    /* 0x57 */ op("LD D,A", 0, 4),
    /* 0x58 */ op("LD E,B", 0, 4),
    /* 0x59 */ op("LD E,C", 0, 4),
    /* 0x5A */ op("LD E,D", 0, 4),
    /* 0x5B */ op("LD E,E", 0, 4),
    /* 0x5C */ op("LD E,H", 0, 4),
    /* 0x5D */ op("LD E,L", 0, 4),
    /* 0x5E */ op("LD E,(HL)", 0, 8),
    /* 0x5F */ op("LD E,A", 0, 4),
    /* 0x60 */ op("LD H,B", 0, 4),
    /* 0x61 */ op("LD H,C", 0, 4),
    /* 0x62 */ op("LD H,D", 0, 4),
    /* 0x63 */ op("LD H,E", 0, 4),
    /* 0x64 */ op("LD H,H", 0, 4),
    /* 0x65 */ op("LD H,L", 0, 4),
    /* 0x66 */ op("LD H,(HL)", 0, 8),
    /* 0x67 */ op("LD H,A", 0, 4),
    /* 0x68 */ op("LD L,B", 0, 4),
    /* 0x69 */ op("LD L,C", 0, 4),
    /* 0x6A */ op("LD L,D", 0, 4),
    /* 0x6B */ op("LD L,E", 0, 4),
    /* 0x6C */ op("LD L,H", 0, 4),
    /* 0x6D */ op("LD L,L", 0, 4),
    /* 0x6E */ op("LD L,(HL)", 0, 8),
    /* 0x6F */ op("LD L,A", 0, 4),
    /* 0x70 */ op("LD (HL),B", 0, 8),
    /* 0x71 */ op("LD (HL),C", 0, 8),
    /* 0x72 */ op("LD (HL),D", 0, 8),
    /* 0x73 */ op("LD (HL),E", 0, 8),
    /* 0x74 */ op("LD (HL),H", 0, 8),
    /* 0x75 */ op("LD (HL),L", 0, 8),
    /* 0x76 */ op("HALT", 0, 4),
    /* 0x77 */ op("LD (HL),A", 0, 8),
    /* 0x78 */ op("LD A,B", 0, 4),
    /* 0x79 */ op("LD A,C", 0, 4),
    /* 0x7A */ op("LD A,D", 0, 4),
    /* 0x7B */ op("LD A,E", 0, 4),
    /* 0x7C */ op("LD A,H", 0, 4),
    /* 0x7D */ op("LD A,L", 0, 4),
    /* 0x7E */ op("LD A,(HL)", 0, 8),
    /* 0x7F */ op("LD A,A", 0, 4),
    /* 0x80 */ op("ADD A,B", 0, 4),
    /* 0x81 */ op("ADD A,C", 0, 4),
    /* 0x82 */ op("ADD A,D", 0, 4),
    /* 0x83 */ op("ADD A,E", 0, 4),
    /* 0x84 */ op("ADD A,H", 0, 4),
    /* 0x85 */ op("ADD A,L", 0, 4),
    /* 0x86 */ op("ADD A,(HL)", 0, 8),
    /* 0x87 */ op("ADD A,A", 0, 4),
    /* 0x88 */ op("ADC A,B", 0, 4),
    /* 0x89 */ op("ADC A,C", 0, 4),
    /* 0x8A */ op("ADC A,D", 0, 4),
    /* 0x8B */ op("ADC A,E", 0, 4),
    /* 0x8C */ op("ADC A,H", 0, 4),
    /* 0x8D */ op("ADC A,L", 0, 4),
    /* 0x8E */ op("ADC A,(HL)", 0, 8),
    /* 0x8F */ op("ADC A,A", 0, 4),
    /* 0x90 */ op("SUB B", 0, 4),
    /* 0x91 */ op("SUB C", 0, 4),
    /* 0x92 */ op("SUB D", 0, 4),
    /* 0x93 */ op("SUB E", 0, 4),
    /* 0x94 */ op("SUB H", 0, 4),
    /* 0x95 */ op("SUB L", 0, 4),
    /* 0x96 */ op("SUB (HL)", 0, 8),
    /* 0x97 */ op("SUB A", 0, 4),
    /* 0x98 */ op("SBC A,B", 0, 4),
    /* 0x99 */ op("SBC A,C", 0, 4),
    /* 0x9A */ op("SBC A,D", 0, 4),
    /* 0x9B */ op("SBC A,E", 0, 4),
    /* 0x9C */ op("SBC A,H", 0, 4),
    /* 0x9D */ op("SBC A,L", 0, 4),
    /* 0x9E */ op("SBC A,(HL)", 0, 8),
    /* 0x9F */ op("SBC A,A", 0, 4),
    /* 0xA0 */ op("AND B", 0, 4),
    /* 0xA1 */ op("AND C", 0, 4),
    /* 0xA2 */ op("AND D", 0, 4),
    /* 0xA3 */ op("AND E", 0, 4),
    /* 0xA4 */ op("AND H", 0, 4),
    /* 0xA5 */ op("AND L", 0, 4),
    /* 0xA6 */ op("AND (HL)", 0, 8),
    /* 0xA7 */ op("AND A", 0, 4),
    /* 0xA8 */ op("XOR B", 0, 4),
    /* 0xA9 */ op("XOR C", 0, 4),
    /* 0xAA */ op("XOR D", 0, 4),
    /* 0xAB */ op("XOR E", 0, 4),
    /* 0xAC */ op("XOR H", 0, 4),
    /* 0xAD */ op("XOR L", 0, 4),
    /* 0xAE */ op("XOR (HL)", 0, 8),
    /* 0xAF */ op("XOR A", 0, 4),
    /* 0xB0 */ op("OR B", 0, 4),
    /* 0xB1 */ op("OR C", 0, 4),
    /* 0xB2 */ op("OR D", 0, 4),
    /* 0xB3 */ op("OR E", 0, 4),
    /* 0xB4 */ op("OR H", 0, 4),
    /* 0xB5 */ op("OR L", 0, 4),
    /* 0xB6 */ op("OR (HL)", 0, 8),
    /* 0xB7 */ op("OR A", 0, 4),
    /* 0xB8 */ op("CP B", 0, 4),
    /* 0xB9 */ op("CP C", 0, 4),
    /* 0xBA */ op("CP D", 0, 4),
    /* 0xBB */ op("CP E", 0, 4),
    /* 0xBC */ op("CP H", 0, 4),
    /* 0xBD */ op("CP L", 0, 4),
    /* 0xBE */ op("CP (HL)", 0, 8),
    /* 0xBF */ op("CP A", 0, 4),
    /* 0xC0 */ branch("RET NZ", 0, 8, 20),
    /* 0xC1 */ op("POP BC", 0, 12),
    /* 0xC2 */ branch("JP NZ,a16", 2, 12, 16),
    /* 0xC3 */ op("JP a16", 2, 16),
    /* 0xC4 */ branch("CALL NZ,a16", 2, 12, 24),
    /* 0xC5 */ op("PUSH BC", 0, 16),
    /* 0xC6 */ op("ADD A,d8", 1, 8),
    /* 0xC7 */ op("RST 00H", 0, 16),
    /* 0xC8 */ branch("RET Z", 0, 8, 20),
    /* 0xC9 */ op("RET", 0, 16),
    /* 0xCA */ branch("JP Z,a16", 2, 12, 16),
    /* 0xCB */ op("PREFIX CB", 1, 4),
    /* 0xCC */ branch("CALL Z,a16", 2, 12, 24),
    /* 0xCD */ op("CALL a16", 2, 24),
    /* 0xCE */ op("ADC A,d8", 1, 8),
    /* 0xCF */ op("RST 08H", 0, 16),
    /* 0xD0 */ branch("RET NC", 0, 8, 20),
    /* 0xD1 */ op("POP DE", 0, 12),
    /* 0xD2 */ branch("JP NC,a16", 2, 12, 16),
    /* 0xD3 */ None,
    /* 0xD4 */ branch("CALL NC,a16", 2, 12, 24),
    /* 0xD5 */ op("PUSH DE", 0, 16),
    /* 0xD6 */ op("SUB d8", 1, 8),
    /* 0xD7 */ op("RST 10H", 0, 16),
    /* 0xD8 */ branch("RET C", 0, 8, 20),
    /* 0xD9 */ op("RETI", 0, 16),
    /* 0xDA */ branch("JP C,a16", 2, 12, 16),
    /* 0xDB */ None,
    /* 0xDC */ branch("CALL C,a16", 2, 12, 24),
    /* 0xDD */ None,
    /* 0xDE */ op("SBC A,d8", 1, 8),
    /* 0xDF */ op("RST 18H", 0, 16),
    /* 0xE0 */ op("LDH (a8),A", 1, 12),
    /* 0xE1 */ op("POP HL", 0, 12),
    /* 0xE2 */ op("LD (C),A", 0, 8),
    /* 0xE3 */ None,
    /* 0xE4 */ None,
    /* 0xE5 */ op("PUSH HL", 0, 16),
    /* 0xE6 */ op("AND d8", 1, 8),
    /* 0xE7 */ op("RST 20H", 0, 16),
    /* 0xE8 */ op("ADD SP,r8", 1, 16),
    /* 0xE9 */ op("JP (HL)", 0, 4),
    /* 0xEA */ op("LD (a16),A", 2, 16),
    /* 0xEB */ None,
    /* 0xEC */ None,
    /* 0xED */ None,
    /* 0xEE */ op("XOR d8", 1, 8),
    /* 0xEF */ op("RST 28H", 0, 16),
    /* 0xF0 */ op("LDH A,(a8)", 1, 12),
    /* 0xF1 */ op("POP AF", 0, 12),
    /* 0xF2 */ op("LD A,(C)", 0, 8),
    /* 0xF3 */ op("DI", 0, 4),
    /* 0xF4 */ None,
    /* 0xF5 */ op("PUSH AF", 0, 16),
    /* 0xF6 */ op("OR d8", 1, 8),
    /* 0xF7 */ op("RST 30H", 0, 16),
    /* 0xF8 */ op("LD HL,SP+r8", 1, 12),
    /* 0xF9 */ op("LD SP,HL", 0, 8),
    /* 0xFA */ op("LD A,(a16)", 2, 16),
    /* 0xFB */ op("EI", 0, 4),
    /* 0xFC */ None,
    /* 0xFD */ None,
    /* 0xFE */ op("CP d8", 1, 8),
    /* 0xFF */ op("RST 38H", 0, 16),
];

/// Look up an unprefixed opcode. Returns `None` for opcode holes.
#[inline]
pub fn decode(opcode: u8) -> Option<&'static Instruction> {
    INSTRUCTIONS[opcode as usize].as_ref()
}

/// Register operand names in opcode encoding order.
pub const REG8_NAMES: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];

const CB_SHIFT_NAMES: [&str; 8] = ["RLC", "RRC", "RL", "RR", "SLA", "SRA", "SWAP", "SRL"];

/// Decoded CB-prefixed instruction.
///
/// Every one of the 256 CB opcodes is valid, so decoding is a total function
/// of the byte that follows the prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CbOp {
    /// Rotate/shift group, indexed like `CB_SHIFT_NAMES`.
    Shift(u8),
    Bit(u8),
    Res(u8),
    Set(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CbInstruction {
    pub op: CbOp,
    /// Register index in `REG8_NAMES` order; 6 is `(HL)`.
    pub reg: u8,
}

impl CbInstruction {
    /// Clock ticks including the prefix byte.
    pub const fn cycles(&self) -> u8 {
        match (self.op, self.reg) {
            (CbOp::Bit(_), 6) => 12,
            (_, 6) => 16,
            _ => 8,
        }
    }

    pub fn mnemonic(&self) -> String {
        let reg = REG8_NAMES[self.reg as usize];
        match self.op {
            CbOp::Shift(kind) => format!("{} {}", CB_SHIFT_NAMES[kind as usize], reg),
            CbOp::Bit(bit) => format!("BIT {bit},{reg}"),
            CbOp::Res(bit) => format!("RES {bit},{reg}"),
            CbOp::Set(bit) => format!("SET {bit},{reg}"),
        }
    }
}

#[inline]
pub const fn decode_cb(cb: u8) -> CbInstruction {
    let y = (cb >> 3) & 0x07;
    let op = match cb >> 6 {
        0 => CbOp::Shift(y),
        1 => CbOp::Bit(y),
        2 => CbOp::Res(y),
        _ => CbOp::Set(y),
    };
    CbInstruction { op, reg: cb & 0x07 }
}

/// Render an instruction with its operand bytes substituted, e.g.
/// `LD SP,$FFFE` or `JR NZ,-5`.
///
/// `operands` holds the bytes following the opcode; only the first
/// `width` of them are used.
pub fn disassemble(opcode: u8, operands: [u8; 2]) -> String {
    if opcode == PREFIX_CB {
        return decode_cb(operands[0]).mnemonic();
    }

    let Some(instr) = decode(opcode) else {
        return format!("DB ${opcode:02X}");
    };

    let d8 = operands[0];
    let d16 = u16::from_le_bytes(operands);
    let r8 = d8 as i8;
    let text = instr.mnemonic;

    if text.contains("d16") {
        text.replace("d16", &format!("${d16:04X}"))
    } else if text.contains("a16") {
        text.replace("a16", &format!("${d16:04X}"))
    } else if text.contains("+r8") {
        text.replace("+r8", &format!("{r8:+}"))
    } else if text.contains("r8") {
        text.replace("r8", &r8.to_string())
    } else if text.contains("d8") {
        text.replace("d8", &format!("${d8:02X}"))
    } else if text.contains("a8") {
        text.replace("a8", &format!("$FF{d8:02X}"))
    } else {
        text.to_string()
    }
}
