use super::{Cpu, Flag};
use crate::opcodes;

impl Cpu {
    /// Render the register file, flags and the opcode about to run as one
    /// fixed-width line. Pure: reads nothing but `self`.
    ///
    /// `PC:0000 OP:31 A:00 B:00 C:00 D:00 E:00 H:00 L:00 SP:0000 F:00 ---- LD SP,d16`
    pub fn trace(&self, opcode: u8) -> String {
        let r = &self.regs;
        let mnemonic = opcodes::decode(opcode).map_or("UNKNOWN OPCODE", |instr| instr.mnemonic);
        format!(
            "PC:{:04X} OP:{:02X} A:{:02X} B:{:02X} C:{:02X} D:{:02X} E:{:02X} H:{:02X} L:{:02X} SP:{:04X} F:{:02X} {}{}{}{} {}",
            r.pc,
            opcode,
            r.a,
            r.b,
            r.c,
            r.d,
            r.e,
            r.h,
            r.l,
            r.sp,
            r.f,
            self.flag_char(Flag::Z, 'Z'),
            self.flag_char(Flag::N, 'N'),
            self.flag_char(Flag::H, 'H'),
            self.flag_char(Flag::C, 'C'),
            mnemonic,
        )
    }

    fn flag_char(&self, flag: Flag, name: char) -> char {
        if self.get_flag(flag) {
            name
        } else {
            '-'
        }
    }
}
