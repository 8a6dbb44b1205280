mod alu;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;

use super::helpers::Operands;
use super::{Bus, Cpu};
use crate::opcodes;

impl Cpu {
    /// Execute a decoded unprefixed opcode.
    ///
    /// PC already points past the instruction, so relative jumps and return
    /// addresses are computed from it. Returns `true` when a conditional
    /// control transfer was taken. Leaves the CPU halted for an opcode it has
    /// no handler for.
    pub(super) fn exec_opcode<B: Bus>(&mut self, bus: &mut B, opcode: u8, ops: Operands) -> bool {
        let mut taken = false;

        match opcode {
            // 0x00: NOP
            0x00 => {}

            // 16-bit immediate loads.
            0x01 | 0x11 | 0x21 | 0x31 => self.exec_ld_rr_d16(opcode, ops),

            // LD (BC/DE/HL±), A
            0x02 | 0x12 | 0x22 | 0x32 => self.exec_ld_indirect_a(bus, opcode),

            // LD A, (BC/DE/HL±)
            0x0A | 0x1A | 0x2A | 0x3A => self.exec_ld_a_indirect(bus, opcode),

            // 16-bit INC rr / DEC rr
            0x03 | 0x13 | 0x23 | 0x33 => self.exec_inc16_rr(opcode),
            0x0B | 0x1B | 0x2B | 0x3B => self.exec_dec16_rr(opcode),

            // INC r / DEC r
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => self.exec_inc8_reg(bus, opcode),
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => self.exec_dec8_reg(bus, opcode),

            // LD r, d8 (and LD (HL), d8)
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
                self.exec_ld_r_d8(bus, opcode, ops)
            }

            // RLCA / RRCA / RLA / RRA
            0x07 | 0x0F | 0x17 | 0x1F => self.exec_rotate_a(opcode),

            // LD (a16), SP
            0x08 => self.exec_ld_a16_sp(bus, ops),

            // ADD HL, rr
            0x09 | 0x19 | 0x29 | 0x39 => self.exec_add_hl_rr(opcode),

            // STOP
            0x10 => self.exec_stop(),

            // JR r8 / JR cc, r8
            0x18 => taken = self.jr(ops.r8(), true),
            0x20 | 0x28 | 0x30 | 0x38 => taken = self.exec_jr_cc(opcode, ops),

            0x27 => self.alu_daa(),
            0x2F => self.exec_cpl(),
            0x37 => self.exec_scf(),
            0x3F => self.exec_ccf(),

            // HALT sits in the middle of the LD r, r' block.
            0x76 => self.exec_halt(),
            0x40..=0x7F => self.exec_ld_r_r(bus, opcode),

            // ADD/ADC/SUB/SBC/AND/XOR/OR/CP on A.
            0x80..=0xBF => self.exec_alu_reg(bus, opcode),
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => self.exec_alu_d8(opcode, ops),

            // RET cc / JP cc, a16 / CALL cc, a16
            0xC0 | 0xC8 | 0xD0 | 0xD8 => taken = self.exec_ret_cc(bus, opcode),
            0xC2 | 0xCA | 0xD2 | 0xDA => taken = self.exec_jp_cc(opcode, ops),
            0xC4 | 0xCC | 0xD4 | 0xDC => taken = self.exec_call_cc(bus, opcode, ops),

            // POP rr / PUSH rr
            0xC1 | 0xD1 | 0xE1 | 0xF1 => self.exec_pop_rr(bus, opcode),
            0xC5 | 0xD5 | 0xE5 | 0xF5 => self.exec_push_rr(bus, opcode),

            // JP a16 / JP (HL)
            0xC3 => taken = self.jp(ops.d16(), true),
            0xE9 => taken = self.jp(self.regs.hl(), true),

            // CALL a16 / RET / RETI
            0xCD => taken = self.call(bus, ops.d16(), true),
            0xC9 => taken = self.ret(bus, true),
            0xD9 => taken = self.exec_reti(bus),

            // RST nn
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => self.exec_rst(bus, opcode),

            // LDH (a8),A / LDH A,(a8) / LD (C),A / LD A,(C)
            0xE0 | 0xF0 => self.exec_ldh_a8(bus, opcode, ops),
            0xE2 | 0xF2 => self.exec_ldh_c(bus, opcode),

            // LD (a16),A / LD A,(a16)
            0xEA | 0xFA => self.exec_ld_a16_a(bus, opcode, ops),

            0xE8 => self.exec_add_sp_r8(ops),
            0xF8 => self.exec_ld_hl_sp_r8(ops),
            0xF9 => self.regs.sp = self.regs.hl(),

            0xF3 => self.exec_di(),
            0xFB => self.exec_ei(),

            // Anything without an arm halts like an opcode hole, with PC
            // back on the opcode.
            _ => {
                let len = opcodes::decode(opcode).map_or(1, |instr| instr.len());
                self.regs.pc = self.regs.pc.wrapping_sub(len);
                self.halt_on_unknown(opcode);
            }
        }

        taken
    }
}
