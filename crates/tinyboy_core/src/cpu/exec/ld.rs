use crate::cpu::helpers::Operands;
use crate::cpu::{Bus, Cpu};

impl Cpu {
    pub(super) fn exec_ld_rr_d16(&mut self, opcode: u8, ops: Operands) {
        debug_assert!(matches!(opcode, 0x01 | 0x11 | 0x21 | 0x31));
        self.write_rp(opcode >> 4, ops.d16());
    }

    pub(super) fn exec_ld_r_d8<B: Bus>(&mut self, bus: &mut B, opcode: u8, ops: Operands) {
        debug_assert!(matches!(
            opcode,
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E
        ));
        self.write_reg8(bus, opcode >> 3, ops.d8());
    }

    pub(super) fn exec_ld_r_r<B: Bus>(&mut self, bus: &mut B, opcode: u8) {
        debug_assert!((0x40..=0x7F).contains(&opcode) && opcode != 0x76);
        let value = self.read_reg8(bus, opcode);
        self.write_reg8(bus, opcode >> 3, value);
    }

    /// Address held by BC, DE, HL+ or HL- for the indirect accumulator
    /// loads, applying the post-increment/decrement to HL.
    fn indirect_address(&mut self, opcode: u8) -> u16 {
        match (opcode >> 4) & 0x03 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            _ => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
        }
    }

    pub(super) fn exec_ld_indirect_a<B: Bus>(&mut self, bus: &mut B, opcode: u8) {
        debug_assert!(matches!(opcode, 0x02 | 0x12 | 0x22 | 0x32));
        let addr = self.indirect_address(opcode);
        bus.write8(addr, self.regs.a);
    }

    pub(super) fn exec_ld_a_indirect<B: Bus>(&mut self, bus: &mut B, opcode: u8) {
        debug_assert!(matches!(opcode, 0x0A | 0x1A | 0x2A | 0x3A));
        let addr = self.indirect_address(opcode);
        self.regs.a = bus.read8(addr);
    }

    pub(super) fn exec_ld_a16_sp<B: Bus>(&mut self, bus: &mut B, ops: Operands) {
        let addr = ops.d16();
        let [lo, hi] = self.regs.sp.to_le_bytes();
        bus.write8(addr, lo);
        bus.write8(addr.wrapping_add(1), hi);
    }

    pub(super) fn exec_ldh_a8<B: Bus>(&mut self, bus: &mut B, opcode: u8, ops: Operands) {
        let addr = 0xFF00 | ops.d8() as u16;
        match opcode {
            0xE0 => bus.write8(addr, self.regs.a),
            _ => self.regs.a = bus.read8(addr),
        }
    }

    pub(super) fn exec_ldh_c<B: Bus>(&mut self, bus: &mut B, opcode: u8) {
        let addr = 0xFF00 | self.regs.c as u16;
        match opcode {
            0xE2 => bus.write8(addr, self.regs.a),
            _ => self.regs.a = bus.read8(addr),
        }
    }

    pub(super) fn exec_ld_a16_a<B: Bus>(&mut self, bus: &mut B, opcode: u8, ops: Operands) {
        let addr = ops.d16();
        match opcode {
            0xEA => bus.write8(addr, self.regs.a),
            _ => self.regs.a = bus.read8(addr),
        }
    }

    pub(super) fn exec_ld_hl_sp_r8(&mut self, ops: Operands) {
        let value = self.alu_sp_offset(ops.d8());
        self.regs.set_hl(value);
    }
}
