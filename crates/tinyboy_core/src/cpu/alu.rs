use super::{Cpu, Flag};

/// The eight accumulator operations, in opcode encoding order
/// (bits 3-5 of `0x80..=0xBF` and of the `d8` forms at `0xC6 + 8n`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    #[inline]
    pub(super) fn from_opcode(opcode: u8) -> Self {
        match (opcode >> 3) & 0x07 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbc,
            4 => AluOp::And,
            5 => AluOp::Xor,
            6 => AluOp::Or,
            _ => AluOp::Cp,
        }
    }
}

impl Cpu {
    pub(super) fn alu(&mut self, op: AluOp, value: u8) {
        match op {
            AluOp::Add => self.regs.a = self.alu_add(value, false),
            AluOp::Adc => self.regs.a = self.alu_add(value, true),
            AluOp::Sub => self.regs.a = self.alu_sub(value, false),
            AluOp::Sbc => self.regs.a = self.alu_sub(value, true),
            AluOp::And => self.alu_logic(self.regs.a & value, true),
            AluOp::Xor => self.alu_logic(self.regs.a ^ value, false),
            AluOp::Or => self.alu_logic(self.regs.a | value, false),
            AluOp::Cp => {
                self.alu_sub(value, false);
            }
        }
    }

    /// A + value (+ carry). Sets Z, clears N, H on a carry out of bit 3,
    /// C on a carry out of bit 7.
    fn alu_add(&mut self, value: u8, with_carry: bool) -> u8 {
        let a = self.regs.a;
        let carry = u8::from(with_carry && self.get_flag(Flag::C));
        let result = a.wrapping_add(value).wrapping_add(carry);

        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, (a & 0x0F) + (value & 0x0F) + carry > 0x0F);
        self.set_flag(Flag::C, a as u16 + value as u16 + carry as u16 > 0xFF);
        result
    }

    /// A - value (- carry), also used by CP which discards the result.
    ///
    /// H is set when the low nibble of A is smaller than the low nibble of the
    /// subtrahend (a borrow out of bit 4), C when A is smaller than the whole
    /// subtrahend.
    fn alu_sub(&mut self, value: u8, with_carry: bool) -> u8 {
        let a = self.regs.a;
        let carry = u8::from(with_carry && self.get_flag(Flag::C));
        let result = a.wrapping_sub(value).wrapping_sub(carry);

        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::N, true);
        self.set_flag(Flag::H, (a & 0x0F) < (value & 0x0F) + carry);
        self.set_flag(Flag::C, (a as u16) < value as u16 + carry as u16);
        result
    }

    fn alu_logic(&mut self, result: u8, half_carry: bool) {
        self.regs.a = result;
        self.clear_flags();
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::H, half_carry);
    }

    /// Decimal adjust A after a BCD add or subtract. N is left unchanged.
    pub(super) fn alu_daa(&mut self) {
        let mut a = self.regs.a;
        let subtract = self.get_flag(Flag::N);
        let mut carry = self.get_flag(Flag::C);

        if subtract {
            if carry {
                a = a.wrapping_sub(0x60);
            }
            if self.get_flag(Flag::H) {
                a = a.wrapping_sub(0x06);
            }
        } else {
            if carry || a > 0x99 {
                a = a.wrapping_add(0x60);
                carry = true;
            }
            if self.get_flag(Flag::H) || (a & 0x0F) > 0x09 {
                a = a.wrapping_add(0x06);
            }
        }

        self.regs.a = a;
        self.set_flag(Flag::Z, a == 0);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::C, carry);
    }

    /// INC r / INC (HL). C is untouched.
    pub(super) fn alu_inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, value & 0x0F == 0x0F);
        result
    }

    /// DEC r / DEC (HL). C is untouched.
    pub(super) fn alu_dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::N, true);
        self.set_flag(Flag::H, value & 0x0F == 0);
        result
    }

    /// ADD HL,rr. Z is untouched; H and C come from bits 11 and 15.
    pub(super) fn alu_add_hl(&mut self, value: u16) {
        let hl = self.regs.hl();
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF);
        self.set_flag(Flag::C, hl as u32 + value as u32 > 0xFFFF);
        self.regs.set_hl(hl.wrapping_add(value));
    }

    /// SP plus a signed byte, shared by ADD SP,r8 and LD HL,SP+r8.
    ///
    /// Z and N are cleared; H and C are computed on the low byte as an
    /// unsigned addition.
    pub(super) fn alu_sp_offset(&mut self, offset: u8) -> u16 {
        let sp = self.regs.sp;
        let low = (sp & 0x00FF) as u8;
        self.set_flag(Flag::Z, false);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, (low & 0x0F) + (offset & 0x0F) > 0x0F);
        self.set_flag(Flag::C, low as u16 + offset as u16 > 0xFF);
        sp.wrapping_add(offset as i8 as u16)
    }

    /// Shared rotate/shift core for the CB group and the A-only rotates.
    ///
    /// Returns the result and the bit shifted out (the new carry).
    pub(super) fn shift(&self, kind: u8, value: u8) -> (u8, bool) {
        let carry_in = self.get_flag(Flag::C);
        match kind {
            // RLC
            0 => (value.rotate_left(1), value & 0x80 != 0),
            // RRC
            1 => (value.rotate_right(1), value & 0x01 != 0),
            // RL
            2 => ((value << 1) | u8::from(carry_in), value & 0x80 != 0),
            // RR
            3 => ((value >> 1) | (u8::from(carry_in) << 7), value & 0x01 != 0),
            // SLA
            4 => (value << 1, value & 0x80 != 0),
            // SRA
            5 => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            // SWAP
            6 => (value.rotate_left(4), false),
            // SRL
            _ => (value >> 1, value & 0x01 != 0),
        }
    }
}
