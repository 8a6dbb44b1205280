use crate::cpu::alu::AluOp;
use crate::cpu::helpers::Operands;
use crate::cpu::{Bus, Cpu, Flag};

impl Cpu {
    pub(super) fn exec_alu_reg<B: Bus>(&mut self, bus: &mut B, opcode: u8) {
        debug_assert!((0x80..=0xBF).contains(&opcode));
        let value = self.read_reg8(bus, opcode);
        self.alu(AluOp::from_opcode(opcode), value);
    }

    /// Immediate forms. `CP d8` compares A with the byte following the
    /// opcode.
    pub(super) fn exec_alu_d8(&mut self, opcode: u8, ops: Operands) {
        self.alu(AluOp::from_opcode(opcode), ops.d8());
    }

    /// RLCA, RRCA, RLA and RRA: the CB rotates applied to A, except that Z is
    /// always cleared.
    pub(super) fn exec_rotate_a(&mut self, opcode: u8) {
        debug_assert!(matches!(opcode, 0x07 | 0x0F | 0x17 | 0x1F));
        let (result, carry) = self.shift(opcode >> 3, self.regs.a);
        self.regs.a = result;
        self.clear_flags();
        self.set_flag(Flag::C, carry);
    }

    pub(super) fn exec_add_hl_rr(&mut self, opcode: u8) {
        debug_assert!(matches!(opcode, 0x09 | 0x19 | 0x29 | 0x39));
        let value = self.read_rp(opcode >> 4);
        self.alu_add_hl(value);
    }

    pub(super) fn exec_add_sp_r8(&mut self, ops: Operands) {
        self.regs.sp = self.alu_sp_offset(ops.d8());
    }

    pub(super) fn exec_cpl(&mut self) {
        self.regs.a = !self.regs.a;
        self.set_flag(Flag::N, true);
        self.set_flag(Flag::H, true);
    }

    pub(super) fn exec_scf(&mut self) {
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::C, true);
    }

    pub(super) fn exec_ccf(&mut self) {
        let carry = self.get_flag(Flag::C);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::C, !carry);
    }
}
