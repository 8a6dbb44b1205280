use super::{Bus, Cpu, Flag};
use crate::opcodes::{CbInstruction, CbOp};

impl Cpu {
    /// Execute a CB-prefixed instruction (bit operations, shifts, rotates).
    pub(super) fn exec_cb<B: Bus>(&mut self, bus: &mut B, instr: CbInstruction) {
        let value = self.read_reg8(bus, instr.reg);

        match instr.op {
            CbOp::Shift(kind) => {
                let (result, carry) = self.shift(kind, value);
                self.clear_flags();
                self.set_flag(Flag::Z, result == 0);
                self.set_flag(Flag::C, carry);
                self.write_reg8(bus, instr.reg, result);
            }
            // BIT leaves C alone and writes nothing back.
            CbOp::Bit(bit) => {
                self.set_flag(Flag::Z, value & (1 << bit) == 0);
                self.set_flag(Flag::N, false);
                self.set_flag(Flag::H, true);
            }
            CbOp::Res(bit) => self.write_reg8(bus, instr.reg, value & !(1 << bit)),
            CbOp::Set(bit) => self.write_reg8(bus, instr.reg, value | (1 << bit)),
        }
    }
}
