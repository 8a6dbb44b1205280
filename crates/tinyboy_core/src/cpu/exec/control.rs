use crate::cpu::helpers::Operands;
use crate::cpu::{Bus, Cpu};

impl Cpu {
    pub(super) fn exec_jr_cc(&mut self, opcode: u8, ops: Operands) -> bool {
        debug_assert!(matches!(opcode, 0x20 | 0x28 | 0x30 | 0x38));
        let cond = self.condition(opcode);
        self.jr(ops.r8(), cond)
    }

    pub(super) fn exec_jp_cc(&mut self, opcode: u8, ops: Operands) -> bool {
        debug_assert!(matches!(opcode, 0xC2 | 0xCA | 0xD2 | 0xDA));
        let cond = self.condition(opcode);
        self.jp(ops.d16(), cond)
    }

    pub(super) fn exec_call_cc<B: Bus>(&mut self, bus: &mut B, opcode: u8, ops: Operands) -> bool {
        debug_assert!(matches!(opcode, 0xC4 | 0xCC | 0xD4 | 0xDC));
        let cond = self.condition(opcode);
        self.call(bus, ops.d16(), cond)
    }

    pub(super) fn exec_ret_cc<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> bool {
        debug_assert!(matches!(opcode, 0xC0 | 0xC8 | 0xD0 | 0xD8));
        let cond = self.condition(opcode);
        self.ret(bus, cond)
    }
}
