pub mod boot;
pub mod cpu;
pub mod error;
pub mod interrupt;
pub mod machine;
pub mod memory;
pub mod opcodes;

pub use cpu::{Bus, Clock, Cpu, Flag, HaltReason, Registers, Sleep, Timing};
pub use error::LoadError;
pub use interrupt::Interrupt;
pub use machine::{Machine, RunConfig, RunSummary, StopReason};
pub use memory::Mmu;
