use std::path::Path;

use crate::boot::BOOT_ROM_SIZE;
use crate::cpu::Bus;
use crate::error::LoadError;

/// Total addressable memory (64 KiB).
///
/// The real hardware splits this space into cartridge ROM/RAM, VRAM, WRAM,
/// HRAM and IO registers. The core only needs a flat byte array; a banked
/// cartridge or IO-aware bus can be layered on top through the `Bus` trait.
pub const MEMORY_SIZE: usize = 0x10000;

/// Flat, zero-initialised 64 KiB address space.
///
/// Addresses are `u16`, so every access is in range by construction and
/// 16-bit address arithmetic wraps at `0xFFFF`.
#[derive(Clone)]
pub struct Mmu {
    memory: Box<[u8]>,
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Mmu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mmu")
            .field("size", &self.memory.len())
            .finish_non_exhaustive()
    }
}

impl Mmu {
    pub fn new() -> Self {
        Self {
            memory: vec![0; MEMORY_SIZE].into_boxed_slice(),
        }
    }

    /// Zero-fill the whole address space.
    pub fn initialize(&mut self) {
        self.memory.fill(0);
    }

    #[inline]
    pub fn read_byte(&self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    #[inline]
    pub fn write_byte(&mut self, address: u16, value: u8) {
        self.memory[address as usize] = value;
    }

    /// Read a little-endian word: `mem[address] | mem[address + 1] << 8`.
    #[inline]
    pub fn read_word(&self, address: u16) -> u16 {
        let lo = self.read_byte(address);
        let hi = self.read_byte(address.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    /// Little-endian inverse of `read_word`.
    #[inline]
    pub fn write_word(&mut self, address: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write_byte(address, lo);
        self.write_byte(address.wrapping_add(1), hi);
    }

    /// Store `value` just below `stack_address`: the low byte goes to
    /// `stack_address - 1` and the high byte to `stack_address - 2`.
    ///
    /// The caller owns the stack pointer and moves it down by two afterwards.
    #[inline]
    pub fn push_word(&mut self, stack_address: u16, value: u16) {
        let hi = (value >> 8) as u8;
        let lo = (value & 0xFF) as u8;
        self.write_byte(stack_address.wrapping_sub(1), lo);
        self.write_byte(stack_address.wrapping_sub(2), hi);
    }

    /// Inverse of `push_word` for a stack pointer that already points at the
    /// pushed word (i.e. `push_word(sp, v)` followed by `pop_word(sp - 2)`).
    #[inline]
    pub fn pop_word(&self, stack_address: u16) -> u16 {
        let hi = self.read_byte(stack_address);
        let lo = self.read_byte(stack_address.wrapping_add(1));
        u16::from_be_bytes([hi, lo])
    }

    /// Read-only view of the entire address space for display or debugger
    /// consumers. Only valid between dispatch calls.
    pub fn as_slice(&self) -> &[u8] {
        &self.memory
    }

    /// Copy the boot image to address 0.
    pub fn load_boot_image(&mut self, image: &[u8; BOOT_ROM_SIZE]) {
        log::info!("Boot image is {} bytes large", image.len());
        self.memory[..BOOT_ROM_SIZE].copy_from_slice(image);
    }

    /// Copy a program image to address 0, overwriting what was there.
    pub fn load_program_image(&mut self, image: &[u8]) -> Result<(), LoadError> {
        self.load_program_image_at(0x0000, image)
    }

    /// Copy a program image to `origin`.
    ///
    /// The size check runs before any byte is written.
    pub fn load_program_image_at(&mut self, origin: u16, image: &[u8]) -> Result<(), LoadError> {
        let start = origin as usize;
        let end = start + image.len();
        if end > MEMORY_SIZE {
            return Err(LoadError::TooLarge {
                len: image.len(),
                origin,
                capacity: MEMORY_SIZE,
            });
        }

        log::info!(
            "Program image is {} bytes large, loaded at 0x{:04X}",
            image.len(),
            origin
        );
        self.memory[start..end].copy_from_slice(image);
        Ok(())
    }

    /// Read a program image from disk and copy it to address 0.
    ///
    /// Returns the number of bytes loaded.
    pub fn load_program_file(&mut self, path: impl AsRef<Path>) -> Result<usize, LoadError> {
        let image = read_program_file(path)?;
        self.load_program_image(&image)?;
        Ok(image.len())
    }
}

/// Read a program image from disk without touching any memory.
pub fn read_program_file(path: impl AsRef<Path>) -> Result<Vec<u8>, LoadError> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl Bus for Mmu {
    #[inline]
    fn read8(&mut self, addr: u16) -> u8 {
        self.read_byte(addr)
    }

    #[inline]
    fn write8(&mut self, addr: u16, value: u8) {
        self.write_byte(addr, value);
    }

    #[inline]
    fn read16(&mut self, addr: u16) -> u16 {
        self.read_word(addr)
    }

    #[inline]
    fn push16(&mut self, stack_addr: u16, value: u16) {
        self.push_word(stack_addr, value);
    }

    #[inline]
    fn pop16(&mut self, stack_addr: u16) -> u16 {
        self.pop_word(stack_addr)
    }
}
