//! Memory-mapped bus shared by the CPU and other components.
//!
//! Two implementations are provided. [`FlatBus`] backs the full 16-bit
//! address space with RAM and is the simplest valid bus for tests and
//! benchmarks. [`MappedBus`] routes accesses to registered devices by
//! address range, translating mirrored ranges into their canonical range
//! before forwarding.
//!
//! Both are total over the 16-bit space: there is no address that can
//! fault. Unmatched addresses on a [`MappedBus`] read as 0 and ignore
//! writes, which is what the modeled hardware does on an open bus.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logging::{log, LogCategory, LogLevel};
use crate::StateError;

/// Byte-addressable bus interface used by the CPU.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&self, addr: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, addr: u16, val: u8);
}

/// A component that can be mapped into a [`MappedBus`] address range.
///
/// Devices receive the canonical absolute address, i.e. an access through a
/// mirror has already been translated before the device sees it.
pub trait BusDevice {
    fn read(&self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, val: u8);
}

/// Serialized form of a [`FlatBus`].
#[derive(Serialize, Deserialize)]
struct FlatBusState {
    ram: Vec<u8>,
}

/// Flat 64 KiB RAM bus.
///
/// Every one of the 65536 addresses is a valid index with no side effects,
/// so reads and writes never fail and never allocate after construction.
pub struct FlatBus {
    ram: Box<[u8; 0x10000]>,
}

impl FlatBus {
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x10000]),
        }
    }

    /// Load a program image at `offset` and point the reset vector at it.
    pub fn load_program(&mut self, offset: u16, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            self.ram[offset.wrapping_add(i as u16) as usize] = byte;
        }
        self.ram[0xFFFC] = (offset & 0xFF) as u8;
        self.ram[0xFFFD] = (offset >> 8) as u8;
    }

    /// JSON snapshot of the full RAM contents.
    pub fn save_state(&self) -> Value {
        let state = FlatBusState {
            ram: self.ram.to_vec(),
        };
        serde_json::to_value(&state).unwrap_or(Value::Null)
    }

    /// Restore RAM contents from a [`FlatBus::save_state`] snapshot.
    pub fn load_state(&mut self, v: &Value) -> Result<(), StateError> {
        let state: FlatBusState = serde_json::from_value(v.clone())?;
        if state.ram.len() != self.ram.len() {
            return Err(StateError::Incompatible(format!(
                "expected {} RAM bytes, snapshot has {}",
                self.ram.len(),
                state.ram.len()
            )));
        }
        self.ram.copy_from_slice(&state.ram);
        Ok(())
    }
}

impl Default for FlatBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for FlatBus {
    fn read(&self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }

    fn write(&mut self, addr: u16, val: u8) {
        self.ram[addr as usize] = val;
    }
}

/// A device registration covering `start..=end`, with mirroring folded
/// down to the first `canonical_len` bytes of the range.
struct Mapping {
    start: u16,
    end: u16,
    // u32 because a full-space range spans 0x10000 bytes.
    canonical_len: u32,
    device: Rc<RefCell<dyn BusDevice>>,
}

impl Mapping {
    fn contains(&self, addr: u16) -> bool {
        addr >= self.start && addr <= self.end
    }

    /// Translate `addr` into the canonical sub-range of this mapping.
    fn canonicalize(&self, addr: u16) -> u16 {
        let offset = (addr - self.start) as u32 % self.canonical_len;
        self.start + offset as u16
    }
}

/// Component-routed bus.
///
/// Each read/write is forwarded to the first registered device whose range
/// contains the address. Overlapping registrations resolve in registration
/// order, so every address has exactly one effective target.
pub struct MappedBus {
    mappings: Vec<Mapping>,
}

impl MappedBus {
    pub fn new() -> Self {
        Self {
            mappings: Vec::new(),
        }
    }

    /// Register `device` over `start..=end` with no mirroring.
    pub fn map(&mut self, device: Rc<RefCell<dyn BusDevice>>, start: u16, end: u16) {
        let span = (end as u32) - (start as u32) + 1;
        self.mappings.push(Mapping {
            start,
            end,
            canonical_len: span,
            device,
        });
    }

    /// Register `device` over `start..=end`, mirroring every
    /// `canonical_len` bytes back onto `start..start + canonical_len`.
    pub fn map_mirrored(
        &mut self,
        device: Rc<RefCell<dyn BusDevice>>,
        start: u16,
        end: u16,
        canonical_len: u16,
    ) {
        let len = if canonical_len == 0 {
            (end as u32) - (start as u32) + 1
        } else {
            canonical_len as u32
        };
        self.mappings.push(Mapping {
            start,
            end,
            canonical_len: len,
            device,
        });
    }
}

impl Default for MappedBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for MappedBus {
    fn read(&self, addr: u16) -> u8 {
        for mapping in &self.mappings {
            if mapping.contains(addr) {
                let canonical = mapping.canonicalize(addr);
                return mapping.device.borrow().read(canonical);
            }
        }
        log(LogCategory::Bus, LogLevel::Debug, || {
            format!("unmapped read at {addr:04X}")
        });
        0
    }

    fn write(&mut self, addr: u16, val: u8) {
        for mapping in &self.mappings {
            if mapping.contains(addr) {
                let canonical = mapping.canonicalize(addr);
                mapping.device.borrow_mut().write(canonical, val);
                return;
            }
        }
        log(LogCategory::Bus, LogLevel::Debug, || {
            format!("unmapped write at {addr:04X} of {val:02X}")
        });
    }
}

/// Fixed-size RAM block usable as a [`MappedBus`] device.
pub struct Ram {
    base: u16,
    data: Vec<u8>,
}

impl Ram {
    /// RAM of `size` bytes whose first byte sits at bus address `base`.
    pub fn new(base: u16, size: usize) -> Self {
        Self {
            base,
            data: vec![0; size],
        }
    }
}

impl BusDevice for Ram {
    fn read(&self, addr: u16) -> u8 {
        self.data[(addr - self.base) as usize]
    }

    fn write(&mut self, addr: u16, val: u8) {
        let idx = (addr - self.base) as usize;
        self.data[idx] = val;
    }
}
