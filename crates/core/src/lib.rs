//! Cycle-counted 2A03/6502 CPU core.
//!
//! The crate is built around three pieces that share nothing but a bus:
//!
//! - [`cpu_2a03::Cpu2a03`], a table-driven CPU where one `tick` is one
//!   CPU cycle and instructions occupy their documented cycle counts;
//! - [`bus::Bus`] implementations giving the CPU a total 16-bit address
//!   space ([`bus::FlatBus`] for flat RAM, [`bus::MappedBus`] for
//!   device routing with mirroring);
//! - [`clock::Clock`], a master pulse counter that ticks registered
//!   [`clock::Tickable`] components at per-component divisors.
//!
//! Everything on the emulation path is total: no address faults, no
//! undefined-opcode panics, no errors to propagate. Fallible surfaces
//! (save-state loading) return [`StateError`].

use thiserror::Error;

pub mod bus;
pub mod clock;
pub mod cpu_2a03;
pub mod flags;
pub mod logging;


pub use bus::{Bus, BusDevice, FlatBus, MappedBus, Ram};
pub use clock::{Clock, Tickable};
pub use cpu_2a03::{address_from_bytes, AddrMode, Cpu2a03, CpuState, Instruction};

/// Failure to restore a serialized snapshot.
///
/// Snapshots are JSON produced by the `save_state` methods; loading can
/// fail on malformed JSON or on a snapshot taken from a differently
/// shaped component.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("malformed state snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("incompatible state snapshot: {0}")]
    Incompatible(String),
}
