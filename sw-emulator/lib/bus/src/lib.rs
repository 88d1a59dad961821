/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the RSA accelerator emulator bus library.

--*/

mod bus;
mod mmio;

pub use crate::bus::{Bus, BusError};
pub use crate::mmio::BusMmio;

/// Data width of a bus transfer.
pub type RvData = u32;

/// Address width of the bus.
pub type RvAddr = u32;

/// Size of a bus transfer.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum RvSize {
    Byte = 1,
    HalfWord = 2,
    Word = 4,
}
