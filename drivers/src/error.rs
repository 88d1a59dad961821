/*++

Licensed under the Apache-2.0 license.

File Name:

    error.rs

Abstract:

    File contains the error type used by the RSA accelerator driver.

--*/

use core::num::NonZeroU32;

/// RSA Accelerator Driver Error Type
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RsaAccelError(pub NonZeroU32);

impl RsaAccelError {
    /// Create an error code; intended to only be used from const contexts,
    /// as we don't want runtime panics if val is zero.
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("RsaAccelError cannot be 0"),
        }
    }

    /// Requested bit length beyond the hardware maximum, or not a
    /// multiple of the hardware word size.
    pub const LENGTH_EXCEEDED: RsaAccelError = RsaAccelError::new_const(0x000a_0001);

    /// Even modulus supplied to a modular operation; the reduction
    /// algorithm requires an odd modulus.
    pub const INVALID_MODULUS: RsaAccelError = RsaAccelError::new_const(0x000a_0002);

    /// Operation requested in a sequencer state that does not permit it.
    pub const SEQUENCE_VIOLATION: RsaAccelError = RsaAccelError::new_const(0x000a_0003);

    /// Completion not observed within the caller-supplied poll budget.
    /// The driver must be reinitialized before further use.
    pub const TIMED_OUT: RsaAccelError = RsaAccelError::new_const(0x000a_0004);

    /// Operation requested before the one-time memory initialization was
    /// observed.
    pub const NOT_INITIALIZED: RsaAccelError = RsaAccelError::new_const(0x000a_0005);

    /// Search position does not fit the hardware field or exceeds the
    /// configured operand length.
    pub const INVALID_SEARCH_POS: RsaAccelError = RsaAccelError::new_const(0x000a_0006);
}

impl From<RsaAccelError> for u32 {
    fn from(val: RsaAccelError) -> Self {
        val.0.get()
    }
}

pub type RsaResult<T> = Result<T, RsaAccelError>;
