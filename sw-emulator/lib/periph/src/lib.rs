/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the RSA accelerator emulator peripheral
    library.

--*/

mod rsa;

pub use crate::rsa::{RsaAccel, SharedRsaAccel, ACCELERATED_LATENCY, CONSTANT_TIME_LATENCY, INIT_READS};
