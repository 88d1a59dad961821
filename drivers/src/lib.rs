/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the RSA accelerator driver library.

--*/

#![cfg_attr(not(test), no_std)]

mod error;
mod rsa;
pub mod wait;

pub use error::{RsaAccelError, RsaResult};
pub use rsa::{
    CompletionMode, OperandBlock, Operation, Rsa, RsaOpKind, Search, Timing, RSA_MAX_OPERAND_BITS,
    RSA_MEM_BYTES, RSA_MEM_WORDS,
};
