// Licensed under the Apache-2.0 license
//
#![no_std]
#![allow(clippy::erasing_op)]
#![allow(clippy::identity_op)]

pub mod rsa;
