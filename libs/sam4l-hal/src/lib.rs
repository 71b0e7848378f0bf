#![cfg_attr(target_os = "none", no_std)]

//! Peripheral drivers for the SAM4L family.
//!
//! Same shape as the sibling family crates: each driver owns a
//! [`hatra::CSR`] over its block in the `hatra::sam4l` map, runs unchanged
//! against hardware (`target_os = "none"`) or the emulated register bank,
//! bounds every busy-wait with [`hal_api::poll_timeout`] and reports
//! failure as [`hal_api::Status`].

pub mod board;
pub mod freqm;
pub mod gpio;
pub mod pm;
pub mod trng;
