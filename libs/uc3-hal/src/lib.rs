#![cfg_attr(target_os = "none", no_std)]

//! Peripheral drivers for the AVR32 UC3 family.
//!
//! Every driver talks to its block through a [`hatra::CSR`] built over the
//! `hatra::uc3` register map, so the same code runs against real hardware
//! (`target_os = "none"`) and against the emulated register bank everywhere
//! else. Blocking operations never spin forever: they go through
//! [`hal_api::poll_timeout`] and surface [`hal_api::Status`] on failure.

pub mod ast;
pub mod board;
pub mod eic;
pub mod gpio;
pub mod intc;
pub mod pevc;
pub mod pm;
pub mod pwm;
pub mod scif;
pub mod spi;
pub mod tc;
pub mod twim;
pub mod usart;
