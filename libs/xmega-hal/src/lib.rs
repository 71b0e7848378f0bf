#![cfg_attr(target_os = "none", no_std)]

//! Peripheral drivers for the AVR XMEGA family (E5 and B1 class devices).
//!
//! The XMEGA I/O space is byte-wide, so every driver here runs a
//! [`hatra::CSR`] over `u8` registers from the `hatra::xmega` map. Drivers
//! that gate a peripheral clock or constrain the allowed sleep depth follow
//! the same discipline: enable the module clock through [`sysclk`], then
//! lock the shallowest workable mode with the [`sleepmgr`] service, and undo
//! both on disable.

pub mod adc;
pub mod aes;
#[cfg(not(target_os = "none"))]
pub mod aes_model;
pub mod board;
pub mod ebi;
pub mod evsys;
pub mod ioport;
pub mod pmic;
pub mod rtc32;
pub mod sysclk;
pub mod tc;
pub mod usart;
pub mod xcl;
