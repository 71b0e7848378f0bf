//! Board wiring, one module per supported kit.

#[cfg(feature = "board-uc3l-ek")]
pub mod uc3l_ek;
