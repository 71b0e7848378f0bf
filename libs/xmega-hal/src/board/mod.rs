//! Board wiring, one module per supported kit.

#[cfg(feature = "board-xmega-e5")]
pub mod xmega_e5_xplained;
