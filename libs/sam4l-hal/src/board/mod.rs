//! Board wiring, one module per supported kit.

#[cfg(feature = "board-sam4l-ek")]
pub mod sam4l_ek;
