//! AES-128 crypto module.
//!
//! The module works on a 16-byte state and key memory, each exposed as a
//! one-byte window with an auto-incrementing pointer; any CTRL write resets
//! the pointers. After an encryption the key memory holds the last round
//! subkey, which is exactly what a following decryption must be loaded
//! with, so decrypt flows first run a dummy encryption to harvest it.

use hal_api::{poll_timeout, Status, POLL_LIMIT};
use hatra::xmega::{aes, pr, vector};
use hatra::{periph_base, CSR};

use crate::pmic::Level;
use crate::sysclk::{self, Port};

pub const BLOCK_LEN: usize = aes::BLOCK_LEN;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Manual waits for [`Aes::start`]; Auto starts on the 16th state write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StartMode {
    Manual,
    Auto,
}

/// With XOR on, state writes fold into the existing state instead of
/// replacing it, which is the CBC chaining primitive.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum XorMode {
    Off,
    On,
}

pub struct Aes {
    csr: CSR<u8>,
}

impl Aes {
    pub fn new() -> Aes {
        let base = periph_base::<u8>(aes::HW_AES_BASE, aes::AES_NUMREGS);
        Aes { csr: CSR::new(base) }
    }

    /// Ungate the module clock.
    pub fn enable(&mut self) {
        sysclk::enable_module(Port::Gen, pr::PR_GEN_AES);
    }

    pub fn disable(&mut self) {
        sysclk::disable_module(Port::Gen, pr::PR_GEN_AES);
    }

    /// Abort any running operation and clear the internal state.
    pub fn software_reset(&mut self) {
        self.csr.wfo(aes::CTRL_RESET, 1);
    }

    pub fn configure(&mut self, dir: Direction, start: StartMode, xor: XorMode) {
        let keep = !(1u8 << aes::CTRL_DECRYPT.offset()
            | 1 << aes::CTRL_AUTO.offset()
            | 1 << aes::CTRL_XOR.offset());
        let v = (self.csr.r(aes::CTRL) & keep)
            | self.csr.ms(aes::CTRL_DECRYPT, (dir == Direction::Decrypt) as u8)
            | self.csr.ms(aes::CTRL_AUTO, (start == StartMode::Auto) as u8)
            | self.csr.ms(aes::CTRL_XOR, (xor == XorMode::On) as u8);
        self.csr.wo(aes::CTRL, v);
    }

    pub fn set_key(&mut self, key: &[u8; BLOCK_LEN]) {
        for &b in key {
            self.csr.wo(aes::KEY, b);
        }
    }

    pub fn get_key(&self, key: &mut [u8; BLOCK_LEN]) {
        for b in key.iter_mut() {
            *b = self.csr.r(aes::KEY);
        }
    }

    pub fn write_inputdata(&mut self, data: &[u8; BLOCK_LEN]) {
        for &b in data {
            self.csr.wo(aes::STATE, b);
        }
    }

    pub fn read_outputdata(&self, data: &mut [u8; BLOCK_LEN]) {
        for b in data.iter_mut() {
            *b = self.csr.r(aes::STATE);
        }
    }

    pub fn start(&mut self) {
        self.csr.rmwf(aes::CTRL_START, 1);
    }

    /// True until the module raises either the ready or the error flag,
    /// including straight after reset.
    pub fn is_busy(&self) -> bool {
        let done =
            1u8 << aes::STATUS_SRIF.offset() | 1 << aes::STATUS_ERROR.offset();
        self.csr.r(aes::STATUS) & done == 0
    }

    pub fn is_ready(&self) -> bool {
        self.csr.rf(aes::STATUS_SRIF) != 0
    }

    pub fn is_error(&self) -> bool {
        self.csr.rf(aes::STATUS_ERROR) != 0
    }

    pub fn clear_ready_flag(&mut self) {
        self.csr.wo(aes::STATUS, 1 << aes::STATUS_SRIF.offset());
    }

    pub fn clear_error_flag(&mut self) {
        self.csr.wo(aes::STATUS, 1 << aes::STATUS_ERROR.offset());
    }

    /// Block until the current operation settles, then report how it went.
    pub fn wait(&self) -> Result<(), Status> {
        poll_timeout(POLL_LIMIT, || !self.is_busy())?;
        if self.is_error() {
            return Err(Status::DeviceError);
        }
        Ok(())
    }

    pub fn set_interrupt_level(&mut self, level: Level) {
        self.csr.rmwf(aes::INTCTRL_INTLVL, level as u8);
    }

    pub fn vector(&self) -> usize {
        vector::AES_READY
    }

    /// Encrypt a dummy block under `key` and read back what the hardware
    /// left in key memory: the last round subkey a decryption needs.
    pub fn generate_last_subkey(
        &mut self,
        key: &[u8; BLOCK_LEN],
        last: &mut [u8; BLOCK_LEN],
    ) -> Result<(), Status> {
        self.software_reset();
        self.configure(Direction::Encrypt, StartMode::Manual, XorMode::Off);
        self.set_key(key);
        self.write_inputdata(&[0u8; BLOCK_LEN]);
        self.start();
        self.wait()?;
        self.get_key(last);
        self.clear_ready_flag();
        Ok(())
    }
}

impl Default for Aes {
    fn default() -> Self {
        Aes::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aes_model;
    use ::aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
    use ::aes::Aes128;
    use hatra::hosted;
    use hatra::xmega::aes;

    const KEY: [u8; 16] = [
        0x30, 0x70, 0x97, 0x1A, 0xB7, 0xCE, 0x45, 0x06, 0x3F, 0xD2, 0x57, 0x3F, 0x49, 0xF5,
        0x42, 0x0D,
    ];
    const PLAINTEXT: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D,
        0x0E, 0x0F,
    ];
    const CIPHERTEXT: [u8; 16] = [
        0x59, 0x1D, 0xA5, 0xBF, 0xEA, 0x0E, 0xD7, 0x61, 0x24, 0x4E, 0x81, 0xBA, 0x1E, 0xF6,
        0x24, 0xB5,
    ];

    #[test]
    fn encrypts_the_reference_vector() {
        aes_model::install();
        let mut a = Aes::new();
        a.software_reset();
        a.configure(Direction::Encrypt, StartMode::Manual, XorMode::Off);
        a.set_key(&KEY);
        a.write_inputdata(&PLAINTEXT);
        a.start();
        a.wait().unwrap();
        let mut out = [0u8; 16];
        a.read_outputdata(&mut out);
        assert_eq!(out, CIPHERTEXT);
        hosted::remove_hook(aes::HW_AES_BASE);
    }

    #[test]
    fn decrypts_with_the_generated_last_subkey() {
        aes_model::install();
        let mut a = Aes::new();
        let mut last = [0u8; 16];
        a.generate_last_subkey(&KEY, &mut last).unwrap();
        assert_ne!(last, KEY);

        a.software_reset();
        a.configure(Direction::Decrypt, StartMode::Manual, XorMode::Off);
        a.set_key(&last);
        a.write_inputdata(&CIPHERTEXT);
        a.start();
        a.wait().unwrap();
        let mut out = [0u8; 16];
        a.read_outputdata(&mut out);
        assert_eq!(out, PLAINTEXT);
        hosted::remove_hook(aes::HW_AES_BASE);
    }

    #[test]
    fn start_without_loaded_state_raises_the_error_flag() {
        aes_model::install();
        let mut a = Aes::new();
        a.software_reset();
        a.configure(Direction::Encrypt, StartMode::Manual, XorMode::Off);
        a.set_key(&KEY);
        assert!(a.is_busy());
        a.start();
        assert!(!a.is_busy());
        assert!(a.is_error());
        assert_eq!(a.wait(), Err(Status::DeviceError));
        a.clear_error_flag();
        assert!(a.is_busy());
        hosted::remove_hook(aes::HW_AES_BASE);
    }

    #[test]
    fn auto_start_with_xor_chains_cbc() {
        aes_model::install();
        let mut a = Aes::new();
        a.software_reset();
        a.configure(Direction::Encrypt, StartMode::Auto, XorMode::On);
        a.set_key(&KEY);

        let p1 = PLAINTEXT;
        let p2 = [0xA5u8; 16];

        // zero IV: the first block XORs into a zeroed state
        a.write_inputdata(&p1);
        a.wait().unwrap();
        let mut c1 = [0u8; 16];
        a.read_outputdata(&mut c1);
        a.clear_ready_flag();

        a.write_inputdata(&p2);
        a.wait().unwrap();
        let mut c2 = [0u8; 16];
        a.read_outputdata(&mut c2);

        let cipher = Aes128::new(GenericArray::from_slice(&KEY));
        let mut b1 = GenericArray::clone_from_slice(&p1);
        cipher.encrypt_block(&mut b1);
        assert_eq!(c1[..], b1[..]);

        let mut x = [0u8; 16];
        for i in 0..16 {
            x[i] = c1[i] ^ p2[i];
        }
        let mut b2 = GenericArray::clone_from_slice(&x);
        cipher.encrypt_block(&mut b2);
        assert_eq!(c2[..], b2[..]);
        hosted::remove_hook(aes::HW_AES_BASE);
    }

    #[test]
    fn interrupt_level_and_gate() {
        let mut a = Aes::new();
        a.enable();
        assert!(sysclk::module_enabled(Port::Gen, pr::PR_GEN_AES));
        a.set_interrupt_level(Level::Medium);
        assert_eq!(hosted::peek(aes::HW_AES_BASE, aes::INTCTRL.offset()), 2);
        assert_eq!(a.vector(), vector::AES_READY);
        a.disable();
        assert!(!sysclk::module_enabled(Port::Gen, pr::PR_GEN_AES));
    }
}
