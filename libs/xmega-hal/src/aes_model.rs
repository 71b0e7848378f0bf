//! Behavioral model of the AES module for the hosted register bank.
//!
//! Unit tests and the demo binaries install this so driver flows run end
//! to end off target. The model keeps the hardware's quirks: the key and
//! state pointers reset on any CTRL write, a start before sixteen state
//! writes raises ERROR, encryption leaves the last round subkey in key
//! memory, and decryption rewinds it back to the round zero key.

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;
use hatra::hosted::{self, Access, HookAction};
use hatra::xmega::aes as regs;
use hatra::Field;

const SBOX: [u8; 256] = [
    0x63, 0x7C, 0x77, 0x7B, 0xF2, 0x6B, 0x6F, 0xC5, 0x30, 0x01, 0x67, 0x2B, 0xFE, 0xD7, 0xAB,
    0x76, 0xCA, 0x82, 0xC9, 0x7D, 0xFA, 0x59, 0x47, 0xF0, 0xAD, 0xD4, 0xA2, 0xAF, 0x9C, 0xA4,
    0x72, 0xC0, 0xB7, 0xFD, 0x93, 0x26, 0x36, 0x3F, 0xF7, 0xCC, 0x34, 0xA5, 0xE5, 0xF1, 0x71,
    0xD8, 0x31, 0x15, 0x04, 0xC7, 0x23, 0xC3, 0x18, 0x96, 0x05, 0x9A, 0x07, 0x12, 0x80, 0xE2,
    0xEB, 0x27, 0xB2, 0x75, 0x09, 0x83, 0x2C, 0x1A, 0x1B, 0x6E, 0x5A, 0xA0, 0x52, 0x3B, 0xD6,
    0xB3, 0x29, 0xE3, 0x2F, 0x84, 0x53, 0xD1, 0x00, 0xED, 0x20, 0xFC, 0xB1, 0x5B, 0x6A, 0xCB,
    0xBE, 0x39, 0x4A, 0x4C, 0x58, 0xCF, 0xD0, 0xEF, 0xAA, 0xFB, 0x43, 0x4D, 0x33, 0x85, 0x45,
    0xF9, 0x02, 0x7F, 0x50, 0x3C, 0x9F, 0xA8, 0x51, 0xA3, 0x40, 0x8F, 0x92, 0x9D, 0x38, 0xF5,
    0xBC, 0xB6, 0xDA, 0x21, 0x10, 0xFF, 0xF3, 0xD2, 0xCD, 0x0C, 0x13, 0xEC, 0x5F, 0x97, 0x44,
    0x17, 0xC4, 0xA7, 0x7E, 0x3D, 0x64, 0x5D, 0x19, 0x73, 0x60, 0x81, 0x4F, 0xDC, 0x22, 0x2A,
    0x90, 0x88, 0x46, 0xEE, 0xB8, 0x14, 0xDE, 0x5E, 0x0B, 0xDB, 0xE0, 0x32, 0x3A, 0x0A, 0x49,
    0x06, 0x24, 0x5C, 0xC2, 0xD3, 0xAC, 0x62, 0x91, 0x95, 0xE4, 0x79, 0xE7, 0xC8, 0x37, 0x6D,
    0x8D, 0xD5, 0x4E, 0xA9, 0x6C, 0x56, 0xF4, 0xEA, 0x65, 0x7A, 0xAE, 0x08, 0xBA, 0x78, 0x25,
    0x2E, 0x1C, 0xA6, 0xB4, 0xC6, 0xE8, 0xDD, 0x74, 0x1F, 0x4B, 0xBD, 0x8B, 0x8A, 0x70, 0x3E,
    0xB5, 0x66, 0x48, 0x03, 0xF6, 0x0E, 0x61, 0x35, 0x57, 0xB9, 0x86, 0xC1, 0x1D, 0x9E, 0xE1,
    0xF8, 0x98, 0x11, 0x69, 0xD9, 0x8E, 0x94, 0x9B, 0x1E, 0x87, 0xE9, 0xCE, 0x55, 0x28, 0xDF,
    0x8C, 0xA1, 0x89, 0x0D, 0xBF, 0xE6, 0x42, 0x68, 0x41, 0x99, 0x2D, 0x0F, 0xB0, 0x54, 0xBB,
    0x16,
];

const RCON: [u8; 10] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1B, 0x36];

fn g(word: [u8; 4], rcon: u8) -> [u8; 4] {
    [
        SBOX[word[1] as usize] ^ rcon,
        SBOX[word[2] as usize],
        SBOX[word[3] as usize],
        SBOX[word[0] as usize],
    ]
}

/// Round 10 subkey of the AES-128 schedule for `key`.
fn expand_last(key: &[u8; 16]) -> [u8; 16] {
    let mut w = [[0u8; 4]; 44];
    for i in 0..4 {
        w[i].copy_from_slice(&key[4 * i..4 * i + 4]);
    }
    for i in 4..44 {
        let t = if i % 4 == 0 { g(w[i - 1], RCON[i / 4 - 1]) } else { w[i - 1] };
        let prev = w[i - 4];
        for j in 0..4 {
            w[i][j] = prev[j] ^ t[j];
        }
    }
    let mut out = [0u8; 16];
    for i in 0..4 {
        out[4 * i..4 * i + 4].copy_from_slice(&w[40 + i]);
    }
    out
}

/// Walk the schedule backwards from the round 10 subkey to the round zero
/// key. Processing the word index downward keeps every input available.
fn rewind_first(last: &[u8; 16]) -> [u8; 16] {
    let mut w = [[0u8; 4]; 44];
    for i in 0..4 {
        w[40 + i].copy_from_slice(&last[4 * i..4 * i + 4]);
    }
    for i in (4..44).rev() {
        let t = if i % 4 == 0 { g(w[i - 1], RCON[i / 4 - 1]) } else { w[i - 1] };
        let cur = w[i];
        for j in 0..4 {
            w[i - 4][j] = cur[j] ^ t[j];
        }
    }
    let mut out = [0u8; 16];
    for i in 0..4 {
        out[4 * i..4 * i + 4].copy_from_slice(&w[i]);
    }
    out
}

fn bit(f: Field) -> usize {
    1 << f.offset()
}

#[derive(Default)]
struct Model {
    key: [u8; 16],
    state: [u8; 16],
    key_ptr: usize,
    state_ptr: usize,
    loaded: usize,
    decrypt: bool,
    auto: bool,
    xor: bool,
    status: usize,
}

impl Model {
    fn run(&mut self) {
        if self.loaded < 16 {
            self.status |= bit(regs::STATUS_ERROR);
            return;
        }
        let mut block = GenericArray::clone_from_slice(&self.state);
        if self.decrypt {
            let first = rewind_first(&self.key);
            Aes128::new(GenericArray::from_slice(&first)).decrypt_block(&mut block);
            self.key = first;
        } else {
            Aes128::new(GenericArray::from_slice(&self.key)).encrypt_block(&mut block);
            self.key = expand_last(&self.key);
        }
        self.state.copy_from_slice(&block);
        self.loaded = 0;
        self.status |= bit(regs::STATUS_SRIF);
    }
}

/// Put the model behind the AES base address of the current thread's bank.
pub fn install() {
    let mut m = Model::default();
    hosted::install_hook(
        regs::HW_AES_BASE,
        Box::new(move |off, access| {
            if off == regs::CTRL.offset() {
                if let Access::Write(v) = access {
                    m.key_ptr = 0;
                    m.state_ptr = 0;
                    if v & bit(regs::CTRL_RESET) != 0 {
                        m = Model::default();
                        return HookAction::Replace(0);
                    }
                    m.decrypt = v & bit(regs::CTRL_DECRYPT) != 0;
                    m.auto = v & bit(regs::CTRL_AUTO) != 0;
                    m.xor = v & bit(regs::CTRL_XOR) != 0;
                    if v & bit(regs::CTRL_START) != 0 {
                        m.run();
                    }
                    return HookAction::Replace(
                        v & !(bit(regs::CTRL_START) | bit(regs::CTRL_RESET)),
                    );
                }
            } else if off == regs::STATUS.offset() {
                match access {
                    Access::Read => return HookAction::Replace(m.status),
                    Access::Write(v) => {
                        m.status &= !v;
                        return HookAction::Replace(m.status);
                    }
                }
            } else if off == regs::KEY.offset() {
                match access {
                    Access::Read => {
                        let b = m.key[m.key_ptr];
                        m.key_ptr = (m.key_ptr + 1) % 16;
                        return HookAction::Replace(b as usize);
                    }
                    Access::Write(v) => {
                        m.key[m.key_ptr] = v as u8;
                        m.key_ptr = (m.key_ptr + 1) % 16;
                        return HookAction::Replace(0);
                    }
                }
            } else if off == regs::STATE.offset() {
                match access {
                    Access::Read => {
                        let b = m.state[m.state_ptr];
                        m.state_ptr = (m.state_ptr + 1) % 16;
                        return HookAction::Replace(b as usize);
                    }
                    Access::Write(v) => {
                        if m.xor {
                            m.state[m.state_ptr] ^= v as u8;
                        } else {
                            m.state[m.state_ptr] = v as u8;
                        }
                        m.state_ptr = (m.state_ptr + 1) % 16;
                        if m.loaded < 16 {
                            m.loaded += 1;
                        }
                        if m.auto && m.loaded == 16 {
                            m.run();
                        }
                        return HookAction::Replace(0);
                    }
                }
            }
            HookAction::Pass
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_rewind_inverts_expansion() {
        let key = [0x2Bu8; 16];
        let last = expand_last(&key);
        assert_ne!(last, key);
        assert_eq!(rewind_first(&last), key);
    }

    #[test]
    fn fips_197_last_subkey() {
        // appendix A.1 expansion of 2b7e151628aed2a6abf7158809cf4f3c
        let key = [
            0x2B, 0x7E, 0x15, 0x16, 0x28, 0xAE, 0xD2, 0xA6, 0xAB, 0xF7, 0x15, 0x88, 0x09, 0xCF,
            0x4F, 0x3C,
        ];
        let last = expand_last(&key);
        let expected = [
            0xD0, 0x14, 0xF9, 0xA8, 0xC9, 0xEE, 0x25, 0x89, 0xE1, 0x3F, 0x0C, 0xC8, 0xB6, 0x63,
            0x0C, 0xA6,
        ];
        assert_eq!(last, expected);
    }
}
