//! AES crypto module on the XMEGA E5 Xplained: encrypt the reference
//! vector in ECB, then chain three blocks in CBC through the hardware
//! XOR path, both checked against a software AES-128.

use std::process;

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;
use hal_api::{PinOps, Status};
use hatra::xmega::usart as usart_map;
use xmega_hal::aes::{Aes, Direction, StartMode, XorMode, BLOCK_LEN};
use xmega_hal::aes_model;
use xmega_hal::board::xmega_e5_xplained as board;

const KEY: [u8; BLOCK_LEN] = [
    0x30, 0x70, 0x97, 0x1A, 0xB7, 0xCE, 0x45, 0x06, 0x3F, 0xD2, 0x57, 0x3F, 0x49, 0xF5, 0x42,
    0x0D,
];
const PLAINTEXT: [u8; BLOCK_LEN] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
    0x0F,
];
const CIPHERTEXT: [u8; BLOCK_LEN] = [
    0x59, 0x1D, 0xA5, 0xBF, 0xEA, 0x0E, 0xD7, 0x61, 0x24, 0x4E, 0x81, 0xBA, 0x1E, 0xF6, 0x24,
    0xB5,
];

const IV: [u8; BLOCK_LEN] = *b"E5 Xplained IV..";
const CBC_PLAIN: [[u8; BLOCK_LEN]; 3] =
    [*b"XMEGA AES in CBC", *b"chains three blo", *b"cks through HW.."];

/// Software CBC encryption of `blocks` under [`KEY`]/[`IV`].
fn reference_cbc(blocks: &[[u8; BLOCK_LEN]]) -> Vec<[u8; BLOCK_LEN]> {
    let cipher = Aes128::new(GenericArray::from_slice(&KEY));
    let mut prev = IV;
    blocks
        .iter()
        .map(|plain| {
            let mut mixed = [0u8; BLOCK_LEN];
            for (m, (p, c)) in mixed.iter_mut().zip(plain.iter().zip(prev.iter())) {
                *m = p ^ c;
            }
            let mut block = GenericArray::clone_from_slice(&mixed);
            cipher.encrypt_block(&mut block);
            prev.copy_from_slice(&block);
            prev
        })
        .collect()
}

/// One hardware block: the key must be reloaded every time because
/// encryption leaves the last round subkey in key memory.
fn hw_encrypt(engine: &mut Aes, xor: XorMode, input: &[u8; BLOCK_LEN]) -> Result<[u8; BLOCK_LEN], Status> {
    engine.configure(Direction::Encrypt, StartMode::Manual, xor);
    engine.set_key(&KEY);
    engine.write_inputdata(input);
    engine.start();
    engine.wait()?;
    let mut out = [0u8; BLOCK_LEN];
    engine.read_outputdata(&mut out);
    engine.clear_ready_flag();
    Ok(out)
}

fn run() -> Result<(), Status> {
    demos::xmega_clock_model();
    demos::xmega_console_model(usart_map::HW_USARTC0_BASE);
    aes_model::install();

    board::init()?;
    let mut console = board::init_console()?;
    console.write_line("-- AES known-answer vectors --")?;

    let mut led = board::led0()?;
    let mut engine = Aes::new();
    engine.enable();
    engine.software_reset();

    let out = hw_encrypt(&mut engine, XorMode::Off, &PLAINTEXT)?;
    if out != CIPHERTEXT {
        log::error!("ECB mismatch: {:02x?}", out);
        return Err(Status::DeviceError);
    }
    console.write_line("ECB vector: ok")?;

    // CBC: prime the state with the IV, then chain with the XOR path on
    engine.software_reset();
    engine.configure(Direction::Encrypt, StartMode::Manual, XorMode::Off);
    engine.set_key(&KEY);
    engine.write_inputdata(&IV);
    let expected = reference_cbc(&CBC_PLAIN);
    for (plain, want) in CBC_PLAIN.iter().zip(expected.iter()) {
        let got = hw_encrypt(&mut engine, XorMode::On, plain)?;
        if got != *want {
            log::error!("CBC mismatch: {:02x?}", got);
            return Err(Status::DeviceError);
        }
    }
    console.write_line(&format!("CBC chain: ok ({} blocks)", CBC_PLAIN.len()))?;

    led.set_low();
    engine.disable();
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("aes-vectors: {:?}", e);
        process::exit(1);
    }
}
