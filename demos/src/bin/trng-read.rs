//! True random number generator on the SAM4L evaluation kit: gate the
//! block, pull eight words by polling, then one more through the
//! interrupt path.

use std::process;
use std::sync::atomic::{AtomicU32, Ordering};

use hal_api::Status;
use hatra::hosted::{self, Access, HookAction};
use hatra::sam4l::{pm as pm_map, trng as trng_map};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use sam4l_hal::board::sam4l_ek as board;
use sam4l_hal::pm::{Bus, Pm};
use sam4l_hal::trng::{self, Trng};

static ISR_WORD: AtomicU32 = AtomicU32::new(0);

fn catch_word(word: u32) {
    ISR_WORD.store(word, Ordering::Relaxed);
}

/// Ring oscillator model: data is always ready and each read of the
/// output register yields the next word of a seeded stream.
fn install_entropy_model() {
    let base = trng_map::HW_TRNG_BASE;
    let mut feed = StdRng::seed_from_u64(0x5341_4D34);
    hosted::install_hook(
        base,
        Box::new(move |off, access| {
            match access {
                Access::Read if off == trng_map::ISR.offset() => {
                    return HookAction::Replace(1);
                }
                Access::Read if off == trng_map::ODATA.offset() => {
                    return HookAction::Replace(feed.next_u32() as usize);
                }
                _ => {}
            }
            HookAction::Pass
        }),
    );
}

fn run() -> Result<(), Status> {
    install_entropy_model();
    board::init()?;

    println!("-- TRNG read --");
    let mut pm = Pm::new();
    pm.enable_module(Bus::Pba, pm_map::PBA_TRNG_BIT);

    let mut rng = Trng::new();
    rng.enable();
    for i in 0..8 {
        let word = rng.read()?;
        println!("word {}: {:08x}", i, word);
    }

    rng.enable_interrupt(catch_word);
    trng::data_ready_isr(Trng::irq(), std::ptr::null_mut());
    println!("interrupt path delivered {:08x}", ISR_WORD.load(Ordering::Relaxed));
    rng.disable_interrupt();

    rng.disable();
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("trng-read: {:?}", e);
        process::exit(1);
    }
}
