//! True random number generator driver.
//!
//! The control register only takes writes that carry the ASCII "RNG" key,
//! so a stray store cannot switch the entropy source on or off. One 32-bit
//! word is ready per ring-oscillator cycle; DATRDY in ISR announces it and
//! clears on read.

use core::cell::RefCell;

use critical_section::Mutex;
use hal_api::{poll_timeout, Status, POLL_LIMIT};
use hatra::sam4l::trng;
use hatra::{periph_base, CSR};

/// Called from the ISR with each fresh word.
pub type Callback = fn(u32);

static CALLBACK: Mutex<RefCell<Option<Callback>>> = Mutex::new(RefCell::new(None));

pub struct Trng {
    csr: CSR<u32>,
}

impl Trng {
    pub fn new() -> Trng {
        Trng { csr: CSR::new(periph_base::<u32>(trng::HW_TRNG_BASE, trng::TRNG_NUMREGS)) }
    }

    /// Interrupt line, for the vector table and for hosted dispatch.
    pub fn irq() -> usize {
        trng::TRNG_IRQ
    }

    pub fn enable(&mut self) {
        let v = self.csr.ms(trng::CR_KEY, trng::CR_KEY_VALUE as u32)
            | self.csr.ms(trng::CR_ENABLE, 1);
        self.csr.wo(trng::CR, v);
    }

    pub fn disable(&mut self) {
        self.csr.wo(trng::CR, self.csr.ms(trng::CR_KEY, trng::CR_KEY_VALUE as u32));
    }

    /// True when a fresh word is waiting. Reading ISR clears the flag, so
    /// a `true` must be followed by [`odata`](Self::odata).
    pub fn data_ready(&self) -> bool {
        self.csr.rf(trng::ISR_DATRDY) != 0
    }

    /// The current output word, without any readiness check.
    pub fn odata(&self) -> u32 {
        self.csr.r(trng::ODATA)
    }

    /// Block for the next word.
    pub fn read(&mut self) -> Result<u32, Status> {
        poll_timeout(POLL_LIMIT, || self.data_ready())?;
        Ok(self.odata())
    }

    /// Hand fresh words to `callback` from interrupt context.
    pub fn enable_interrupt(&mut self, callback: Callback) {
        critical_section::with(|cs| {
            *CALLBACK.borrow(cs).borrow_mut() = Some(callback);
        });
        self.csr.wo(trng::IER, 1);
    }

    pub fn disable_interrupt(&mut self) {
        self.csr.wo(trng::IDR, 1);
        critical_section::with(|cs| {
            *CALLBACK.borrow(cs).borrow_mut() = None;
        });
    }
}

impl Default for Trng {
    fn default() -> Self {
        Self::new()
    }
}

/// Vector-table entry for the DATRDY interrupt.
pub fn data_ready_isr(_line: usize, _arg: *mut usize) {
    let trng_blk = Trng::new();
    if !trng_blk.data_ready() {
        return;
    }
    let word = trng_blk.odata();
    let cb = critical_section::with(|cs| *CALLBACK.borrow(cs).borrow());
    match cb {
        Some(f) => f(word),
        // never log the word itself, it is entropy somebody may still use
        None => log::debug!("trng: word dropped, no consumer"),
    }
}
