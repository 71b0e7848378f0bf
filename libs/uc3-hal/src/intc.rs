//! Interrupt controller: a claim table over the INTC priority registers.
//!
//! Peripheral drivers claim a logical line with [`register_handler`]; the
//! low-level vector (or a hosted test) hands lines to [`dispatch`].

use core::cell::RefCell;

use critical_section::Mutex;
use hal_api::Status;
use hatra::uc3::{intc, irq};
use hatra::{periph_base, CSR};

pub type IrqHandler = fn(usize, *mut usize);

#[derive(Clone, Copy)]
struct Entry {
    handler: IrqHandler,
    // Stored as usize so the table stays Send; cast back at dispatch time.
    arg: usize,
    level: u8,
    enabled: bool,
}

static TABLE: Mutex<RefCell<[Option<Entry>; irq::LINES]>> =
    Mutex::new(RefCell::new([None; irq::LINES]));

fn intc_csr() -> CSR<u32> {
    CSR::new(periph_base::<u32>(intc::HW_INTC_BASE, intc::INTC_NUMREGS))
}

/// Claim `line` at priority `level` (0..=3). Refuses a second claim so two
/// drivers can't silently fight over one line.
pub fn register_handler(
    line: usize,
    level: u8,
    handler: IrqHandler,
    arg: *mut usize,
) -> Result<(), Status> {
    if line >= irq::LINES || level > 3 {
        return Err(Status::InvalidArg);
    }
    critical_section::with(|cs| {
        let mut table = TABLE.borrow(cs).borrow_mut();
        if table[line].is_some() {
            return Err(Status::Busy);
        }
        table[line] = Some(Entry { handler, arg: arg as usize, level, enabled: true });
        let mut csr = intc_csr();
        csr.wfo(intc::ipr_intlevel(line), level as u32);
        Ok(())
    })
}

pub fn unregister_handler(line: usize) {
    if line >= irq::LINES {
        return;
    }
    critical_section::with(|cs| {
        TABLE.borrow(cs).borrow_mut()[line] = None;
    });
}

pub fn irq_level(line: usize) -> Option<u8> {
    if line >= irq::LINES {
        return None;
    }
    critical_section::with(|cs| TABLE.borrow(cs).borrow()[line].map(|e| e.level))
}

fn set_enabled(line: usize, enabled: bool) {
    if line >= irq::LINES {
        return;
    }
    critical_section::with(|cs| {
        if let Some(entry) = TABLE.borrow(cs).borrow_mut()[line].as_mut() {
            entry.enabled = enabled;
        }
    });
}

/// Lines start enabled when claimed; these mask a line without losing
/// the claim.
pub fn enable(line: usize) {
    set_enabled(line, true);
}

pub fn disable(line: usize) {
    set_enabled(line, false);
}

/// Run the handler claimed for `line`, if any. The entry is copied out of the
/// table first so the handler itself may claim or release lines.
pub fn dispatch(line: usize) -> bool {
    if line >= irq::LINES {
        return false;
    }
    let entry = critical_section::with(|cs| TABLE.borrow(cs).borrow()[line]);
    match entry {
        Some(e) if e.enabled => {
            (e.handler)(line, e.arg as *mut usize);
            true
        }
        _ => false,
    }
}

/// Simulate a hardware event by running the claimed handler directly.
#[cfg(not(target_os = "none"))]
pub fn trigger(line: usize) -> bool {
    dispatch(line)
}
