//! Programmable multilevel interrupt controller, plus the vector claim
//! table.
//!
//! Unlike the UC3 controller, per-source priority lives in each
//! peripheral's own `INTCTRL`; the PMIC only opens or closes the three
//! level groups. Drivers claim their vector with [`register_handler`]; the
//! low-level vector stubs (or a hosted test) hand vectors to [`dispatch`].

use core::cell::RefCell;

use critical_section::Mutex;
use hal_api::Status;
use hatra::xmega::{pmic, vector};
use hatra::{periph_base, CSR};

/// Interrupt priority, the two-bit `INTLVL` encoding every XMEGA
/// peripheral uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Level {
    Off = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

pub type IrqHandler = fn(usize, *mut usize);

#[derive(Clone, Copy)]
struct Entry {
    handler: IrqHandler,
    // Stored as usize so the table stays Send; cast back at dispatch time.
    arg: usize,
    enabled: bool,
}

static TABLE: Mutex<RefCell<[Option<Entry>; vector::VECTORS]>> =
    Mutex::new(RefCell::new([None; vector::VECTORS]));

fn pmic_csr() -> CSR<u8> {
    CSR::new(periph_base::<u8>(pmic::HW_PMIC_BASE, pmic::PMIC_NUMREGS))
}

/// Open all three level groups. Individual sources stay silent until their
/// own `INTCTRL` asks for a level.
pub fn init() {
    let mut csr = pmic_csr();
    let v = csr.ms(pmic::CTRL_LOLVLEN, 1)
        | csr.ms(pmic::CTRL_MEDLVLEN, 1)
        | csr.ms(pmic::CTRL_HILVLEN, 1);
    csr.wo(pmic::CTRL, v);
}

pub fn enable_level(level: Level) {
    let mut csr = pmic_csr();
    match level {
        Level::Off => {}
        Level::Low => csr.rmwf(pmic::CTRL_LOLVLEN, 1),
        Level::Medium => csr.rmwf(pmic::CTRL_MEDLVLEN, 1),
        Level::High => csr.rmwf(pmic::CTRL_HILVLEN, 1),
    }
}

pub fn disable_level(level: Level) {
    let mut csr = pmic_csr();
    match level {
        Level::Off => {}
        Level::Low => csr.rmwf(pmic::CTRL_LOLVLEN, 0),
        Level::Medium => csr.rmwf(pmic::CTRL_MEDLVLEN, 0),
        Level::High => csr.rmwf(pmic::CTRL_HILVLEN, 0),
    }
}

/// Round-robin arbitration for the low level group.
pub fn enable_round_robin() {
    pmic_csr().rmwf(pmic::CTRL_RREN, 1);
}

pub fn disable_round_robin() {
    pmic_csr().rmwf(pmic::CTRL_RREN, 0);
}

/// Level-executing status bits, `PMIC.STATUS` layout.
pub fn status() -> u8 {
    pmic_csr().r(pmic::STATUS)
}

/// Claim `vec` for a handler. Refuses a second claim so two drivers can't
/// silently fight over one vector.
pub fn register_handler(vec: usize, handler: IrqHandler, arg: *mut usize) -> Result<(), Status> {
    if vec >= vector::VECTORS {
        return Err(Status::InvalidArg);
    }
    critical_section::with(|cs| {
        let mut table = TABLE.borrow(cs).borrow_mut();
        if table[vec].is_some() {
            return Err(Status::Busy);
        }
        table[vec] = Some(Entry { handler, arg: arg as usize, enabled: true });
        Ok(())
    })
}

pub fn unregister_handler(vec: usize) {
    if vec >= vector::VECTORS {
        return;
    }
    critical_section::with(|cs| {
        TABLE.borrow(cs).borrow_mut()[vec] = None;
    });
}

pub fn claimed(vec: usize) -> bool {
    vec < vector::VECTORS && critical_section::with(|cs| TABLE.borrow(cs).borrow()[vec].is_some())
}

fn set_enabled(vec: usize, enabled: bool) {
    if vec >= vector::VECTORS {
        return;
    }
    critical_section::with(|cs| {
        if let Some(entry) = TABLE.borrow(cs).borrow_mut()[vec].as_mut() {
            entry.enabled = enabled;
        }
    });
}

/// Vectors start enabled when claimed; these mask one without losing the
/// claim.
pub fn enable(vec: usize) {
    set_enabled(vec, true);
}

pub fn disable(vec: usize) {
    set_enabled(vec, false);
}

/// Run the handler claimed for `vec`, if any. The entry is copied out of
/// the table first so the handler itself may claim or release vectors.
pub fn dispatch(vec: usize) -> bool {
    if vec >= vector::VECTORS {
        return false;
    }
    let entry = critical_section::with(|cs| TABLE.borrow(cs).borrow()[vec]);
    match entry {
        Some(e) if e.enabled => {
            (e.handler)(vec, e.arg as *mut usize);
            true
        }
        _ => false,
    }
}

/// Simulate a hardware event by running the claimed handler directly.
#[cfg(not(target_os = "none"))]
pub fn trigger(vec: usize) -> bool {
    dispatch(vec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use hatra::hosted;

    // One counter per test; the claim table is crate-global and the
    // harness runs tests in parallel, so tests must not share vectors.
    static DISPATCH_HITS: AtomicUsize = AtomicUsize::new(0);
    static MASKED_HITS: AtomicUsize = AtomicUsize::new(0);

    fn count_dispatch(_vec: usize, _arg: *mut usize) {
        DISPATCH_HITS.fetch_add(1, Ordering::SeqCst);
    }

    fn count_masked(_vec: usize, _arg: *mut usize) {
        MASKED_HITS.fetch_add(1, Ordering::SeqCst);
    }

    fn noop(_vec: usize, _arg: *mut usize) {}

    #[test]
    fn init_opens_all_level_groups() {
        init();
        assert_eq!(hosted::peek(pmic::HW_PMIC_BASE, pmic::CTRL.offset()), 0b111);
        disable_level(Level::Medium);
        assert_eq!(hosted::peek(pmic::HW_PMIC_BASE, pmic::CTRL.offset()), 0b101);
        enable_round_robin();
        assert_eq!(hosted::peek(pmic::HW_PMIC_BASE, pmic::CTRL.offset()), 0b101 | (1 << 7));
    }

    #[test]
    fn claim_is_exclusive() {
        let vec = vector::ADCA_CH0;
        register_handler(vec, noop, core::ptr::null_mut()).unwrap();
        assert_eq!(register_handler(vec, noop, core::ptr::null_mut()), Err(Status::Busy));
        assert!(claimed(vec));
        unregister_handler(vec);
        assert!(!claimed(vec));
    }

    #[test]
    fn dispatch_runs_claimed_handler_only() {
        let vec = vector::TCC0_ERR;
        assert!(!dispatch(vec));
        register_handler(vec, count_dispatch, core::ptr::null_mut()).unwrap();
        assert!(dispatch(vec));
        assert_eq!(DISPATCH_HITS.load(Ordering::SeqCst), 1);
        unregister_handler(vec);
        assert!(!dispatch(vec));
    }

    #[test]
    fn masked_vector_keeps_its_claim() {
        let vec = vector::USARTC0_RXC;
        register_handler(vec, count_masked, core::ptr::null_mut()).unwrap();
        disable(vec);
        assert!(!trigger(vec));
        assert!(claimed(vec));
        enable(vec);
        assert!(trigger(vec));
        assert_eq!(MASKED_HITS.load(Ordering::SeqCst), 1);
        unregister_handler(vec);
    }

    #[test]
    fn rejects_bad_vectors() {
        assert_eq!(
            register_handler(vector::VECTORS, noop, core::ptr::null_mut()),
            Err(Status::InvalidArg)
        );
        assert!(!dispatch(vector::VECTORS));
    }
}
