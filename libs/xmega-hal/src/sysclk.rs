//! System clock control: source selection, prescalers and per-module
//! clock gates.
//!
//! `CLK.CTRL` and `CLK.PSCTRL` sit behind the configuration change
//! protection port, so every write to them goes through [`ccp_io_write`].

use hal_api::{poll_timeout, Status, POLL_LIMIT};
use hatra::xmega::{clk, cpu, osc, pr};
use hatra::{periph_base, CSR, Register};

/// Clock sources in `SCLKSEL` encoding; the same value is the bit position
/// of the source in `OSC.CTRL` and `OSC.STATUS`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClockSource {
    Rc2M = 0,
    Rc32M = 1,
    Rc32K = 2,
    Xosc = 3,
    Pll = 4,
}

/// Prescaler A division, `PSADIV` encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrescalerA {
    Div1 = 0,
    Div2 = 1,
    Div4 = 3,
    Div8 = 5,
    Div16 = 7,
    Div32 = 9,
    Div64 = 11,
    Div128 = 13,
    Div256 = 15,
    Div512 = 17,
}

/// Combined B and C prescaler division, `PSBCDIV` encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrescalerBc {
    Div1_1 = 0,
    Div1_2 = 1,
    Div4_1 = 2,
    Div2_2 = 3,
}

/// Clock domain a module gate lives in: the general register or one
/// per-port register.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Port {
    Gen = 0,
    A = 1,
    B = 2,
    C = 3,
    D = 4,
    E = 5,
    F = 6,
}

/// RTC clock source, `RTCSRC` encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RtcSource {
    Ulp1K = 0,
    Tosc1K = 1,
    Rcosc1K = 2,
    Tosc32K = 5,
    ExtClk = 6,
    Rcosc32K = 7,
}

fn clk_csr() -> CSR<u8> {
    CSR::new(periph_base::<u8>(clk::HW_CLK_BASE, clk::CLK_NUMREGS))
}

fn osc_csr() -> CSR<u8> {
    CSR::new(periph_base::<u8>(osc::HW_OSC_BASE, osc::OSC_NUMREGS))
}

fn pr_csr() -> CSR<u8> {
    CSR::new(periph_base::<u8>(pr::HW_PR_BASE, pr::PR_NUMREGS))
}

const PR_REGS: [Register; 7] =
    [pr::PRGEN, pr::PRPA, pr::PRPB, pr::PRPC, pr::PRPD, pr::PRPE, pr::PRPF];

/// Write a protected I/O register. The CCP signature opens a four cycle
/// window and the payload write must be the next I/O access, so the pair
/// runs with interrupts masked.
pub fn ccp_io_write(target: &mut CSR<u8>, reg: Register, value: u8) {
    let mut ccp: CSR<u8> = CSR::new(periph_base::<u8>(cpu::HW_CPU_BASE, cpu::CPU_NUMREGS));
    critical_section::with(|_| {
        ccp.wo(cpu::CCP, cpu::CCP_IOREG as u8);
        target.wo(reg, value);
    });
}

/// Reset-state bringup: undivided clocks on the 2 MHz RC oscillator, and
/// every peripheral clock gated off. Drivers re-enable the gates they need
/// through [`enable_module`].
pub fn init() {
    let mut c = clk_csr();
    ccp_io_write(&mut c, clk::PSCTRL, 0);
    ccp_io_write(&mut c, clk::CTRL, ClockSource::Rc2M as u8);
    let mut p = pr_csr();
    for reg in PR_REGS {
        p.wo(reg, reg.mask() as u8);
    }
}

pub fn enable_osc(source: ClockSource) {
    let mut o = osc_csr();
    let v = o.r(osc::CTRL) | (1u8 << source as u8);
    o.wo(osc::CTRL, v);
}

pub fn disable_osc(source: ClockSource) {
    let mut o = osc_csr();
    let v = o.r(osc::CTRL) & !(1u8 << source as u8);
    o.wo(osc::CTRL, v);
}

pub fn osc_ready(source: ClockSource) -> bool {
    osc_csr().r(osc::STATUS) & (1u8 << source as u8) != 0
}

pub fn wait_osc_ready(source: ClockSource) -> Result<(), Status> {
    poll_timeout(POLL_LIMIT, || osc_ready(source))
}

/// Switch the system clock. The new source must already be running; callers
/// go through [`enable_osc`] and [`wait_osc_ready`] first.
pub fn set_source(source: ClockSource) -> Result<(), Status> {
    if !osc_ready(source) {
        return Err(Status::Error);
    }
    ccp_io_write(&mut clk_csr(), clk::CTRL, source as u8);
    Ok(())
}

/// Raw `SCLKSEL` value, comparable against `ClockSource as u8`.
pub fn current_source() -> u8 {
    clk_csr().rf(clk::CTRL_SCLKSEL)
}

pub fn set_prescalers(div_a: PrescalerA, div_bc: PrescalerBc) {
    let mut c = clk_csr();
    let v = c.ms(clk::PSCTRL_PSADIV, div_a as u8) | c.ms(clk::PSCTRL_PSBCDIV, div_bc as u8);
    ccp_io_write(&mut c, clk::PSCTRL, v);
}

/// Open a peripheral clock gate. `bit` is one of the `hatra::xmega::pr`
/// bit positions valid for the port.
pub fn enable_module(port: Port, bit: usize) {
    let reg = PR_REGS[port as usize];
    let mut p = pr_csr();
    let v = p.r(reg) & !(1 << bit);
    p.wo(reg, v);
}

/// Gate a peripheral clock off again.
pub fn disable_module(port: Port, bit: usize) {
    let reg = PR_REGS[port as usize];
    let mut p = pr_csr();
    let v = p.r(reg) | (1 << bit);
    p.wo(reg, v);
}

pub fn module_enabled(port: Port, bit: usize) -> bool {
    pr_csr().r(PR_REGS[port as usize]) & (1 << bit) == 0
}

/// Route a clock to the RTC prescaler and enable it.
pub fn set_rtc_source(source: RtcSource) {
    let mut c = clk_csr();
    let v = c.ms(clk::RTCCTRL_RTCSRC, source as u8) | c.ms(clk::RTCCTRL_RTCEN, 1);
    c.wo(clk::RTCCTRL, v);
}

pub fn disable_rtc_clock() {
    clk_csr().wo(clk::RTCCTRL, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatra::hosted;

    #[test]
    fn init_gates_every_peripheral_clock() {
        init();
        assert_eq!(hosted::peek(clk::HW_CLK_BASE, clk::CTRL.offset()), ClockSource::Rc2M as usize);
        assert_eq!(hosted::peek(clk::HW_CLK_BASE, clk::PSCTRL.offset()), 0);
        for reg in PR_REGS {
            assert_eq!(hosted::peek(pr::HW_PR_BASE, reg.offset()), reg.mask());
        }
        assert!(!module_enabled(Port::C, pr::PR_TC0));
    }

    #[test]
    fn protected_write_leads_with_the_signature() {
        // the CCP port must carry the I/O signature when the payload lands
        ccp_io_write(&mut clk_csr(), clk::PSCTRL, 0x03);
        assert_eq!(hosted::peek(cpu::HW_CPU_BASE, cpu::CCP.offset()), cpu::CCP_IOREG);
        assert_eq!(hosted::peek(clk::HW_CLK_BASE, clk::PSCTRL.offset()), 0x03);
    }

    #[test]
    fn source_switch_requires_a_ready_oscillator() {
        assert_eq!(set_source(ClockSource::Rc32M), Err(Status::Error));
        enable_osc(ClockSource::Rc32M);
        assert_eq!(
            hosted::peek(osc::HW_OSC_BASE, osc::CTRL.offset()),
            1 << ClockSource::Rc32M as usize
        );
        hosted::poke_or(osc::HW_OSC_BASE, osc::STATUS.offset(), 1 << ClockSource::Rc32M as usize);
        set_source(ClockSource::Rc32M).unwrap();
        assert_eq!(current_source(), ClockSource::Rc32M as u8);
    }

    #[test]
    fn module_gates_toggle_single_bits() {
        init();
        enable_module(Port::C, pr::PR_USART0);
        enable_module(Port::C, pr::PR_TC0);
        let prpc = hosted::peek(pr::HW_PR_BASE, pr::PRPC.offset());
        assert_eq!(prpc, pr::PRPC.mask() & !(1 << pr::PR_USART0) & !(1 << pr::PR_TC0));
        assert!(module_enabled(Port::C, pr::PR_USART0));
        disable_module(Port::C, pr::PR_USART0);
        assert!(!module_enabled(Port::C, pr::PR_USART0));
        assert!(module_enabled(Port::C, pr::PR_TC0));
    }

    #[test]
    fn rtc_clock_carries_source_and_enable() {
        set_rtc_source(RtcSource::Tosc32K);
        let v = hosted::peek(clk::HW_CLK_BASE, clk::RTCCTRL.offset());
        assert_eq!(v, (RtcSource::Tosc32K as usize) << 1 | 1);
        disable_rtc_clock();
        assert_eq!(hosted::peek(clk::HW_CLK_BASE, clk::RTCCTRL.offset()), 0);
    }
}
