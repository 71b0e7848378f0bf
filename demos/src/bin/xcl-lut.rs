//! XMEGA custom logic on the E5 Xplained: LUT0 computes the XOR of two
//! port pins, while the BTC0 timer half underflows at a fixed rate and
//! paces the LED through the software timeout service.

use std::process;

use hal_api::{PinOps, Status};
use hatra::hosted::{self, Access, HookAction};
use hatra::xmega::{usart as usart_map, xcl as xcl_map};
use timeout::Timeout;
use xmega_hal::board::xmega_e5_xplained as board;
use xmega_hal::xcl::{
    ClockSource, CommandTarget, LutConfig, LutInput, LutOutput, PortSel, TcMode, TcType,
    TimerUnit, Truth, Xcl,
};

static SOFT: Timeout = Timeout::new();

/// Soft timer channels over the underflow tick.
const LED_BLINK: usize = 0;
const RUN_TIME: usize = 1;

const BLINKS_WANTED: u32 = 8;

/// Underflow tick model: every third look at the flags register reports
/// a fresh BTC0 underflow until it is acknowledged.
fn install_tick_model() {
    let base = xcl_map::HW_XCL_BASE;
    let mut reads = 0u32;
    let mut pending = false;
    hosted::install_hook(
        base,
        Box::new(move |off, access| {
            match access {
                Access::Read if off == xcl_map::INTFLAGS.offset() => {
                    reads += 1;
                    if reads % 3 == 0 {
                        pending = true;
                    }
                    return HookAction::Replace(pending as usize);
                }
                Access::Write(v) if off == xcl_map::INTFLAGS.offset() => {
                    if v & 1 != 0 {
                        pending = false;
                    }
                    return HookAction::Replace(0);
                }
                _ => {}
            }
            HookAction::Pass
        }),
    );
}

fn run() -> Result<(), Status> {
    demos::xmega_clock_model();
    demos::xmega_console_model(usart_map::HW_USARTC0_BASE);
    install_tick_model();

    board::init()?;
    let mut console = board::init_console()?;
    console.write_line("-- XCL glue logic --")?;

    let mut led = board::led0()?;
    let mut logic = Xcl::new();
    logic.enable(ClockSource::Synchronous)?;

    // LUT0: XOR of the low and high pin inputs, routed back out on pin 0
    logic.select_port(PortSel::D);
    logic.lut_type(LutConfig::TwoLut2In);
    logic.lut_in0(LutInput::PinLow);
    logic.lut_in1(LutInput::PinHigh);
    logic.lut0_truth(Truth::Xor);
    logic.lut0_output(LutOutput::Pin0);
    let truth = hosted::peek(xcl_map::HW_XCL_BASE, xcl_map::CTRLD.offset()) & 0xF;
    console.write_line(&format!("LUT0 truth table {:#x}, output on pin 0", truth))?;

    // BTC0 underflow as the tick source for the soft timers
    logic.tc_type(TcType::Btc0);
    logic.tc_mode(TcMode::Normal);
    let tick_hz = logic.tc_set_resolution(board::PER_HZ, 500_000);
    logic.btc_write_period(TimerUnit::T0, 124);
    logic.btc_write_count(TimerUnit::T0, 124);
    logic.tc_restart(CommandTarget::Timer0);
    console.write_line(&format!("timer resolution {} Hz", tick_hz))?;

    SOFT.start_periodic(LED_BLINK, 2);
    SOFT.start_singleshot(RUN_TIME, 2 * BLINKS_WANTED);

    let mut blinks = 0u32;
    for _ in 0..200 {
        if !logic.underflow_pending(TimerUnit::T0) {
            continue;
        }
        logic.clear_underflow(TimerUnit::T0);
        SOFT.tick();
        if SOFT.test_and_clear_expired(LED_BLINK) {
            led.toggle();
            blinks += 1;
        }
        if SOFT.test_and_clear_expired(RUN_TIME) {
            break;
        }
    }
    SOFT.stop(LED_BLINK);
    logic.disable();

    console.write_line(&format!("LED blinked {} times", blinks))?;
    if blinks < BLINKS_WANTED {
        return Err(Status::Timeout);
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("xcl-lut: {:?}", e);
        process::exit(1);
    }
}
