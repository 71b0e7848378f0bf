//! Calendar alarm on the UC3L evaluation kit: the asynchronous timer
//! keeps wall-clock time off the 32 kHz crystal, wakes the core through
//! alarm 0 and trims its rate with the digital tuner.

use std::process;

use hal_api::Status;
use hatra::hosted::{self, Access, HookAction};
use hatra::uc3::{ast as ast_map, pm as pm_map, usart as usart_map};
use sleepmgr::uc3::{self as sleep, SleepMode};
use uc3_hal::ast::{Ast, AstFlags, Calendar, ClockSource};
use uc3_hal::board::uc3l_ek as board;
use uc3_hal::pm::{Bus, Pm};

/// Trim target for the digital tuner, a little above the crystal.
const TUNED_HZ: u32 = 32_800;

fn pack_calendar(datetime: &Calendar) -> u32 {
    let field = |f: hatra::Field, v: u8| ((v as usize & f.mask()) << f.offset()) as u32;
    field(ast_map::CALV_SEC, datetime.second)
        | field(ast_map::CALV_MIN, datetime.minute)
        | field(ast_map::CALV_HOUR, datetime.hour)
        | field(ast_map::CALV_DAY, datetime.day)
        | field(ast_map::CALV_MONTH, datetime.month)
        | field(ast_map::CALV_YEAR, datetime.year)
}

/// Once alarm 0 is armed, let it fire after a handful of status reads,
/// advancing the calendar to the match value like real silicon would,
/// and fold acknowledge writes back into the status register.
fn install_alarm_model() {
    let base = ast_map::HW_AST_BASE;
    let mut alarm_value = None;
    let mut reads = 0u32;
    hosted::install_hook(
        base,
        Box::new(move |off, access| {
            match access {
                Access::Write(v) if off == ast_map::AR0.offset() => alarm_value = Some(v),
                Access::Read if off == ast_map::SR.offset() => {
                    if let Some(at) = alarm_value {
                        reads += 1;
                        if reads == 6 {
                            hosted::poke(base, ast_map::CALV.offset(), at);
                            hosted::poke_or(base, ast_map::SR.offset(), 1 << 8);
                        }
                    }
                }
                Access::Write(v) if off == ast_map::SCR.offset() => {
                    let sr = hosted::peek(base, ast_map::SR.offset());
                    hosted::poke(base, ast_map::SR.offset(), sr & !v);
                    return HookAction::Replace(0);
                }
                _ => {}
            }
            HookAction::Pass
        }),
    );
}

fn run() -> Result<(), Status> {
    demos::uc3_clock_model();
    demos::uc3_console_model(usart_map::HW_USART1_BASE, &[]);
    install_alarm_model();

    board::init_clocks()?;
    let mut console = board::init_console()?;
    console.write_line("-- AST calendar alarm --")?;

    sleep::SLEEPMGR.init();
    let mut pm = Pm::new();
    pm.enable_module(Bus::Pba, pm_map::PBA_AST_BIT);

    let mut timer = Ast::new();
    let now = Calendar { year: 26, month: 8, day: 25, hour: 14, minute: 0, second: 0 };
    timer.init_calendar(ClockSource::Osc32, 0, &now)?;
    timer.configure_digital_tuner(board::OSC32_HZ, TUNED_HZ)?;
    console.write_line(&format!("tuner trimming {} Hz towards {} Hz", board::OSC32_HZ, TUNED_HZ))?;

    let alarm = Calendar { minute: 1, ..now };
    timer.set_alarm0(pack_calendar(&alarm))?;
    timer.enable_interrupt(AstFlags::ALARM0);
    timer.enable_wake(AstFlags::ALARM0);
    timer.enable()?;
    console.write_line(&format!(
        "alarm armed for {:02}:{:02}:{:02}",
        alarm.hour, alarm.minute, alarm.second
    ))?;

    // the console holds the core at Idle until the alarm has fired
    sleep::lock(SleepMode::Idle);
    console.write_line(&format!("deepest sleep for the wait: {:?}", sleep::deepest_allowed()))?;

    let mut fired = false;
    for _ in 0..50 {
        if timer.status().contains(AstFlags::ALARM0) {
            timer.clear(AstFlags::ALARM0)?;
            fired = true;
            break;
        }
    }
    sleep::unlock(SleepMode::Idle);
    if !fired {
        log::warn!("alarm never fired");
        return Err(Status::Timeout);
    }

    let at = timer.calendar();
    console.write_line(&format!(
        "woke on alarm at {:02}:{:02}:{:02}",
        at.hour, at.minute, at.second
    ))?;
    console.write_line(&format!("deepest sleep now: {:?}", sleep::deepest_allowed()))?;
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("ast-alarm: {:?}", e);
        process::exit(1);
    }
}
