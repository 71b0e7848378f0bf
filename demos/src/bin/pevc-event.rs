//! Peripheral events on the UC3L evaluation kit: route the button pad
//! generator to a user channel through the input glitch filter, falling
//! back to a software event when nobody presses anything.

use std::process;

use hal_api::{PinOps, Status};
use hatra::hosted::{self, Access, HookAction};
use hatra::uc3::{pevc as pevc_map, pm as pm_map, usart as usart_map};
use uc3_hal::board::uc3l_ek as board;
use uc3_hal::pevc::{EventShaper, Pevc};
use uc3_hal::pm::{Bus, Pm};

const USER_CHANNEL: usize = 2;
/// PA11, the kit button, as the event system sees it.
const BUTTON_PAD_GENERATOR: usize = 11;

/// Fold the set/clear and software-event strobes into their status
/// registers, the way the hardware plumbs them.
fn install_channel_model() {
    let base = pevc_map::HW_PEVC_BASE;
    hosted::install_hook(
        base,
        Box::new(move |off, access| {
            if let Access::Write(v) = access {
                let fold = |reg: usize, set: bool| {
                    let cur = hosted::peek(base, reg);
                    hosted::poke(base, reg, if set { cur | v } else { cur & !v });
                };
                if off == pevc_map::CHER0.offset() {
                    fold(pevc_map::CHSR0.offset(), true);
                    return HookAction::Replace(0);
                }
                if off == pevc_map::CHDR0.offset() {
                    fold(pevc_map::CHSR0.offset(), false);
                    return HookAction::Replace(0);
                }
                if off == pevc_map::SEV0.offset() {
                    fold(pevc_map::TRSR0.offset(), true);
                    return HookAction::Replace(0);
                }
                if off == pevc_map::TRSCR0.offset() {
                    fold(pevc_map::TRSR0.offset(), false);
                    return HookAction::Replace(0);
                }
            }
            HookAction::Pass
        }),
    );
}

fn run() -> Result<(), Status> {
    demos::uc3_clock_model();
    demos::uc3_console_model(usart_map::HW_USART1_BASE, &[]);
    install_channel_model();

    board::init_clocks()?;
    let mut console = board::init_console()?;
    console.write_line("-- PEVC event routing --")?;

    let mut pm = Pm::new();
    pm.enable_module(Bus::Pba, pm_map::PBA_PEVC_BIT);

    let mut led = board::led0()?;
    let mut ev = Pevc::new();
    ev.set_filter_divider(4)?;
    // a press pulls the pad low
    let shaper = EventShaper { filter: Some(2), on_rising: false, on_falling: true };
    ev.configure_channel(USER_CHANNEL, BUTTON_PAD_GENERATOR, &shaper)?;
    ev.enable_channels(1 << USER_CHANNEL);
    console.write_line(&format!(
        "pad generator {} feeding channel {}",
        BUTTON_PAD_GENERATOR, USER_CHANNEL
    ))?;

    let mut from_pad = true;
    let mut delivered = false;
    for _ in 0..40 {
        if ev.triggered() & (1 << USER_CHANNEL) != 0 {
            delivered = true;
            break;
        }
    }
    if !delivered {
        console.write_line("no pad activity, raising a software event")?;
        from_pad = false;
        ev.use_software_event(USER_CHANNEL)?;
        ev.software_event(USER_CHANNEL)?;
        delivered = ev.triggered() & (1 << USER_CHANNEL) != 0;
    }
    if !delivered {
        log::warn!("event never reached the channel");
        return Err(Status::Timeout);
    }

    led.toggle();
    ev.clear_triggered(1 << USER_CHANNEL);
    console.write_line(&format!(
        "event delivered on channel {} ({})",
        USER_CHANNEL,
        if from_pad { "pad" } else { "software" }
    ))?;
    if ev.overrun() == 0 {
        console.write_line("no overruns")?;
    }
    ev.disable_channels(1 << USER_CHANNEL);
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("pevc-event: {:?}", e);
        process::exit(1);
    }
}
