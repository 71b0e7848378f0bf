//! Keypad scan on the UC3L evaluation kit: the external interrupt
//! controller drives the rows and watches the columns, the demo reports
//! each key and blinks the LED.

use std::collections::VecDeque;
use std::process;

use hal_api::{PinOps, Status};
use hatra::hosted::{self, Access, HookAction};
use hatra::uc3::{eic as eic_map, pm as pm_map, usart as usart_map};
use uc3_hal::board::uc3l_ek as board;
use uc3_hal::eic::{Eic, LineConfig, Trigger};
use uc3_hal::pm::{Bus, Pm};

/// Keypad columns sit on these EIC lines, rows on the scan outputs.
const COLUMN_LINES: [usize; 3] = [3, 4, 5];
const SCAN_PRESCALER: u8 = 5;
const PRESSES_EXPECTED: u32 = 3;

/// Script three key presses: each shows up as a pending column line with
/// the scan output parked on the pressed row.
fn install_keypad_model() {
    let base = eic_map::HW_EIC_BASE;
    let mut script: VecDeque<(usize, usize)> = [(0, 3), (1, 4), (2, 5)].into_iter().collect();
    let mut isr_reads = 0u32;
    hosted::install_hook(
        base,
        Box::new(move |off, access| {
            match access {
                Access::Read if off == eic_map::ISR.offset() => {
                    isr_reads += 1;
                    if isr_reads % 5 == 0 {
                        if let Some((row, line)) = script.pop_front() {
                            let scan = hosted::peek(base, eic_map::SCAN.offset());
                            hosted::poke(base, eic_map::SCAN.offset(), (scan & !(7 << 24)) | (row << 24));
                            hosted::poke_or(base, eic_map::ISR.offset(), 1 << line);
                        }
                    }
                }
                Access::Write(v) if off == eic_map::ICR.offset() => {
                    let isr = hosted::peek(base, eic_map::ISR.offset());
                    hosted::poke(base, eic_map::ISR.offset(), isr & !v);
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
    install_keypad_model();

    board::init_clocks()?;
    let mut console = board::init_console()?;
    console.write_line("-- EIC keypad scan --")?;

    let mut pm = Pm::new();
    pm.enable_module(Bus::Pba, pm_map::PBA_EIC_BIT);

    let mut led = board::led0()?;
    let mut eic_blk = Eic::new();
    let config = LineConfig { trigger: Trigger::FallingEdge, filter: true, asynchronous: false };
    eic_blk.init(&COLUMN_LINES.map(|line| (line, config)))?;
    let column_mask = COLUMN_LINES.iter().fold(0u32, |m, line| m | 1 << line);
    eic_blk.enable_lines(column_mask);
    eic_blk.enable_scan(SCAN_PRESCALER)?;

    let mut presses = 0u32;
    for _ in 0..100 {
        let pending = eic_blk.pending_mask() & column_mask;
        if pending == 0 {
            continue;
        }
        let row = eic_blk.scan_pin();
        for (col, &line) in COLUMN_LINES.iter().enumerate() {
            if pending & (1 << line) != 0 {
                console.write_line(&format!("key at row {} column {}", row, col))?;
                led.toggle();
                presses += 1;
            }
        }
        eic_blk.clear_lines(pending);
        if presses == PRESSES_EXPECTED {
            break;
        }
    }

    eic_blk.disable_scan();
    eic_blk.disable_lines(column_mask);
    if presses < PRESSES_EXPECTED {
        log::warn!("keypad went quiet after {} presses", presses);
        return Err(Status::Timeout);
    }
    console.write_line("scan done")?;
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("eic-keypad: {:?}", e);
        process::exit(1);
    }
}
