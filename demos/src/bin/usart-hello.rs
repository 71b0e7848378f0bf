//! RS-232 hello on the UC3L evaluation kit console: banner at 57600 8N1,
//! then echo whatever arrives until the line goes quiet.

use std::process;

use hal_api::Status;
use hatra::uc3::usart as usart_map;
use uc3_hal::board::uc3l_ek as board;
use uc3_hal::usart::UsartOptions;

const BAUD: u32 = 57_600;

fn run() -> Result<(), Status> {
    demos::uc3_clock_model();
    demos::uc3_console_model(usart_map::HW_USART1_BASE, b"Hello from the other end!\r");

    board::init_clocks()?;
    let mut console = board::init_console()?;
    // the kit header talks 57600 8N1 in this demo
    console.init_rs232(&UsartOptions { baudrate: BAUD, ..Default::default() }, board::PBA_HZ)?;

    console.write_line("-- USART RS-232 hello --")?;
    console.write_line("type a line and the board answers back")?;

    let mut echoed = 0u32;
    loop {
        match console.read_char() {
            Ok(b) => {
                console.write_char(b)?;
                if b == b'\r' {
                    console.write_char(b'\n')?;
                }
                echoed += 1;
            }
            Err(Status::Timeout) => break,
            Err(e) => return Err(e),
        }
    }
    log::info!("echoed {} characters", echoed);
    console.write_line("line idle, goodbye")?;
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("usart-hello: {:?}", e);
        process::exit(1);
    }
}
