//! Look for a SAM on a serial reader and print what it reports.
//!
//! Usage:
//!   cargo run -p libseader --example check_sam --features serial -- /dev/ttyACM0

use std::time::Duration;

use anyhow::{Context, bail};
use libseader::transport::SerialTransport;
use libseader::utils::bytes_to_hex;
use libseader::worker::{WorkerBuilder, WorkerEvent};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            println!("available ports:");
            for port in SerialTransport::available_ports()? {
                println!("  {}", port);
            }
            bail!("usage: check_sam <port>");
        }
    };

    let worker = WorkerBuilder::new()
        .with_serial_port(&path)
        .with_context(|| format!("opening {}", path))?
        .build()?
        .start()?;

    worker.check_for_sam()?;
    match worker.events().recv_timeout(Duration::from_secs(5)) {
        Ok(WorkerEvent::SamPresent) => println!("SAM present"),
        Ok(other) => bail!("no usable SAM: {:?}", other),
        Err(_) => bail!("reader did not answer"),
    }

    // version and serial number follow the ATR
    std::thread::sleep(Duration::from_millis(500));
    let info = worker.sam_info();
    match info.version {
        Some(v) => println!("version {} firmware {}", v, bytes_to_hex(&v.firmware)),
        None => println!("version unknown"),
    }
    if let Some(serial) = info.serial {
        println!("serial {}", bytes_to_hex(&serial));
    }

    worker.stop();
    Ok(())
}
