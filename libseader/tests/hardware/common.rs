#![cfg(feature = "serial")]

//! Helpers for tests against a real reader. The port comes from
//! `SEADER_PORT`; without it the tests pass without doing anything.

use libseader::worker::{Running, SeaderWorker, WorkerBuilder};
use libseader::Result;

pub const PORT_ENV: &str = "SEADER_PORT";

/// Open the reader named by `SEADER_PORT` and start a worker on it.
///
/// - Ok(Some(worker)) : port opened and threads running
/// - Ok(None) : no port configured (CI)
/// - Err(e) : the port could not be opened
pub fn open_worker() -> Result<Option<SeaderWorker<Running>>> {
    let Ok(path) = std::env::var(PORT_ENV) else {
        return Ok(None);
    };
    let worker = WorkerBuilder::new().with_serial_port(&path)?.build()?.start()?;
    Ok(Some(worker))
}
