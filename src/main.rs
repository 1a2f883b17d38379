//! Back-office batch runner
//!
//! Loads the client ledger and settles every pending transfer batch found
//! under the data directory, printing one summary line per batch.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- <data-dir> [bank-code]
//! ```
//!
//! The data directory holds `clients.csv` plus the `pending/`, `completed/`
//! and `failed/` stage directories.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use backoffice::{BackofficeError, BatchProcessor, ClientLedger, Result};
use std::env;
use std::path::Path;
use std::process;

/// Bank code used when none is given on the command line.
const DEFAULT_BANK_CODE: u32 = 777;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(BackofficeError::MissingArgument);
    }

    let data_dir = Path::new(&args[1]);
    let local_bank = match args.get(2) {
        Some(raw) => raw
            .parse()
            .map_err(|_| BackofficeError::InvalidBankCode(raw.clone()))?,
        None => DEFAULT_BANK_CODE,
    };

    let mut ledger = ClientLedger::new(data_dir.join("clients.csv"));
    ledger.load()?;

    let processor = BatchProcessor::new(
        local_bank,
        data_dir.join("pending"),
        data_dir.join("completed"),
        data_dir.join("failed"),
    );
    for report in processor.run(&mut ledger)? {
        println!(
            "{}: {} completed, {} failed",
            report.date, report.completed, report.failed
        );
    }

    Ok(())
}
