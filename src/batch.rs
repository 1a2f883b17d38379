//! Dated transfer-batch settlement.
//!
//! A batch is one pending file named `transactions-<yyyyMMdd>-pending.csv`.
//! The processor reads the whole file up front, settles every row in order
//! against the client ledger, writes a completed file and a failed file for
//! the same date, persists the ledger once, and deletes the consumed input.
//!
//! Rejections are data: every row ends up in exactly one of the two output
//! files, so `completed + failed == pending` always holds. Structural
//! problems (unreadable file, malformed row) abort the run before any
//! ledger mutation for that batch.

use crate::client::ClientLedger;
use crate::decimal::Decimal2;
use crate::error::{BackofficeError, Result};
use crate::tariff::tariff;
use crate::transaction::{Transaction, TransactionResult, TransactionType};
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Common filename prefix of every batch file.
pub const BATCH_PREFIX: &str = "transactions-";

/// Suffix of pending batch files.
pub const PENDING_SUFFIX: &str = "-pending.csv";

/// Suffix of completed output files.
pub const COMPLETED_SUFFIX: &str = "-completed.csv";

/// Suffix of failed output files.
pub const FAILED_SUFFIX: &str = "-failed.csv";

/// Extracts the batch date from a pending file name.
///
/// Only names matching `transactions-<yyyyMMdd>-pending.csv` exactly parse;
/// anything else yields `None` and the file is left alone.
pub fn batch_date(file_name: &str) -> Option<NaiveDate> {
    let stamp = file_name
        .strip_prefix(BATCH_PREFIX)?
        .strip_suffix(PENDING_SUFFIX)?;
    if stamp.len() != 8 || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(stamp, "%Y%m%d").ok()
}

/// Outcome counts for one settled batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Booking date taken from the pending file name
    pub date: NaiveDate,

    /// Transactions written to the completed file
    pub completed: usize,

    /// Transactions written to the failed file
    pub failed: usize,
}

/// Settles pending batches against a [`ClientLedger`].
///
/// Holds the fixed local bank code and the three stage directories. All
/// state is explicit; nothing global.
pub struct BatchProcessor {
    local_bank: u32,
    pending_dir: PathBuf,
    completed_dir: PathBuf,
    failed_dir: PathBuf,
}

impl BatchProcessor {
    /// Creates a processor for the given bank code and stage directories.
    pub fn new(
        local_bank: u32,
        pending_dir: impl Into<PathBuf>,
        completed_dir: impl Into<PathBuf>,
        failed_dir: impl Into<PathBuf>,
    ) -> Self {
        BatchProcessor {
            local_bank,
            pending_dir: pending_dir.into(),
            completed_dir: completed_dir.into(),
            failed_dir: failed_dir.into(),
        }
    }

    /// Settles every matching pending file, oldest batch first.
    ///
    /// Files whose names do not parse against the batch pattern are skipped
    /// with a warning. Stops at the first structural error.
    pub fn run(&self, ledger: &mut ClientLedger) -> Result<Vec<BatchReport>> {
        let mut batches: Vec<(NaiveDate, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&self.pending_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            match batch_date(&name) {
                Some(date) => batches.push((date, entry.path())),
                None => warn!("skipping {}: name does not match batch pattern", name),
            }
        }
        batches.sort();

        let mut reports = Vec::with_capacity(batches.len());
        for (date, path) in batches {
            reports.push(self.process_batch(ledger, date, &path)?);
        }
        Ok(reports)
    }

    /// Settles one pending file and writes its two output files.
    fn process_batch(
        &self,
        ledger: &mut ClientLedger,
        date: NaiveDate,
        path: &Path,
    ) -> Result<BatchReport> {
        // Parse everything before touching the ledger: a malformed row must
        // not leave a half-applied batch behind.
        let pending = read_transactions(path)?;
        let total = pending.len();

        let mut completed = Vec::new();
        let mut failed = Vec::new();
        for transaction in pending {
            match self.settle(ledger, &transaction, date) {
                Ok(()) => completed.push(transaction),
                Err(result) => {
                    debug!("rejected {:?}: {}", transaction, result);
                    failed.push((transaction, result));
                }
            }
        }

        let stamp = date.format("%Y%m%d");
        write_completed(
            &self
                .completed_dir
                .join(format!("{}{}{}", BATCH_PREFIX, stamp, COMPLETED_SUFFIX)),
            &completed,
        )?;
        write_failed(
            &self
                .failed_dir
                .join(format!("{}{}{}", BATCH_PREFIX, stamp, FAILED_SUFFIX)),
            &failed,
        )?;
        ledger.save()?;
        fs::remove_file(path)?;

        info!(
            "batch {}: {} completed, {} failed of {}",
            date,
            completed.len(),
            failed.len(),
            total
        );
        Ok(BatchReport {
            date,
            completed: completed.len(),
            failed: failed.len(),
        })
    }

    /// Settles a single transaction against the ledger.
    ///
    /// Four mutually exclusive cases on which legs are local. A transaction
    /// with no local leg passes through untouched. The source is always
    /// validated before the target, the debit covers amount plus tariff,
    /// and the target credit cannot fail once the target is validated.
    fn settle(
        &self,
        ledger: &mut ClientLedger,
        transaction: &Transaction,
        date: NaiveDate,
    ) -> std::result::Result<(), TransactionResult> {
        let source_local = transaction.source_bank == self.local_bank;
        let target_local = transaction.target_bank == self.local_bank;

        if !source_local && !target_local {
            return Ok(());
        }

        if source_local {
            match ledger.get(transaction.source_branch, transaction.source_account) {
                Some(client) if client.is_active() => {}
                _ => return Err(TransactionResult::InvalidSource),
            }
        }
        if target_local {
            match ledger.get(transaction.target_branch, transaction.target_account) {
                Some(client) if client.is_active() => {}
                _ => return Err(TransactionResult::InvalidTarget),
            }
        }

        // TEF never leaves the bank.
        if transaction.kind == TransactionType::Tef && !(source_local && target_local) {
            return Err(TransactionResult::InvalidType);
        }

        if source_local {
            let debit = transaction.amount + tariff(transaction.kind, date, transaction.amount);
            // Safety: source validated above
            let source = ledger
                .get_mut(transaction.source_branch, transaction.source_account)
                .expect("source validated");
            if !source.modify_balance(-debit) {
                return Err(TransactionResult::InsufficientBalance);
            }
        }
        if target_local {
            // Safety: target validated above
            let target = ledger
                .get_mut(transaction.target_branch, transaction.target_account)
                .expect("target validated");
            let credited = target.modify_balance(transaction.amount);
            debug_assert!(credited, "crediting an active client cannot fail");
        }
        Ok(())
    }
}

/// Reads a whole pending file into memory.
///
/// Any row that fails to parse, or carries a negative amount, is a
/// structural error.
fn read_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let mut transactions = Vec::new();
    for (idx, row) in reader.deserialize::<Transaction>().enumerate() {
        let transaction = row?;
        if transaction.amount < Decimal2::ZERO {
            return Err(BackofficeError::NegativeAmount {
                path: path.display().to_string(),
                row: idx + 1,
            });
        }
        transactions.push(transaction);
    }
    Ok(transactions)
}

fn write_completed(path: &Path, completed: &[Transaction]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    for transaction in completed {
        writer.serialize(transaction)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes each rejected transaction as its row immediately followed by a
/// single-field row holding the result name.
fn write_failed(path: &Path, failed: &[(Transaction, TransactionResult)]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(BufWriter::new(file));
    for (transaction, result) in failed {
        writer.serialize(transaction)?;
        writer.write_record([result.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
