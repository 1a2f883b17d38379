//! # Back-office Engine
//!
//! A small bank's back office: keyed flat-file stores for clients and
//! users, and a batch processor that settles dated files of pending
//! transfers against the client ledger.
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: 2 decimal places via `rust_decimal`
//! - **Validation as data**: rejections are [`TransactionResult`] values,
//!   never errors; only structural failures abort a run
//! - **One mutation point**: every debit and credit goes through
//!   `Client::modify_balance`, so balances never go negative
//! - **Explicit state**: ledgers, directories and the processor are plain
//!   values passed by reference, no globals
//!
//! ## Example
//!
//! ```no_run
//! use backoffice::{BatchProcessor, ClientLedger};
//!
//! let mut ledger = ClientLedger::new("data/clients.csv");
//! ledger.load().unwrap();
//!
//! let processor = BatchProcessor::new(777, "data/pending", "data/completed", "data/failed");
//! for report in processor.run(&mut ledger).unwrap() {
//!     println!("{}: {} completed, {} failed", report.date, report.completed, report.failed);
//! }
//! ```

pub mod batch;
pub mod client;
pub mod cpf;
pub mod decimal;
pub mod error;
pub mod store;
pub mod tariff;
pub mod transaction;
pub mod user;

pub use batch::{batch_date, BatchProcessor, BatchReport};
pub use client::{Client, ClientLedger, HOME_BRANCH};
pub use cpf::Cpf;
pub use decimal::Decimal2;
pub use error::{BackofficeError, Result};
pub use store::{Keyed, KeyedStore};
pub use tariff::tariff;
pub use transaction::{Transaction, TransactionResult, TransactionType};
pub use user::{User, UserDirectory};
