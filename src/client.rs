//! Client record and the ledger domain layer.
//!
//! The ledger wraps a [`KeyedStore`] of clients keyed by `(branch, account)`
//! and is the only place client records are created or mutated. Balance
//! changes go through [`Client::modify_balance`] without exception, so the
//! non-negative-balance and inactive-client invariants hold everywhere.

use crate::cpf::Cpf;
use crate::decimal::Decimal2;
use crate::error::{BackofficeError, Result};
use crate::store::{Keyed, KeyedStore};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The branch new accounts are allocated in.
pub const HOME_BRANCH: u32 = 1;

/// Account numbers per branch; accounts are always below this.
const BRANCH_CAPACITY: u32 = 1_000_000;

/// One client of the bank.
///
/// Field order matches the persisted column order:
/// `branch,account,balance,active,name,cpf-base`.
///
/// # Invariants
///
/// - `balance >= 0` while the client is active
/// - deactivation is monotone: once inactive, never active again
/// - clients are never deleted, only deactivated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Branch number of this account
    pub branch: u32,

    /// Account number, unique within the branch, below 1,000,000
    pub account: u32,

    /// Current balance
    pub balance: Decimal2,

    /// Whether the account accepts balance mutations
    pub active: bool,

    /// Account holder's full name
    pub name: String,

    /// Account holder's tax identifier
    pub cpf: Cpf,
}

impl Client {
    /// Returns `true` if the account accepts balance mutations.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Applies `delta` to the balance.
    ///
    /// Returns `false` without mutation if the client is inactive or the
    /// resulting balance would be negative. This is the sole mutation entry
    /// point for balances; every debit and credit goes through it.
    pub fn modify_balance(&mut self, delta: Decimal2) -> bool {
        if !self.active {
            return false;
        }
        let next = self.balance + delta;
        if next.is_negative() {
            return false;
        }
        self.balance = next;
        true
    }

    /// Deactivates the account. Idempotent and irreversible.
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

impl Keyed for Client {
    type Key = (u32, u32);

    fn key(&self) -> (u32, u32) {
        (self.branch, self.account)
    }
}

/// Domain layer over the client store.
pub struct ClientLedger {
    store: KeyedStore<Client>,
}

impl ClientLedger {
    /// Creates a ledger backed by the given file. Call
    /// [`load`](Self::load) before use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ClientLedger {
            store: KeyedStore::new(path),
        }
    }

    /// Reloads every client from the backing file.
    pub fn load(&mut self) -> Result<()> {
        self.store.load()
    }

    /// Persists every client, overwriting the backing file.
    pub fn save(&self) -> Result<()> {
        self.store.save()
    }

    /// Opens a new active account with zero balance in the home branch.
    ///
    /// Draws a uniformly random starting account number and linearly probes
    /// until a free one is found. The probe is bounded: once every slot of
    /// the branch has been tried, the allocation fails with
    /// [`BackofficeError::BranchFull`] instead of looping.
    pub fn new_client(&mut self, name: &str, cpf: Cpf) -> Result<&Client> {
        let mut candidate = rand::thread_rng().gen_range(0..BRANCH_CAPACITY);
        let mut probes: u32 = 0;

        while self.store.contains_key(&(HOME_BRANCH, candidate)) {
            probes += 1;
            if probes >= BRANCH_CAPACITY {
                return Err(BackofficeError::BranchFull {
                    branch: HOME_BRANCH,
                });
            }
            candidate = (candidate + 1) % BRANCH_CAPACITY;
        }

        let client = Client {
            branch: HOME_BRANCH,
            account: candidate,
            balance: Decimal2::ZERO,
            active: true,
            name: name.to_string(),
            cpf,
        };
        self.store.add(client);
        debug!("allocated account {}-{} for {}", HOME_BRANCH, candidate, name);

        // Safety: inserted just above
        Ok(self
            .store
            .get(&(HOME_BRANCH, candidate))
            .expect("client just inserted"))
    }

    /// Looks up a client by branch and account number.
    pub fn get(&self, branch: u32, account: u32) -> Option<&Client> {
        self.store.get(&(branch, account))
    }

    /// Looks up a client for mutation.
    pub fn get_mut(&mut self, branch: u32, account: u32) -> Option<&mut Client> {
        self.store.get_mut(&(branch, account))
    }

    /// Iterates over all clients in row order.
    pub fn clients(&self) -> impl Iterator<Item = &Client> {
        self.store.iter()
    }

    /// Number of client records.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the ledger holds no clients.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Inserts a pre-built client record (for test fixtures).
    #[cfg(test)]
    pub fn add(&mut self, client: Client) -> bool {
        self.store.add(client)
    }
}
