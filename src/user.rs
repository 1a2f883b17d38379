//! Back-office user records and the credential directory.
//!
//! Thin domain layer over a [`KeyedStore`] of users keyed by username. The
//! directory only ever compares opaque salted hashes; the hash scheme lives
//! behind `hash_password` and is not part of the stored format.

use crate::error::Result;
use crate::store::{Keyed, KeyedStore};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// One back-office user.
///
/// Field order matches the persisted column order:
/// `username,salt,hash,active,last_login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique login name, non-empty
    pub username: String,

    /// Random per-password salt, hex-encoded
    salt: String,

    /// Salted password hash, hex-encoded
    hash: String,

    /// Whether this user may log in
    pub active: bool,

    /// Timestamp of the last successful password check
    pub last_login: DateTime<Utc>,
}

impl User {
    fn new(username: &str, pass: &str) -> Self {
        let salt = new_salt();
        let hash = hash_password(&salt, pass);
        User {
            username: username.to_string(),
            salt,
            hash,
            active: true,
            last_login: Utc::now(),
        }
    }

    fn verify(&self, pass: &str) -> bool {
        hash_password(&self.salt, pass) == self.hash
    }

    fn rotate(&mut self, pass: &str) {
        self.salt = new_salt();
        self.hash = hash_password(&self.salt, pass);
    }

    /// Deactivates this user. Idempotent.
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

impl Keyed for User {
    type Key = String;

    fn key(&self) -> String {
        self.username.clone()
    }
}

fn new_salt() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

fn hash_password(salt: &str, pass: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(pass.as_bytes());
    hex::encode(hasher.finalize())
}

/// Domain layer over the user store.
pub struct UserDirectory {
    store: KeyedStore<User>,
}

impl UserDirectory {
    /// Creates a directory backed by the given file. Call
    /// [`load`](Self::load) before use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        UserDirectory {
            store: KeyedStore::new(path),
        }
    }

    /// Reloads every user from the backing file.
    pub fn load(&mut self) -> Result<()> {
        self.store.load()
    }

    /// Persists every user, overwriting the backing file.
    pub fn save(&self) -> Result<()> {
        self.store.save()
    }

    /// Creates an active user with a fresh salt and hash.
    ///
    /// Returns `None` if the username is empty or already taken.
    pub fn new_user(&mut self, username: &str, pass: &str) -> Option<&User> {
        if username.is_empty() || self.store.contains_key(&username.to_string()) {
            return None;
        }
        self.store.add(User::new(username, pass));
        self.store.get(&username.to_string())
    }

    /// Looks up a user by name.
    pub fn get(&self, username: &str) -> Option<&User> {
        self.store.get(&username.to_string())
    }

    /// Checks a password against the stored hash.
    ///
    /// Inactive and unknown users always fail. A successful check stamps
    /// `last_login`.
    pub fn check_pass(&mut self, username: &str, pass: &str) -> bool {
        match self.store.get_mut(&username.to_string()) {
            Some(user) if user.active && user.verify(pass) => {
                user.last_login = Utc::now();
                true
            }
            _ => false,
        }
    }

    /// Replaces a user's salt and hash with ones derived from `pass`.
    ///
    /// Returns `false` for unknown or inactive users.
    pub fn change_pass(&mut self, username: &str, pass: &str) -> bool {
        match self.store.get_mut(&username.to_string()) {
            Some(user) if user.active => {
                user.rotate(pass);
                true
            }
            _ => false,
        }
    }

    /// Deactivates a user. Returns `false` if unknown.
    pub fn deactivate(&mut self, username: &str) -> bool {
        match self.store.get_mut(&username.to_string()) {
            Some(user) => {
                user.deactivate();
                true
            }
            None => false,
        }
    }

    /// Iterates over all users in row order.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.store.iter()
    }
}
