// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # UniPal Store
//!
//! Persistence for the sync pipeline:
//!
//! - [`CacheStore`], a namespaced cache with write timestamps,
//!   self-healing reads, and a fetch-through policy
//! - [`KeyValueStorage`] with file-backed and in-memory implementations
//! - [`SecureCredentialStore`] over the system keychain

pub mod cache;
pub mod error;
pub mod secure;
pub mod storage;

pub use cache::{CacheEntry, CacheStore, FetchPolicy};
pub use error::StoreError;
pub use secure::{
    CredentialStorage, KeyringStorage, MemoryCredentialStorage, SecureCredentialStore,
};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
