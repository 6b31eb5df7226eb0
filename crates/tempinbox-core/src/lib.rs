//! # tempinbox-core
//!
//! Delivery and storage for tempinbox.
//!
//! This crate provides:
//! - **Delivery** - size-checked decoding of raw incoming messages
//! - **Inbox storage** - per-recipient `SQLite` store with time-based expiry
//! - **Configuration** - retention, raw-size budget and decoder caps

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod delivery;
mod error;
pub mod inbox;

pub use config::{DEFAULT_MAX_RAW_BYTES, DEFAULT_RETENTION_SECS, InboxConfig, InboxConfigBuilder};
pub use delivery::{Delivered, DeliveryService};
pub use error::{Error, Result};
pub use inbox::{
    Envelope, InboxRepository, StoredEmail, StoredEmailSummary, StoredHeaders, storage_key,
};
