//! Expiring per-recipient inbox.
//!
//! Delivered messages are stored under `email:{recipient}:{arrival millis}`
//! and disappear from every read once their retention has passed.

mod model;
mod repository;

pub use model::{
    Envelope, StoredEmail, StoredEmailSummary, StoredHeaders, normalize_address, storage_key,
};
pub use repository::InboxRepository;
