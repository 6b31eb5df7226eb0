//! Subcommand implementations.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tempinbox_core::{DeliveryService, Envelope, InboxConfig, InboxRepository};
use tempinbox_mime::Decoder;

/// Resolves the database path, creating the default data directory.
pub fn database_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tempinbox");
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating {}", data_dir.display()))?;

    Ok(data_dir.join("inbox.db"))
}

/// Reads a raw message from a file, or stdin for `-`.
///
/// Bytes that are not valid UTF-8 are replaced.
pub fn read_raw(path: &Path) -> Result<String> {
    let bytes = if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("reading message from stdin")?;
        buf
    } else {
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))?
    };

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Rejects input over the raw-size budget before any decoding.
pub fn check_raw_size(config: &InboxConfig, raw: &str) -> Result<()> {
    if raw.len() > config.max_raw_bytes {
        bail!(
            "message is {} bytes, over the {}-byte limit",
            raw.len(),
            config.max_raw_bytes
        );
    }
    Ok(())
}

/// Decodes a raw message and prints it as JSON.
pub fn decode(config: &InboxConfig, file: &Path, pretty: bool) -> Result<()> {
    let raw = read_raw(file)?;
    check_raw_size(config, &raw)?;
    let email = Decoder::new(config.decoder.clone()).decode_message(&raw);

    let json = if pretty {
        serde_json::to_string_pretty(&email)?
    } else {
        serde_json::to_string(&email)?
    };
    print_line(&json)
}

/// Delivers a raw message and prints the stored summary.
pub async fn deliver(
    config: &InboxConfig,
    db: &Path,
    from: &str,
    to: &str,
    file: &Path,
) -> Result<()> {
    let raw = read_raw(file)?;
    let service = DeliveryService::new(config, open_repository(config, db).await?);

    let delivered = service.deliver(&Envelope::new(from, to), &raw).await?;
    print_line(&serde_json::to_string_pretty(
        &delivered.email.summary(delivered.key),
    )?)
}

/// Prints the live messages for an address, newest first.
pub async fn list(config: &InboxConfig, db: &Path, address: &str, summary: bool) -> Result<()> {
    let repo = open_repository(config, db).await?;

    let json = if summary {
        serde_json::to_string_pretty(&repo.list_summaries(address).await?)?
    } else {
        serde_json::to_string_pretty(&repo.list(address).await?)?
    };
    print_line(&json)
}

/// Deletes expired messages and prints how many were removed.
pub async fn purge(config: &InboxConfig, db: &Path) -> Result<()> {
    let repo = open_repository(config, db).await?;
    let removed = repo.purge_expired().await?;
    tracing::info!(removed, "Purge finished");
    print_line(&removed.to_string())
}

async fn open_repository(config: &InboxConfig, db: &Path) -> Result<InboxRepository> {
    let path = db
        .to_str()
        .with_context(|| format!("database path is not UTF-8: {}", db.display()))?;
    InboxRepository::new(path, config.retention)
        .await
        .with_context(|| format!("opening inbox database {path}"))
}

fn print_line(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    Ok(())
}
