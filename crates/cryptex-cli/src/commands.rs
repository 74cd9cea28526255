//! Command execution over generic input and output streams.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use cryptex::{generate_key, CryptexError, MultiCryptex, TokenParts};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::{Cli, Commands};
use crate::config::{split_keys, Config};

/// Effective settings after merging command-line flags over configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Comma-separated key ring, possibly empty.
    pub keys: String,
    /// TTL used when `encrypt` gets no `--ttl`; `0` disables expiry.
    pub default_ttl_secs: u64,
}

impl Settings {
    /// Flags win over environment configuration.
    pub fn resolve(cli: &Cli, cfg: &Config) -> Self {
        Self {
            keys: cli.keys.clone().unwrap_or_else(|| cfg.keys.clone()),
            default_ttl_secs: cfg.default_ttl_secs,
        }
    }

    fn ring(&self) -> Result<MultiCryptex> {
        if self.keys.trim().is_empty() {
            anyhow::bail!("no keys configured: pass --keys or set CRYPTEX_KEYS");
        }
        let keys = split_keys(&self.keys)?;
        MultiCryptex::new(keys).map_err(|e| tagged(e, "failed to load key ring"))
    }
}

/// JSON body printed by `decrypt --json`.
#[derive(Debug, Serialize)]
struct DecryptOutput {
    expiry: Option<u64>,
    /// URL-safe base64 of the payload bytes.
    payload: String,
}

/// JSON body printed by `inspect`.
#[derive(Debug, Serialize)]
struct InspectOutput {
    expiry: Option<u64>,
    payload_len: usize,
    verified: bool,
}

/// Execute `command`, reading payloads from `input` and writing results to `out`.
///
/// # Errors
///
/// Returns an error tagged with the failure kind if a key or token is rejected.
pub fn run<R: Read, W: Write>(
    command: Commands,
    settings: &Settings,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    match command {
        Commands::Keygen { count } => {
            for _ in 0..count {
                writeln!(out, "{}", generate_key())?;
            }
            info!(count, "keys generated");
        }
        Commands::Encrypt { ttl, data } => {
            let ring = settings.ring()?;
            let payload = match data {
                Some(text) => text.into_bytes(),
                None => {
                    let mut buf = Vec::new();
                    input
                        .read_to_end(&mut buf)
                        .context("failed to read payload from stdin")?;
                    buf
                }
            };
            let ttl = effective_ttl(ttl, settings.default_ttl_secs);
            let token = ring
                .encrypt(&payload, ttl)
                .map_err(|e| tagged(e, "encryption failed"))?;
            writeln!(out, "{token}")?;
            info!(payload_len = payload.len(), ?ttl, "token issued");
        }
        Commands::Decrypt { token, json } => {
            let ring = settings.ring()?;
            let decoded = ring.decrypt_token(&token).map_err(|e| {
                warn!(error = e.kind(), "token rejected");
                tagged(e, "token verification failed")
            })?;
            if json {
                let body = DecryptOutput {
                    expiry: decoded.expiry,
                    payload: URL_SAFE_NO_PAD.encode(&decoded.payload),
                };
                serde_json::to_writer(&mut *out, &body)?;
                writeln!(out)?;
            } else {
                out.write_all(&decoded.payload)?;
            }
        }
        Commands::Inspect { token } => {
            let parts = TokenParts::from_text(&token).map_err(|e| tagged(e, "cannot inspect token"))?;
            let body = InspectOutput {
                expiry: parts.expiry(),
                payload_len: parts.ciphertext.len(),
                verified: false,
            };
            serde_json::to_writer(&mut *out, &body)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// `--ttl` wins over the configured default; zero means no expiry.
fn effective_ttl(flag: Option<u64>, default_secs: u64) -> Option<u64> {
    match flag.unwrap_or(default_secs) {
        0 => None,
        secs => Some(secs),
    }
}

fn tagged(err: CryptexError, what: &str) -> anyhow::Error {
    let kind = err.kind();
    anyhow::Error::new(err).context(format!("{what} [{kind}]"))
}
