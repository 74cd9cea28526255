use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "cryptex",
    version,
    about = "Issue and verify tamper-evident, optionally expiring tokens",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Comma-separated key ring, primary first (overrides CRYPTEX_KEYS)
    #[arg(long, global = true)]
    pub keys: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate fresh random keys, one per line
    Keygen {
        /// Number of keys to generate
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },

    /// Encrypt a payload into a token under the primary key
    Encrypt {
        /// Seconds until the token expires (0 = never; overrides CRYPTEX_DEFAULT_TTL_SECS)
        #[arg(long)]
        ttl: Option<u64>,

        /// Payload text; read from stdin when absent
        #[arg(long)]
        data: Option<String>,
    },

    /// Verify a token against the key ring and print its payload
    Decrypt {
        /// Token text
        token: String,

        /// Print expiry and base64url payload as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a token's cleartext header without verifying it
    Inspect {
        /// Token text
        token: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_encrypt_with_ttl() {
        let cli = Cli::try_parse_from(["cryptex", "encrypt", "--ttl", "30", "--data", "hi"]).unwrap();
        match cli.command {
            Commands::Encrypt { ttl, data } => {
                assert_eq!(ttl, Some(30));
                assert_eq!(data.as_deref(), Some("hi"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn keys_flag_is_global() {
        let cli = Cli::try_parse_from(["cryptex", "decrypt", "tok", "--keys", "a,b"]).unwrap();
        assert_eq!(cli.keys.as_deref(), Some("a,b"));
    }

    #[test]
    fn keygen_defaults_to_one() {
        let cli = Cli::try_parse_from(["cryptex", "keygen"]).unwrap();
        assert!(matches!(cli.command, Commands::Keygen { count: 1 }));
    }

    #[test]
    fn decrypt_requires_token() {
        assert!(Cli::try_parse_from(["cryptex", "decrypt"]).is_err());
    }
}
