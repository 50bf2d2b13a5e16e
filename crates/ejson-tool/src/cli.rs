//! Command-line interface.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ejson_config::KeyMaterial;

/// Create and inspect AES-256-GCM encrypted JSON settings files.
#[derive(Debug, Parser)]
#[command(name = "ejson-tool", version)]
pub struct Cli {
    /// Log level for diagnostics written to stderr
    #[arg(long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a new random base64 key
    Keygen,

    /// Encrypt a JSON settings document
    Encrypt(TransformArgs),

    /// Decrypt a settings file back to JSON
    Decrypt(TransformArgs),

    /// Decrypt a settings file and list its flattened keys and values
    Flatten {
        #[command(flatten)]
        key: KeyArgs,

        /// Encrypted settings file
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Input and output for `encrypt` and `decrypt`.
#[derive(Debug, Args)]
pub struct TransformArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// File to read
    #[arg(short, long)]
    pub input: PathBuf,

    /// File to write, without a trailing newline (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// How to obtain the key.
#[derive(Debug, Args)]
pub struct KeyArgs {
    /// Base64 key
    #[arg(long, env = "EJSON_KEY", hide_env_values = true)]
    pub key: String,

    /// Use the key as a raw 32-byte AES key instead of a PBKDF2 password
    #[arg(long)]
    pub raw: bool,
}

impl KeyArgs {
    /// Decode the key into the material the codec expects.
    pub fn material(&self) -> Result<KeyMaterial> {
        if self.raw {
            KeyMaterial::raw_from_base64(&self.key)
                .context("--key must be base64 of exactly 32 bytes when --raw is set")
        } else {
            KeyMaterial::password_from_base64(&self.key).context("--key must be base64")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_encrypt_with_key_flag() {
        let cli = Cli::try_parse_from([
            "ejson-tool",
            "encrypt",
            "--key",
            "AAAA",
            "--input",
            "settings.json",
            "--output",
            "settings.ejson",
        ])
        .unwrap();
        let Command::Encrypt(args) = cli.command else {
            panic!("expected encrypt");
        };
        assert_eq!(args.input, PathBuf::from("settings.json"));
        assert_eq!(args.output, Some(PathBuf::from("settings.ejson")));
        assert!(!args.key.raw);
    }

    #[test]
    fn raw_key_must_be_32_bytes() {
        let args = KeyArgs {
            key: "AAAA".into(),
            raw: true,
        };
        assert!(args.material().is_err());

        let args = KeyArgs {
            key: "AAAA".into(),
            raw: false,
        };
        assert!(args.material().unwrap().is_password());
    }
}
