//! Command implementations. Each writes its result to `out` unless an output
//! file is given.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use ejson_config::flatten::flatten_slice;
use ejson_config::{decrypt_bytes, encrypt_bytes, generate_base64_key, EncryptedJsonFile};
use tracing::info;

use crate::cli::{Command, KeyArgs, TransformArgs};

/// Run `command`, writing anything it prints to `out`.
pub fn execute(command: Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Keygen => keygen(out),
        Command::Encrypt(args) => encrypt(&args, out),
        Command::Decrypt(args) => decrypt(&args, out),
        Command::Flatten { key, input } => flatten(&key, &input, out),
    }
}

fn keygen(out: &mut dyn Write) -> Result<()> {
    let key = generate_base64_key()?;
    writeln!(out, "{}", key.as_str())?;
    Ok(())
}

fn encrypt(args: &TransformArgs, out: &mut dyn Write) -> Result<()> {
    let key = args.key.material()?;
    let plaintext = read(&args.input)?;

    let entries = flatten_slice(&plaintext)
        .with_context(|| format!("{} is not a valid settings document", args.input.display()))?
        .len();
    let text = encrypt_bytes(&plaintext, &key)?;

    emit(text.as_bytes(), args.output.as_deref(), out)?;
    info!(input = %args.input.display(), entries, "settings encrypted");
    Ok(())
}

fn decrypt(args: &TransformArgs, out: &mut dyn Write) -> Result<()> {
    let key = args.key.material()?;
    let bytes = read(&args.input)?;
    let text = std::str::from_utf8(&bytes)
        .with_context(|| format!("{} is not a text envelope", args.input.display()))?;

    let plaintext = decrypt_bytes(text, &key)
        .with_context(|| format!("failed to decrypt {}", args.input.display()))?;

    emit(&plaintext, args.output.as_deref(), out)?;
    info!(input = %args.input.display(), "settings decrypted");
    Ok(())
}

fn flatten(key: &KeyArgs, input: &Path, out: &mut dyn Write) -> Result<()> {
    let flat = EncryptedJsonFile::new(input, key.material()?)
        .load()
        .with_context(|| format!("failed to load {}", input.display()))?;

    for (path, value) in flat.iter() {
        match value {
            Some(value) => writeln!(out, "{path}={value}")?,
            None => writeln!(out, "{path}")?,
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn emit(bytes: &[u8], output: Option<&Path>, out: &mut dyn Write) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            out.write_all(bytes)?;
            out.flush()?;
            Ok(())
        }
    }
}
