//! Configuration sources backed by encrypted JSON.
//!
//! [`EncryptedJsonFile`] reads a Base64 text envelope from disk and
//! [`EncryptedJsonStream`] reads a binary envelope from any reader. Both
//! decrypt, flatten and expose the result either directly as a
//! [`FlatConfig`] or as a [`config::Source`] so they can be layered with other
//! sources in a [`config::ConfigBuilder`].
//!
//! A source is all or nothing: `load` returns the complete map or an error.

pub mod file;
pub mod stream;

pub use file::EncryptedJsonFile;
pub use stream::EncryptedJsonStream;

use config::{ConfigError, Map, Value, ValueKind};

use crate::crypto::{AeadCodec, Envelope, KeyMaterial};
use crate::error::{Error, Result};
use crate::flatten::{flatten_slice, FlatConfig, FlattenError, KEY_DELIMITER};

/// Decrypt `envelope` and flatten the plaintext.
pub(crate) fn open(envelope: &Envelope, key: &KeyMaterial, iterations: u32) -> Result<FlatConfig> {
    let plaintext = AeadCodec::new()
        .with_iterations(iterations)
        .decrypt(envelope, key, None)?;
    Ok(flatten_slice(&plaintext)?)
}

/// Hand a crate error to `config` without losing its cause chain.
pub(crate) fn foreign(err: Error) -> ConfigError {
    ConfigError::Foreign(Box::new(err))
}

/// Intermediate tree used to turn `a:b:c` paths back into nested tables.
#[derive(Debug)]
enum Section {
    Leaf(Option<String>),
    Table(Vec<(String, Section)>),
}

/// Nest a flat map into `config` tables, splitting paths on [`KEY_DELIMITER`].
///
/// Tables whose keys are exactly `0..n` in order become arrays, so JSON arrays
/// deserialise into sequences. Segment names keep the spelling of the first
/// path that introduced them.
///
/// # Errors
///
/// Returns [`FlattenError::DuplicateKey`] when one path is both a value and a
/// parent of other paths, e.g. `a` and `a:b`.
pub fn to_config_map(
    flat: &FlatConfig,
    origin: &str,
) -> std::result::Result<Map<String, Value>, FlattenError> {
    let mut root = Vec::new();
    for (path, value) in flat.iter() {
        let segments: Vec<&str> = path.split(KEY_DELIMITER).collect();
        insert(&mut root, path, &segments, value.map(str::to_owned))?;
    }

    let origin = origin.to_owned();
    Ok(root
        .into_iter()
        .map(|(name, section)| (name, to_value(section, &origin)))
        .collect())
}

fn insert(
    table: &mut Vec<(String, Section)>,
    path: &str,
    segments: &[&str],
    value: Option<String>,
) -> std::result::Result<(), FlattenError> {
    let Some((head, rest)) = segments.split_first() else {
        return Ok(());
    };
    let folded = head.to_lowercase();
    let position = table
        .iter()
        .position(|(name, _)| name.to_lowercase() == folded);

    if rest.is_empty() {
        if position.is_some() {
            return Err(FlattenError::DuplicateKey(path.to_owned()));
        }
        table.push(((*head).to_owned(), Section::Leaf(value)));
        return Ok(());
    }

    let index = match position {
        Some(index) => index,
        None => {
            table.push(((*head).to_owned(), Section::Table(Vec::new())));
            table.len() - 1
        }
    };
    match &mut table[index].1 {
        Section::Table(children) => insert(children, path, rest, value),
        Section::Leaf(_) => Err(FlattenError::DuplicateKey(path.to_owned())),
    }
}

fn to_value(section: Section, origin: &String) -> Value {
    match section {
        Section::Leaf(Some(text)) => Value::new(Some(origin), ValueKind::String(text)),
        Section::Leaf(None) => Value::new(Some(origin), ValueKind::Nil),
        Section::Table(children) if is_sequence(&children) => {
            let items: Vec<Value> = children
                .into_iter()
                .map(|(_, child)| to_value(child, origin))
                .collect();
            Value::new(Some(origin), ValueKind::Array(items))
        }
        Section::Table(children) => {
            let table: Map<String, Value> = children
                .into_iter()
                .map(|(name, child)| (name, to_value(child, origin)))
                .collect();
            Value::new(Some(origin), ValueKind::Table(table))
        }
    }
}

fn is_sequence(children: &[(String, Section)]) -> bool {
    !children.is_empty()
        && children
            .iter()
            .enumerate()
            .all(|(i, (name, _))| *name == i.to_string())
}
