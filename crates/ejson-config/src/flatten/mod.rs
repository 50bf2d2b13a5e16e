//! JSON → flat key-path flattening.
//!
//! Turns an object-rooted JSON document into a [`FlatConfig`] whose keys are
//! member names and array indices joined with [`KEY_DELIMITER`]:
//!
//! ```text
//! {"Logging":{"LogLevel":"Warning"},"Hosts":["a","b"]}
//!   Logging:LogLevel = Warning
//!   Hosts:0          = a
//!   Hosts:1          = b
//! ```
//!
//! # Module invariants
//!
//! - **No crypto dependencies.** This module must not import anything from
//!   `crate::crypto`.
//! - Malformed text is always [`FlattenError::MalformedDocument`]; well-formed
//!   JSON with the wrong shape is [`FlattenError::UnsupportedToken`] or
//!   [`FlattenError::DuplicateKey`].

pub mod flat_config;
pub mod node;

pub use flat_config::FlatConfig;
pub use node::JsonNode;

use thiserror::Error;

/// Separator between path segments.
pub const KEY_DELIMITER: char = ':';

/// Errors produced while parsing and flattening a document.
#[derive(Debug, Error)]
pub enum FlattenError {
    /// The text is not syntactically valid JSON.
    #[error("malformed JSON document: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    /// Valid JSON, but a node kind the flattener does not accept here.
    #[error("unsupported JSON token '{0}' was found")]
    UnsupportedToken(&'static str),

    /// Two leaves map to the same path under case-insensitive comparison.
    #[error("a duplicate key '{0}' was found")]
    DuplicateKey(String),
}

/// Parse `bytes` as JSON and flatten it.
///
/// # Errors
///
/// See [`FlattenError`].
pub fn flatten_slice(bytes: &[u8]) -> Result<FlatConfig, FlattenError> {
    let document: JsonNode = serde_json::from_slice(bytes)?;
    flatten(&document)
}

/// Parse `text` as JSON and flatten it.
///
/// # Errors
///
/// See [`FlattenError`].
pub fn flatten_str(text: &str) -> Result<FlatConfig, FlattenError> {
    let document: JsonNode = serde_json::from_str(text)?;
    flatten(&document)
}

/// Flatten an already-parsed document. The root must be an object.
///
/// # Errors
///
/// Returns [`FlattenError::UnsupportedToken`] for a non-object root and
/// [`FlattenError::DuplicateKey`] for a repeated path.
pub fn flatten(document: &JsonNode) -> Result<FlatConfig, FlattenError> {
    match document {
        JsonNode::Object(_) => flatten_node(document, None, FlatConfig::new()),
        other => Err(FlattenError::UnsupportedToken(other.kind())),
    }
}

/// Flatten `node` beneath `prefix`, appending its leaves to `acc`.
///
/// Lets a sub-tree be flattened on its own, e.g. under `Some("Logging")`.
///
/// # Errors
///
/// Returns [`FlattenError::DuplicateKey`] if a leaf path is already in `acc`,
/// and [`FlattenError::UnsupportedToken`] for a scalar with no prefix.
pub fn flatten_node(
    node: &JsonNode,
    prefix: Option<&str>,
    acc: FlatConfig,
) -> Result<FlatConfig, FlattenError> {
    match node {
        JsonNode::Object(members) => members.iter().try_fold(acc, |acc, (name, value)| {
            flatten_node(value, Some(child_path(prefix, name).as_str()), acc)
        }),
        JsonNode::Array(items) => items.iter().enumerate().try_fold(acc, |acc, (index, item)| {
            flatten_node(item, Some(child_path(prefix, &index.to_string()).as_str()), acc)
        }),
        leaf => {
            let Some(path) = prefix else {
                return Err(FlattenError::UnsupportedToken(leaf.kind()));
            };
            let mut acc = acc;
            acc.try_insert(path.to_owned(), render(leaf))?;
            Ok(acc)
        }
    }
}

/// Join path segments with [`KEY_DELIMITER`].
pub fn combine_path<S: AsRef<str>>(segments: &[S]) -> String {
    let mut path = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            path.push(KEY_DELIMITER);
        }
        path.push_str(segment.as_ref());
    }
    path
}

fn child_path(prefix: Option<&str>, segment: &str) -> String {
    match prefix {
        Some(prefix) => combine_path(&[prefix, segment]),
        None => segment.to_owned(),
    }
}

fn render(leaf: &JsonNode) -> Option<String> {
    match leaf {
        JsonNode::String(s) => Some(s.clone()),
        JsonNode::Number(text) => Some(text.clone()),
        JsonNode::Bool(b) => Some(b.to_string()),
        JsonNode::Null | JsonNode::Object(_) | JsonNode::Array(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_objects_and_arrays() {
        let flat = flatten_str(
            r#"{
                "ConnectionStrings": {"Default": "Host=db"},
                "Hosts": ["a", {"Name": "b"}],
                "Matrix": [[1, 2]]
            }"#,
        )
        .unwrap();
        assert_eq!(flat.get("ConnectionStrings:Default"), Some("Host=db"));
        assert_eq!(flat.get("Hosts:0"), Some("a"));
        assert_eq!(flat.get("Hosts:1:Name"), Some("b"));
        assert_eq!(flat.get("Matrix:0:1"), Some("2"));
    }

    #[test]
    fn scalar_rendering() {
        let flat = flatten_str(
            r#"{"Int": 42, "Neg": -7, "Float": 1.5, "Yes": true, "No": false, "Nothing": null}"#,
        )
        .unwrap();
        assert_eq!(flat.get("Int"), Some("42"));
        assert_eq!(flat.get("Neg"), Some("-7"));
        assert_eq!(flat.get("Float"), Some("1.5"));
        assert_eq!(flat.get("Yes"), Some("true"));
        assert_eq!(flat.get("No"), Some("false"));
        assert!(flat.contains_key("Nothing"));
        assert_eq!(flat.get("Nothing"), None);
    }

    #[test]
    fn numbers_render_as_written() {
        let flat = flatten_str(
            r#"{"Ratio": 1.50, "Limit": 1e3, "AccountId": 12345678901234567890123, "Step": 0.1000}"#,
        )
        .unwrap();
        assert_eq!(flat.get("Ratio"), Some("1.50"));
        assert_eq!(flat.get("Limit"), Some("1e3"));
        assert_eq!(flat.get("AccountId"), Some("12345678901234567890123"));
        assert_eq!(flat.get("Step"), Some("0.1000"));
    }

    #[test]
    fn iteration_follows_document_order() {
        let flat = flatten_str(r#"{"b": 1, "a": {"z": 2, "y": 3}, "c": [4]}"#).unwrap();
        assert_eq!(flat.keys().collect::<Vec<_>>(), ["b", "a:z", "a:y", "c:0"]);
    }

    #[test]
    fn empty_containers_produce_no_entries() {
        let flat = flatten_str(r#"{"a": {}, "b": [], "c": "x"}"#).unwrap();
        assert_eq!(flat.len(), 1);
        assert!(flatten_str("{}").unwrap().is_empty());
    }

    #[test]
    fn exact_duplicate_member_rejected() {
        let err = flatten_str(r#"{"a": 1, "a": 2}"#).unwrap_err();
        assert!(matches!(err, FlattenError::DuplicateKey(ref k) if k == "a"));
    }

    #[test]
    fn case_variant_duplicate_rejected() {
        let err = flatten_str(r#"{"Key": 1, "key": 2}"#).unwrap_err();
        assert!(matches!(err, FlattenError::DuplicateKey(ref k) if k == "key"));
    }

    #[test]
    fn nested_duplicate_via_delimiter_rejected() {
        let err = flatten_str(r#"{"a": {"b": 1}, "a:b": 2}"#).unwrap_err();
        assert!(matches!(err, FlattenError::DuplicateKey(ref k) if k == "a:b"));
    }

    #[test]
    fn non_object_roots_rejected() {
        for (text, kind) in [
            ("[1, 2]", "Array"),
            (r#""text""#, "String"),
            ("12", "Number"),
            ("true", "True"),
            ("null", "Null"),
        ] {
            let err = flatten_str(text).unwrap_err();
            assert!(
                matches!(err, FlattenError::UnsupportedToken(k) if k == kind),
                "{text}: {err}"
            );
        }
    }

    #[test]
    fn malformed_text_is_distinct() {
        for text in ["", "{", r#"{"a": }"#, "not json", "{\"a\": 1,}"] {
            assert!(
                matches!(flatten_str(text), Err(FlattenError::MalformedDocument(_))),
                "{text:?}"
            );
        }
    }

    #[test]
    fn sub_tree_flattens_under_prefix() {
        let node: JsonNode = serde_json::from_str(r#"{"Level": "Debug"}"#).unwrap();
        let flat = flatten_node(&node, Some("Logging"), FlatConfig::new()).unwrap();
        assert_eq!(flat.get("logging:level"), Some("Debug"));
    }

    #[test]
    fn scalar_without_prefix_rejected() {
        let node = JsonNode::Bool(true);
        assert!(matches!(
            flatten_node(&node, None, FlatConfig::new()),
            Err(FlattenError::UnsupportedToken("True"))
        ));
    }

    #[test]
    fn combine_path_joins_segments() {
        assert_eq!(combine_path(&["a", "b", "0"]), "a:b:0");
        assert_eq!(combine_path::<&str>(&[]), "");
    }
}
