//! [`JsonNode`]: a JSON tree that keeps what `serde_json::Value` throws away.
//!
//! Object members stay in document order and repeated member names are kept, so
//! the flattener can report them instead of silently taking the last one.

use std::fmt;

use serde::de::{self, Deserialize, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::value::RawValue;

/// Deepest container nesting accepted, matching serde_json's own limit.
const MAX_DEPTH: usize = 128;

/// A parsed JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonNode {
    /// Members in document order, duplicates included.
    Object(Vec<(String, JsonNode)>),
    Array(Vec<JsonNode>),
    String(String),
    /// The number exactly as written in the document.
    Number(String),
    Bool(bool),
    Null,
}

impl JsonNode {
    /// Token name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            JsonNode::Object(_) => "Object",
            JsonNode::Array(_) => "Array",
            JsonNode::String(_) => "String",
            JsonNode::Number(_) => "Number",
            JsonNode::Bool(true) => "True",
            JsonNode::Bool(false) => "False",
            JsonNode::Null => "Null",
        }
    }
}

impl<'de> Deserialize<'de> for JsonNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        NodeSeed { depth: 0 }.deserialize(deserializer)
    }
}

// Every value is captured as raw text first so numbers keep their literal
// spelling (`1.50`, `1e3`, integers wider than 64 bits).
#[derive(Clone, Copy)]
struct NodeSeed {
    depth: usize,
}

impl NodeSeed {
    fn parse(self, text: &str) -> serde_json::Result<JsonNode> {
        if text.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
            return Ok(JsonNode::Number(text.to_owned()));
        }
        if text.starts_with(['[', '{']) && self.depth >= MAX_DEPTH {
            return Err(de::Error::custom("recursion limit exceeded"));
        }
        let mut deserializer = serde_json::Deserializer::from_str(text);
        (&mut deserializer).deserialize_any(NodeVisitor { depth: self.depth })
    }

    fn child(self) -> Self {
        Self {
            depth: self.depth + 1,
        }
    }
}

impl<'de> DeserializeSeed<'de> for NodeSeed {
    type Value = JsonNode;

    fn deserialize<D>(self, deserializer: D) -> Result<JsonNode, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        self.parse(raw.get()).map_err(de::Error::custom)
    }
}

struct NodeVisitor {
    depth: usize,
}

impl NodeVisitor {
    fn seed(&self) -> NodeSeed {
        NodeSeed { depth: self.depth }.child()
    }
}

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = JsonNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<JsonNode, E> {
        Ok(JsonNode::Bool(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<JsonNode, E> {
        Ok(JsonNode::String(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> Result<JsonNode, E> {
        Ok(JsonNode::String(v))
    }

    fn visit_unit<E>(self) -> Result<JsonNode, E> {
        Ok(JsonNode::Null)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<JsonNode, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element_seed(self.seed())? {
            items.push(item);
        }
        Ok(JsonNode::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<JsonNode, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut members = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(name) = map.next_key::<String>()? {
            let value = map.next_value_seed(self.seed())?;
            members.push((name, value));
        }
        Ok(JsonNode::Object(members))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_member_order_and_duplicates() {
        let node: JsonNode = serde_json::from_str(r#"{"b":1,"a":2,"b":3}"#).unwrap();
        let JsonNode::Object(members) = node else {
            panic!("expected object");
        };
        let names: Vec<&str> = members.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["b", "a", "b"]);
    }

    #[test]
    fn scalar_kinds() {
        let node: JsonNode =
            serde_json::from_str(r#"[true,false,null,1,-2,1.5,"s"]"#).unwrap();
        let JsonNode::Array(items) = node else {
            panic!("expected array");
        };
        let kinds: Vec<&str> = items.iter().map(JsonNode::kind).collect();
        assert_eq!(
            kinds,
            ["True", "False", "Null", "Number", "Number", "Number", "String"]
        );
    }

    #[test]
    fn numbers_keep_their_spelling() {
        let node: JsonNode =
            serde_json::from_str(r#"[1.50, 1e3, -0.0, 12345678901234567890123, 2E-7]"#).unwrap();
        let JsonNode::Array(items) = node else {
            panic!("expected array");
        };
        let texts: Vec<&str> = items
            .iter()
            .map(|item| match item {
                JsonNode::Number(text) => text.as_str(),
                other => panic!("expected number, got {}", other.kind()),
            })
            .collect();
        assert_eq!(texts, ["1.50", "1e3", "-0.0", "12345678901234567890123", "2E-7"]);
    }

    #[test]
    fn nested_members_survive_raw_capture() {
        let node: JsonNode =
            serde_json::from_str(r#" { "a" : [ {"b": "x\"y"} , null ] , "a": 1 } "#).unwrap();
        assert_eq!(
            node,
            JsonNode::Object(vec![
                (
                    "a".into(),
                    JsonNode::Array(vec![
                        JsonNode::Object(vec![("b".into(), JsonNode::String("x\"y".into()))]),
                        JsonNode::Null,
                    ])
                ),
                ("a".into(), JsonNode::Number("1".into())),
            ])
        );
    }

    #[test]
    fn excessive_nesting_rejected() {
        let deep = format!("{}{}", "[".repeat(MAX_DEPTH + 2), "]".repeat(MAX_DEPTH + 2));
        assert!(serde_json::from_str::<JsonNode>(&deep).is_err());

        let shallow = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(serde_json::from_str::<JsonNode>(&shallow).is_ok());
    }
}
