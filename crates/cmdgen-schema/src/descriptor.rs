//! Decoding of fresh descriptor sources.
//!
//! A source is a JSON object mapping a command name to its properties. Both
//! the server's own snake_case property names (`key_specs`, `begin_search`,
//! `keynumidx`, ...) and their camelCase spellings are accepted. Properties
//! this compiler does not use are ignored.

use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::Value;

use crate::error::SchemaError;
use crate::model::{
    ArgKind, ArgMeta, ArgumentNode, BeginSearch, CommandDescriptor, FindKeys, KeySpec,
};

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    #[serde(default)]
    container: Option<String>,
    #[serde(default)]
    arity: Option<i64>,
    #[serde(default, alias = "keySpecs")]
    key_specs: Option<Vec<RawKeySpec>>,
    #[serde(default)]
    arguments: Option<Vec<RawArgument>>,
}

#[derive(Debug, Deserialize)]
struct RawKeySpec {
    #[serde(alias = "beginSearch")]
    begin_search: RawBeginSearch,
    #[serde(alias = "findKeys")]
    find_keys: RawFindKeys,
}

#[derive(Debug, Deserialize)]
struct RawBeginSearch {
    #[serde(default)]
    index: Option<RawIndex>,
}

#[derive(Debug, Deserialize)]
struct RawIndex {
    pos: u32,
}

#[derive(Debug, Deserialize)]
struct RawFindKeys {
    #[serde(default)]
    range: Option<IgnoredAny>,
    #[serde(default)]
    keynum: Option<RawKeynum>,
}

#[derive(Debug, Deserialize)]
struct RawKeynum {
    #[serde(alias = "keynumIndexOffset")]
    keynumidx: i64,
    #[serde(alias = "firstKeyOffset")]
    firstkey: i64,
}

#[derive(Debug, Deserialize)]
struct RawArgument {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    multiple: bool,
    #[serde(default)]
    arguments: Option<Vec<RawArgument>>,
}

impl From<RawKeySpec> for KeySpec {
    fn from(raw: RawKeySpec) -> Self {
        let begin_search = match raw.begin_search.index {
            Some(index) => BeginSearch::Index { pos: index.pos },
            None => BeginSearch::Other,
        };
        let find_keys = match (raw.find_keys.range, raw.find_keys.keynum) {
            (Some(_), _) => FindKeys::Range,
            (None, Some(keynum)) => FindKeys::Keynum {
                keynum_index_offset: keynum.keynumidx,
                first_key_offset: keynum.firstkey,
            },
            (None, None) => FindKeys::Other,
        };
        KeySpec {
            begin_search,
            find_keys,
        }
    }
}

impl From<RawArgument> for ArgumentNode {
    fn from(raw: RawArgument) -> Self {
        let meta = ArgMeta {
            name: raw.name,
            token: raw.token,
            optional: raw.optional,
            multiple: raw.multiple,
        };
        let children = || {
            raw.arguments
                .unwrap_or_default()
                .into_iter()
                .map(ArgumentNode::from)
                .collect()
        };
        match raw.kind.as_deref() {
            Some("block") => ArgumentNode::Block {
                meta,
                children: children(),
            },
            Some("oneof") => ArgumentNode::OneOf {
                meta,
                children: children(),
            },
            Some(other) => ArgumentNode::Scalar {
                kind: ArgKind::from_type_name(other),
                meta,
            },
            None => ArgumentNode::Scalar {
                kind: ArgKind::Other(String::new()),
                meta,
            },
        }
    }
}

/// Decodes one descriptor source that has already been parsed into a JSON tree.
///
/// Command and container names are upper-cased. Entries come out in source
/// order, so a later entry overrides an earlier one with the same canonical
/// key once both are inserted into a table.
pub fn descriptors_from_value(
    source_name: &str,
    value: &Value,
) -> Result<Vec<CommandDescriptor>, SchemaError> {
    let Value::Object(entries) = value else {
        return Err(SchemaError::malformed_source(
            source_name,
            "top level must be an object mapping command names to properties",
        ));
    };

    let mut descriptors = Vec::with_capacity(entries.len());
    for (name, props) in entries {
        let raw = RawDescriptor::deserialize(props).map_err(|err| {
            SchemaError::malformed_source(source_name, format!("command `{name}`: {err}"))
        })?;
        descriptors.push(CommandDescriptor {
            name: name.to_uppercase(),
            container: raw.container.map(|c| c.to_uppercase()),
            arity: raw.arity,
            key_specs: raw
                .key_specs
                .map(|specs| specs.into_iter().map(KeySpec::from).collect()),
            arguments: raw
                .arguments
                .map(|args| args.into_iter().map(ArgumentNode::from).collect()),
        });
    }
    Ok(descriptors)
}

/// Parses JSON text and decodes it as a descriptor source.
pub fn descriptors_from_str(
    source_name: &str,
    text: &str,
) -> Result<Vec<CommandDescriptor>, SchemaError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| SchemaError::malformed_source(source_name, err.to_string()))?;
    descriptors_from_value(source_name, &value)
}
