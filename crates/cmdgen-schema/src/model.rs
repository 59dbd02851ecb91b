//! Typed model: raw command descriptors in, resolved commands out.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Descriptor side (input)
// ============================================================================

/// Value kind of a scalar argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgKind {
    Key,
    String,
    Integer,
    Double,
    Pattern,
    UnixTime,
    PureToken,
    /// Anything else (including a missing `type`), kept verbatim.
    Other(String),
}

impl ArgKind {
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "key" => ArgKind::Key,
            "string" => ArgKind::String,
            "integer" => ArgKind::Integer,
            "double" => ArgKind::Double,
            "pattern" => ArgKind::Pattern,
            "unix-time" => ArgKind::UnixTime,
            "pure-token" => ArgKind::PureToken,
            other => ArgKind::Other(other.to_string()),
        }
    }
}

/// Flags and labels shared by every argument node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgMeta {
    pub name: Option<String>,
    /// Literal token written before the value (e.g. `EX` in `EX seconds`).
    pub token: Option<String>,
    pub optional: bool,
    pub multiple: bool,
}

/// One node of a command's argument tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentNode {
    Scalar { kind: ArgKind, meta: ArgMeta },
    /// Sequential group, inlined at its own position.
    Block {
        meta: ArgMeta,
        children: Vec<ArgumentNode>,
    },
    /// Mutually exclusive alternatives.
    OneOf {
        meta: ArgMeta,
        children: Vec<ArgumentNode>,
    },
}

impl ArgumentNode {
    pub fn scalar(kind: ArgKind) -> Self {
        ArgumentNode::Scalar {
            kind,
            meta: ArgMeta::default(),
        }
    }

    pub fn block(children: Vec<ArgumentNode>) -> Self {
        ArgumentNode::Block {
            meta: ArgMeta::default(),
            children,
        }
    }

    pub fn one_of(children: Vec<ArgumentNode>) -> Self {
        ArgumentNode::OneOf {
            meta: ArgMeta::default(),
            children,
        }
    }

    pub fn meta(&self) -> &ArgMeta {
        match self {
            ArgumentNode::Scalar { meta, .. }
            | ArgumentNode::Block { meta, .. }
            | ArgumentNode::OneOf { meta, .. } => meta,
        }
    }

    fn meta_mut(&mut self) -> &mut ArgMeta {
        match self {
            ArgumentNode::Scalar { meta, .. }
            | ArgumentNode::Block { meta, .. }
            | ArgumentNode::OneOf { meta, .. } => meta,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.meta_mut().name = Some(name.to_string());
        self
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.meta_mut().token = Some(token.to_string());
        self
    }

    pub fn optional(mut self) -> Self {
        self.meta_mut().optional = true;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.meta_mut().multiple = true;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.meta().optional
    }

    pub fn is_multiple(&self) -> bool {
        self.meta().multiple
    }

    /// True if this node or anything nested below it is a `key` argument.
    pub fn contains_key(&self) -> bool {
        match self {
            ArgumentNode::Scalar { kind, .. } => *kind == ArgKind::Key,
            ArgumentNode::Block { children, .. } | ArgumentNode::OneOf { children, .. } => {
                children.iter().any(ArgumentNode::contains_key)
            }
        }
    }
}

/// Where the key search starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginSearch {
    Index { pos: u32 },
    /// Keyword-anchored or unknown.
    Other,
}

/// How keys are found once the search has begun.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindKeys {
    Range,
    Keynum {
        keynum_index_offset: i64,
        first_key_offset: i64,
    },
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub begin_search: BeginSearch,
    pub find_keys: FindKeys,
}

/// One decoded descriptor record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub name: String,
    pub container: Option<String>,
    pub arity: Option<i64>,
    pub key_specs: Option<Vec<KeySpec>>,
    pub arguments: Option<Vec<ArgumentNode>>,
}

impl CommandDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Container name, if this descriptor is a subcommand.
    pub fn container(&self) -> Option<&str> {
        self.container.as_deref().filter(|c| !c.is_empty())
    }
}

// ============================================================================
// Resolved side (output)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FirstKeyMethod {
    /// No keys.
    None,
    /// First key position unknown or too complex to express.
    Unknown,
    /// First key is the argument at the position.
    Index,
    /// Argument at the position holds the key count; keys follow it.
    Keynum,
}

impl FirstKeyMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            FirstKeyMethod::None => "NONE",
            FirstKeyMethod::Unknown => "UNKNOWN",
            FirstKeyMethod::Index => "INDEX",
            FirstKeyMethod::Keynum => "KEYNUM",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "NONE" => Some(FirstKeyMethod::None),
            "UNKNOWN" => Some(FirstKeyMethod::Unknown),
            "INDEX" => Some(FirstKeyMethod::Index),
            "KEYNUM" => Some(FirstKeyMethod::Keynum),
            _ => None,
        }
    }
}

impl fmt::Display for FirstKeyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolver answer: method plus argv position (0 is the command name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstKey {
    pub method: FirstKeyMethod,
    pub position: u32,
}

impl FirstKey {
    pub const NONE: FirstKey = FirstKey {
        method: FirstKeyMethod::None,
        position: 0,
    };

    pub const UNKNOWN: FirstKey = FirstKey {
        method: FirstKeyMethod::Unknown,
        position: 0,
    };

    pub fn index(position: u32) -> Self {
        FirstKey {
            method: FirstKeyMethod::Index,
            position,
        }
    }

    pub fn keynum(position: u32) -> Self {
        FirstKey {
            method: FirstKeyMethod::Keynum,
            position,
        }
    }

    /// Shifts positional answers by `by` slots; NONE and UNKNOWN stay at 0.
    pub fn shifted(self, by: u32) -> Self {
        match self.method {
            FirstKeyMethod::Index | FirstKeyMethod::Keynum => FirstKey {
                method: self.method,
                position: self.position.saturating_add(by),
            },
            FirstKeyMethod::None | FirstKeyMethod::Unknown => self,
        }
    }
}

/// One row of the command table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCommand {
    pub display_name: String,
    pub subcommand: Option<String>,
    /// `N >= 0`: exactly N tokens including the name; `-N`: at least N.
    pub arity: i64,
    pub first_key: FirstKey,
}

impl ResolvedCommand {
    /// Table key: `NAME` or `NAME_SUBCOMMAND`.
    pub fn canonical_key(&self) -> String {
        match &self.subcommand {
            Some(sub) => format!("{}_{}", self.display_name, sub),
            None => self.display_name.clone(),
        }
    }
}
