//! First-key resolution.
//!
//! `resolve_first_key` answers "where is the first key argument of this
//! command, and how is it found" from whatever the descriptor provides. The
//! tiers are tried from most to least authoritative and the first applicable
//! one wins:
//!
//! 1. explicit key specs (first spec only)
//! 2. flat walk of the top-level arguments, for descriptors that have
//!    arguments but neither key specs nor arity (third-party module commands)
//! 3. structural walk of the full argument tree
//! 4. nothing to go on: no keys
//!
//! Any optionality, repetition or alternation seen before a key makes the
//! answer UNKNOWN. A wrong INDEX would send requests to the wrong node; an
//! UNKNOWN only makes the caller fall back to a slower path.

use crate::error::SchemaError;
use crate::model::{
    ArgKind, ArgumentNode, BeginSearch, CommandDescriptor, FindKeys, FirstKey, KeySpec,
};

/// Resolves the first-key method and position of a descriptor.
///
/// Positions are argv indices: 0 is the command name, and for subcommands
/// (descriptors with a container) 1 is the subcommand name.
pub fn resolve_first_key(descriptor: &CommandDescriptor) -> Result<FirstKey, SchemaError> {
    if let Some(specs) = &descriptor.key_specs {
        return from_key_specs(&descriptor.name, specs);
    }
    let Some(arguments) = descriptor.arguments.as_deref() else {
        return Ok(FirstKey::NONE);
    };
    let start = first_argument_position(descriptor);
    if descriptor.arity.is_none() {
        return Ok(from_flat_arguments(arguments, start));
    }
    Ok(from_argument_tree(arguments, start))
}

fn first_argument_position(descriptor: &CommandDescriptor) -> u32 {
    if descriptor.container().is_some() {
        2
    } else {
        1
    }
}

// ----------------------------------------------------------------------------
// Key specs
// ----------------------------------------------------------------------------

fn from_key_specs(command: &str, specs: &[KeySpec]) -> Result<FirstKey, SchemaError> {
    let Some(first) = specs.first() else {
        return Ok(FirstKey::NONE);
    };
    let BeginSearch::Index { pos } = first.begin_search else {
        return Ok(FirstKey::UNKNOWN);
    };
    match first.find_keys {
        FindKeys::Range => Ok(FirstKey::index(pos)),
        FindKeys::Keynum {
            keynum_index_offset: 0,
            first_key_offset: 1,
        } => Ok(FirstKey::keynum(pos)),
        FindKeys::Keynum {
            keynum_index_offset,
            first_key_offset,
        } => Err(SchemaError::KeynumContract {
            command: command.to_string(),
            keynum_index_offset,
            first_key_offset,
        }),
        FindKeys::Other => Ok(FirstKey::UNKNOWN),
    }
}

// ----------------------------------------------------------------------------
// Flat fallback
// ----------------------------------------------------------------------------

fn key_at(position: u32, seen_optional: bool) -> FirstKey {
    if seen_optional {
        FirstKey::UNKNOWN
    } else {
        FirstKey::index(position)
    }
}

fn is_named_key(arg: &ArgumentNode) -> bool {
    arg.meta()
        .name
        .as_deref()
        .is_some_and(|name| name.eq_ignore_ascii_case("key"))
}

/// Walks only the top-level arguments. Module metadata sometimes types its key
/// argument as a `string` named `key`, so that is treated as a key too.
fn from_flat_arguments(arguments: &[ArgumentNode], start: u32) -> FirstKey {
    let mut seen_optional = false;
    for (position, arg) in (start..).zip(arguments) {
        if arg.is_optional() {
            seen_optional = true;
        }
        match arg {
            ArgumentNode::Scalar {
                kind: ArgKind::Key,
                ..
            } => return key_at(position, seen_optional),
            ArgumentNode::Scalar {
                kind: ArgKind::String,
                meta,
            } if is_named_key(arg) => {
                if meta.optional || meta.multiple {
                    return FirstKey::UNKNOWN;
                }
                return key_at(position, seen_optional);
            }
            ArgumentNode::Scalar {
                kind: ArgKind::String,
                ..
            } => {}
            _ => return FirstKey::UNKNOWN,
        }
        if arg.is_multiple() {
            seen_optional = true;
        }
    }
    FirstKey::NONE
}

// ----------------------------------------------------------------------------
// Structural walk
// ----------------------------------------------------------------------------

/// Number of argv slots a node always occupies, or `None` if that depends on
/// the actual invocation.
fn fixed_width(node: &ArgumentNode) -> Option<u32> {
    if node.is_optional() || node.is_multiple() {
        return None;
    }
    let token = u32::from(node.meta().token.is_some());
    match node {
        ArgumentNode::Scalar {
            kind: ArgKind::PureToken,
            ..
        } => Some(1),
        ArgumentNode::Scalar {
            kind: ArgKind::Other(_),
            ..
        } => None,
        ArgumentNode::Scalar { .. } => Some(token + 1),
        ArgumentNode::Block { children, .. } => children
            .iter()
            .try_fold(token, |acc, child| Some(acc + fixed_width(child)?)),
        ArgumentNode::OneOf { children, .. } => {
            let mut widths = children.iter().map(fixed_width);
            let first = widths.next()??;
            widths
                .all(|w| w == Some(first))
                .then_some(token + first)
        }
    }
}

struct TreeWalk {
    position: u32,
    /// Set once anything before the current position may be absent, repeated
    /// or of variable width.
    uncertain: bool,
}

impl TreeWalk {
    fn visit_all(&mut self, nodes: &[ArgumentNode], inherited_optional: bool) -> Option<FirstKey> {
        nodes
            .iter()
            .find_map(|node| self.visit(node, inherited_optional))
    }

    fn visit(&mut self, node: &ArgumentNode, inherited_optional: bool) -> Option<FirstKey> {
        let optional = inherited_optional || node.is_optional();
        match node {
            ArgumentNode::Block { meta, children } => {
                if meta.token.is_some() {
                    self.position += 1;
                }
                let found = self.visit_all(children, optional);
                if found.is_none() && (optional || meta.multiple) {
                    self.uncertain = true;
                }
                found
            }
            ArgumentNode::OneOf { children, .. } => {
                if children.iter().any(ArgumentNode::contains_key) {
                    return Some(FirstKey::UNKNOWN);
                }
                match fixed_width(node) {
                    Some(width) if !optional => self.position += width,
                    _ => self.uncertain = true,
                }
                None
            }
            ArgumentNode::Scalar { kind, meta } => {
                let token = u32::from(meta.token.is_some());
                if *kind == ArgKind::Key {
                    let position = self.position + token;
                    return Some(if self.uncertain || optional {
                        FirstKey::UNKNOWN
                    } else {
                        FirstKey::index(position)
                    });
                }
                self.position += if *kind == ArgKind::PureToken {
                    1
                } else {
                    token + 1
                };
                if optional || meta.multiple || matches!(kind, ArgKind::Other(_)) {
                    self.uncertain = true;
                }
                None
            }
        }
    }
}

/// Walks the whole argument tree: blocks are inlined, oneofs that could hold a
/// key make the answer UNKNOWN, keyless oneofs are stepped over.
fn from_argument_tree(arguments: &[ArgumentNode], start: u32) -> FirstKey {
    let mut walk = TreeWalk {
        position: start,
        uncertain: false,
    };
    walk.visit_all(arguments, false).unwrap_or(FirstKey::NONE)
}
