// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Tag resolution.
//!
//! An explicit tag other than the non-specific `!` is used verbatim. A
//! plain, untagged scalar is matched against a table of patterns keyed by
//! its first character; the first match names the tag. Everything else
//! falls back to `str`/`seq`/`map` per node kind.
//!
//! The default table implements the YAML 1.1 types: `null`, `bool`, `int`
//! (including binary, octal, hex, and sexagesimal forms), `float`,
//! `timestamp`, the merge key `<<`, and the value key `=`. Patterns are
//! compiled once and shared.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;

pub const TAG_STR: &str = "tag:yaml.org,2002:str";
pub const TAG_SEQ: &str = "tag:yaml.org,2002:seq";
pub const TAG_MAP: &str = "tag:yaml.org,2002:map";
pub const TAG_NULL: &str = "tag:yaml.org,2002:null";
pub const TAG_BOOL: &str = "tag:yaml.org,2002:bool";
pub const TAG_INT: &str = "tag:yaml.org,2002:int";
pub const TAG_FLOAT: &str = "tag:yaml.org,2002:float";
pub const TAG_TIMESTAMP: &str = "tag:yaml.org,2002:timestamp";
pub const TAG_VALUE: &str = "tag:yaml.org,2002:value";
pub const TAG_MERGE: &str = "tag:yaml.org,2002:merge";

/// The kind of node being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
}

/// `(tag, pattern, first characters)` rows of the default table, in match
/// order.
static DEFAULT_IMPLICIT_RESOLVERS: LazyLock<Vec<(&'static str, Regex, &'static str)>> =
    LazyLock::new(|| {
        let table: [(&str, &str, &str); 7] = [
            (
                TAG_BOOL,
                r"^(?:yes|Yes|YES|no|No|NO|true|True|TRUE|false|False|FALSE|on|On|ON|off|Off|OFF)$",
                "yYnNtTfFoO",
            ),
            (
                TAG_FLOAT,
                r"^(?:[-+]?(?:[0-9][0-9_]*)\.[0-9_]*(?:[eE][-+][0-9]+)?|\.[0-9_]+(?:[eE][-+][0-9]+)?|[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+\.[0-9_]*|[-+]?\.(?:inf|Inf|INF)|\.(?:nan|NaN|NAN))$",
                "-+0123456789.",
            ),
            (
                TAG_INT,
                r"^(?:[-+]?0b[0-1_]+|[-+]?0[0-7_]+|[-+]?(?:0|[1-9][0-9_]*)|[-+]?0x[0-9a-fA-F_]+|[-+]?[1-9][0-9_]*(?::[0-5]?[0-9])+)$",
                "-+0123456789",
            ),
            (TAG_MERGE, r"^(?:<<)$", "<"),
            (TAG_NULL, r"^(?:~|null|Null|NULL|)$", "~nN"),
            (
                TAG_TIMESTAMP,
                r"^(?:[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]|[0-9][0-9][0-9][0-9]-[0-9][0-9]?-[0-9][0-9]?(?:[Tt]|[ \t]+)[0-9][0-9]?:[0-9][0-9]:[0-9][0-9](?:\.[0-9]*)?(?:[ \t]*(?:Z|[-+][0-9][0-9]?(?::[0-9][0-9])?))?)$",
                "0123456789",
            ),
            (TAG_VALUE, r"^(?:=)$", "="),
        ];
        table
            .into_iter()
            .map(|(tag, pattern, first)| {
                let regex = Regex::new(pattern).expect("default resolver pattern is valid");
                (tag, regex, first)
            })
            .collect()
    });

/// Maps `(node kind, explicit tag, value, implicit flag)` to a resolved
/// tag.
#[derive(Debug)]
pub struct Resolver {
    /// Pattern rows keyed by the value's first character; `None` holds the
    /// rows whose pattern accepts the empty scalar.
    scalar_resolvers: HashMap<Option<char>, Vec<(Rc<str>, Regex)>>,
}

impl Resolver {
    /// A resolver carrying the default YAML 1.1 table.
    #[must_use]
    pub fn new() -> Self {
        let mut resolver = Self {
            scalar_resolvers: HashMap::new(),
        };
        for (tag, pattern, first) in DEFAULT_IMPLICIT_RESOLVERS.iter() {
            resolver.add_implicit_resolver(tag, pattern.clone(), first);
        }
        resolver
    }

    /// Register a pattern for implicit scalar resolution. `first` lists the
    /// characters a matching value can start with; a pattern that matches
    /// the empty string also claims empty scalars.
    pub fn add_implicit_resolver(&mut self, tag: &str, pattern: Regex, first: &str) {
        let tag: Rc<str> = Rc::from(tag);
        if pattern.is_match("") {
            self.scalar_resolvers
                .entry(None)
                .or_default()
                .push((tag.clone(), pattern.clone()));
        }
        for ch in first.chars() {
            self.scalar_resolvers
                .entry(Some(ch))
                .or_default()
                .push((tag.clone(), pattern.clone()));
        }
    }

    /// Resolve a tag. An explicit tag other than `!` wins; an implicit
    /// scalar goes through the pattern table; anything else falls back to
    /// the kind's default tag.
    #[must_use]
    pub fn resolve(
        &self,
        kind: NodeKind,
        tag: Option<&str>,
        value: &str,
        implicit: bool,
    ) -> Rc<str> {
        if let Some(tag) = tag
            && tag != "!"
        {
            return Rc::from(tag);
        }
        match kind {
            NodeKind::Scalar => {
                if implicit
                    && let Some(tag) = self.resolve_scalar(value)
                {
                    return tag;
                }
                Rc::from(TAG_STR)
            }
            NodeKind::Sequence => Rc::from(TAG_SEQ),
            NodeKind::Mapping => Rc::from(TAG_MAP),
        }
    }

    fn resolve_scalar(&self, value: &str) -> Option<Rc<str>> {
        let rows = self.scalar_resolvers.get(&value.chars().next())?;
        rows.iter()
            .find(|(_, regex)| regex.is_match(value))
            .map(|(tag, _)| tag.clone())
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn implicit(value: &str) -> Rc<str> {
        Resolver::new().resolve(NodeKind::Scalar, None, value, true)
    }

    #[test]
    fn test_explicit_tag_wins() {
        let resolver = Resolver::new();
        let tag = resolver.resolve(NodeKind::Scalar, Some(TAG_STR), "42", true);
        assert_eq!(&*tag, TAG_STR);
    }

    #[test]
    fn test_non_specific_tag_falls_back_to_kind() {
        let resolver = Resolver::new();
        assert_eq!(
            &*resolver.resolve(NodeKind::Scalar, Some("!"), "42", false),
            TAG_STR
        );
        assert_eq!(
            &*resolver.resolve(NodeKind::Sequence, Some("!"), "", false),
            TAG_SEQ
        );
    }

    #[test]
    fn test_int_resolution() {
        assert_eq!(&*implicit("42"), TAG_INT);
        assert_eq!(&*implicit("-17"), TAG_INT);
        assert_eq!(&*implicit("0x1F"), TAG_INT);
        assert_eq!(&*implicit("0b1010"), TAG_INT);
        assert_eq!(&*implicit("0755"), TAG_INT);
        assert_eq!(&*implicit("1:30:00"), TAG_INT);
        assert_eq!(&*implicit("1_000"), TAG_INT);
    }

    #[test]
    fn test_float_resolution() {
        assert_eq!(&*implicit("3.14"), TAG_FLOAT);
        assert_eq!(&*implicit("-2.0"), TAG_FLOAT);
        assert_eq!(&*implicit(".5"), TAG_FLOAT);
        assert_eq!(&*implicit(".inf"), TAG_FLOAT);
        assert_eq!(&*implicit(".NaN"), TAG_FLOAT);
        assert_eq!(&*implicit("1:30.5"), TAG_FLOAT);
    }

    #[test]
    fn test_bool_resolution() {
        for value in ["yes", "No", "TRUE", "false", "on", "Off"] {
            assert_eq!(&*implicit(value), TAG_BOOL, "{value}");
        }
    }

    #[test]
    fn test_null_resolution() {
        assert_eq!(&*implicit("~"), TAG_NULL);
        assert_eq!(&*implicit("null"), TAG_NULL);
        assert_eq!(&*implicit("NULL"), TAG_NULL);
        assert_eq!(&*implicit(""), TAG_NULL);
    }

    #[test]
    fn test_timestamp_resolution() {
        assert_eq!(&*implicit("2001-12-14"), TAG_TIMESTAMP);
        assert_eq!(&*implicit("2001-12-14 21:59:43.10 -5"), TAG_TIMESTAMP);
        assert_eq!(&*implicit("2001-12-14T21:59:43Z"), TAG_TIMESTAMP);
    }

    #[test]
    fn test_merge_and_value_keys() {
        assert_eq!(&*implicit("<<"), TAG_MERGE);
        assert_eq!(&*implicit("="), TAG_VALUE);
    }

    #[test]
    fn test_plain_strings_fall_through() {
        assert_eq!(&*implicit("hello"), TAG_STR);
        assert_eq!(&*implicit("0x"), TAG_STR);
        assert_eq!(&*implicit("yes we can"), TAG_STR);
        assert_eq!(&*implicit("12 monkeys"), TAG_STR);
    }

    #[test]
    fn test_non_implicit_scalar_is_str() {
        let resolver = Resolver::new();
        assert_eq!(
            &*resolver.resolve(NodeKind::Scalar, None, "42", false),
            TAG_STR
        );
    }

    #[test]
    fn test_custom_resolver_registration() {
        let mut resolver = Resolver::new();
        let pattern = Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid pattern");
        resolver.add_implicit_resolver("!color", pattern, "#");
        assert_eq!(
            &*resolver.resolve(NodeKind::Scalar, None, "#ff0000", true),
            "!color"
        );
    }
}
