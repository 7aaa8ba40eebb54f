// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Document composer.
//!
//! The composer turns the parser's event stream into one [`Node`] tree per
//! document. It owns the anchors table for the current document: an anchor
//! is entered as *uninitialized* before its node is composed, so an alias
//! that resolves to an anchor still under composition is the recursion
//! error, and an alias that resolves afterwards shares the finished node by
//! identity.
//!
//! Mapping composition honors merge keys: a key resolved to the merge tag
//! has its value flattened into the enclosing mapping. Explicit pairs are
//! kept in order and win over merged pairs with the same key; duplicates
//! among explicit pairs are an error, duplicates arriving through a merge
//! are silently dropped.

use std::collections::HashMap;

use crate::error::{ErrorKind, LoadError, Result};
use crate::event::EventKind;
use crate::node::{Node, NodeValue};
use crate::parser::Parser;
use crate::resolver::{NodeKind, Resolver};

/// Events → nodes, one document at a time.
#[derive(Debug)]
pub struct Composer {
    parser: Parser,
    resolver: Resolver,
    /// Anchor name → composed node; `None` while the node is still being
    /// composed (the cycle sentinel). Cleared per document.
    anchors: HashMap<String, Option<Node>>,
}

impl Composer {
    /// Create a composer over the input with the default resolver.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self::with_resolver(input, Resolver::new())
    }

    /// Create a composer with a caller-supplied resolver.
    #[must_use]
    pub fn with_resolver(input: &str, resolver: Resolver) -> Self {
        Self {
            parser: Parser::new(input),
            resolver,
            anchors: HashMap::new(),
        }
    }

    /// Returns `true` while another document is available. Consumes the
    /// stream start on first use.
    pub fn check_node(&mut self) -> Result<bool> {
        if matches!(self.parser.peek_event()?.kind, EventKind::StreamStart { .. }) {
            self.parser.next_event()?;
        }
        Ok(!matches!(self.parser.peek_event()?.kind, EventKind::StreamEnd))
    }

    /// Compose and return the next document, or `None` when the stream is
    /// exhausted.
    pub fn get_node(&mut self) -> Result<Option<Node>> {
        if self.check_node()? {
            Ok(Some(self.compose_document()?))
        } else {
            Ok(None)
        }
    }

    /// Compose the only document of the stream. Zero documents or more
    /// than one are errors.
    pub fn get_single_node(&mut self) -> Result<Node> {
        if !self.check_node()? {
            let mark = self.parser.peek_event()?.start_mark;
            return Err(LoadError::new(ErrorKind::NoDocument, mark));
        }
        let document = self.compose_document()?;
        if !matches!(self.parser.peek_event()?.kind, EventKind::StreamEnd) {
            let mark = self.parser.peek_event()?.start_mark;
            return Err(LoadError::new(ErrorKind::UnexpectedDocument, mark));
        }
        Ok(document)
    }

    fn compose_document(&mut self) -> Result<Node> {
        self.anchors.clear();
        self.parser.next_event()?; // DocumentStart
        let node = self.compose_node()?;
        self.parser.next_event()?; // DocumentEnd
        self.anchors.clear();
        Ok(node)
    }

    fn compose_node(&mut self) -> Result<Node> {
        if matches!(self.parser.peek_event()?.kind, EventKind::Alias { .. }) {
            let event = self.parser.next_event()?;
            let EventKind::Alias { anchor } = event.kind else {
                return Err(LoadError::new(
                    ErrorKind::UnexpectedEndOfStream,
                    event.start_mark,
                ));
            };
            return match self.anchors.get(&anchor) {
                None => Err(LoadError::new(
                    ErrorKind::UndefinedAlias(anchor),
                    event.start_mark,
                )),
                Some(None) => Err(LoadError::new(
                    ErrorKind::RecursiveAlias(anchor),
                    event.start_mark,
                )),
                Some(Some(node)) => Ok(node.clone()),
            };
        }

        let event = self.parser.peek_event()?;
        let start_mark = event.start_mark;
        let anchor = match &event.kind {
            EventKind::Scalar { anchor, .. }
            | EventKind::SequenceStart { anchor, .. }
            | EventKind::MappingStart { anchor, .. } => anchor.clone(),
            _ => None,
        };
        if let Some(name) = &anchor {
            if self.anchors.contains_key(name) {
                return Err(LoadError::new(
                    ErrorKind::DuplicateAnchor(name.clone()),
                    start_mark,
                ));
            }
            // Sentinel: the anchor exists but its node is not finished, so
            // an alias reaching it now is recursive.
            self.anchors.insert(name.clone(), None);
        }

        let node = if matches!(self.parser.peek_event()?.kind, EventKind::Scalar { .. }) {
            self.compose_scalar_node()?
        } else if matches!(
            self.parser.peek_event()?.kind,
            EventKind::SequenceStart { .. }
        ) {
            self.compose_sequence_node()?
        } else if matches!(
            self.parser.peek_event()?.kind,
            EventKind::MappingStart { .. }
        ) {
            self.compose_mapping_node()?
        } else {
            let event = self.parser.peek_event()?;
            return Err(LoadError::new(
                ErrorKind::Expected {
                    expected: "a node",
                    found: event.kind.name().to_owned(),
                },
                event.start_mark,
            ));
        };

        if let Some(name) = anchor {
            self.anchors.insert(name, Some(node.clone()));
        }
        Ok(node)
    }

    fn compose_scalar_node(&mut self) -> Result<Node> {
        let event = self.parser.next_event()?;
        let EventKind::Scalar {
            tag,
            implicit,
            value,
            style,
            ..
        } = event.kind
        else {
            return Err(LoadError::new(
                ErrorKind::UnexpectedEndOfStream,
                event.start_mark,
            ));
        };
        let tag = self
            .resolver
            .resolve(NodeKind::Scalar, tag.as_deref(), &value, implicit.0);
        Ok(Node::scalar(
            tag,
            value,
            style,
            event.start_mark,
            event.end_mark,
        ))
    }

    fn compose_sequence_node(&mut self) -> Result<Node> {
        let event = self.parser.next_event()?;
        let EventKind::SequenceStart {
            tag,
            implicit,
            style,
            ..
        } = event.kind
        else {
            return Err(LoadError::new(
                ErrorKind::UnexpectedEndOfStream,
                event.start_mark,
            ));
        };
        let tag = self
            .resolver
            .resolve(NodeKind::Sequence, tag.as_deref(), "", implicit);
        let mut items = Vec::new();
        while !matches!(self.parser.peek_event()?.kind, EventKind::SequenceEnd) {
            items.push(self.compose_node()?);
        }
        let end = self.parser.next_event()?;
        Ok(Node::sequence(
            tag,
            items,
            style,
            event.start_mark,
            end.end_mark,
        ))
    }

    fn compose_mapping_node(&mut self) -> Result<Node> {
        let event = self.parser.next_event()?;
        let EventKind::MappingStart {
            tag,
            implicit,
            style,
            ..
        } = event.kind
        else {
            return Err(LoadError::new(
                ErrorKind::UnexpectedEndOfStream,
                event.start_mark,
            ));
        };
        let tag = self
            .resolver
            .resolve(NodeKind::Mapping, tag.as_deref(), "", implicit);
        let mut pairs: Vec<(Node, Node)> = Vec::new();
        let mut merged: Vec<(Node, Node)> = Vec::new();
        while !matches!(self.parser.peek_event()?.kind, EventKind::MappingEnd) {
            let key = self.compose_node()?;
            let value = self.compose_node()?;
            if key.is_merge() {
                Self::flatten_merge(&value, &mut merged)?;
            } else {
                if pairs.iter().any(|(existing, _)| *existing == key) {
                    return Err(LoadError::new(ErrorKind::DuplicateKey, key.start_mark()));
                }
                pairs.push((key, value));
            }
        }
        // Explicit pairs first, then merged pairs whose keys are still
        // absent.
        for (key, value) in merged {
            if !pairs.iter().any(|(existing, _)| *existing == key) {
                pairs.push((key, value));
            }
        }
        let end = self.parser.next_event()?;
        Ok(Node::mapping(
            tag,
            pairs,
            style,
            event.start_mark,
            end.end_mark,
        ))
    }

    /// Flatten a merge-key value: a mapping contributes its pairs, a
    /// sequence contributes the pairs of each mapping in order. Merge keys
    /// nested in the sources were already expanded when those mappings were
    /// composed.
    fn flatten_merge(value: &Node, out: &mut Vec<(Node, Node)>) -> Result<()> {
        match value.value() {
            NodeValue::Mapping(pairs) => {
                out.extend(pairs.iter().cloned());
                Ok(())
            }
            NodeValue::Sequence(items) => {
                for item in items {
                    let NodeValue::Mapping(pairs) = item.value() else {
                        return Err(LoadError::new(
                            ErrorKind::InvalidMergeValue(item.kind_name()),
                            item.start_mark(),
                        ));
                    };
                    out.extend(pairs.iter().cloned());
                }
                Ok(())
            }
            NodeValue::Scalar(_) => Err(LoadError::new(
                ErrorKind::InvalidMergeValue(value.kind_name()),
                value.start_mark(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{TAG_INT, TAG_MAP, TAG_SEQ, TAG_STR};

    fn compose_one(input: &str) -> Node {
        Composer::new(input)
            .get_single_node()
            .expect("compose failed")
    }

    fn compose_error(input: &str) -> LoadError {
        let mut composer = Composer::new(input);
        loop {
            match composer.get_node() {
                Ok(Some(_)) => {}
                Ok(None) => panic!("expected a compose error"),
                Err(err) => return err,
            }
        }
    }

    fn scalar_of(node: &Node) -> &str {
        node.as_scalar().expect("expected a scalar")
    }

    #[test]
    fn test_scalar_document() {
        let node = compose_one("42");
        assert_eq!(node.tag(), TAG_INT);
        assert_eq!(node.as_scalar(), Some("42"));
    }

    #[test]
    fn test_mapping_order_preserved() {
        let node = compose_one("b: 1\na: 2\nc: 3\n");
        assert_eq!(node.tag(), TAG_MAP);
        let keys: Vec<&str> = node
            .as_mapping()
            .expect("mapping")
            .iter()
            .map(|(key, _)| scalar_of(key))
            .collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn test_sequence_tags() {
        let node = compose_one("- a\n- 1\n");
        assert_eq!(node.tag(), TAG_SEQ);
        let items = node.as_sequence().expect("sequence");
        assert_eq!(items[0].tag(), TAG_STR);
        assert_eq!(items[1].tag(), TAG_INT);
    }

    #[test]
    fn test_alias_shares_identity() {
        let node = compose_one("a: &x {k: v}\nb: *x\n");
        let pairs = node.as_mapping().expect("mapping");
        assert!(pairs[0].1.same_node(&pairs[1].1));
    }

    #[test]
    fn test_alias_before_anchor_completes() {
        let err = compose_error("&a [*a]");
        assert_eq!(err.kind, ErrorKind::RecursiveAlias("a".to_owned()));
    }

    #[test]
    fn test_undefined_alias() {
        let err = compose_error("a: *nope\n");
        assert_eq!(err.kind, ErrorKind::UndefinedAlias("nope".to_owned()));
    }

    #[test]
    fn test_duplicate_anchor() {
        let err = compose_error("a: &x 1\nb: &x 2\n");
        assert_eq!(err.kind, ErrorKind::DuplicateAnchor("x".to_owned()));
    }

    #[test]
    fn test_anchors_reset_between_documents() {
        let err = compose_error("---\na: &x 1\n---\nb: *x\n");
        assert_eq!(err.kind, ErrorKind::UndefinedAlias("x".to_owned()));
    }

    #[test]
    fn test_anchor_rebound_in_next_document() {
        let mut composer = Composer::new("---\n&x 1\n---\n&x 2\n");
        let first = composer.get_node().expect("first").expect("some");
        let second = composer.get_node().expect("second").expect("some");
        assert_eq!(first.as_scalar(), Some("1"));
        assert_eq!(second.as_scalar(), Some("2"));
    }

    #[test]
    fn test_duplicate_key() {
        let err = compose_error("{a: 1, a: 2}");
        assert_eq!(err.kind, ErrorKind::DuplicateKey);
    }

    #[test]
    fn test_duplicate_key_compares_resolved_values() {
        // Both keys resolve to int 1 under the same tag.
        let err = compose_error("{1: a, 1: b}");
        assert_eq!(err.kind, ErrorKind::DuplicateKey);
    }

    #[test]
    fn test_merge_key_explicit_pairs_win() {
        let node = compose_one("base: &b { x: 1, y: 2 }\nover: { <<: *b, y: 9 }\n");
        let pairs = node.as_mapping().expect("mapping");
        let over = pairs[1].1.as_mapping().expect("mapping");
        let rendered: Vec<(&str, &str)> = over
            .iter()
            .map(|(key, value)| (scalar_of(key), scalar_of(value)))
            .collect();
        assert_eq!(rendered, [("y", "9"), ("x", "1")]);
    }

    #[test]
    fn test_merge_sequence_of_mappings() {
        let input = "\
a: &a { x: 1 }
b: &b { y: 2, x: 9 }
c: { <<: [*a, *b], z: 3 }
";
        let node = compose_one(input);
        let pairs = node.as_mapping().expect("mapping");
        let merged = pairs[2].1.as_mapping().expect("mapping");
        let rendered: Vec<(&str, &str)> = merged
            .iter()
            .map(|(key, value)| (scalar_of(key), scalar_of(value)))
            .collect();
        // Explicit z first; x comes from *a, which precedes *b.
        assert_eq!(rendered, [("z", "3"), ("x", "1"), ("y", "2")]);
    }

    #[test]
    fn test_merge_value_must_be_mapping_shaped() {
        let err = compose_error("a: &b [1, 2]\nc: { <<: *b }\n");
        assert_eq!(err.kind, ErrorKind::InvalidMergeValue("a scalar"));
        let err = compose_error("c: { <<: 1 }\n");
        assert_eq!(err.kind, ErrorKind::InvalidMergeValue("a scalar"));
    }

    #[test]
    fn test_explicit_merge_tag() {
        let node = compose_one("base: &b { x: 1 }\nover: { !!merge m: *b }\n");
        // An explicit !!merge tag on any key triggers merging.
        let over = node.as_mapping().expect("mapping")[1]
            .1
            .as_mapping()
            .expect("mapping");
        assert_eq!(scalar_of(&over[0].0), "x");
    }

    #[test]
    fn test_single_document_enforced() {
        let err = Composer::new("---\nA\n---\nB\n")
            .get_single_node()
            .expect_err("expected an error");
        assert_eq!(err.kind, ErrorKind::UnexpectedDocument);
    }

    #[test]
    fn test_single_document_from_empty_stream() {
        let err = Composer::new("")
            .get_single_node()
            .expect_err("expected an error");
        assert_eq!(err.kind, ErrorKind::NoDocument);
    }

    #[test]
    fn test_check_and_get_node_cursor() {
        let mut composer = Composer::new("---\nA\n...\n---\nB\n...\n");
        assert!(composer.check_node().expect("check"));
        let first = composer.get_node().expect("get").expect("some");
        assert_eq!(first.as_scalar(), Some("A"));
        assert!(composer.check_node().expect("check"));
        let second = composer.get_node().expect("get").expect("some");
        assert_eq!(second.as_scalar(), Some("B"));
        assert!(!composer.check_node().expect("check"));
        assert!(composer.get_node().expect("get").is_none());
    }
}
