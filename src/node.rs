// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Composed YAML nodes.
//!
//! A [`Node`] is a cheap-to-clone handle over the node record: aliases
//! resolve to the *same* node as their anchor, observable through
//! [`Node::same_node`], not to a deep copy. Recursive anchors are rejected
//! during composition, so the sharing is acyclic and plain reference
//! counting suffices.
//!
//! Equality is structural over the resolved tag and the value; marks and
//! presentation styles do not participate. This is the equality the
//! composer uses for duplicate-key detection.

use std::rc::Rc;

use crate::event::CollectionStyle;
use crate::mark::Mark;
use crate::resolver::TAG_MERGE;
use crate::token::ScalarStyle;

/// Presentation style of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStyle {
    Scalar(ScalarStyle),
    Collection(CollectionStyle),
}

/// The content of a node.
#[derive(Debug, PartialEq, Eq)]
pub enum NodeValue {
    Scalar(String),
    Sequence(Vec<Node>),
    /// Key/value pairs in insertion order.
    Mapping(Vec<(Node, Node)>),
}

#[derive(Debug)]
struct NodeData {
    tag: Rc<str>,
    value: NodeValue,
    style: NodeStyle,
    start_mark: Mark,
    end_mark: Mark,
}

/// A composed node: a shared handle over the tag, value, style, and marks.
#[derive(Debug, Clone)]
pub struct Node(Rc<NodeData>);

impl Node {
    /// Build a scalar node.
    #[must_use]
    pub fn scalar(
        tag: Rc<str>,
        value: String,
        style: ScalarStyle,
        start_mark: Mark,
        end_mark: Mark,
    ) -> Self {
        Self(Rc::new(NodeData {
            tag,
            value: NodeValue::Scalar(value),
            style: NodeStyle::Scalar(style),
            start_mark,
            end_mark,
        }))
    }

    /// Build a sequence node.
    #[must_use]
    pub fn sequence(
        tag: Rc<str>,
        items: Vec<Node>,
        style: CollectionStyle,
        start_mark: Mark,
        end_mark: Mark,
    ) -> Self {
        Self(Rc::new(NodeData {
            tag,
            value: NodeValue::Sequence(items),
            style: NodeStyle::Collection(style),
            start_mark,
            end_mark,
        }))
    }

    /// Build a mapping node. Pair order is preserved.
    #[must_use]
    pub fn mapping(
        tag: Rc<str>,
        pairs: Vec<(Node, Node)>,
        style: CollectionStyle,
        start_mark: Mark,
        end_mark: Mark,
    ) -> Self {
        Self(Rc::new(NodeData {
            tag,
            value: NodeValue::Mapping(pairs),
            style: NodeStyle::Collection(style),
            start_mark,
            end_mark,
        }))
    }

    /// The resolved tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    /// The node content.
    #[must_use]
    pub fn value(&self) -> &NodeValue {
        &self.0.value
    }

    /// The presentation style.
    #[must_use]
    pub fn style(&self) -> NodeStyle {
        self.0.style
    }

    /// Where the node began.
    #[must_use]
    pub fn start_mark(&self) -> Mark {
        self.0.start_mark
    }

    /// One past where the node ended.
    #[must_use]
    pub fn end_mark(&self) -> Mark {
        self.0.end_mark
    }

    /// Scalar content, if this is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match &self.0.value {
            NodeValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Sequence items, if this is a sequence.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match &self.0.value {
            NodeValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Mapping pairs, if this is a mapping.
    #[must_use]
    pub fn as_mapping(&self) -> Option<&[(Node, Node)]> {
        match &self.0.value {
            NodeValue::Mapping(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Returns `true` if this node carries the merge tag (`<<`).
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.tag() == TAG_MERGE
    }

    /// Identity comparison: `true` when both handles refer to the same
    /// node, as an alias and its anchor do.
    #[must_use]
    pub fn same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Short kind name for error messages.
    pub(crate) fn kind_name(&self) -> &'static str {
        match self.0.value {
            NodeValue::Scalar(_) => "a scalar",
            NodeValue::Sequence(_) => "a sequence",
            NodeValue::Mapping(_) => "a mapping",
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
            || (self.0.tag == other.0.tag && self.0.value == other.0.value)
    }
}

impl Eq for Node {}
