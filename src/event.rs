// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Parsing events.
//!
//! Events mirror the YAML event grammar: a stream wraps documents, a
//! document wraps one node, and nodes are scalars, sequences, mappings, or
//! aliases. Collection starts carry the node properties (anchor, tag) and
//! the presentation style; the composer consumes events and never sees
//! tokens.

use ordermap::OrderMap;

use crate::mark::Mark;
use crate::reader::Encoding;
use crate::token::ScalarStyle;

/// Collection presentation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionStyle {
    /// Indentation-based.
    #[default]
    Block,
    /// `[...]` / `{...}` with `,` separators.
    Flow,
}

/// A parsing event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    StreamStart {
        encoding: Encoding,
    },
    StreamEnd,
    DocumentStart {
        /// `true` when the document was opened with `---`.
        explicit: bool,
        /// The `%YAML` version, when one was given.
        version: Option<(u32, u32)>,
        /// Tag handles in effect for this document, frozen in directive
        /// order with the defaults appended.
        tags: OrderMap<String, String>,
    },
    DocumentEnd {
        /// `true` when the document was closed with `...`.
        explicit: bool,
    },
    Alias {
        anchor: String,
    },
    Scalar {
        anchor: Option<String>,
        tag: Option<String>,
        /// Whether the tag could be inferred (when plain, when non-plain).
        implicit: (bool, bool),
        value: String,
        style: ScalarStyle,
    },
    SequenceStart {
        anchor: Option<String>,
        tag: Option<String>,
        implicit: bool,
        style: CollectionStyle,
    },
    SequenceEnd,
    MappingStart {
        anchor: Option<String>,
        tag: Option<String>,
        implicit: bool,
        style: CollectionStyle,
    },
    MappingEnd,
}

impl EventKind {
    /// Short name used in composer error messages.
    pub(crate) const fn name(&self) -> &'static str {
        match self {
            Self::StreamStart { .. } => "a stream start",
            Self::StreamEnd => "a stream end",
            Self::DocumentStart { .. } => "a document start",
            Self::DocumentEnd { .. } => "a document end",
            Self::Alias { .. } => "an alias",
            Self::Scalar { .. } => "a scalar",
            Self::SequenceStart { .. } => "a sequence start",
            Self::SequenceEnd => "a sequence end",
            Self::MappingStart { .. } => "a mapping start",
            Self::MappingEnd => "a mapping end",
        }
    }
}

/// An event with its source marks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub start_mark: Mark,
    pub end_mark: Mark,
}

impl Event {
    /// Create an event from a kind and its marks.
    #[must_use]
    pub const fn new(kind: EventKind, start_mark: Mark, end_mark: Mark) -> Self {
        Self {
            kind,
            start_mark,
            end_mark,
        }
    }
}
