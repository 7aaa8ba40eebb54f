// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

#![deny(unused_crate_dependencies)]

//! A YAML 1.1 loading front end.
//!
//! This crate implements the three pull-based stages that turn a buffer
//! into typed YAML nodes:
//!
//! - **Scanner** — code points to tokens, tracking indentation, flow
//!   nesting, and simple-key candidates with retroactive `Key` injection;
//! - **Parser** — tokens to structural events per the YAML grammar;
//! - **Composer** — events to one [`Node`] tree per document, resolving
//!   anchors and aliases (with cycle detection) and flattening merge keys.
//!
//! Each stage exposes a peek/advance cursor and pulls lazily from the stage
//! below, so only bounded buffering is needed. Errors are fatal to the
//! stream and carry both a problem mark and the mark of the enclosing
//! construct.
//!
//! # Example
//!
//! ```
//! use yaml_loader::compose;
//!
//! let node = compose("name: John\nage: 30\n").unwrap();
//! let pairs = node.as_mapping().unwrap();
//! assert_eq!(pairs[0].0.as_scalar(), Some("name"));
//! assert_eq!(pairs[1].1.tag(), "tag:yaml.org,2002:int");
//! ```
//!
//! Multi-document streams go through [`compose_all`], or through
//! [`Composer`] directly for lazy, document-at-a-time pulling.

mod composer;
mod error;
mod escape;
mod event;
mod mark;
mod node;
mod parser;
mod reader;
mod resolver;
mod scanner;
mod token;

pub use composer::Composer;
pub use error::{ErrorKind, LoadError, Result};
pub use event::{CollectionStyle, Event, EventKind};
pub use mark::Mark;
pub use node::{Node, NodeStyle, NodeValue};
pub use parser::Parser;
pub use reader::{Encoding, Reader};
pub use resolver::{
    NodeKind, Resolver, TAG_BOOL, TAG_FLOAT, TAG_INT, TAG_MAP, TAG_MERGE, TAG_NULL, TAG_SEQ,
    TAG_STR, TAG_TIMESTAMP, TAG_VALUE,
};
pub use scanner::Scanner;
pub use token::{Chomping, Directive, ScalarStyle, Token, TokenKind};

/// Compose the single document of `input`.
///
/// An empty stream and a stream with more than one document are errors.
pub fn compose(input: &str) -> Result<Node> {
    Composer::new(input).get_single_node()
}

/// Compose every document of `input`, in order.
///
/// A well-formed but empty stream yields an empty vector.
pub fn compose_all(input: &str) -> Result<Vec<Node>> {
    let mut composer = Composer::new(input);
    let mut documents = Vec::new();
    while let Some(node) = composer.get_node()? {
        documents.push(node);
    }
    Ok(documents)
}
