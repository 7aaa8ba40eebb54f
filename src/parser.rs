// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Event parser for YAML 1.1.
//!
//! A deterministic LL-style machine over the scanner's token stream,
//! implementing the productions:
//!
//! ```text
//! stream       := StreamStart (implicit_document | explicit_document)* StreamEnd
//! explicit     := Directive* DocumentStart node? DocumentEnd?
//! node         := Alias | properties (scalar | block_seq | block_map | flow_seq | flow_map)
//! properties   := (Anchor Tag? | Tag Anchor?)?
//! block_seq    := BlockSequenceStart (BlockEntry node?)* BlockEnd
//! block_map    := BlockMappingStart ((Key node?)? (Value node?)?)* BlockEnd
//! flow_seq     := FlowSequenceStart (flow_seq_entry (FlowEntry flow_seq_entry)*)? FlowSequenceEnd
//! flow_map     := FlowMappingStart (flow_map_entry (FlowEntry flow_map_entry)*)? FlowMappingEnd
//! ```
//!
//! The parser keeps a stack of continuation states and a stack of the marks
//! where open collections began (for error messages). Where the grammar
//! expects a node and none is present, an empty plain scalar event is
//! emitted. A lone `Key` inside a flow sequence opens a one-pair mapping.
//!
//! `%YAML` and `%TAG` directives are processed per document: duplicates are
//! errors, a major version other than 1 is only warned about, and the handle
//! table is frozen into the `DocumentStart` event before being reset.

use ordermap::OrderMap;

use crate::error::{ErrorKind, LoadError, Result};
use crate::escape::decode_double_quoted;
use crate::event::{CollectionStyle, Event, EventKind};
use crate::mark::Mark;
use crate::scanner::Scanner;
use crate::token::{Directive, ScalarStyle, TokenKind};

/// Handles every document starts with.
const DEFAULT_TAG_HANDLES: [(&str, &str); 2] = [("!", "!"), ("!!", "tag:yaml.org,2002:")];

/// Parser continuations. Each value names the production to resume when the
/// next event is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StreamStart,
    ImplicitDocumentStart,
    DocumentStart,
    DocumentContent,
    DocumentEnd,
    BlockSequenceFirstEntry,
    BlockSequenceEntry,
    IndentlessSequenceEntry,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingValue,
    FlowSequenceFirstEntry,
    FlowSequenceEntry,
    FlowSequenceEntryMappingKey,
    FlowSequenceEntryMappingValue,
    FlowSequenceEntryMappingEnd,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingValue,
    FlowMappingEmptyValue,
    End,
}

/// The event parser. `peek_event`/`next_event` form the pull cursor
/// consumed by the composer.
#[derive(Debug)]
pub struct Parser {
    scanner: Scanner,
    state: State,
    states: Vec<State>,
    /// Start marks of the open collections, for error context.
    marks: Vec<Mark>,
    current: Option<Event>,
    yaml_version: Option<(u32, u32)>,
    tag_handles: OrderMap<String, String>,
}

impl Parser {
    /// Create a parser over the input.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            scanner: Scanner::new(input),
            state: State::StreamStart,
            states: Vec::new(),
            marks: Vec::new(),
            current: None,
            yaml_version: None,
            tag_handles: OrderMap::new(),
        }
    }

    /// The next event, without consuming it.
    pub fn peek_event(&mut self) -> Result<&Event> {
        if self.current.is_none() {
            self.current = Some(self.produce()?);
        }
        self.current
            .as_ref()
            .ok_or_else(|| LoadError::new(ErrorKind::UnexpectedEndOfStream, self.scanner.mark()))
    }

    /// Consume and return the next event.
    pub fn next_event(&mut self) -> Result<Event> {
        if let Some(event) = self.current.take() {
            return Ok(event);
        }
        self.produce()
    }

    fn produce(&mut self) -> Result<Event> {
        match self.state {
            State::StreamStart => self.parse_stream_start(),
            State::ImplicitDocumentStart => self.parse_document_start(true),
            State::DocumentStart => self.parse_document_start(false),
            State::DocumentContent => self.parse_document_content(),
            State::DocumentEnd => self.parse_document_end(),
            State::BlockSequenceFirstEntry => self.parse_block_sequence_first_entry(),
            State::BlockSequenceEntry => self.parse_block_sequence_entry(),
            State::IndentlessSequenceEntry => self.parse_indentless_sequence_entry(),
            State::BlockMappingFirstKey => self.parse_block_mapping_first_key(),
            State::BlockMappingKey => self.parse_block_mapping_key(),
            State::BlockMappingValue => self.parse_block_mapping_value(),
            State::FlowSequenceFirstEntry => self.parse_flow_sequence_entry(true),
            State::FlowSequenceEntry => self.parse_flow_sequence_entry(false),
            State::FlowSequenceEntryMappingKey => self.parse_flow_sequence_entry_mapping_key(),
            State::FlowSequenceEntryMappingValue => self.parse_flow_sequence_entry_mapping_value(),
            State::FlowSequenceEntryMappingEnd => self.parse_flow_sequence_entry_mapping_end(),
            State::FlowMappingFirstKey => self.parse_flow_mapping_key(true),
            State::FlowMappingKey => self.parse_flow_mapping_key(false),
            State::FlowMappingValue => self.parse_flow_mapping_value(false),
            State::FlowMappingEmptyValue => self.parse_flow_mapping_value(true),
            State::End => Err(LoadError::new(
                ErrorKind::UnexpectedEndOfStream,
                self.scanner.mark(),
            )),
        }
    }

    fn pop_state(&mut self) -> Result<State> {
        self.states
            .pop()
            .ok_or_else(|| LoadError::new(ErrorKind::UnexpectedEndOfStream, self.scanner.mark()))
    }

    /// The event emitted where the grammar expects a node and none is
    /// present.
    const fn empty_scalar(mark: Mark) -> Event {
        Event::new(
            EventKind::Scalar {
                anchor: None,
                tag: None,
                implicit: (true, false),
                value: String::new(),
                style: ScalarStyle::Plain,
            },
            mark,
            mark,
        )
    }

    // ------------------------------------------------------------------
    // Stream and document productions
    // ------------------------------------------------------------------

    fn parse_stream_start(&mut self) -> Result<Event> {
        let token = self.scanner.next_token()?;
        match token.kind {
            TokenKind::StreamStart(encoding) => {
                self.state = State::ImplicitDocumentStart;
                Ok(Event::new(
                    EventKind::StreamStart { encoding },
                    token.start_mark,
                    token.end_mark,
                ))
            }
            other => Err(LoadError::new(
                ErrorKind::Expected {
                    expected: "'<stream start>'",
                    found: other.to_string(),
                },
                token.start_mark,
            )),
        }
    }

    fn parse_document_start(&mut self, implicit_allowed: bool) -> Result<Event> {
        if implicit_allowed {
            let token = self.scanner.peek_token()?;
            if !matches!(
                token.kind,
                TokenKind::Directive(_) | TokenKind::DocumentStart | TokenKind::StreamEnd
            ) {
                let mark = token.start_mark;
                self.yaml_version = None;
                self.tag_handles = default_tag_handles();
                self.states.push(State::DocumentEnd);
                self.state = State::DocumentContent;
                return Ok(Event::new(
                    EventKind::DocumentStart {
                        explicit: false,
                        version: None,
                        tags: self.tag_handles.clone(),
                    },
                    mark,
                    mark,
                ));
            }
        }
        // Stray `...` tokens between documents carry no content.
        while self.scanner.peek_token()?.kind == TokenKind::DocumentEnd {
            self.scanner.next_token()?;
        }
        if self.scanner.peek_token()?.kind == TokenKind::StreamEnd {
            let token = self.scanner.next_token()?;
            self.state = State::End;
            return Ok(Event::new(
                EventKind::StreamEnd,
                token.start_mark,
                token.end_mark,
            ));
        }
        let start_mark = self.scanner.peek_token()?.start_mark;
        let (version, tags) = self.process_directives()?;
        let token = self.scanner.peek_token()?;
        if token.kind != TokenKind::DocumentStart {
            return Err(LoadError::new(
                ErrorKind::Expected {
                    expected: "'<document start>'",
                    found: token.kind.to_string(),
                },
                token.start_mark,
            ));
        }
        let token = self.scanner.next_token()?;
        self.states.push(State::DocumentEnd);
        self.state = State::DocumentContent;
        Ok(Event::new(
            EventKind::DocumentStart {
                explicit: true,
                version,
                tags,
            },
            start_mark,
            token.end_mark,
        ))
    }

    fn parse_document_end(&mut self) -> Result<Event> {
        let token = self.scanner.peek_token()?;
        let start_mark = token.start_mark;
        let mut end_mark = start_mark;
        let mut explicit = false;
        if token.kind == TokenKind::DocumentEnd {
            let token = self.scanner.next_token()?;
            end_mark = token.end_mark;
            explicit = true;
        }
        self.state = State::DocumentStart;
        Ok(Event::new(
            EventKind::DocumentEnd { explicit },
            start_mark,
            end_mark,
        ))
    }

    fn parse_document_content(&mut self) -> Result<Event> {
        let token = self.scanner.peek_token()?;
        if matches!(
            token.kind,
            TokenKind::Directive(_)
                | TokenKind::DocumentStart
                | TokenKind::DocumentEnd
                | TokenKind::StreamEnd
        ) {
            let mark = token.start_mark;
            self.state = self.pop_state()?;
            Ok(Self::empty_scalar(mark))
        } else {
            self.parse_node(true, false)
        }
    }

    fn process_directives(&mut self) -> Result<(Option<(u32, u32)>, OrderMap<String, String>)> {
        self.yaml_version = None;
        self.tag_handles = OrderMap::new();
        while matches!(self.scanner.peek_token()?.kind, TokenKind::Directive(_)) {
            let token = self.scanner.next_token()?;
            let TokenKind::Directive(directive) = token.kind else {
                break;
            };
            match directive {
                Directive::Yaml { major, minor } => {
                    if self.yaml_version.is_some() {
                        return Err(LoadError::new(
                            ErrorKind::DuplicateYamlDirective,
                            token.start_mark,
                        ));
                    }
                    if major != 1 {
                        log::warn!(
                            "unsupported YAML version {major}.{minor} at {}; \
                             parsing with 1.1 rules",
                            token.start_mark
                        );
                    }
                    self.yaml_version = Some((major, minor));
                }
                Directive::Tag { handle, prefix } => {
                    if self.tag_handles.contains_key(&handle) {
                        return Err(LoadError::new(
                            ErrorKind::DuplicateTagHandle(handle),
                            token.start_mark,
                        ));
                    }
                    self.tag_handles.insert(handle, prefix);
                }
                Directive::Reserved { .. } => {}
            }
        }
        for (handle, prefix) in DEFAULT_TAG_HANDLES {
            if !self.tag_handles.contains_key(handle) {
                self.tag_handles
                    .insert(handle.to_owned(), prefix.to_owned());
            }
        }
        Ok((self.yaml_version, self.tag_handles.clone()))
    }

    // ------------------------------------------------------------------
    // Node productions
    // ------------------------------------------------------------------

    /// Parse one node. `block` enables the block collection productions;
    /// `indentless` additionally allows a sequence of `-` entries at the
    /// current indentation (the value position of a block mapping).
    fn parse_node(&mut self, block: bool, indentless: bool) -> Result<Event> {
        let context = if block {
            "parsing a block node"
        } else {
            "parsing a flow node"
        };
        if matches!(self.scanner.peek_token()?.kind, TokenKind::Alias(_)) {
            let token = self.scanner.next_token()?;
            let TokenKind::Alias(anchor) = token.kind else {
                return Err(LoadError::new(
                    ErrorKind::UnexpectedEndOfStream,
                    token.start_mark,
                ));
            };
            self.state = self.pop_state()?;
            return Ok(Event::new(
                EventKind::Alias { anchor },
                token.start_mark,
                token.end_mark,
            ));
        }

        let mut start_mark = self.scanner.peek_token()?.start_mark;
        let mut end_mark = start_mark;
        let mut anchor = None;
        let mut tag_token = None;
        if matches!(self.scanner.peek_token()?.kind, TokenKind::Anchor(_)) {
            let token = self.scanner.next_token()?;
            start_mark = token.start_mark;
            end_mark = token.end_mark;
            if let TokenKind::Anchor(name) = token.kind {
                anchor = Some(name);
            }
            if matches!(self.scanner.peek_token()?.kind, TokenKind::Tag { .. }) {
                let token = self.scanner.next_token()?;
                end_mark = token.end_mark;
                if let TokenKind::Tag { handle, suffix } = token.kind {
                    tag_token = Some((handle, suffix, token.start_mark));
                }
            }
        } else if matches!(self.scanner.peek_token()?.kind, TokenKind::Tag { .. }) {
            let token = self.scanner.next_token()?;
            start_mark = token.start_mark;
            end_mark = token.end_mark;
            if let TokenKind::Tag { handle, suffix } = token.kind {
                tag_token = Some((handle, suffix, token.start_mark));
            }
            if matches!(self.scanner.peek_token()?.kind, TokenKind::Anchor(_)) {
                let token = self.scanner.next_token()?;
                end_mark = token.end_mark;
                if let TokenKind::Anchor(name) = token.kind {
                    anchor = Some(name);
                }
            }
        }

        let tag = match tag_token {
            Some((Some(handle), suffix, mark)) => {
                let Some(prefix) = self.tag_handles.get(&handle) else {
                    return Err(LoadError::new(
                        ErrorKind::UndefinedTagHandle(handle),
                        mark,
                    )
                    .with_context(context, start_mark));
                };
                Some(format!("{prefix}{suffix}"))
            }
            Some((None, suffix, _)) => Some(suffix),
            None => None,
        };
        // A collection tag is inferable when none was written, or only the
        // non-specific '!' was.
        let implicit = tag.is_none() || tag.as_deref() == Some("!");

        if indentless && matches!(self.scanner.peek_token()?.kind, TokenKind::BlockEntry) {
            let end_mark = self.scanner.peek_token()?.end_mark;
            self.state = State::IndentlessSequenceEntry;
            return Ok(Event::new(
                EventKind::SequenceStart {
                    anchor,
                    tag,
                    implicit,
                    style: CollectionStyle::Block,
                },
                start_mark,
                end_mark,
            ));
        }

        if matches!(self.scanner.peek_token()?.kind, TokenKind::Scalar { .. }) {
            let token = self.scanner.next_token()?;
            let TokenKind::Scalar { value, style } = token.kind else {
                return Err(LoadError::new(
                    ErrorKind::UnexpectedEndOfStream,
                    token.start_mark,
                ));
            };
            let implicit_pair = (
                tag.is_none() && style == ScalarStyle::Plain,
                tag.is_none() && style != ScalarStyle::Plain,
            );
            // Escape decoding was deferred by the scanner.
            let value = if style == ScalarStyle::DoubleQuoted {
                decode_double_quoted(&value).map_err(|kind| {
                    LoadError::new(kind, token.start_mark).with_context(context, start_mark)
                })?
            } else {
                value
            };
            self.state = self.pop_state()?;
            return Ok(Event::new(
                EventKind::Scalar {
                    anchor,
                    tag,
                    implicit: implicit_pair,
                    value,
                    style,
                },
                start_mark,
                token.end_mark,
            ));
        }
        if matches!(self.scanner.peek_token()?.kind, TokenKind::FlowSequenceStart) {
            let end_mark = self.scanner.peek_token()?.end_mark;
            self.state = State::FlowSequenceFirstEntry;
            return Ok(Event::new(
                EventKind::SequenceStart {
                    anchor,
                    tag,
                    implicit,
                    style: CollectionStyle::Flow,
                },
                start_mark,
                end_mark,
            ));
        }
        if matches!(self.scanner.peek_token()?.kind, TokenKind::FlowMappingStart) {
            let end_mark = self.scanner.peek_token()?.end_mark;
            self.state = State::FlowMappingFirstKey;
            return Ok(Event::new(
                EventKind::MappingStart {
                    anchor,
                    tag,
                    implicit,
                    style: CollectionStyle::Flow,
                },
                start_mark,
                end_mark,
            ));
        }
        if block && matches!(self.scanner.peek_token()?.kind, TokenKind::BlockSequenceStart) {
            let end_mark = self.scanner.peek_token()?.start_mark;
            self.state = State::BlockSequenceFirstEntry;
            return Ok(Event::new(
                EventKind::SequenceStart {
                    anchor,
                    tag,
                    implicit,
                    style: CollectionStyle::Block,
                },
                start_mark,
                end_mark,
            ));
        }
        if block && matches!(self.scanner.peek_token()?.kind, TokenKind::BlockMappingStart) {
            let end_mark = self.scanner.peek_token()?.start_mark;
            self.state = State::BlockMappingFirstKey;
            return Ok(Event::new(
                EventKind::MappingStart {
                    anchor,
                    tag,
                    implicit,
                    style: CollectionStyle::Block,
                },
                start_mark,
                end_mark,
            ));
        }
        if anchor.is_some() || tag.is_some() {
            // `&anchor` or `!tag` with nothing after them: an empty scalar
            // node.
            self.state = self.pop_state()?;
            return Ok(Event::new(
                EventKind::Scalar {
                    implicit: (tag.is_none(), false),
                    anchor,
                    tag,
                    value: String::new(),
                    style: ScalarStyle::Plain,
                },
                start_mark,
                end_mark,
            ));
        }
        let token = self.scanner.peek_token()?;
        Err(LoadError::new(
            ErrorKind::Expected {
                expected: "the node content",
                found: token.kind.to_string(),
            },
            token.start_mark,
        )
        .with_context(context, start_mark))
    }

    // ------------------------------------------------------------------
    // Block collection productions
    // ------------------------------------------------------------------

    fn parse_block_sequence_first_entry(&mut self) -> Result<Event> {
        let token = self.scanner.next_token()?;
        self.marks.push(token.start_mark);
        self.parse_block_sequence_entry()
    }

    fn parse_block_sequence_entry(&mut self) -> Result<Event> {
        if self.scanner.peek_token()?.kind == TokenKind::BlockEntry {
            let token = self.scanner.next_token()?;
            if matches!(
                self.scanner.peek_token()?.kind,
                TokenKind::BlockEntry | TokenKind::BlockEnd
            ) {
                self.state = State::BlockSequenceEntry;
                return Ok(Self::empty_scalar(token.end_mark));
            }
            self.states.push(State::BlockSequenceEntry);
            return self.parse_node(true, false);
        }
        if self.scanner.peek_token()?.kind == TokenKind::BlockEnd {
            let token = self.scanner.next_token()?;
            self.state = self.pop_state()?;
            self.marks.pop();
            return Ok(Event::new(
                EventKind::SequenceEnd,
                token.start_mark,
                token.end_mark,
            ));
        }
        let context_mark = self.marks.last().copied().unwrap_or_default();
        let token = self.scanner.peek_token()?;
        Err(LoadError::new(
            ErrorKind::Expected {
                expected: "<block end>",
                found: token.kind.to_string(),
            },
            token.start_mark,
        )
        .with_context("parsing a block collection", context_mark))
    }

    fn parse_indentless_sequence_entry(&mut self) -> Result<Event> {
        if self.scanner.peek_token()?.kind == TokenKind::BlockEntry {
            let token = self.scanner.next_token()?;
            if matches!(
                self.scanner.peek_token()?.kind,
                TokenKind::BlockEntry | TokenKind::Key | TokenKind::Value | TokenKind::BlockEnd
            ) {
                self.state = State::IndentlessSequenceEntry;
                return Ok(Self::empty_scalar(token.end_mark));
            }
            self.states.push(State::IndentlessSequenceEntry);
            return self.parse_node(true, false);
        }
        // No BlockEnd token is scanned for an indentless sequence; it ends
        // wherever its parent mapping resumes.
        let mark = self.scanner.peek_token()?.start_mark;
        self.state = self.pop_state()?;
        Ok(Event::new(EventKind::SequenceEnd, mark, mark))
    }

    fn parse_block_mapping_first_key(&mut self) -> Result<Event> {
        let token = self.scanner.next_token()?;
        self.marks.push(token.start_mark);
        self.parse_block_mapping_key()
    }

    fn parse_block_mapping_key(&mut self) -> Result<Event> {
        if self.scanner.peek_token()?.kind == TokenKind::Key {
            let token = self.scanner.next_token()?;
            if matches!(
                self.scanner.peek_token()?.kind,
                TokenKind::Key | TokenKind::Value | TokenKind::BlockEnd
            ) {
                self.state = State::BlockMappingValue;
                return Ok(Self::empty_scalar(token.end_mark));
            }
            self.states.push(State::BlockMappingValue);
            return self.parse_node(true, true);
        }
        if self.scanner.peek_token()?.kind == TokenKind::BlockEnd {
            let token = self.scanner.next_token()?;
            self.state = self.pop_state()?;
            self.marks.pop();
            return Ok(Event::new(
                EventKind::MappingEnd,
                token.start_mark,
                token.end_mark,
            ));
        }
        let context_mark = self.marks.last().copied().unwrap_or_default();
        let token = self.scanner.peek_token()?;
        Err(LoadError::new(
            ErrorKind::Expected {
                expected: "<block end>",
                found: token.kind.to_string(),
            },
            token.start_mark,
        )
        .with_context("parsing a block mapping", context_mark))
    }

    fn parse_block_mapping_value(&mut self) -> Result<Event> {
        if self.scanner.peek_token()?.kind == TokenKind::Value {
            let token = self.scanner.next_token()?;
            if matches!(
                self.scanner.peek_token()?.kind,
                TokenKind::Key | TokenKind::Value | TokenKind::BlockEnd
            ) {
                self.state = State::BlockMappingKey;
                return Ok(Self::empty_scalar(token.end_mark));
            }
            self.states.push(State::BlockMappingKey);
            return self.parse_node(true, true);
        }
        // `? key` with no `:` line pairs with an empty value.
        let mark = self.scanner.peek_token()?.start_mark;
        self.state = State::BlockMappingKey;
        Ok(Self::empty_scalar(mark))
    }

    // ------------------------------------------------------------------
    // Flow collection productions
    // ------------------------------------------------------------------

    fn parse_flow_sequence_entry(&mut self, first: bool) -> Result<Event> {
        if first {
            let token = self.scanner.next_token()?;
            self.marks.push(token.start_mark);
        }
        if self.scanner.peek_token()?.kind != TokenKind::FlowSequenceEnd {
            if !first {
                let token = self.scanner.peek_token()?;
                if token.kind == TokenKind::FlowEntry {
                    self.scanner.next_token()?;
                } else {
                    return Err(LoadError::new(
                        ErrorKind::Expected {
                            expected: "',' or ']'",
                            found: token.kind.to_string(),
                        },
                        token.start_mark,
                    )
                    .with_context(
                        "parsing a flow sequence",
                        self.marks.last().copied().unwrap_or_default(),
                    ));
                }
            }
            let token = self.scanner.peek_token()?;
            if token.kind == TokenKind::Key {
                // A lone key opens a single-pair mapping.
                let event = Event::new(
                    EventKind::MappingStart {
                        anchor: None,
                        tag: None,
                        implicit: true,
                        style: CollectionStyle::Flow,
                    },
                    token.start_mark,
                    token.end_mark,
                );
                self.state = State::FlowSequenceEntryMappingKey;
                return Ok(event);
            } else if token.kind != TokenKind::FlowSequenceEnd {
                self.states.push(State::FlowSequenceEntry);
                return self.parse_node(false, false);
            }
        }
        let token = self.scanner.next_token()?;
        self.state = self.pop_state()?;
        self.marks.pop();
        Ok(Event::new(
            EventKind::SequenceEnd,
            token.start_mark,
            token.end_mark,
        ))
    }

    fn parse_flow_sequence_entry_mapping_key(&mut self) -> Result<Event> {
        let token = self.scanner.next_token()?; // the Key token
        let next = self.scanner.peek_token()?;
        if matches!(
            next.kind,
            TokenKind::Value | TokenKind::FlowEntry | TokenKind::FlowSequenceEnd
        ) {
            self.state = State::FlowSequenceEntryMappingValue;
            Ok(Self::empty_scalar(token.end_mark))
        } else {
            self.states.push(State::FlowSequenceEntryMappingValue);
            self.parse_node(false, false)
        }
    }

    fn parse_flow_sequence_entry_mapping_value(&mut self) -> Result<Event> {
        let token = self.scanner.peek_token()?;
        if token.kind == TokenKind::Value {
            let token = self.scanner.next_token()?;
            let next = self.scanner.peek_token()?;
            if matches!(
                next.kind,
                TokenKind::FlowEntry | TokenKind::FlowSequenceEnd
            ) {
                self.state = State::FlowSequenceEntryMappingEnd;
                Ok(Self::empty_scalar(token.end_mark))
            } else {
                self.states.push(State::FlowSequenceEntryMappingEnd);
                self.parse_node(false, false)
            }
        } else {
            let mark = token.start_mark;
            self.state = State::FlowSequenceEntryMappingEnd;
            Ok(Self::empty_scalar(mark))
        }
    }

    fn parse_flow_sequence_entry_mapping_end(&mut self) -> Result<Event> {
        let mark = self.scanner.peek_token()?.start_mark;
        self.state = State::FlowSequenceEntry;
        Ok(Event::new(EventKind::MappingEnd, mark, mark))
    }

    fn parse_flow_mapping_key(&mut self, first: bool) -> Result<Event> {
        if first {
            let token = self.scanner.next_token()?;
            self.marks.push(token.start_mark);
        }
        if self.scanner.peek_token()?.kind != TokenKind::FlowMappingEnd {
            if !first {
                let token = self.scanner.peek_token()?;
                if token.kind == TokenKind::FlowEntry {
                    self.scanner.next_token()?;
                } else {
                    return Err(LoadError::new(
                        ErrorKind::Expected {
                            expected: "',' or '}'",
                            found: token.kind.to_string(),
                        },
                        token.start_mark,
                    )
                    .with_context(
                        "parsing a flow mapping",
                        self.marks.last().copied().unwrap_or_default(),
                    ));
                }
            }
            let token = self.scanner.peek_token()?;
            if token.kind == TokenKind::Key {
                let token = self.scanner.next_token()?;
                let next = self.scanner.peek_token()?;
                if matches!(
                    next.kind,
                    TokenKind::Value | TokenKind::FlowEntry | TokenKind::FlowMappingEnd
                ) {
                    self.state = State::FlowMappingValue;
                    return Ok(Self::empty_scalar(token.end_mark));
                }
                self.states.push(State::FlowMappingValue);
                return self.parse_node(false, false);
            } else if token.kind != TokenKind::FlowMappingEnd {
                // A keyless entry, e.g. `{a}`; it pairs with an empty value.
                self.states.push(State::FlowMappingEmptyValue);
                return self.parse_node(false, false);
            }
        }
        let token = self.scanner.next_token()?;
        self.state = self.pop_state()?;
        self.marks.pop();
        Ok(Event::new(
            EventKind::MappingEnd,
            token.start_mark,
            token.end_mark,
        ))
    }

    /// `empty_value` is set when the preceding entry was a keyless node, in
    /// which case the pair is completed with an empty value immediately.
    fn parse_flow_mapping_value(&mut self, empty_value: bool) -> Result<Event> {
        if empty_value {
            let mark = self.scanner.peek_token()?.start_mark;
            self.state = State::FlowMappingKey;
            return Ok(Self::empty_scalar(mark));
        }
        let token = self.scanner.peek_token()?;
        if token.kind == TokenKind::Value {
            let token = self.scanner.next_token()?;
            let next = self.scanner.peek_token()?;
            if matches!(next.kind, TokenKind::FlowEntry | TokenKind::FlowMappingEnd) {
                self.state = State::FlowMappingKey;
                Ok(Self::empty_scalar(token.end_mark))
            } else {
                self.states.push(State::FlowMappingKey);
                self.parse_node(false, false)
            }
        } else {
            let mark = token.start_mark;
            self.state = State::FlowMappingKey;
            Ok(Self::empty_scalar(mark))
        }
    }
}

fn default_tag_handles() -> OrderMap<String, String> {
    DEFAULT_TAG_HANDLES
        .iter()
        .map(|(handle, prefix)| ((*handle).to_owned(), (*prefix).to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collect event kinds for the whole stream.
    fn events(input: &str) -> Vec<EventKind> {
        let mut parser = Parser::new(input);
        let mut out = Vec::new();
        loop {
            let event = parser.next_event().expect("parse failed");
            let done = event.kind == EventKind::StreamEnd;
            out.push(event.kind);
            if done {
                break;
            }
        }
        out
    }

    fn parse_error(input: &str) -> LoadError {
        let mut parser = Parser::new(input);
        loop {
            match parser.next_event() {
                Ok(event) if event.kind == EventKind::StreamEnd => {
                    panic!("expected a parse error")
                }
                Ok(_) => {}
                Err(err) => return err,
            }
        }
    }

    fn plain(value: &str) -> EventKind {
        EventKind::Scalar {
            anchor: None,
            tag: None,
            implicit: (true, false),
            value: value.to_owned(),
            style: ScalarStyle::Plain,
        }
    }

    #[test]
    fn test_empty_stream() {
        let kinds = events("");
        assert_eq!(kinds.len(), 2);
        assert!(matches!(kinds[0], EventKind::StreamStart { .. }));
        assert_eq!(kinds[1], EventKind::StreamEnd);
    }

    #[test]
    fn test_implicit_document_scalar() {
        let kinds = events("hello");
        assert!(matches!(
            kinds[1],
            EventKind::DocumentStart { explicit: false, .. }
        ));
        assert_eq!(kinds[2], plain("hello"));
        assert_eq!(kinds[3], EventKind::DocumentEnd { explicit: false });
    }

    #[test]
    fn test_block_mapping_events() {
        let kinds = events("a: 1\nb: 2\n");
        assert!(matches!(
            kinds[2],
            EventKind::MappingStart {
                style: CollectionStyle::Block,
                ..
            }
        ));
        assert_eq!(kinds[3], plain("a"));
        assert_eq!(kinds[4], plain("1"));
        assert_eq!(kinds[5], plain("b"));
        assert_eq!(kinds[6], plain("2"));
        assert_eq!(kinds[7], EventKind::MappingEnd);
    }

    #[test]
    fn test_balanced_nesting() {
        let kinds = events("a:\n  - 1\n  - x: y\nb: [1, {c: d}]\n");
        let starts = kinds
            .iter()
            .filter(|k| {
                matches!(
                    k,
                    EventKind::SequenceStart { .. } | EventKind::MappingStart { .. }
                )
            })
            .count();
        let ends = kinds
            .iter()
            .filter(|k| matches!(k, EventKind::SequenceEnd | EventKind::MappingEnd))
            .count();
        assert_eq!(starts, ends);
    }

    #[test]
    fn test_empty_value_gets_empty_scalar() {
        let kinds = events("key:\n");
        assert_eq!(kinds[3], plain("key"));
        assert_eq!(kinds[4], plain(""));
        assert_eq!(kinds[5], EventKind::MappingEnd);
    }

    #[test]
    fn test_indentless_sequence() {
        let kinds = events("k:\n- a\n- b\n");
        assert!(matches!(
            kinds[4],
            EventKind::SequenceStart {
                style: CollectionStyle::Block,
                ..
            }
        ));
        assert_eq!(kinds[5], plain("a"));
        assert_eq!(kinds[6], plain("b"));
        assert_eq!(kinds[7], EventKind::SequenceEnd);
    }

    #[test]
    fn test_flow_sequence_single_pair_mapping() {
        let kinds = events("[a: 1, b]");
        assert!(matches!(kinds[2], EventKind::SequenceStart { .. }));
        assert!(matches!(
            kinds[3],
            EventKind::MappingStart {
                implicit: true,
                style: CollectionStyle::Flow,
                ..
            }
        ));
        assert_eq!(kinds[4], plain("a"));
        assert_eq!(kinds[5], plain("1"));
        assert_eq!(kinds[6], EventKind::MappingEnd);
        assert_eq!(kinds[7], plain("b"));
        assert_eq!(kinds[8], EventKind::SequenceEnd);
    }

    #[test]
    fn test_anchor_and_alias_events() {
        let kinds = events("a: &x 1\nb: *x\n");
        assert!(kinds.iter().any(|k| matches!(
            k,
            EventKind::Scalar { anchor: Some(a), .. } if a == "x"
        )));
        assert!(
            kinds
                .iter()
                .any(|k| matches!(k, EventKind::Alias { anchor } if anchor == "x"))
        );
    }

    #[test]
    fn test_tag_shorthand_expansion() {
        let kinds = events("!!str 42");
        assert!(matches!(
            &kinds[2],
            EventKind::Scalar { tag: Some(tag), implicit: (false, false), .. }
                if tag == "tag:yaml.org,2002:str"
        ));
    }

    #[test]
    fn test_tag_directive_expansion() {
        let kinds = events("%TAG !e! tag:example.com,2000:\n---\n!e!foo bar\n");
        assert!(matches!(
            &kinds[2],
            EventKind::Scalar { tag: Some(tag), .. } if tag == "tag:example.com,2000:foo"
        ));
    }

    #[test]
    fn test_verbatim_tag() {
        let kinds = events("!<tag:example.com,2000:x> v");
        assert!(matches!(
            &kinds[2],
            EventKind::Scalar { tag: Some(tag), .. } if tag == "tag:example.com,2000:x"
        ));
    }

    #[test]
    fn test_non_specific_tag_stays_bang() {
        let kinds = events("! 42");
        assert!(matches!(
            &kinds[2],
            EventKind::Scalar { tag: Some(tag), implicit: (false, false), .. } if tag == "!"
        ));
    }

    #[test]
    fn test_quoted_scalar_implicit_pair() {
        let kinds = events("'x'");
        assert!(matches!(
            &kinds[2],
            EventKind::Scalar {
                tag: None,
                implicit: (false, true),
                style: ScalarStyle::SingleQuoted,
                ..
            }
        ));
    }

    #[test]
    fn test_double_quoted_escapes_decoded() {
        let kinds = events("\"a\\tb\\u0041\"");
        assert!(matches!(
            &kinds[2],
            EventKind::Scalar { value, .. } if value == "a\tb\u{0041}"
        ));
    }

    #[test]
    fn test_explicit_documents() {
        let kinds = events("---\nA\n...\n---\nB\n...\n");
        let docs = kinds
            .iter()
            .filter(|k| matches!(k, EventKind::DocumentStart { explicit: true, .. }))
            .count();
        assert_eq!(docs, 2);
        assert!(kinds.contains(&EventKind::DocumentEnd { explicit: true }));
    }

    #[test]
    fn test_version_directive_on_event() {
        let kinds = events("%YAML 1.1\n---\na\n");
        assert!(matches!(
            &kinds[1],
            EventKind::DocumentStart {
                explicit: true,
                version: Some((1, 1)),
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_yaml_directive_rejected() {
        let err = parse_error("%YAML 1.1\n%YAML 1.1\n---\na\n");
        assert_eq!(err.kind, ErrorKind::DuplicateYamlDirective);
    }

    #[test]
    fn test_duplicate_tag_handle_rejected() {
        let err = parse_error("%TAG !e! tag:a:\n%TAG !e! tag:b:\n---\na\n");
        assert_eq!(err.kind, ErrorKind::DuplicateTagHandle("!e!".to_owned()));
    }

    #[test]
    fn test_undefined_tag_handle_rejected() {
        let err = parse_error("!e!foo bar");
        assert_eq!(err.kind, ErrorKind::UndefinedTagHandle("!e!".to_owned()));
    }

    #[test]
    fn test_unterminated_flow_sequence_rejected() {
        let err = parse_error("[a");
        assert!(matches!(
            err.kind,
            ErrorKind::Expected {
                expected: "',' or ']'",
                ..
            }
        ));
    }

    #[test]
    fn test_content_after_document_rejected() {
        let err = parse_error("a\nb: c\n");
        assert!(matches!(err.kind, ErrorKind::Expected { .. }));
    }

    #[test]
    fn test_properties_without_content() {
        let kinds = events("a: &x\nb: 1\n");
        assert!(kinds.iter().any(|k| matches!(
            k,
            EventKind::Scalar { anchor: Some(a), value, .. } if a == "x" && value.is_empty()
        )));
    }

    #[test]
    fn test_tag_before_anchor() {
        let kinds = events("!!str &x v");
        assert!(matches!(
            &kinds[2],
            EventKind::Scalar { anchor: Some(a), tag: Some(t), .. }
                if a == "x" && t == "tag:yaml.org,2002:str"
        ));
    }

    #[test]
    fn test_stray_document_end_tokens_skipped() {
        let kinds = events("a\n...\n...\n");
        assert_eq!(kinds.last(), Some(&EventKind::StreamEnd));
    }
}
