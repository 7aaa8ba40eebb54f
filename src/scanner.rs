// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Pull tokenizer for YAML 1.1.
//!
//! The scanner reads code points through [`Reader`] and produces [`Token`]s
//! on demand. Three pieces of state drive it:
//!
//! - an **indent stack**: `BlockSequenceStart`/`BlockMappingStart` are
//!   synthesized when a collection opens at a deeper column, `BlockEnd` when
//!   indentation unwinds past it;
//! - a **flow level**: inside `[...]`/`{...}` the indicators `,?[]{}` change
//!   meaning and indentation is ignored;
//! - a **simple-key table**: a key written without `?` is only recognized
//!   when its `:` shows up, at which point a `Key` token (and possibly a
//!   `BlockMappingStart`) is inserted retroactively into the token queue at
//!   the position recorded for the candidate.
//!
//! A simple-key candidate is only viable for 1024 code points and must not
//! cross a line break. The queue is refilled whenever it runs dry or the
//! oldest candidate's token is about to be handed out, so callers never
//! observe a token that a later `:` could still rewrite.
//!
//! All scanner errors are fatal: no token is emitted after a failure.

use std::collections::{HashMap, VecDeque};

use crate::error::{ErrorKind, LoadError, Result, describe_char};
use crate::mark::Mark;
use crate::reader::{Reader, is_blank, is_blank_or_break_or_end, is_break, is_break_or_end};
use crate::token::{Chomping, Directive, ScalarStyle, Token, TokenKind};

/// Characters that cannot begin a plain scalar.
const PLAIN_FORBIDDEN_FIRST: &str = "-?:,[]{}#&*!|>'\"%@`";

/// Escape characters of a double-quoted scalar that stand for a single
/// replacement character. Hex escapes (`x`, `u`, `U`) are handled separately.
const SIMPLE_ESCAPES: &str = "0abt\tnvfre \"/\\N_LP";

/// A candidate for a simple key, recorded when a key-starting token is
/// scanned and resolved (or discarded) when a `:` is seen.
#[derive(Debug, Clone, Copy)]
struct SimpleKey {
    /// Queue position of the candidate's first token, counted from the
    /// start of the stream.
    token_number: usize,
    /// A required key must be matched by a `:`; it sits at the exact
    /// indentation of its enclosing block mapping.
    required: bool,
    /// Position of the candidate's first code point.
    mark: Mark,
}

/// The tokenizer. `peek_token`/`next_token` form the pull cursor consumed
/// by the parser.
#[derive(Debug)]
pub struct Scanner {
    reader: Reader,
    /// Set once `StreamEnd` has been queued; nothing is scanned after it.
    done: bool,
    /// Number of unclosed `[` and `{`.
    flow_level: usize,
    tokens: VecDeque<Token>,
    /// Number of tokens already handed to the caller.
    tokens_taken: usize,
    /// Column of the innermost block collection, `-1` outside any.
    indent: isize,
    indents: Vec<isize>,
    /// Whether a simple key may start at the current position.
    allow_simple_key: bool,
    /// At most one live candidate per flow level.
    possible_simple_keys: HashMap<usize, SimpleKey>,
}

impl Scanner {
    /// Create a scanner over the input. The `StreamStart` token is queued
    /// immediately.
    #[must_use]
    pub fn new(input: &str) -> Self {
        let reader = Reader::new(input);
        let mark = reader.mark();
        let mut tokens = VecDeque::new();
        tokens.push_back(Token::new(
            TokenKind::StreamStart(reader.encoding()),
            mark,
            mark,
        ));
        Self {
            reader,
            done: false,
            flow_level: 0,
            tokens,
            tokens_taken: 0,
            indent: -1,
            indents: Vec::new(),
            allow_simple_key: true,
            possible_simple_keys: HashMap::new(),
        }
    }

    /// The next token, without consuming it.
    pub fn peek_token(&mut self) -> Result<&Token> {
        self.ensure_tokens()?;
        self.tokens.front().ok_or_else(|| {
            LoadError::new(ErrorKind::UnexpectedEndOfStream, self.reader.mark())
        })
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.ensure_tokens()?;
        match self.tokens.pop_front() {
            Some(token) => {
                self.tokens_taken += 1;
                Ok(token)
            }
            None => Err(LoadError::new(
                ErrorKind::UnexpectedEndOfStream,
                self.reader.mark(),
            )),
        }
    }

    /// The reader's current position.
    pub(crate) fn mark(&self) -> Mark {
        self.reader.mark()
    }

    /// Fetch until the head of the queue is stable: the queue is non-empty
    /// and no pending simple-key candidate points at the token about to be
    /// returned.
    fn ensure_tokens(&mut self) -> Result<()> {
        while self.need_more_tokens()? {
            self.fetch_token()?;
        }
        Ok(())
    }

    fn need_more_tokens(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        if self.tokens.is_empty() {
            return Ok(true);
        }
        self.stale_possible_simple_keys()?;
        Ok(self.next_possible_simple_key() == Some(self.tokens_taken))
    }

    // ------------------------------------------------------------------
    // Simple-key machinery
    // ------------------------------------------------------------------

    fn next_possible_simple_key(&self) -> Option<usize> {
        self.possible_simple_keys
            .values()
            .map(|key| key.token_number)
            .min()
    }

    /// Drop candidates that crossed a line break or outgrew the 1024
    /// code-point window; a required candidate doing so is an error.
    fn stale_possible_simple_keys(&mut self) -> Result<()> {
        let line = self.reader.line();
        let index = self.reader.index();
        let stale = |key: &SimpleKey| key.mark.line != line || index - key.mark.index > 1024;
        if let Some(key) = self
            .possible_simple_keys
            .values()
            .find(|key| key.required && stale(key))
        {
            return Err(
                LoadError::new(ErrorKind::SimpleKeyExpired, self.reader.mark())
                    .with_context("scanning a simple key", key.mark),
            );
        }
        self.possible_simple_keys.retain(|_, key| !stale(key));
        Ok(())
    }

    /// Record a candidate for the token about to be scanned, replacing any
    /// candidate already pending at this flow level.
    fn save_possible_simple_key(&mut self) -> Result<()> {
        if !self.allow_simple_key {
            return Ok(());
        }
        let required = self.flow_level == 0 && self.indent == self.reader.column() as isize;
        self.remove_possible_simple_key()?;
        let key = SimpleKey {
            token_number: self.tokens_taken + self.tokens.len(),
            required,
            mark: self.reader.mark(),
        };
        self.possible_simple_keys.insert(self.flow_level, key);
        Ok(())
    }

    /// Discard the candidate at the current flow level; discarding a
    /// required candidate means its `:` can no longer appear.
    fn remove_possible_simple_key(&mut self) -> Result<()> {
        if let Some(key) = self.possible_simple_keys.get(&self.flow_level) {
            if key.required {
                return Err(
                    LoadError::new(ErrorKind::SimpleKeyExpired, self.reader.mark())
                        .with_context("scanning a simple key", key.mark),
                );
            }
            self.possible_simple_keys.remove(&self.flow_level);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Indentation machinery
    // ------------------------------------------------------------------

    /// Pop indentation levels above `column`, emitting one `BlockEnd` per
    /// level. Indentation is meaningless in flow context.
    fn unwind_indent(&mut self, column: isize) {
        if self.flow_level > 0 {
            return;
        }
        while self.indent > column {
            let mark = self.reader.mark();
            self.indent = self.indents.pop().unwrap_or(-1);
            self.tokens
                .push_back(Token::new(TokenKind::BlockEnd, mark, mark));
        }
    }

    /// Push a deeper indentation level. Returns `false` when `column` does
    /// not go deeper, which is how sibling entries at the same column share
    /// one collection opener.
    fn add_indent(&mut self, column: isize) -> bool {
        if self.indent < column {
            self.indents.push(self.indent);
            self.indent = column;
            true
        } else {
            false
        }
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    fn fetch_token(&mut self) -> Result<()> {
        self.scan_to_next_token();
        self.stale_possible_simple_keys()?;
        self.unwind_indent(self.reader.column() as isize);

        let Some(ch) = self.reader.peek() else {
            return self.fetch_stream_end();
        };
        if self.reader.column() == 0 {
            if ch == '%' {
                return self.fetch_directive();
            }
            if self.next_is_document_indicator() {
                let kind = if ch == '-' {
                    TokenKind::DocumentStart
                } else {
                    TokenKind::DocumentEnd
                };
                return self.fetch_document_indicator(kind);
            }
        }
        match ch {
            '[' => self.fetch_flow_collection_start(TokenKind::FlowSequenceStart),
            '{' => self.fetch_flow_collection_start(TokenKind::FlowMappingStart),
            ']' => self.fetch_flow_collection_end(TokenKind::FlowSequenceEnd),
            '}' => self.fetch_flow_collection_end(TokenKind::FlowMappingEnd),
            ',' => self.fetch_flow_entry(),
            '-' if self.check_block_entry() => self.fetch_block_entry(),
            '?' if self.check_key() => self.fetch_key(),
            ':' if self.check_value() => self.fetch_value(),
            '*' => self.fetch_anchor_or_alias(true),
            '&' => self.fetch_anchor_or_alias(false),
            '!' => self.fetch_tag(),
            '|' if self.flow_level == 0 => self.fetch_block_scalar(ScalarStyle::Literal),
            '>' if self.flow_level == 0 => self.fetch_block_scalar(ScalarStyle::Folded),
            '\'' => self.fetch_flow_scalar(ScalarStyle::SingleQuoted),
            '"' => self.fetch_flow_scalar(ScalarStyle::DoubleQuoted),
            _ if self.check_plain() => self.fetch_plain(),
            _ => Err(LoadError::new(
                ErrorKind::UnexpectedCharacter(ch),
                self.reader.mark(),
            )),
        }
    }

    /// `---` or `...` at column 0, followed by a blank, a break, or EOF.
    fn next_is_document_indicator(&self) -> bool {
        self.reader.column() == 0
            && matches!(self.reader.prefix(3).as_str(), "---" | "...")
            && is_blank_or_break_or_end(self.reader.peek_at(3))
    }

    /// `-` begins a block entry when followed by a blank, a break, or EOF.
    fn check_block_entry(&self) -> bool {
        is_blank_or_break_or_end(self.reader.peek_at(1))
    }

    /// `?` begins a key in flow context, or before a blank/break/EOF.
    fn check_key(&self) -> bool {
        self.flow_level > 0 || is_blank_or_break_or_end(self.reader.peek_at(1))
    }

    /// `:` begins a value in flow context, or before a blank/break/EOF.
    fn check_value(&self) -> bool {
        self.flow_level > 0 || is_blank_or_break_or_end(self.reader.peek_at(1))
    }

    /// A plain scalar may start with anything outside the indicator set,
    /// or with `-` (always) or `?`/`:` (block context only) when the next
    /// character is not a blank.
    fn check_plain(&self) -> bool {
        let Some(ch) = self.reader.peek() else {
            return false;
        };
        let plain_start = !is_blank(ch) && !is_break(ch) && !PLAIN_FORBIDDEN_FIRST.contains(ch);
        plain_start
            || (!is_blank_or_break_or_end(self.reader.peek_at(1))
                && (ch == '-' || (self.flow_level == 0 && matches!(ch, '?' | ':'))))
    }

    /// Skip spaces (plus tabs in flow context), comments, and line breaks.
    /// A line break in block context re-arms simple keys.
    fn scan_to_next_token(&mut self) {
        loop {
            while self.reader.peek() == Some(' ')
                || (self.flow_level > 0 && self.reader.peek() == Some('\t'))
            {
                self.reader.forward();
            }
            if self.reader.peek() == Some('#') {
                while !is_break_or_end(self.reader.peek()) {
                    self.reader.forward();
                }
            }
            if self.scan_line_break().is_some() {
                if self.flow_level == 0 {
                    self.allow_simple_key = true;
                }
            } else {
                break;
            }
        }
    }

    /// Consume one line break, normalizing `\r\n`, `\r`, and NEL to `\n`.
    fn scan_line_break(&mut self) -> Option<char> {
        match self.reader.peek()? {
            '\r' => {
                self.reader.forward();
                if self.reader.peek() == Some('\n') {
                    self.reader.forward();
                }
                Some('\n')
            }
            '\n' | '\u{0085}' => {
                self.reader.forward();
                Some('\n')
            }
            c @ ('\u{2028}' | '\u{2029}') => {
                self.reader.forward();
                Some(c)
            }
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Fetch routines
    // ------------------------------------------------------------------

    fn fetch_stream_end(&mut self) -> Result<()> {
        self.unwind_indent(-1);
        self.remove_possible_simple_key()?;
        self.allow_simple_key = false;
        self.possible_simple_keys.clear();
        let mark = self.reader.mark();
        self.tokens
            .push_back(Token::new(TokenKind::StreamEnd, mark, mark));
        self.done = true;
        Ok(())
    }

    fn fetch_directive(&mut self) -> Result<()> {
        self.unwind_indent(-1);
        self.remove_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = self.scan_directive()?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_document_indicator(&mut self, kind: TokenKind) -> Result<()> {
        self.unwind_indent(-1);
        self.remove_possible_simple_key()?;
        self.allow_simple_key = false;
        let start_mark = self.reader.mark();
        self.reader.forward_n(3);
        let end_mark = self.reader.mark();
        self.tokens.push_back(Token::new(kind, start_mark, end_mark));
        Ok(())
    }

    fn fetch_flow_collection_start(&mut self, kind: TokenKind) -> Result<()> {
        // The bracket itself may be a key: `[a]: b` is a valid mapping.
        self.save_possible_simple_key()?;
        self.flow_level += 1;
        self.allow_simple_key = true;
        let start_mark = self.reader.mark();
        self.reader.forward();
        let end_mark = self.reader.mark();
        self.tokens.push_back(Token::new(kind, start_mark, end_mark));
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, kind: TokenKind) -> Result<()> {
        self.remove_possible_simple_key()?;
        self.flow_level = self.flow_level.saturating_sub(1);
        self.allow_simple_key = false;
        let start_mark = self.reader.mark();
        self.reader.forward();
        let end_mark = self.reader.mark();
        self.tokens.push_back(Token::new(kind, start_mark, end_mark));
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> Result<()> {
        self.allow_simple_key = true;
        self.remove_possible_simple_key()?;
        let start_mark = self.reader.mark();
        self.reader.forward();
        let end_mark = self.reader.mark();
        self.tokens
            .push_back(Token::new(TokenKind::FlowEntry, start_mark, end_mark));
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> Result<()> {
        if self.flow_level == 0 {
            if !self.allow_simple_key {
                return Err(LoadError::new(
                    ErrorKind::UnexpectedBlockEntry,
                    self.reader.mark(),
                ));
            }
            if self.add_indent(self.reader.column() as isize) {
                let mark = self.reader.mark();
                self.tokens
                    .push_back(Token::new(TokenKind::BlockSequenceStart, mark, mark));
            }
        }
        // In flow context a stray '-' entry is left for the parser to reject.
        self.allow_simple_key = true;
        self.remove_possible_simple_key()?;
        let start_mark = self.reader.mark();
        self.reader.forward();
        let end_mark = self.reader.mark();
        self.tokens
            .push_back(Token::new(TokenKind::BlockEntry, start_mark, end_mark));
        Ok(())
    }

    fn fetch_key(&mut self) -> Result<()> {
        if self.flow_level == 0 {
            if !self.allow_simple_key {
                return Err(LoadError::new(ErrorKind::UnexpectedKey, self.reader.mark()));
            }
            if self.add_indent(self.reader.column() as isize) {
                let mark = self.reader.mark();
                self.tokens
                    .push_back(Token::new(TokenKind::BlockMappingStart, mark, mark));
            }
        }
        self.allow_simple_key = self.flow_level == 0;
        self.remove_possible_simple_key()?;
        let start_mark = self.reader.mark();
        self.reader.forward();
        let end_mark = self.reader.mark();
        self.tokens
            .push_back(Token::new(TokenKind::Key, start_mark, end_mark));
        Ok(())
    }

    fn fetch_value(&mut self) -> Result<()> {
        if let Some(key) = self.possible_simple_keys.remove(&self.flow_level) {
            // The candidate really was a key: splice the Key token (and the
            // mapping opener, if this column starts one) in front of it.
            let insert_at = key.token_number - self.tokens_taken;
            self.tokens.insert(
                insert_at,
                Token::new(TokenKind::Key, key.mark, key.mark),
            );
            if self.flow_level == 0 && self.add_indent(key.mark.column as isize) {
                self.tokens.insert(
                    insert_at,
                    Token::new(TokenKind::BlockMappingStart, key.mark, key.mark),
                );
            }
            self.allow_simple_key = false;
        } else {
            if self.flow_level == 0 {
                if !self.allow_simple_key {
                    return Err(LoadError::new(
                        ErrorKind::UnexpectedValue,
                        self.reader.mark(),
                    ));
                }
                if self.add_indent(self.reader.column() as isize) {
                    let mark = self.reader.mark();
                    self.tokens
                        .push_back(Token::new(TokenKind::BlockMappingStart, mark, mark));
                }
            }
            self.allow_simple_key = self.flow_level == 0;
        }
        let start_mark = self.reader.mark();
        self.reader.forward();
        let end_mark = self.reader.mark();
        self.tokens
            .push_back(Token::new(TokenKind::Value, start_mark, end_mark));
        Ok(())
    }

    fn fetch_anchor_or_alias(&mut self, alias: bool) -> Result<()> {
        self.save_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = self.scan_anchor(alias)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_tag(&mut self) -> Result<()> {
        self.save_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = self.scan_tag()?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_block_scalar(&mut self, style: ScalarStyle) -> Result<()> {
        // A simple key may follow a block scalar.
        self.allow_simple_key = true;
        self.remove_possible_simple_key()?;
        let token = self.scan_block_scalar(style)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_flow_scalar(&mut self, style: ScalarStyle) -> Result<()> {
        self.save_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = self.scan_flow_scalar(style)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_plain(&mut self) -> Result<()> {
        self.save_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = self.scan_plain();
        self.tokens.push_back(token);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Scan routines
    // ------------------------------------------------------------------

    fn expected(
        &self,
        expected: &'static str,
        found: Option<char>,
        context: &'static str,
        context_mark: Mark,
    ) -> LoadError {
        LoadError::new(
            ErrorKind::Expected {
                expected,
                found: describe_char(found),
            },
            self.reader.mark(),
        )
        .with_context(context, context_mark)
    }

    fn scan_directive(&mut self) -> Result<Token> {
        let start_mark = self.reader.mark();
        self.reader.forward(); // '%'
        let name = self.scan_directive_name(start_mark)?;
        let directive;
        let end_mark;
        match name.as_str() {
            "YAML" => {
                let (major, minor) = self.scan_yaml_directive_value(start_mark)?;
                end_mark = self.reader.mark();
                directive = Directive::Yaml { major, minor };
            }
            "TAG" => {
                let (handle, prefix) = self.scan_tag_directive_value(start_mark)?;
                end_mark = self.reader.mark();
                directive = Directive::Tag { handle, prefix };
            }
            _ => {
                end_mark = self.reader.mark();
                // The content of a reserved directive is ignored.
                while !is_break_or_end(self.reader.peek()) {
                    self.reader.forward();
                }
                directive = Directive::Reserved { name };
            }
        }
        self.scan_directive_ignored_line(start_mark)?;
        Ok(Token::new(
            TokenKind::Directive(directive),
            start_mark,
            end_mark,
        ))
    }

    fn scan_directive_name(&mut self, start_mark: Mark) -> Result<String> {
        let mut length = 0;
        while self
            .reader
            .peek_at(length)
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        {
            length += 1;
        }
        if length == 0 {
            return Err(self.expected(
                "an alphabetic or numeric character",
                self.reader.peek(),
                "scanning a directive",
                start_mark,
            ));
        }
        let value = self.reader.prefix(length);
        self.reader.forward_n(length);
        if !is_blank_or_break_or_end(self.reader.peek()) {
            return Err(self.expected(
                "an alphabetic or numeric character",
                self.reader.peek(),
                "scanning a directive",
                start_mark,
            ));
        }
        Ok(value)
    }

    fn scan_yaml_directive_value(&mut self, start_mark: Mark) -> Result<(u32, u32)> {
        while self.reader.peek() == Some(' ') {
            self.reader.forward();
        }
        let major = self.scan_yaml_directive_number(start_mark)?;
        if self.reader.peek() != Some('.') {
            return Err(self.expected(
                "a digit or '.'",
                self.reader.peek(),
                "scanning a directive",
                start_mark,
            ));
        }
        self.reader.forward();
        let minor = self.scan_yaml_directive_number(start_mark)?;
        if !is_blank_or_break_or_end(self.reader.peek()) {
            return Err(self.expected(
                "a digit or ' '",
                self.reader.peek(),
                "scanning a directive",
                start_mark,
            ));
        }
        Ok((major, minor))
    }

    fn scan_yaml_directive_number(&mut self, start_mark: Mark) -> Result<u32> {
        let mut length = 0;
        while self
            .reader
            .peek_at(length)
            .is_some_and(|c| c.is_ascii_digit())
        {
            length += 1;
        }
        if length == 0 {
            return Err(self.expected(
                "a digit",
                self.reader.peek(),
                "scanning a directive",
                start_mark,
            ));
        }
        let digits = self.reader.prefix(length);
        self.reader.forward_n(length);
        match digits.parse() {
            Ok(number) => Ok(number),
            Err(_) => Err(LoadError::new(
                ErrorKind::Expected {
                    expected: "a version number",
                    found: format!("'{digits}'"),
                },
                self.reader.mark(),
            )
            .with_context("scanning a directive", start_mark)),
        }
    }

    fn scan_tag_directive_value(&mut self, start_mark: Mark) -> Result<(String, String)> {
        while self.reader.peek() == Some(' ') {
            self.reader.forward();
        }
        let handle = self.scan_tag_handle("scanning a directive", start_mark)?;
        while self.reader.peek() == Some(' ') {
            self.reader.forward();
        }
        let prefix = self.scan_tag_uri("scanning a directive", start_mark)?;
        if !is_blank_or_break_or_end(self.reader.peek()) {
            return Err(self.expected(
                "' '",
                self.reader.peek(),
                "scanning a directive",
                start_mark,
            ));
        }
        Ok((handle, prefix))
    }

    fn scan_directive_ignored_line(&mut self, start_mark: Mark) -> Result<()> {
        while self.reader.peek() == Some(' ') {
            self.reader.forward();
        }
        if self.reader.peek() == Some('#') {
            while !is_break_or_end(self.reader.peek()) {
                self.reader.forward();
            }
        }
        if !is_break_or_end(self.reader.peek()) {
            return Err(self.expected(
                "a comment or a line break",
                self.reader.peek(),
                "scanning a directive",
                start_mark,
            ));
        }
        self.scan_line_break();
        Ok(())
    }

    fn scan_anchor(&mut self, alias: bool) -> Result<Token> {
        let start_mark = self.reader.mark();
        let context = if alias {
            "scanning an alias"
        } else {
            "scanning an anchor"
        };
        self.reader.forward(); // '*' or '&'
        let mut length = 0;
        while self
            .reader
            .peek_at(length)
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        {
            length += 1;
        }
        if length == 0 {
            return Err(self.expected(
                "an alphabetic or numeric character",
                self.reader.peek(),
                context,
                start_mark,
            ));
        }
        let value = self.reader.prefix(length);
        self.reader.forward_n(length);
        let next = self.reader.peek();
        if !is_blank_or_break_or_end(next)
            && !matches!(next, Some('?' | ':' | ',' | ']' | '}' | '%' | '@' | '`'))
        {
            return Err(self.expected(
                "an alphabetic or numeric character",
                next,
                context,
                start_mark,
            ));
        }
        let end_mark = self.reader.mark();
        let kind = if alias {
            TokenKind::Alias(value)
        } else {
            TokenKind::Anchor(value)
        };
        Ok(Token::new(kind, start_mark, end_mark))
    }

    fn scan_tag(&mut self) -> Result<Token> {
        let start_mark = self.reader.mark();
        let handle;
        let suffix;
        match self.reader.peek_at(1) {
            Some('<') => {
                // Verbatim tag: !<uri>
                self.reader.forward_n(2);
                handle = None;
                suffix = self.scan_tag_uri("scanning a tag", start_mark)?;
                if self.reader.peek() != Some('>') {
                    return Err(self.expected(
                        "'>'",
                        self.reader.peek(),
                        "scanning a tag",
                        start_mark,
                    ));
                }
                self.reader.forward();
            }
            next if is_blank_or_break_or_end(next) => {
                // The non-specific tag: a lone '!'.
                self.reader.forward();
                handle = None;
                suffix = "!".to_owned();
            }
            _ => {
                // A second '!' before the next blank means a named handle.
                let mut length = 1;
                let mut use_handle = false;
                while let Some(c) = self.reader.peek_at(length) {
                    if is_blank(c) || is_break(c) {
                        break;
                    }
                    if c == '!' {
                        use_handle = true;
                        break;
                    }
                    length += 1;
                }
                if use_handle {
                    handle = Some(self.scan_tag_handle("scanning a tag", start_mark)?);
                } else {
                    handle = Some("!".to_owned());
                    self.reader.forward();
                }
                suffix = self.scan_tag_uri("scanning a tag", start_mark)?;
            }
        }
        if !is_blank_or_break_or_end(self.reader.peek()) {
            return Err(self.expected("' '", self.reader.peek(), "scanning a tag", start_mark));
        }
        let end_mark = self.reader.mark();
        Ok(Token::new(
            TokenKind::Tag { handle, suffix },
            start_mark,
            end_mark,
        ))
    }

    fn scan_tag_handle(&mut self, context: &'static str, context_mark: Mark) -> Result<String> {
        if self.reader.peek() != Some('!') {
            return Err(self.expected("'!'", self.reader.peek(), context, context_mark));
        }
        let mut length = 1;
        if self.reader.peek_at(1) != Some(' ') {
            while self
                .reader
                .peek_at(length)
                .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
            {
                length += 1;
            }
            if self.reader.peek_at(length) != Some('!') {
                let found = self.reader.peek_at(length);
                self.reader.forward_n(length);
                return Err(self.expected("'!'", found, context, context_mark));
            }
            length += 1;
        }
        let value = self.reader.prefix(length);
        self.reader.forward_n(length);
        Ok(value)
    }

    fn scan_tag_uri(&mut self, context: &'static str, context_mark: Mark) -> Result<String> {
        const URI_CHARS: &str = "-;/?:@&=+$,_.!~*'()[]%";
        let mut chunks = String::new();
        let mut length = 0;
        while let Some(c) = self.reader.peek_at(length) {
            if !c.is_ascii_alphanumeric() && !URI_CHARS.contains(c) {
                break;
            }
            if c == '%' {
                chunks.push_str(&self.reader.prefix(length));
                self.reader.forward_n(length);
                length = 0;
                chunks.push_str(&self.scan_uri_escapes(context, context_mark)?);
            } else {
                length += 1;
            }
        }
        if length > 0 {
            chunks.push_str(&self.reader.prefix(length));
            self.reader.forward_n(length);
        }
        if chunks.is_empty() {
            return Err(self.expected("a URI", self.reader.peek(), context, context_mark));
        }
        Ok(chunks)
    }

    /// Decode a run of `%XX` escapes. The decoded bytes of a run must form
    /// valid UTF-8.
    fn scan_uri_escapes(&mut self, context: &'static str, context_mark: Mark) -> Result<String> {
        let mark = self.reader.mark();
        let mut bytes = Vec::new();
        while self.reader.peek() == Some('%') {
            self.reader.forward();
            let hi = self.reader.peek().and_then(|c| c.to_digit(16));
            let lo = self.reader.peek_at(1).and_then(|c| c.to_digit(16));
            let (Some(hi), Some(lo)) = (hi, lo) else {
                let found = if hi.is_none() {
                    self.reader.peek()
                } else {
                    self.reader.peek_at(1)
                };
                return Err(self.expected(
                    "a URI escape sequence of 2 hexadecimal digits",
                    found,
                    context,
                    context_mark,
                ));
            };
            bytes.push((hi * 16 + lo) as u8);
            self.reader.forward_n(2);
        }
        String::from_utf8(bytes).map_err(|_| {
            LoadError::new(ErrorKind::InvalidUriEscapes, mark).with_context(context, context_mark)
        })
    }

    fn scan_block_scalar(&mut self, style: ScalarStyle) -> Result<Token> {
        let folded = style == ScalarStyle::Folded;
        let start_mark = self.reader.mark();
        self.reader.forward(); // '|' or '>'
        let (chomping, increment) = self.scan_block_scalar_indicators(start_mark)?;
        self.scan_block_scalar_ignored_line(start_mark)?;

        let min_indent = (self.indent + 1).max(1);
        let indent;
        let mut breaks;
        let mut end_mark;
        if let Some(increment) = increment {
            indent = min_indent + isize::from(increment) - 1;
            let scanned = self.scan_block_scalar_breaks(indent);
            breaks = scanned.0;
            end_mark = scanned.1;
        } else {
            let (leading_breaks, max_indent, mark) = self.scan_block_scalar_indentation();
            breaks = leading_breaks;
            end_mark = mark;
            indent = min_indent.max(max_indent);
        }

        let mut chunks = String::new();
        let mut line_break = None;
        while self.reader.column() as isize == indent && !self.reader.is_eof() {
            chunks.push_str(&breaks);
            let leading_non_space = !matches!(self.reader.peek(), Some(' ' | '\t'));
            let mut length = 0;
            while !is_break_or_end(self.reader.peek_at(length)) {
                length += 1;
            }
            chunks.push_str(&self.reader.prefix(length));
            self.reader.forward_n(length);
            line_break = self.scan_line_break();
            let scanned = self.scan_block_scalar_breaks(indent);
            breaks = scanned.0;
            end_mark = scanned.1;
            if self.reader.column() as isize == indent && !self.reader.is_eof() {
                // Folding: adjacent non-empty lines join with a space; a line
                // that starts indented, or follows an empty line, keeps its
                // break.
                if folded
                    && line_break == Some('\n')
                    && leading_non_space
                    && !matches!(self.reader.peek(), Some(' ' | '\t'))
                {
                    if breaks.is_empty() {
                        chunks.push(' ');
                    }
                } else if let Some(lb) = line_break {
                    chunks.push(lb);
                }
            } else {
                break;
            }
        }

        match chomping {
            Chomping::Strip => {}
            Chomping::Clip => {
                if let Some(lb) = line_break {
                    chunks.push(lb);
                }
            }
            Chomping::Keep => {
                if let Some(lb) = line_break {
                    chunks.push(lb);
                }
                chunks.push_str(&breaks);
            }
        }
        Ok(Token::new(
            TokenKind::Scalar {
                value: chunks,
                style,
            },
            start_mark,
            end_mark,
        ))
    }

    /// Chomping and indentation indicators, in either order.
    fn scan_block_scalar_indicators(
        &mut self,
        start_mark: Mark,
    ) -> Result<(Chomping, Option<u8>)> {
        let mut chomping = Chomping::Clip;
        let mut increment = None;
        match self.reader.peek() {
            Some(c @ ('+' | '-')) => {
                chomping = if c == '+' {
                    Chomping::Keep
                } else {
                    Chomping::Strip
                };
                self.reader.forward();
                if let Some(digit) = self.reader.peek().and_then(|c| c.to_digit(10)) {
                    if digit == 0 {
                        return Err(LoadError::new(
                            ErrorKind::BadIndentationIndicator,
                            self.reader.mark(),
                        )
                        .with_context("scanning a block scalar", start_mark));
                    }
                    increment = Some(digit as u8);
                    self.reader.forward();
                }
            }
            Some(c) if c.is_ascii_digit() => {
                let digit = c.to_digit(10).unwrap_or(0);
                if digit == 0 {
                    return Err(LoadError::new(
                        ErrorKind::BadIndentationIndicator,
                        self.reader.mark(),
                    )
                    .with_context("scanning a block scalar", start_mark));
                }
                increment = Some(digit as u8);
                self.reader.forward();
                if let Some(c) = self.reader.peek()
                    && matches!(c, '+' | '-')
                {
                    chomping = if c == '+' {
                        Chomping::Keep
                    } else {
                        Chomping::Strip
                    };
                    self.reader.forward();
                }
            }
            _ => {}
        }
        let next = self.reader.peek();
        if !(next.is_none() || next == Some(' ') || next.is_some_and(is_break)) {
            return Err(self.expected(
                "chomping or indentation indicators",
                next,
                "scanning a block scalar",
                start_mark,
            ));
        }
        Ok((chomping, increment))
    }

    fn scan_block_scalar_ignored_line(&mut self, start_mark: Mark) -> Result<()> {
        while self.reader.peek() == Some(' ') {
            self.reader.forward();
        }
        if self.reader.peek() == Some('#') {
            while !is_break_or_end(self.reader.peek()) {
                self.reader.forward();
            }
        }
        if !is_break_or_end(self.reader.peek()) {
            return Err(self.expected(
                "a comment or a line break",
                self.reader.peek(),
                "scanning a block scalar",
                start_mark,
            ));
        }
        self.scan_line_break();
        Ok(())
    }

    /// Leading blank lines of an auto-indented block scalar; the deepest
    /// column seen determines the detected indentation.
    fn scan_block_scalar_indentation(&mut self) -> (String, isize, Mark) {
        let mut chunks = String::new();
        let mut max_indent = 0;
        let mut end_mark = self.reader.mark();
        while let Some(c) = self.reader.peek() {
            if c == ' ' {
                self.reader.forward();
                max_indent = max_indent.max(self.reader.column() as isize);
            } else if is_break(c) {
                if let Some(lb) = self.scan_line_break() {
                    chunks.push(lb);
                }
                end_mark = self.reader.mark();
            } else {
                break;
            }
        }
        (chunks, max_indent, end_mark)
    }

    /// Blank lines between content lines of a block scalar, consuming at
    /// most `indent` leading spaces per line.
    fn scan_block_scalar_breaks(&mut self, indent: isize) -> (String, Mark) {
        let mut chunks = String::new();
        let mut end_mark = self.reader.mark();
        loop {
            while (self.reader.column() as isize) < indent && self.reader.peek() == Some(' ') {
                self.reader.forward();
            }
            match self.reader.peek() {
                Some(c) if is_break(c) => {
                    if let Some(lb) = self.scan_line_break() {
                        chunks.push(lb);
                    }
                    end_mark = self.reader.mark();
                }
                _ => break,
            }
        }
        (chunks, end_mark)
    }

    fn scan_flow_scalar(&mut self, style: ScalarStyle) -> Result<Token> {
        let double = style == ScalarStyle::DoubleQuoted;
        let start_mark = self.reader.mark();
        let quote = self.reader.peek();
        self.reader.forward();
        let mut chunks = String::new();
        self.scan_flow_scalar_non_spaces(&mut chunks, double, start_mark)?;
        while self.reader.peek() != quote {
            self.scan_flow_scalar_spaces(&mut chunks, start_mark)?;
            self.scan_flow_scalar_non_spaces(&mut chunks, double, start_mark)?;
        }
        self.reader.forward();
        let end_mark = self.reader.mark();
        Ok(Token::new(
            TokenKind::Scalar {
                value: chunks,
                style,
            },
            start_mark,
            end_mark,
        ))
    }

    fn scan_flow_scalar_non_spaces(
        &mut self,
        chunks: &mut String,
        double: bool,
        start_mark: Mark,
    ) -> Result<()> {
        loop {
            let mut length = 0;
            while let Some(c) = self.reader.peek_at(length) {
                if matches!(c, '\'' | '"' | '\\') || is_blank(c) || is_break(c) {
                    break;
                }
                length += 1;
            }
            if length > 0 {
                chunks.push_str(&self.reader.prefix(length));
                self.reader.forward_n(length);
            }
            match self.reader.peek() {
                Some('\'') if !double && self.reader.peek_at(1) == Some('\'') => {
                    chunks.push('\'');
                    self.reader.forward_n(2);
                }
                Some('\'') if double => {
                    chunks.push('\'');
                    self.reader.forward();
                }
                Some(c @ ('"' | '\\')) if !double => {
                    chunks.push(c);
                    self.reader.forward();
                }
                Some('\\') if double => self.scan_flow_scalar_escape(chunks, start_mark)?,
                _ => return Ok(()),
            }
        }
    }

    /// Validate one backslash escape, appending its raw text. Decoding is
    /// deferred to the parser; only an escaped line break is consumed here,
    /// because it folds away together with any following leading blanks.
    fn scan_flow_scalar_escape(&mut self, chunks: &mut String, start_mark: Mark) -> Result<()> {
        match self.reader.peek_at(1) {
            Some(c) if is_break(c) => {
                self.reader.forward();
                self.scan_line_break();
                let breaks = self.scan_flow_scalar_breaks(start_mark)?;
                chunks.push_str(&breaks);
                Ok(())
            }
            Some(c) if SIMPLE_ESCAPES.contains(c) => {
                chunks.push('\\');
                chunks.push(c);
                self.reader.forward_n(2);
                Ok(())
            }
            Some(c @ ('x' | 'u' | 'U')) => {
                let (width, expected) = match c {
                    'x' => (2, "an escape sequence of 2 hexadecimal digits"),
                    'u' => (4, "an escape sequence of 4 hexadecimal digits"),
                    _ => (8, "an escape sequence of 8 hexadecimal digits"),
                };
                chunks.push('\\');
                chunks.push(c);
                self.reader.forward_n(2);
                for _ in 0..width {
                    match self.reader.peek() {
                        Some(h) if h.is_ascii_hexdigit() => {
                            chunks.push(h);
                            self.reader.forward();
                        }
                        other => {
                            return Err(self.expected(
                                expected,
                                other,
                                "scanning a double-quoted scalar",
                                start_mark,
                            ));
                        }
                    }
                }
                Ok(())
            }
            Some(c) => Err(LoadError::new(ErrorKind::UnknownEscape(c), self.reader.mark())
                .with_context("scanning a double-quoted scalar", start_mark)),
            None => Err(
                LoadError::new(ErrorKind::UnexpectedEndOfStream, self.reader.mark())
                    .with_context("scanning a double-quoted scalar", start_mark),
            ),
        }
    }

    fn scan_flow_scalar_spaces(&mut self, chunks: &mut String, start_mark: Mark) -> Result<()> {
        let mut length = 0;
        while matches!(self.reader.peek_at(length), Some(' ' | '\t')) {
            length += 1;
        }
        let whitespaces = self.reader.prefix(length);
        self.reader.forward_n(length);
        match self.reader.peek() {
            None => Err(
                LoadError::new(ErrorKind::UnexpectedEndOfStream, self.reader.mark())
                    .with_context("scanning a quoted scalar", start_mark),
            ),
            Some(c) if is_break(c) => {
                let line_break = self.scan_line_break();
                let breaks = self.scan_flow_scalar_breaks(start_mark)?;
                match line_break {
                    Some('\n') if breaks.is_empty() => chunks.push(' '),
                    Some('\n') | None => {}
                    Some(lb) => chunks.push(lb),
                }
                chunks.push_str(&breaks);
                Ok(())
            }
            _ => {
                chunks.push_str(&whitespaces);
                Ok(())
            }
        }
    }

    fn scan_flow_scalar_breaks(&mut self, start_mark: Mark) -> Result<String> {
        let mut chunks = String::new();
        loop {
            if self.next_is_document_indicator() {
                return Err(LoadError::new(
                    ErrorKind::UnexpectedDocumentSeparator,
                    self.reader.mark(),
                )
                .with_context("scanning a quoted scalar", start_mark));
            }
            while matches!(self.reader.peek(), Some(' ' | '\t')) {
                self.reader.forward();
            }
            match self.reader.peek() {
                Some(c) if is_break(c) => {
                    if let Some(lb) = self.scan_line_break() {
                        chunks.push(lb);
                    }
                }
                _ => return Ok(chunks),
            }
        }
    }

    fn scan_plain(&mut self) -> Token {
        let start_mark = self.reader.mark();
        let mut end_mark = start_mark;
        let indent = self.indent + 1;
        let mut chunks = String::new();
        let mut spaces = String::new();
        loop {
            if self.reader.peek() == Some('#') {
                break;
            }
            let mut length = 0;
            loop {
                let Some(c) = self.reader.peek_at(length) else {
                    break;
                };
                if is_blank(c) || is_break(c) {
                    break;
                }
                if c == ':' {
                    let next = self.reader.peek_at(length + 1);
                    if is_blank_or_break_or_end(next)
                        || (self.flow_level > 0
                            && next.is_some_and(|n| matches!(n, ',' | '[' | ']' | '{' | '}')))
                    {
                        break;
                    }
                }
                if self.flow_level > 0 && matches!(c, ',' | '?' | '[' | ']' | '{' | '}') {
                    break;
                }
                length += 1;
            }
            if length == 0 {
                break;
            }
            self.allow_simple_key = false;
            chunks.push_str(&spaces);
            chunks.push_str(&self.reader.prefix(length));
            self.reader.forward_n(length);
            end_mark = self.reader.mark();
            spaces = self.scan_plain_spaces();
            if spaces.is_empty()
                || self.reader.peek() == Some('#')
                || (self.flow_level == 0 && (self.reader.column() as isize) < indent)
            {
                break;
            }
        }
        Token::new(
            TokenKind::Scalar {
                value: chunks,
                style: ScalarStyle::Plain,
            },
            start_mark,
            end_mark,
        )
    }

    /// Whitespace between plain-scalar chunks. An isolated line break folds
    /// to a space, further breaks are kept, and a document indicator ends
    /// the scalar (signalled by returning an empty string). Tabs are not
    /// accepted here at all.
    fn scan_plain_spaces(&mut self) -> String {
        let mut chunks = String::new();
        let mut length = 0;
        while self.reader.peek_at(length) == Some(' ') {
            length += 1;
        }
        let whitespaces = self.reader.prefix(length);
        self.reader.forward_n(length);
        match self.reader.peek() {
            Some(c) if is_break(c) => {
                let line_break = self.scan_line_break();
                self.allow_simple_key = true;
                if self.next_is_document_indicator() {
                    return String::new();
                }
                let mut breaks = String::new();
                loop {
                    match self.reader.peek() {
                        Some(' ') => self.reader.forward(),
                        Some(c) if is_break(c) => {
                            if let Some(lb) = self.scan_line_break() {
                                breaks.push(lb);
                            }
                            if self.next_is_document_indicator() {
                                return String::new();
                            }
                        }
                        _ => break,
                    }
                }
                match line_break {
                    Some('\n') if breaks.is_empty() => chunks.push(' '),
                    Some('\n') | None => {}
                    Some(lb) => chunks.push(lb),
                }
                chunks.push_str(&breaks);
            }
            _ => chunks.push_str(&whitespaces),
        }
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collect token kinds for the whole stream.
    fn tokens(input: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(input);
        let mut out = Vec::new();
        loop {
            let token = scanner.next_token().expect("scan failed");
            let done = token.kind == TokenKind::StreamEnd;
            out.push(token.kind);
            if done {
                break;
            }
        }
        out
    }

    fn scan_error(input: &str) -> LoadError {
        let mut scanner = Scanner::new(input);
        loop {
            match scanner.next_token() {
                Ok(token) if token.kind == TokenKind::StreamEnd => {
                    panic!("expected a scan error")
                }
                Ok(_) => {}
                Err(err) => return err,
            }
        }
    }

    fn plain(value: &str) -> TokenKind {
        TokenKind::Scalar {
            value: value.to_owned(),
            style: ScalarStyle::Plain,
        }
    }

    #[test]
    fn test_empty_stream() {
        assert_eq!(
            tokens(""),
            vec![
                TokenKind::StreamStart(crate::reader::Encoding::Utf8),
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn test_simple_key_injection() {
        let kinds = tokens("a: 1");
        assert_eq!(
            &kinds[1..],
            &[
                TokenKind::BlockMappingStart,
                TokenKind::Key,
                plain("a"),
                TokenKind::Value,
                plain("1"),
                TokenKind::BlockEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn test_siblings_share_one_mapping_start() {
        let kinds = tokens("a: 1\nb: 2\n");
        let openers = kinds
            .iter()
            .filter(|k| **k == TokenKind::BlockMappingStart)
            .count();
        let ends = kinds.iter().filter(|k| **k == TokenKind::BlockEnd).count();
        assert_eq!(openers, 1);
        assert_eq!(ends, 1);
    }

    #[test]
    fn test_block_sequence() {
        let kinds = tokens("- a\n- b\n");
        assert_eq!(
            &kinds[1..],
            &[
                TokenKind::BlockSequenceStart,
                TokenKind::BlockEntry,
                plain("a"),
                TokenKind::BlockEntry,
                plain("b"),
                TokenKind::BlockEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn test_nested_block_collections_balance() {
        let kinds = tokens("a:\n  b:\n    - 1\n    - 2\nc: 3\n");
        let starts = kinds
            .iter()
            .filter(|k| {
                matches!(
                    k,
                    TokenKind::BlockMappingStart | TokenKind::BlockSequenceStart
                )
            })
            .count();
        let ends = kinds.iter().filter(|k| **k == TokenKind::BlockEnd).count();
        assert_eq!(starts, ends);
    }

    #[test]
    fn test_flow_sequence() {
        let kinds = tokens("[a, b]");
        assert_eq!(
            &kinds[1..],
            &[
                TokenKind::FlowSequenceStart,
                plain("a"),
                TokenKind::FlowEntry,
                plain("b"),
                TokenKind::FlowSequenceEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn test_flow_mapping_key() {
        let kinds = tokens("{a: 1}");
        assert_eq!(
            &kinds[1..],
            &[
                TokenKind::FlowMappingStart,
                TokenKind::Key,
                plain("a"),
                TokenKind::Value,
                plain("1"),
                TokenKind::FlowMappingEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn test_plain_adjacent_colon_in_flow() {
        // Without a following space the colon stays inside the scalar.
        let kinds = tokens("{a:1}");
        assert_eq!(
            &kinds[1..],
            &[
                TokenKind::FlowMappingStart,
                plain("a:1"),
                TokenKind::FlowMappingEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn test_document_indicators() {
        let kinds = tokens("---\na\n...\n");
        assert_eq!(
            &kinds[1..],
            &[
                TokenKind::DocumentStart,
                plain("a"),
                TokenKind::DocumentEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn test_plain_must_not_cross_document_boundary() {
        let kinds = tokens("a\n---\nb\n");
        assert_eq!(
            &kinds[1..],
            &[
                plain("a"),
                TokenKind::DocumentStart,
                plain("b"),
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn test_plain_folding() {
        let kinds = tokens("a\n b\n\n c\n");
        assert_eq!(kinds[1], plain("a b\nc"));
    }

    #[test]
    fn test_directive_tokens() {
        let kinds = tokens("%YAML 1.1\n%TAG !e! tag:example.com,2000:\n---\na\n");
        assert_eq!(
            kinds[1],
            TokenKind::Directive(Directive::Yaml { major: 1, minor: 1 })
        );
        assert_eq!(
            kinds[2],
            TokenKind::Directive(Directive::Tag {
                handle: "!e!".to_owned(),
                prefix: "tag:example.com,2000:".to_owned(),
            })
        );
        assert_eq!(kinds[3], TokenKind::DocumentStart);
    }

    #[test]
    fn test_reserved_directive() {
        let kinds = tokens("%FOO bar baz\n---\na\n");
        assert_eq!(
            kinds[1],
            TokenKind::Directive(Directive::Reserved {
                name: "FOO".to_owned()
            })
        );
    }

    #[test]
    fn test_anchor_alias_tokens() {
        let kinds = tokens("a: &x 1\nb: *x\n");
        assert!(kinds.contains(&TokenKind::Anchor("x".to_owned())));
        assert!(kinds.contains(&TokenKind::Alias("x".to_owned())));
    }

    #[test]
    fn test_tag_tokens() {
        let kinds = tokens("!!str a");
        assert_eq!(
            kinds[1],
            TokenKind::Tag {
                handle: Some("!!".to_owned()),
                suffix: "str".to_owned(),
            }
        );
        let kinds = tokens("!local a");
        assert_eq!(
            kinds[1],
            TokenKind::Tag {
                handle: Some("!".to_owned()),
                suffix: "local".to_owned(),
            }
        );
        let kinds = tokens("!<tag:example.com,2000:x> a");
        assert_eq!(
            kinds[1],
            TokenKind::Tag {
                handle: None,
                suffix: "tag:example.com,2000:x".to_owned(),
            }
        );
        let kinds = tokens("! a");
        assert_eq!(
            kinds[1],
            TokenKind::Tag {
                handle: None,
                suffix: "!".to_owned(),
            }
        );
    }

    #[test]
    fn test_tag_uri_escapes() {
        let kinds = tokens("!e%21 a");
        assert_eq!(
            kinds[1],
            TokenKind::Tag {
                handle: Some("!".to_owned()),
                suffix: "e!".to_owned(),
            }
        );
    }

    #[test]
    fn test_single_quoted() {
        let kinds = tokens("'it''s'");
        assert_eq!(
            kinds[1],
            TokenKind::Scalar {
                value: "it's".to_owned(),
                style: ScalarStyle::SingleQuoted,
            }
        );
    }

    #[test]
    fn test_single_quoted_folding() {
        let kinds = tokens("'a\n b'");
        assert_eq!(
            kinds[1],
            TokenKind::Scalar {
                value: "a b".to_owned(),
                style: ScalarStyle::SingleQuoted,
            }
        );
    }

    #[test]
    fn test_double_quoted_keeps_raw_escapes() {
        // Escape decoding happens at the parser boundary.
        let kinds = tokens("\"a\\tb\\x41\"");
        assert_eq!(
            kinds[1],
            TokenKind::Scalar {
                value: "a\\tb\\x41".to_owned(),
                style: ScalarStyle::DoubleQuoted,
            }
        );
    }

    #[test]
    fn test_double_quoted_escaped_break_swallowed() {
        let kinds = tokens("\"a\\\n  b\"");
        assert_eq!(
            kinds[1],
            TokenKind::Scalar {
                value: "ab".to_owned(),
                style: ScalarStyle::DoubleQuoted,
            }
        );
    }

    #[test]
    fn test_literal_block_scalar() {
        let kinds = tokens("|\n  a\n  b\n");
        assert_eq!(
            kinds[1],
            TokenKind::Scalar {
                value: "a\nb\n".to_owned(),
                style: ScalarStyle::Literal,
            }
        );
    }

    #[test]
    fn test_folded_block_scalar() {
        let kinds = tokens(">\n  a\n  b\n\n  c\n");
        assert_eq!(
            kinds[1],
            TokenKind::Scalar {
                value: "a b\nc\n".to_owned(),
                style: ScalarStyle::Folded,
            }
        );
    }

    #[test]
    fn test_block_scalar_chomping() {
        let strip = tokens("|-\n  a\n\n");
        assert_eq!(
            strip[1],
            TokenKind::Scalar {
                value: "a".to_owned(),
                style: ScalarStyle::Literal,
            }
        );
        let keep = tokens("|+\n  a\n\n");
        assert_eq!(
            keep[1],
            TokenKind::Scalar {
                value: "a\n\n".to_owned(),
                style: ScalarStyle::Literal,
            }
        );
    }

    #[test]
    fn test_block_scalar_explicit_indent() {
        let kinds = tokens("|2\n  a\n");
        assert_eq!(
            kinds[1],
            TokenKind::Scalar {
                value: "a\n".to_owned(),
                style: ScalarStyle::Literal,
            }
        );
        // Deeper content keeps its extra indentation.
        let kinds = tokens("|1\n  a\n");
        assert_eq!(
            kinds[1],
            TokenKind::Scalar {
                value: " a\n".to_owned(),
                style: ScalarStyle::Literal,
            }
        );
    }

    #[test]
    fn test_explicit_key_token() {
        let kinds = tokens("? a\n: b\n");
        assert_eq!(
            &kinds[1..],
            &[
                TokenKind::BlockMappingStart,
                TokenKind::Key,
                plain("a"),
                TokenKind::Value,
                plain("b"),
                TokenKind::BlockEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn test_simple_key_at_1024_chars() {
        let key = "k".repeat(1024);
        let kinds = tokens(&format!("{key}: v"));
        assert_eq!(kinds[1], TokenKind::BlockMappingStart);
        assert_eq!(kinds[2], TokenKind::Key);
        assert_eq!(kinds[3], plain(&key));
    }

    #[test]
    fn test_simple_key_beyond_1024_chars() {
        // The candidate is silently dropped at 1025 characters, so the ':'
        // that follows has no key to attach to.
        let key = "k".repeat(1025);
        let err = scan_error(&format!("{key}: v"));
        assert_eq!(err.kind, ErrorKind::UnexpectedValue);
    }

    #[test]
    fn test_required_simple_key_beyond_1024_chars() {
        // At the indentation of its enclosing mapping the candidate is
        // required, so expiring is an error of its own.
        let key = "k".repeat(1025);
        let err = scan_error(&format!("a: 1\n{key}: v"));
        assert_eq!(err.kind, ErrorKind::SimpleKeyExpired);
        assert_eq!(err.context, Some("scanning a simple key"));
    }

    #[test]
    fn test_value_after_consumed_key_rejected() {
        // In `a: b: c` the scalar `b` can no longer become a key.
        let err = scan_error("a: b: c");
        assert_eq!(err.kind, ErrorKind::UnexpectedValue);
    }

    #[test]
    fn test_tab_cannot_start_token() {
        let err = scan_error("a:\n\t- b");
        assert_eq!(err.kind, ErrorKind::UnexpectedCharacter('\t'));
    }

    #[test]
    fn test_reserved_first_character() {
        let err = scan_error("@foo");
        assert_eq!(err.kind, ErrorKind::UnexpectedCharacter('@'));
    }

    #[test]
    fn test_unterminated_quoted_scalar() {
        let err = scan_error("'abc");
        assert_eq!(err.kind, ErrorKind::UnexpectedEndOfStream);
        assert_eq!(err.context, Some("scanning a quoted scalar"));
    }

    #[test]
    fn test_unknown_escape_rejected() {
        let err = scan_error("\"a\\qb\"");
        assert_eq!(err.kind, ErrorKind::UnknownEscape('q'));
    }

    #[test]
    fn test_short_hex_escape_rejected() {
        let err = scan_error("\"\\x4g\"");
        assert!(matches!(err.kind, ErrorKind::Expected { .. }));
    }

    #[test]
    fn test_quoted_scalar_document_separator() {
        let err = scan_error("'a\n---\nb'");
        assert_eq!(err.kind, ErrorKind::UnexpectedDocumentSeparator);
    }

    #[test]
    fn test_bad_block_scalar_indent_indicator() {
        let err = scan_error("|0\n a\n");
        assert_eq!(err.kind, ErrorKind::BadIndentationIndicator);
    }

    #[test]
    fn test_crlf_matches_lf_token_values() {
        let crlf = tokens("a: 1\r\nb: |\r\n  x\r\n  y\r\n");
        let lf = tokens("a: 1\nb: |\n  x\n  y\n");
        assert_eq!(crlf, lf);
    }

    #[test]
    fn test_line_break_normalization_in_plain() {
        let kinds = tokens("a\r\n b\r\n");
        assert_eq!(kinds[1], plain("a b"));
    }
}
