// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Error types for YAML loading.
//!
//! All three stages report failures through [`LoadError`]: a problem
//! description with the mark where it occurred, plus an optional context
//! ("while scanning a block scalar") with its own mark. Errors are fatal to
//! the containing document; no stage retries or resumes.

use derive_more::Display;

use crate::mark::Mark;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LoadError>;

/// The kind of loading error.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ErrorKind {
    /// A character that cannot begin any token in the current context.
    #[display("found character '{_0}' that cannot start any token")]
    UnexpectedCharacter(char),

    /// A simple key candidate went stale (crossed a line or exceeded 1024
    /// characters) while it was required.
    #[display("could not find expected ':'")]
    SimpleKeyExpired,

    /// `?` key indicator in a position where no key may start.
    #[display("mapping keys are not allowed here")]
    UnexpectedKey,

    /// `:` value indicator in a position where no value may start.
    #[display("mapping values are not allowed here")]
    UnexpectedValue,

    /// `-` entry indicator in a position where no entry may start.
    #[display("sequence entries are not allowed here")]
    UnexpectedBlockEntry,

    /// Generic "expected X, but found Y" for scanner and parser rules.
    #[display("expected {expected}, but found {found}")]
    Expected {
        expected: &'static str,
        found: String,
    },

    /// Invalid escape character in a double-quoted scalar.
    #[display("found unknown escape character '{_0}'")]
    UnknownEscape(char),

    /// Input ended inside a quoted scalar.
    #[display("found unexpected end of stream")]
    UnexpectedEndOfStream,

    /// `---` or `...` at column 0 inside a quoted scalar.
    #[display("found unexpected document separator")]
    UnexpectedDocumentSeparator,

    /// `%XX` escapes in a tag URI did not decode to UTF-8.
    #[display("URI escape sequences do not decode to valid UTF-8")]
    InvalidUriEscapes,

    /// Block scalar header carried the indentation indicator `0`.
    #[display("expected an indentation indicator in the range 1-9, but found 0")]
    BadIndentationIndicator,

    /// Second `%YAML` directive in one document.
    #[display("found duplicate %YAML directive")]
    DuplicateYamlDirective,

    /// Second `%TAG` directive for the same handle in one document.
    #[display("found duplicate tag handle '{_0}'")]
    DuplicateTagHandle(String),

    /// A `!handle!suffix` tag whose handle has no `%TAG` directive.
    #[display("found undefined tag handle '{_0}'")]
    UndefinedTagHandle(String),

    /// `*name` with no matching `&name` earlier in the document.
    #[display("found undefined alias '{_0}'")]
    UndefinedAlias(String),

    /// `*name` resolved while `&name` was still being composed.
    #[display("found recursive alias '{_0}'")]
    RecursiveAlias(String),

    /// `&name` bound twice in one document.
    #[display("found duplicate anchor '{_0}'")]
    DuplicateAnchor(String),

    /// The same key written twice in one mapping.
    #[display("duplicate key in mapping")]
    DuplicateKey,

    /// A merge key (`<<`) whose value is neither a mapping nor a sequence
    /// of mappings.
    #[display("expected a mapping or a list of mappings for merging, but found {_0}")]
    InvalidMergeValue(&'static str),

    /// `get_single_node` found a second document.
    #[display("expected a single document in the stream, but found another document")]
    UnexpectedDocument,

    /// `get_single_node` found no document at all.
    #[display("expected a single document in the stream, but found none")]
    NoDocument,
}

/// An error raised by the scanner, parser, or composer.
///
/// Carries the problem and its mark, and optionally the enclosing context
/// and its mark (e.g. the start of the scalar being scanned when the error
/// fires midway through it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Where it went wrong.
    pub problem_mark: Mark,
    /// The surrounding activity, e.g. "scanning a block scalar".
    pub context: Option<&'static str>,
    /// Where the surrounding activity began.
    pub context_mark: Option<Mark>,
}

impl LoadError {
    /// Create an error with just a kind and a problem mark.
    #[must_use]
    pub const fn new(kind: ErrorKind, problem_mark: Mark) -> Self {
        Self {
            kind,
            problem_mark,
            context: None,
            context_mark: None,
        }
    }

    /// Attach the enclosing context and its start mark.
    #[must_use]
    pub const fn with_context(mut self, context: &'static str, mark: Mark) -> Self {
        self.context = Some(context);
        self.context_mark = Some(mark);
        self
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let (Some(context), Some(mark)) = (self.context, self.context_mark) {
            write!(
                f,
                "while {} at {}: {} at {}",
                context, mark, self.kind, self.problem_mark
            )
        } else {
            write!(f, "{} at {}", self.kind, self.problem_mark)
        }
    }
}

impl std::error::Error for LoadError {}

/// Render a looked-at character for an [`ErrorKind::Expected`] message.
/// End of input shows as a phrase rather than a NUL escape.
pub(crate) fn describe_char(ch: Option<char>) -> String {
    match ch {
        Some(c) => format!("'{c}'"),
        None => "end of stream".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoadError::new(ErrorKind::SimpleKeyExpired, Mark::new(0, 1030, 1030));
        assert_eq!(
            err.to_string(),
            "could not find expected ':' at line 1, column 1031"
        );
    }

    #[test]
    fn test_error_display_with_context() {
        let err = LoadError::new(
            ErrorKind::Expected {
                expected: "a comment or a line break",
                found: "'x'".to_owned(),
            },
            Mark::new(2, 4, 20),
        )
        .with_context("scanning a block scalar", Mark::new(2, 0, 16));
        assert_eq!(
            err.to_string(),
            "while scanning a block scalar at line 3, column 1: \
             expected a comment or a line break, but found 'x' at line 3, column 5"
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(
            ErrorKind::UnexpectedCharacter('\t').to_string(),
            "found character '\t' that cannot start any token"
        );
        assert_eq!(
            ErrorKind::RecursiveAlias("a".to_owned()).to_string(),
            "found recursive alias 'a'"
        );
        assert_eq!(
            ErrorKind::DuplicateKey.to_string(),
            "duplicate key in mapping"
        );
    }

    #[test]
    fn test_describe_char() {
        assert_eq!(describe_char(Some('y')), "'y'");
        assert_eq!(describe_char(None), "end of stream");
    }
}
