//! Error-tolerant tokenizer for D source.
//!
//! This is not a conformant D lexer: it knows exactly enough lexical
//! structure (string and comment flavours, operators, block keywords) to
//! cut source into spans a tree builder can work with. Its defining
//! property is that it never fails: end of input in the middle of a token
//! truncates the token to an `Other` span, and every later call reports
//! `End`. The reducer routinely feeds this lexer source that it is itself
//! breaking, and expects spans back, not errors.

mod cursor;

use cursor::Cursor;
use whittle_common::span::Span;
use whittle_common::token::{self, TokenKind};

/// The `@`-attributes consumed as a single token. Matched literally, with
/// no word-boundary check, ahead of the operator table.
const ATTRIBUTES: &[&[u8]] = &[b"@disable", b"@property", b"@safe", b"@trusted", b"@system"];

/// Forward-only tokenizer over one source buffer.
///
/// Each parse owns a fresh `Lexer`; the cursor is instance state, never
/// global. All positions are byte offsets into the original text.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source.as_bytes()),
        }
    }

    /// Current byte position.
    pub fn pos(&self) -> u32 {
        self.cursor.pos()
    }

    /// Advance past exactly one token and return its kind.
    ///
    /// First matching rule wins; the catch-all tail classifies whitespace
    /// runs, word runs, and single unknown bytes. Unterminated strings and
    /// block comments are truncated at end of input and classified
    /// [`TokenKind::Other`].
    pub fn skip_token_or_ws(&mut self) -> TokenKind {
        let Some(first) = self.cursor.peek() else {
            return TokenKind::End;
        };
        match first {
            // Character literal. A backslash skips one byte, then the
            // scan runs through the next quote. An escaped quote is
            // therefore taken as the closing quote; close enough for
            // splitting purposes.
            b'\'' => {
                self.cursor.advance();
                if self.cursor.peek() == Some(b'\\') {
                    self.cursor.advance();
                }
                self.cursor.eat_while(|b| b != b'\'');
                self.cursor.advance();
                TokenKind::Other
            }

            // Naked backslash: consume it and the byte it escapes. This
            // is the D1 escaped-string notation; one two-byte token is
            // close enough for splitting purposes.
            b'\\' => {
                self.cursor.advance_by(2);
                TokenKind::Other
            }

            // Double-quoted string with backslash escapes.
            b'"' => {
                self.cursor.advance();
                loop {
                    match self.cursor.advance() {
                        None | Some(b'"') => break,
                        Some(b'\\') => {
                            self.cursor.advance();
                        }
                        Some(_) => {}
                    }
                }
                TokenKind::Other
            }

            // Raw string r"...": no escapes, runs to the next quote.
            b'r' if self.cursor.peek_at(1) == Some(b'"') => {
                self.cursor.advance_by(2);
                self.cursor.eat_while(|b| b != b'"');
                self.cursor.advance();
                TokenKind::Other
            }

            // Wysiwyg string `...`.
            b'`' => {
                self.cursor.advance();
                self.cursor.eat_while(|b| b != b'`');
                self.cursor.advance();
                TokenKind::Other
            }

            // Line comment: runs to the newline, which stays unconsumed.
            b'/' if self.cursor.peek_at(1) == Some(b'/') => {
                self.cursor.eat_while(|b| b != b'\n');
                TokenKind::Comment
            }

            // Block comment /* ... */.
            b'/' if self.cursor.peek_at(1) == Some(b'*') => {
                self.cursor.advance_by(2);
                loop {
                    if self.cursor.is_eof() {
                        return TokenKind::Other;
                    }
                    if self.cursor.starts_with(b"*/") {
                        self.cursor.advance_by(2);
                        return TokenKind::Comment;
                    }
                    self.cursor.advance();
                }
            }

            // Nesting block comment /+ ... +/.
            b'/' if self.cursor.peek_at(1) == Some(b'+') => {
                self.cursor.advance_by(2);
                let mut depth = 1u32;
                while depth > 0 {
                    if self.cursor.is_eof() {
                        return TokenKind::Other;
                    }
                    if self.cursor.starts_with(b"/+") {
                        self.cursor.advance_by(2);
                        depth += 1;
                    } else if self.cursor.starts_with(b"+/") {
                        self.cursor.advance_by(2);
                        depth -= 1;
                    } else {
                        self.cursor.advance();
                    }
                }
                TokenKind::Comment
            }

            // Known @-attributes lex as one token; any other `@` is a
            // single unknown byte.
            b'@' => {
                for &attr in ATTRIBUTES {
                    if self.cursor.starts_with(attr) {
                        self.cursor.advance_by(attr.len() as u32);
                        return TokenKind::Other;
                    }
                }
                self.cursor.advance();
                TokenKind::Other
            }

            // Preprocessor-style line: to the newline, with backslash
            // continuations (a backslash skips the byte after it).
            b'#' => {
                loop {
                    match self.cursor.peek() {
                        None | Some(b'\n') => break,
                        Some(b'\\') => self.cursor.advance_by(2),
                        Some(_) => {
                            self.cursor.advance();
                        }
                    }
                }
                TokenKind::Other
            }

            _ => {
                if let Some((kind, len)) = token::lookup(self.cursor.rest()) {
                    self.cursor.advance_by(len as u32);
                    return kind;
                }
                if first.is_ascii_whitespace() {
                    self.cursor.eat_while(|b| b.is_ascii_whitespace());
                    TokenKind::Whitespace
                } else if token::is_word_byte(first) {
                    self.cursor.eat_while(token::is_word_byte);
                    TokenKind::Other
                } else {
                    self.cursor.advance();
                    TokenKind::Other
                }
            }
        }
    }

    /// Read the next significant token.
    ///
    /// Skips whitespace and comments, lexes one token, then absorbs the
    /// trailing whitespace run up to and including the first newline -- a
    /// statement keeps its own trailing newline, but not the indentation
    /// of the next one. The returned span covers everything consumed,
    /// leading trivia included.
    pub fn read_token(&mut self) -> (TokenKind, Span) {
        let start = self.pos();
        let kind = loop {
            match self.skip_token_or_ws() {
                TokenKind::Whitespace | TokenKind::Comment => continue,
                kind => break kind,
            }
        };
        if kind != TokenKind::End {
            loop {
                match self.cursor.peek() {
                    Some(b'\n') => {
                        self.cursor.advance();
                        break;
                    }
                    Some(b) if b.is_ascii_whitespace() => {
                        self.cursor.advance();
                    }
                    _ => break,
                }
            }
        }
        (kind, Span::new(start, self.pos()))
    }
}

/// A copy of `source` with every comment token elided and every other
/// span preserved verbatim.
pub fn strip_comments(source: &str) -> String {
    let mut lexer = Lexer::new(source);
    let mut out = String::new();
    loop {
        let start = lexer.pos() as usize;
        let kind = lexer.skip_token_or_ws();
        if kind == TokenKind::End {
            break;
        }
        if kind != TokenKind::Comment {
            out.push_str(&source[start..lexer.pos() as usize]);
        }
    }
    out
}

/// One word of the language-aware word splitter: the span of an `Other`
/// token, plus the coalesced span of any following non-word tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan {
    /// Span of the word itself; `None` for the placeholder that fronts
    /// input beginning with non-word tokens.
    pub head: Option<Span>,
    /// Coalesced span of the trailing non-word run, if any.
    pub tail: Option<Span>,
}

/// Split `source` into word spans using the full lexer.
///
/// Every `Other` token opens a new word; runs of anything else (operators,
/// whitespace, comments) accumulate onto the previous word's tail. Input
/// that starts with non-word tokens gets a headless placeholder so the
/// spans still concatenate back to the source.
pub fn word_spans(source: &str) -> Vec<WordSpan> {
    let mut lexer = Lexer::new(source);
    let mut words: Vec<WordSpan> = Vec::new();
    loop {
        let start = lexer.pos();
        let kind = lexer.skip_token_or_ws();
        if kind == TokenKind::End {
            break;
        }
        let span = Span::new(start, lexer.pos());
        if kind == TokenKind::Other {
            words.push(WordSpan {
                head: Some(span),
                tail: None,
            });
        } else {
            if words.is_empty() {
                words.push(WordSpan {
                    head: None,
                    tail: None,
                });
            }
            let last = words.last_mut().expect("placeholder just pushed");
            last.tail = Some(match last.tail {
                Some(tail) => tail.merge(span),
                None => span,
            });
        }
    }
    words
}
