//! Tokenization of a raw input line under shell quoting rules.
//!
//! The lexer splits on runs of unquoted whitespace and understands three
//! escape surfaces: single quotes (verbatim contents), double quotes
//! (backslash escapes only `"` and `\`), and bare backslash (next character
//! taken literally, which allows embedded spaces). Quote delimiters are
//! consumed, not retained. Redirection markers are *not* recognized here;
//! `>` travels inside word tokens and is interpreted by [`crate::redirect`].

use std::fmt;

/// Errors that can occur while tokenizing a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// A single or double quote was opened and never closed.
    UnterminatedQuote,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnterminatedQuote => write!(f, "syntax error: unterminated quote"),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingSingleQuote,
    ReadingDoubleQuote,
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
    // Distinguishes "no word yet" from a word that is so far empty,
    // so that `''` still produces an empty-string token.
    in_word: bool,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
            in_word: false,
        }
    }

    fn make_tokens(&mut self) -> Result<Vec<String>, ParseError> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => self.handle_start(ch),
                LexingState::ReadingWord => self.handle_word(ch, &mut out),
                LexingState::ReadingSingleQuote => self.handle_single_quote(ch),
                LexingState::ReadingDoubleQuote => self.handle_double_quote(ch),
            }
        }

        match self.state {
            LexingState::ReadingSingleQuote | LexingState::ReadingDoubleQuote => {
                return Err(ParseError::UnterminatedQuote);
            }
            _ => {}
        }

        if self.in_word {
            out.push(std::mem::take(&mut self.buffer));
        }

        Ok(out)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn handle_start(&mut self, ch: char) {
        match ch {
            ' ' | '\t' => {}
            '\'' => {
                self.in_word = true;
                self.state = LexingState::ReadingSingleQuote;
            }
            '"' => {
                self.in_word = true;
                self.state = LexingState::ReadingDoubleQuote;
            }
            '\\' => {
                self.in_word = true;
                self.push_escaped();
                self.state = LexingState::ReadingWord;
            }
            c => {
                self.buffer.push(c);
                self.in_word = true;
                self.state = LexingState::ReadingWord;
            }
        }
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<String>) {
        match ch {
            ' ' | '\t' => {
                out.push(std::mem::take(&mut self.buffer));
                self.in_word = false;
                self.state = LexingState::Start;
            }
            '\'' => self.state = LexingState::ReadingSingleQuote,
            '"' => self.state = LexingState::ReadingDoubleQuote,
            '\\' => self.push_escaped(),
            c => self.buffer.push(c),
        }
    }

    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::ReadingWord,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) {
        match ch {
            '"' => self.state = LexingState::ReadingWord,
            '\\' => match self.peek_char() {
                // Only the quote character and the backslash itself are
                // escapable inside double quotes; any other backslash is literal.
                Some(next @ ('"' | '\\')) => {
                    self.read_char();
                    self.buffer.push(next);
                }
                _ => self.buffer.push('\\'),
            },
            c => self.buffer.push(c),
        }
    }

    /// Bare backslash: the next character is taken literally, whatever it is.
    /// A trailing backslash at end of line stands for itself.
    fn push_escaped(&mut self) {
        match self.read_char() {
            Some(c) => self.buffer.push(c),
            None => self.buffer.push('\\'),
        }
    }
}

/// Split a raw input line into argument tokens.
///
/// An empty or whitespace-only line yields an empty vector, which the REPL
/// treats as a no-op.
pub fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    let mut lexer = LexingFSM::new(line);
    lexer.make_tokens()
}
