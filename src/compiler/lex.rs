use std::{str::Chars, sync::Arc};

use log::{debug, trace};

use crate::{
    common::{data::Data, source::SourceText, span::Span, ty::Ty},
    compiler::syntax::Diagnostics,
    construct::token::{SyntaxKind, SyntaxToken},
};

/// Turns source text into tokens, one call to [`Lexer::lex`] at a time.
/// Never fails: malformed input is reported and still produces a token,
/// so that the parser always has something to work with.
#[derive(Debug)]
pub struct Lexer {
    source: Arc<SourceText>,
    position: usize,
    diagnostics: Diagnostics,
}

impl Lexer {
    pub fn new(source: Arc<SourceText>) -> Lexer {
        trace!("Lexing {:?}", source.contents());
        Lexer {
            source,
            position: 0,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Lexes a whole source into a stream of tokens,
    /// ending with exactly one end-of-file token.
    /// Whitespace and bad tokens are kept.
    pub fn lex_all(source: Arc<SourceText>) -> (Vec<SyntaxToken>, Diagnostics) {
        let mut lexer = Lexer::new(source);
        let mut tokens = vec![];

        loop {
            let token = lexer.lex();
            let done = token.kind == SyntaxKind::EndOfFileToken;
            tokens.push(token);
            if done {
                break;
            }
        }

        debug!("Lexed {} token(s)", tokens.len());
        (tokens, lexer.diagnostics)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns all characters after the current position.
    fn remaining(&self) -> Chars {
        self.source.contents()[self.position..].chars()
    }

    fn current(&self) -> Option<char> {
        self.remaining().next()
    }

    fn lookahead(&self) -> Option<char> {
        self.remaining().nth(1)
    }

    /// Consumes characters one at a time according to a
    /// `pred`icate, returning the number of bytes consumed.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let len: usize = self
            .remaining()
            .take_while(|c| pred(*c))
            .map(char::len_utf8)
            .sum();
        self.position += len;
        len
    }

    fn advance(&mut self, len: usize, kind: SyntaxKind) -> (SyntaxKind, Option<Data>) {
        self.position += len;
        (kind, None)
    }

    fn number(&mut self, start: usize) -> (SyntaxKind, Option<Data>) {
        self.take_while(|c| c.is_ascii_digit());
        let text = &self.source.contents()[start..self.position];

        let value = match text.parse::<i32>() {
            Ok(n) => n,
            Err(_) => {
                let span = Span::from_bounds(start, self.position);
                self.diagnostics.report_invalid_number(span, text, Ty::Integer);
                0
            },
        };

        (SyntaxKind::NumberToken, Some(Data::Integer(value)))
    }

    /// Two quotes in a row stand for a single quote inside the literal.
    fn string(&mut self, start: usize) -> (SyntaxKind, Option<Data>) {
        // skip opening quote
        self.position += 1;
        let mut contents = String::new();

        loop {
            match self.current() {
                None | Some('\r' | '\n') => {
                    self.diagnostics.report_unterminated_string(Span::new(start, 1));
                    break;
                },
                Some('"') if self.lookahead() == Some('"') => {
                    contents.push('"');
                    self.position += 2;
                },
                Some('"') => {
                    self.position += 1;
                    break;
                },
                Some(c) => {
                    contents.push(c);
                    self.position += c.len_utf8();
                },
            }
        }

        (SyntaxKind::StringToken, Some(Data::String(contents)))
    }

    /// Produces the next token.
    /// Once the end of the source is reached,
    /// every call returns the same zero-width end-of-file token.
    pub fn lex(&mut self) -> SyntaxToken {
        use SyntaxKind::*;
        let start = self.position;

        let c = match self.current() {
            Some(c) => c,
            None => return SyntaxToken::new(EndOfFileToken, start, "", None),
        };

        let (kind, value) = match (c, self.lookahead()) {
            // longest match first
            ('&', Some('&')) => self.advance(2, AmpersandAmpersandToken),
            ('|', Some('|')) => self.advance(2, PipePipeToken),
            ('=', Some('=')) => self.advance(2, EqualsEqualsToken),
            ('!', Some('=')) => self.advance(2, BangEqualsToken),
            ('<', Some('=')) => self.advance(2, LessOrEqualsToken),
            ('>', Some('=')) => self.advance(2, GreaterOrEqualsToken),

            ('+', _) => self.advance(1, PlusToken),
            ('-', _) => self.advance(1, MinusToken),
            ('*', _) => self.advance(1, StarToken),
            ('/', _) => self.advance(1, SlashToken),
            ('(', _) => self.advance(1, OpenParenthesisToken),
            (')', _) => self.advance(1, CloseParenthesisToken),
            ('{', _) => self.advance(1, OpenBraceToken),
            ('}', _) => self.advance(1, CloseBraceToken),
            (',', _) => self.advance(1, CommaToken),
            ('~', _) => self.advance(1, TildeToken),
            ('^', _) => self.advance(1, HatToken),
            ('&', _) => self.advance(1, AmpersandToken),
            ('|', _) => self.advance(1, PipeToken),
            ('=', _) => self.advance(1, EqualsToken),
            ('!', _) => self.advance(1, BangToken),
            ('<', _) => self.advance(1, LessToken),
            ('>', _) => self.advance(1, GreaterToken),

            ('"', _) => self.string(start),
            (c, _) if c.is_ascii_digit() => self.number(start),

            (c, _) if c.is_whitespace() => {
                self.take_while(char::is_whitespace);
                (WhitespaceToken, None)
            },

            (c, _) if c.is_alphabetic() => {
                self.take_while(char::is_alphabetic);
                let text = &self.source.contents()[start..self.position];
                (SyntaxKind::keyword(text), None)
            },

            (unknown, _) => {
                self.diagnostics.report_bad_character(start, unknown);
                self.advance(unknown.len_utf8(), BadToken)
            },
        };

        let text = &self.source.contents()[start..self.position];
        SyntaxToken::new(kind, start, text, value)
    }
}
