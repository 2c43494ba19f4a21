//! Token stream producer (spec.md §1, §6: an external collaborator of the
//! core, carried here as a real module so the crate runs end to end).
//!
//! Grounded in the teacher's hand-rolled `src/lexer/mod.rs`: a
//! `Peekable<Chars>` walked character-by-character with explicit line/col
//! tracking, rather than the teacher's older `pest`-grammar lexer (dropped,
//! see DESIGN.md) — CO needs a lexer that hands off a clean token stream to
//! an independent recursive-descent parser, which a combined grammar
//! doesn't give us as directly.

mod token;

pub use token::{Token, TokenKind};

use std::{iter::Peekable, rc::Rc, str::Chars};

use crate::{
    diagnostics::{Diagnostics, Issue},
    source::{LineCol, SourceCode},
};

pub struct Lexer<'a> {
    file: Rc<str>,
    iterator: Peekable<Chars<'a>>,
    line: usize,
    col: usize,
    diagnostics: Diagnostics,
    tokens: Vec<Token>,
    issues: Vec<Issue>,
}

impl<'a> Lexer<'a> {
    pub fn new(file: impl Into<Rc<str>>, source: &'a str, diagnostics: Diagnostics) -> Lexer<'a> {
        Lexer {
            file: file.into(),
            iterator: source.chars().peekable(),
            line: 1,
            col: 1,
            diagnostics,
            tokens: vec![],
            issues: vec![],
        }
    }

    pub fn lex(mut self) -> (Vec<Token>, Vec<Issue>) {
        loop {
            self.eat_whitespace_and_comments();
            let Some(&next) = self.iterator.peek() else {
                break;
            };
            match next {
                'a'..='z' | 'A'..='Z' | '_' => self.lex_identifier(),
                '0'..='9' => self.lex_number(),
                _ => self.lex_punctuation(),
            }
        }
        let eof = SourceCode::point(self.file.clone(), self.here());
        self.tokens.push(Token::new(TokenKind::Eof, eof));
        (self.tokens, self.issues)
    }

    fn here(&self) -> LineCol {
        LineCol::new(self.line, self.col)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.iterator.next()?;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn advance_if(&mut self, expected: char) -> bool {
        if self.iterator.peek() == Some(&expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_whitespace_and_comments(&mut self) {
        loop {
            while matches!(self.iterator.peek(), Some(c) if c.is_whitespace()) {
                self.advance();
            }
            if self.iterator.peek() == Some(&'/') {
                let mut lookahead = self.iterator.clone();
                lookahead.next();
                if lookahead.peek() == Some(&'/') {
                    while !matches!(self.iterator.peek(), None | Some('\n')) {
                        self.advance();
                    }
                    continue;
                }
            }
            break;
        }
    }

    fn push(&mut self, kind: TokenKind, start: LineCol) {
        let span = SourceCode::new(self.file.clone(), start, self.here());
        self.tokens.push(Token::new(kind, span));
    }

    fn lex_identifier(&mut self) {
        let start = self.here();
        let mut text = String::new();
        while matches!(self.iterator.peek(), Some(c) if c.is_alphanumeric() || *c == '_') {
            text.push(self.advance().unwrap());
        }
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier(text));
        self.push(kind, start);
    }

    fn lex_number(&mut self) {
        let start = self.here();
        let mut text = String::new();
        let mut is_double = false;

        while matches!(self.iterator.peek(), Some(c) if c.is_ascii_digit()) {
            text.push(self.advance().unwrap());
        }

        if self.iterator.peek() == Some(&'.') {
            let mut lookahead = self.iterator.clone();
            lookahead.next();
            if matches!(lookahead.peek(), Some(c) if c.is_ascii_digit()) {
                is_double = true;
                text.push(self.advance().unwrap());
                while matches!(self.iterator.peek(), Some(c) if c.is_ascii_digit()) {
                    text.push(self.advance().unwrap());
                }
            }
        }

        if matches!(self.iterator.peek(), Some('e') | Some('E')) {
            let mut lookahead = self.iterator.clone();
            let marker = lookahead.next().unwrap();
            let mut exponent = String::new();
            if matches!(lookahead.peek(), Some('+') | Some('-')) {
                exponent.push(*lookahead.peek().unwrap());
                lookahead.next();
            }
            let digits_start = exponent.len();
            while matches!(lookahead.peek(), Some(c) if c.is_ascii_digit()) {
                exponent.push(*lookahead.peek().unwrap());
                lookahead.next();
            }
            let has_digits = exponent.len() > digits_start;
            let next_is_alpha = matches!(lookahead.peek(), Some(c) if c.is_alphabetic());

            if has_digits {
                is_double = true;
                text.push(marker);
                self.advance();
                text.push_str(&exponent);
                for _ in 0..exponent.len() {
                    self.advance();
                }
            } else if !next_is_alpha {
                // `1e`, `1e+` with nothing sensible after: malformed, but we
                // still consume the marker (and sign) so recovery continues
                // past it rather than re-lexing it as punctuation.
                text.push(marker);
                self.advance();
                if matches!(self.iterator.peek(), Some('+') | Some('-')) {
                    text.push(self.advance().unwrap());
                }
                let span = SourceCode::new(self.file.clone(), start, self.here());
                self.issues.push(self.diagnostics.malformed_exponent(span.clone(), &text));
                self.push(TokenKind::DoubleLiteral(text), start);
                return;
            }
        }

        if matches!(self.iterator.peek(), Some(c) if c.is_alphabetic() || *c == '_') {
            while matches!(self.iterator.peek(), Some(c) if c.is_alphanumeric() || *c == '_') {
                text.push(self.advance().unwrap());
            }
            let span = SourceCode::new(self.file.clone(), start, self.here());
            self.issues.push(self.diagnostics.unknown_numeric_literal(span, &text));
            self.push(TokenKind::IntLiteral(text), start);
            return;
        }

        if !is_double && text.parse::<i128>().is_err() {
            let span = SourceCode::new(self.file.clone(), start, self.here());
            self.issues.push(self.diagnostics.numeric_literal_out_of_range(span, &text));
        }

        let kind = if is_double {
            TokenKind::DoubleLiteral(text)
        } else {
            TokenKind::IntLiteral(text)
        };
        self.push(kind, start);
    }

    fn lex_punctuation(&mut self) {
        let start = self.here();
        let ch = self.advance().unwrap();
        let kind = match ch {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '&' => {
                if self.advance_if('&') {
                    TokenKind::AndAnd
                } else {
                    TokenKind::Amp
                }
            }
            '|' if self.advance_if('|') => TokenKind::OrOr,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' => {
                if self.advance_if('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.advance_if('=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.advance_if('=') {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.advance_if('=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            _ => {
                let span = SourceCode::new(self.file.clone(), start, self.here());
                self.issues.push(self.diagnostics.unknown_character(span, ch));
                return;
            }
        };
        self.push(kind, start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Locale;

    fn lex(source: &str) -> (Vec<TokenKind>, Vec<Issue>) {
        let (tokens, issues) = Lexer::new("test.co", source, Diagnostics::new(Locale::En)).lex();
        (tokens.into_iter().map(|t| t.kind).collect(), issues)
    }

    #[test]
    fn lexes_a_function_header() {
        let (kinds, issues) = lex("void main() {}");
        assert!(issues.is_empty());
        assert_eq!(
            kinds,
            vec![
                TokenKind::KwVoid,
                TokenKind::Identifier("main".into()),
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_numeric_literals() {
        let (kinds, issues) = lex("5 3.14 2e3 int&");
        assert!(issues.is_empty());
        assert_eq!(
            kinds,
            vec![
                TokenKind::IntLiteral("5".into()),
                TokenKind::DoubleLiteral("3.14".into()),
                TokenKind::DoubleLiteral("2e3".into()),
                TokenKind::KwInt,
                TokenKind::Amp,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn reports_unknown_character() {
        let (_, issues) = lex("int x = 1 $ 2;");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code.to_string(), "E0004");
    }

    #[test]
    fn reports_malformed_numeric_literal() {
        let (_, issues) = lex("123abc");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code.to_string(), "E0003");
    }

    #[test]
    fn distinguishes_double_and_single_ampersand() {
        let (kinds, _) = lex("a && b & c");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::AndAnd,
                TokenKind::Identifier("b".into()),
                TokenKind::Amp,
                TokenKind::Identifier("c".into()),
                TokenKind::Eof,
            ]
        );
    }
}
