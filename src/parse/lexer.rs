//! Tokenizer for critter program text.
//!
//! Words are not classified here: whether `tag` is a memory alias or an
//! action depends on what follows it, which only the parser knows.

use std::fmt;

use crate::error::{ParseError, ParseResult};

/// One token with the line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) text: String,
    pub(crate) line: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Keyword or name, spelled in `text`.
    Word,
    /// Unsigned decimal literal, spelled in `text`.
    Number,
    Arrow,
    Assign,
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,
    Plus,
    Minus,
    Star,
    Slash,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Semicolon,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Word => "word",
            Self::Number => "number",
            Self::Arrow => "-->",
            Self::Assign => ":=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "=",
            Self::Ge => ">=",
            Self::Gt => ">",
            Self::Ne => "!=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::OpenParen => "(",
            Self::CloseParen => ")",
            Self::OpenBracket => "[",
            Self::CloseBracket => "]",
            Self::OpenBrace => "{",
            Self::CloseBrace => "}",
            Self::Semicolon => ";",
            Self::Eof => "end of input",
        };
        f.write_str(text)
    }
}

#[derive(Debug)]
pub(crate) struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    /// Tokenize the whole input. The last token is always [`TokenKind::Eof`].
    pub(crate) fn tokenize(&mut self) -> ParseResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.pos >= self.input.len() {
                tokens.push(Token::new(TokenKind::Eof, "", self.line));
                return Ok(tokens);
            }
            tokens.push(self.next_token()?);
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '/' && self.peek_at(1) == Some('/') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn symbol(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.pos;
        let line = self.line;
        for _ in 0..len {
            self.advance();
        }
        let text: String = self.input[start..self.pos].iter().collect();
        Token::new(kind, text, line)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek().filter(|&c| pred(c)) {
            text.push(ch);
            self.advance();
        }
        text
    }

    fn next_token(&mut self) -> ParseResult<Token> {
        let line = self.line;
        let Some(ch) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", line));
        };
        let next = self.peek_at(1);
        let token = match ch {
            '-' if next == Some('-') && self.peek_at(2) == Some('>') => {
                self.symbol(TokenKind::Arrow, 3)
            }
            ':' if next == Some('=') => self.symbol(TokenKind::Assign, 2),
            '<' if next == Some('=') => self.symbol(TokenKind::Le, 2),
            '>' if next == Some('=') => self.symbol(TokenKind::Ge, 2),
            '!' if next == Some('=') => self.symbol(TokenKind::Ne, 2),
            '<' => self.symbol(TokenKind::Lt, 1),
            '>' => self.symbol(TokenKind::Gt, 1),
            '=' => self.symbol(TokenKind::Eq, 1),
            '+' => self.symbol(TokenKind::Plus, 1),
            '-' => self.symbol(TokenKind::Minus, 1),
            '*' => self.symbol(TokenKind::Star, 1),
            '/' => self.symbol(TokenKind::Slash, 1),
            '(' => self.symbol(TokenKind::OpenParen, 1),
            ')' => self.symbol(TokenKind::CloseParen, 1),
            '[' => self.symbol(TokenKind::OpenBracket, 1),
            ']' => self.symbol(TokenKind::CloseBracket, 1),
            '{' => self.symbol(TokenKind::OpenBrace, 1),
            '}' => self.symbol(TokenKind::CloseBrace, 1),
            ';' => self.symbol(TokenKind::Semicolon, 1),
            c if c.is_ascii_digit() => {
                let text = self.take_while(|c| c.is_ascii_digit());
                Token::new(TokenKind::Number, text, line)
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let text = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
                Token::new(TokenKind::Word, text, line)
            }
            found => return Err(ParseError::UnexpectedChar { line, found }),
        };
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_arrow_versus_minus() {
        assert_eq!(
            kinds("a --> - -1"),
            vec![
                TokenKind::Word,
                TokenKind::Arrow,
                TokenKind::Minus,
                TokenKind::Minus,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_and_lines() {
        let tokens = Lexer::new("// header\nmem[3] := 1 // trailing\n;").tokenize().unwrap();
        assert_eq!(tokens[0].text, "mem");
        assert_eq!(tokens[0].line, 2);
        let semi = tokens.iter().find(|t| t.kind == TokenKind::Semicolon).unwrap();
        assert_eq!(semi.line, 3);
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            kinds("<= >= != := < > ="),
            vec![
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::Ne,
                TokenKind::Assign,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unknown_character() {
        let err = Lexer::new("mem[1] $").tokenize().unwrap_err();
        assert_eq!(err, ParseError::UnexpectedChar { line: 1, found: '$' });
    }
}
