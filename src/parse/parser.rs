//! Recursive-descent parser building a [`Program`] arena directly.

use crate::ast::{
    ActionKind, ArithOp, BinaryOp, MemAddr, NodeId, NodeKind, Program, RelOp, SensorKind, Sugar,
};
use crate::error::{ParseError, ParseResult};
use crate::parse::lexer::{Lexer, Token, TokenKind};

/// Deepest nesting of parentheses, braces, brackets, and negations.
pub(crate) const MAX_DEPTH: usize = 256;

#[derive(Debug)]
pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    program: Program,
}

impl Parser {
    pub(crate) fn parse(input: &str) -> ParseResult<Program> {
        let tokens = Lexer::new(input).tokenize()?;
        let mut parser = Self {
            tokens,
            pos: 0,
            depth: 0,
            program: Program::new(),
        };
        while !parser.check(TokenKind::Eof) {
            let rule = parser.parse_rule()?;
            parser.program.push_rule(rule);
        }
        Ok(parser.program)
    }

    fn peek(&self) -> &Token {
        // tokenize always ends with Eof, and Eof is never consumed
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_next(&self) -> &Token {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn check_word(&self, word: &str) -> bool {
        self.check(TokenKind::Word) && self.peek().text == word
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            ParseError::UnexpectedEnd { expected }
        } else {
            ParseError::UnexpectedToken {
                line: token.line,
                found: token.text.clone(),
                expected,
            }
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Run `parse` one nesting level down.
    fn nested(&mut self, parse: fn(&mut Self) -> ParseResult<NodeId>) -> ParseResult<NodeId> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep {
                line: self.peek().line,
                limit: MAX_DEPTH,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.program.alloc(kind)
    }

    fn parse_rule(&mut self) -> ParseResult<NodeId> {
        let condition = self.parse_condition()?;
        self.expect(TokenKind::Arrow, "`-->`")?;
        let mut updates = Vec::new();
        let mut action = None;
        while !self.check(TokenKind::Semicolon) {
            if self.starts_update() {
                updates.push(self.parse_update()?);
            } else if self.starts_action() {
                action = Some(self.parse_action()?);
                break;
            } else if self.starts_expression() {
                return Err(ParseError::InvalidUpdateTarget {
                    line: self.peek().line,
                });
            } else {
                return Err(self.unexpected("an update, an action, or `;`"));
            }
        }
        self.expect(TokenKind::Semicolon, "`;`")?;
        Ok(self.alloc(NodeKind::Rule {
            condition,
            updates,
            action,
        }))
    }

    fn starts_update(&self) -> bool {
        if !self.check(TokenKind::Word) {
            return false;
        }
        let word = self.peek().text.as_str();
        if word == "tag" {
            return self.peek_next().kind != TokenKind::OpenBracket;
        }
        word == "mem" || Sugar::from_keyword(word).is_some()
    }

    fn starts_action(&self) -> bool {
        self.check(TokenKind::Word) && ActionKind::from_keyword(&self.peek().text).is_some()
    }

    fn starts_expression(&self) -> bool {
        match self.peek().kind {
            TokenKind::Number | TokenKind::Minus | TokenKind::OpenParen => true,
            TokenKind::Word => sensor_keyword(&self.peek().text).is_some(),
            _ => false,
        }
    }

    fn parse_update(&mut self) -> ParseResult<NodeId> {
        let target = self.parse_mem()?;
        self.expect(TokenKind::Assign, "`:=`")?;
        let value = self.parse_expr()?;
        Ok(self.alloc(NodeKind::Update { target, value }))
    }

    fn parse_action(&mut self) -> ParseResult<NodeId> {
        let token = self.advance();
        let kind = ActionKind::from_keyword(&token.text).ok_or(ParseError::UnexpectedToken {
            line: token.line,
            found: token.text.clone(),
            expected: "an action",
        })?;
        let arg = if kind.takes_operand() {
            Some(self.parse_bracketed()?)
        } else {
            None
        };
        Ok(self.alloc(NodeKind::Action { kind, arg }))
    }

    fn parse_condition(&mut self) -> ParseResult<NodeId> {
        let mut left = self.parse_conjunction()?;
        while self.check_word(BinaryOp::Or.keyword()) {
            self.advance();
            let right = self.parse_conjunction()?;
            left = self.alloc(NodeKind::Binary {
                op: BinaryOp::Or,
                left,
                right,
            });
        }
        Ok(left)
    }

    fn parse_conjunction(&mut self) -> ParseResult<NodeId> {
        let mut left = self.parse_relation()?;
        while self.check_word(BinaryOp::And.keyword()) {
            self.advance();
            let right = self.parse_relation()?;
            left = self.alloc(NodeKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            });
        }
        Ok(left)
    }

    fn parse_relation(&mut self) -> ParseResult<NodeId> {
        if self.check(TokenKind::OpenBrace) {
            self.advance();
            let inner = self.nested(Self::parse_condition)?;
            self.expect(TokenKind::CloseBrace, "`}`")?;
            return Ok(inner);
        }
        let left = self.parse_expr()?;
        let op = match self.peek().kind {
            TokenKind::Lt => RelOp::Lt,
            TokenKind::Le => RelOp::Le,
            TokenKind::Eq => RelOp::Eq,
            TokenKind::Ge => RelOp::Ge,
            TokenKind::Gt => RelOp::Gt,
            TokenKind::Ne => RelOp::Ne,
            _ => return Err(self.unexpected("a comparison")),
        };
        self.advance();
        let right = self.parse_expr()?;
        Ok(self.alloc(NodeKind::Relation { op, left, right }))
    }

    fn parse_expr(&mut self) -> ParseResult<NodeId> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => ArithOp::Add,
                TokenKind::Minus => ArithOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_term()?;
            left = self.alloc(NodeKind::arith(op, left, right));
        }
    }

    fn parse_term(&mut self) -> ParseResult<NodeId> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => ArithOp::Mul,
                TokenKind::Slash => ArithOp::Div,
                TokenKind::Word if self.peek().text == "mod" => ArithOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_factor()?;
            left = self.alloc(NodeKind::arith(op, left, right));
        }
    }

    fn parse_factor(&mut self) -> ParseResult<NodeId> {
        match self.peek().kind {
            TokenKind::Number => {
                let token = self.advance();
                let value = literal(&token, false)?;
                Ok(self.alloc(NodeKind::Num(value)))
            }
            TokenKind::Minus => {
                self.advance();
                if self.check(TokenKind::Number) {
                    let token = self.advance();
                    let value = literal(&token, true)?;
                    Ok(self.alloc(NodeKind::Num(value)))
                } else {
                    let inner = self.nested(Self::parse_factor)?;
                    Ok(self.alloc(NodeKind::Unary(inner)))
                }
            }
            TokenKind::OpenParen => {
                self.advance();
                let inner = self.nested(Self::parse_expr)?;
                self.expect(TokenKind::CloseParen, "`)`")?;
                Ok(inner)
            }
            TokenKind::Word => {
                if let Some(kind) = sensor_keyword(&self.peek().text) {
                    self.advance();
                    let arg = if kind.takes_operand() {
                        Some(self.parse_bracketed()?)
                    } else {
                        None
                    };
                    Ok(self.alloc(NodeKind::Sensor { kind, arg }))
                } else {
                    self.parse_mem()
                }
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_mem(&mut self) -> ParseResult<NodeId> {
        if self.check_word("mem") {
            self.advance();
            let index = self.parse_bracketed()?;
            return Ok(self.alloc(NodeKind::Mem(MemAddr::Index(index))));
        }
        if self.check(TokenKind::Word) {
            if let Some(sugar) = Sugar::from_keyword(&self.peek().text) {
                self.advance();
                return Ok(self.alloc(NodeKind::Mem(MemAddr::Sugar(sugar))));
            }
        }
        Err(self.unexpected("a memory expression"))
    }

    fn parse_bracketed(&mut self) -> ParseResult<NodeId> {
        self.expect(TokenKind::OpenBracket, "`[`")?;
        let inner = self.nested(Self::parse_expr)?;
        self.expect(TokenKind::CloseBracket, "`]`")?;
        Ok(inner)
    }
}

fn sensor_keyword(word: &str) -> Option<SensorKind> {
    [
        SensorKind::Nearby,
        SensorKind::Ahead,
        SensorKind::Random,
        SensorKind::Smell,
    ]
    .into_iter()
    .find(|kind| kind.keyword() == word)
}

/// Decode a literal, negated when it followed a unary minus.
fn literal(token: &Token, negative: bool) -> ParseResult<i32> {
    let out_of_range = || ParseError::NumberOutOfRange {
        line: token.line,
        literal: if negative {
            format!("-{}", token.text)
        } else {
            token.text.clone()
        },
    };
    let magnitude: i64 = token.text.parse().map_err(|_| out_of_range())?;
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).map_err(|_| out_of_range())
}
