use crate::lang::Expr;
use crate::lang::expr::MAX_NESTING;
use crate::lexer::{Lexer, Span, Spanned};
use crate::parser_error::ParserError;
use crate::token::Token;

/// Recursive-descent parser for Tack.
///
/// The parser consumes the lexer's `Spanned` tokens and produces the program
/// as a flat sequence of expressions in text order:
/// - `[ ... ]` nests into an `Expr::Quot`
/// - `( a b )` is an `Expr::Pair` and must hold exactly two nodes
/// - string tokens desugar into quotations of characters
/// - comments are kept as `Expr::Comment`; reduction erases them
///
/// Brackets and parens may nest at most [`MAX_NESTING`] levels deep.
pub struct Parser<'a> {
    /// Original text, for remainder previews in errors.
    source: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    /// Open brackets and parens around the current position.
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Spanned>) -> Self {
        Parser {
            source,
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn current(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek(&self) -> Option<&Token> {
        self.current().map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    /// Builds an error at `span`, or at the end of input when there is no
    /// token left to point at.
    fn error_at(&self, span: Option<&Span>, message: &str) -> ParserError {
        match span {
            Some(span) => ParserError::at(self.source, span.offset, span.line, span.col, message),
            None => {
                let (line, col) = end_position(self.source);
                ParserError::at(self.source, self.source.len(), line, col, message)
            }
        }
    }

    fn error(&self, message: &str) -> ParserError {
        self.error_at(self.current().map(|s| &s.span), message)
    }

    /// Parses the whole input. Any closer without a matching opener is an
    /// error.
    pub fn parse(&mut self) -> Result<Vec<Expr>, ParserError> {
        let mut program = Vec::new();
        loop {
            match self.peek() {
                None | Some(Token::Eof) => return Ok(program),
                Some(token) if token.is_closer() => {
                    let message = format!("unexpected '{}'", token);
                    return Err(self.error(&message));
                }
                Some(_) => program.push(self.parse_node()?),
            }
        }
    }

    fn parse_node(&mut self) -> Result<Expr, ParserError> {
        let Some(spanned) = self.advance() else {
            return Err(self.error("unexpected end of input"));
        };

        match spanned.token {
            Token::Number(n) => Ok(Expr::Num(n)),
            Token::Bool(b) => Ok(Expr::Bool(b)),
            Token::Char(c) => Ok(Expr::Chr(c)),
            Token::Str(text) => Ok(Expr::string(&text)),
            Token::Word(name) => Ok(Expr::Word(name)),
            Token::Comment(text) => Ok(Expr::Comment(text)),
            Token::LBracket | Token::LParen => {
                if self.depth >= MAX_NESTING {
                    let message = format!("nesting deeper than {} levels", MAX_NESTING);
                    return Err(self.error_at(Some(&spanned.span), &message));
                }
                self.depth += 1;
                let node = if spanned.token == Token::LBracket {
                    self.parse_quotation(&spanned.span)
                } else {
                    self.parse_pair(&spanned.span)
                };
                self.depth -= 1;
                node
            }
            Token::RBracket | Token::RParen => {
                Err(self.error_at(Some(&spanned.span), &format!("unexpected '{}'", spanned.token)))
            }
            Token::Eof => Err(self.error_at(Some(&spanned.span), "unexpected end of input")),
        }
    }

    /// Parses everything up to the matching `]`.
    fn parse_quotation(&mut self, open: &Span) -> Result<Expr, ParserError> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                Some(Token::RBracket) => {
                    self.advance();
                    return Ok(Expr::Quot(items));
                }
                Some(Token::RParen) => return Err(self.error("unexpected ')' inside quotation")),
                None | Some(Token::Eof) => {
                    return Err(self.error_at(Some(open), "unterminated quotation, missing ']'"));
                }
                Some(_) => items.push(self.parse_node()?),
            }
        }
    }

    /// Parses `( a b )`. Comments inside a pair are dropped so they do not
    /// count as an element.
    fn parse_pair(&mut self, open: &Span) -> Result<Expr, ParserError> {
        let mut items = Vec::with_capacity(2);
        loop {
            match self.peek() {
                Some(Token::RParen) => {
                    if items.len() != 2 {
                        let message = format!("a pair needs exactly 2 elements, found {}", items.len());
                        return Err(self.error_at(Some(open), &message));
                    }
                    self.advance();
                    let second = items.pop();
                    let first = items.pop();
                    return match (first, second) {
                        (Some(first), Some(second)) => Ok(Expr::pair(first, second)),
                        _ => Err(self.error_at(Some(open), "malformed pair")),
                    };
                }
                Some(Token::RBracket) => return Err(self.error("unexpected ']' inside pair")),
                None | Some(Token::Eof) => {
                    return Err(self.error_at(Some(open), "unterminated pair, missing ')'"));
                }
                Some(Token::Comment(_)) => {
                    self.advance();
                }
                Some(_) => items.push(self.parse_node()?),
            }
        }
    }
}

/// 1-based line and column just past the last character of `source`.
fn end_position(source: &str) -> (usize, usize) {
    let line = source.matches('\n').count() + 1;
    let col = source
        .rsplit('\n')
        .next()
        .map_or(0, |last| last.chars().count())
        + 1;
    (line, col)
}

/// Lexes and parses `source` in one go.
pub fn parse_source(source: &str) -> Result<Vec<Expr>, ParserError> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(source, tokens).parse()
}
