use crate::parser_error::ParserError;
use crate::token::Token;

/// Characters that may delimit a string literal.
pub const QUOTE_CHARS: [char; 3] = ['`', '"', '\''];

#[derive(Debug, Clone)]
pub struct Span {
    pub line: usize,
    pub col: usize,
    /// Byte offset into the source, used for remainder previews.
    pub offset: usize,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

/// Returns true if `ch` may appear inside a word.
pub fn is_word_char(ch: char) -> bool {
    !(ch.is_whitespace()
        || ch.is_control()
        || matches!(ch, '[' | ']' | '(' | ')')
        || QUOTE_CHARS.contains(&ch))
}

/// Returns true if `ch` may start a word.
pub fn is_word_start(ch: char) -> bool {
    is_word_char(ch) && !ch.is_ascii_digit() && ch != '.'
}

pub struct Lexer<'a> {
    text: &'a str,
    source: Vec<(usize, char)>,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Lexer {
            text,
            source: text.char_indices().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).map(|&(_, ch)| ch)
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos + 1).map(|&(_, ch)| ch)
    }

    fn offset(&self) -> usize {
        self.source
            .get(self.pos)
            .map(|&(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        if ch == Some('\n') {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.pos += 1;
        ch
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            col: self.col,
            offset: self.offset(),
        }
    }

    fn error_at(&self, span: &Span, message: &str) -> ParserError {
        ParserError::at(self.text, span.offset, span.line, span.col, message)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_comment(&mut self) -> Token {
        self.advance(); // '-'
        self.advance(); // '-'
        let mut comment = String::new();
        while let Some(ch) = self.current() {
            if ch == '\n' {
                break;
            }
            comment.push(ch);
            self.advance();
        }
        Token::Comment(comment.trim().to_string())
    }

    fn read_char(&mut self, start: &Span) -> Result<Token, ParserError> {
        self.advance(); // '.'
        match self.advance() {
            Some(ch) => Ok(Token::Char(ch)),
            None => Err(self.error_at(start, "expected a character after '.'")),
        }
    }

    fn read_string(&mut self, start: &Span) -> Result<Token, ParserError> {
        let delimiter = self.advance();
        let mut string = String::new();
        loop {
            match self.current() {
                Some(ch) if Some(ch) == delimiter => {
                    self.advance();
                    return Ok(Token::Str(string));
                }
                Some(ch) => {
                    string.push(ch);
                    self.advance();
                }
                None => return Err(self.error_at(start, "unterminated string literal")),
            }
        }
    }

    fn read_number(&mut self, start: &Span) -> Result<Token, ParserError> {
        let mut digits = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        digits
            .parse()
            .map(Token::Number)
            .map_err(|_| self.error_at(start, &format!("integer literal out of range: {}", digits)))
    }

    fn read_word(&mut self) -> Token {
        let mut word = String::new();
        while let Some(ch) = self.current() {
            if is_word_char(ch) {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match word.as_str() {
            "True" => Token::Bool(true),
            "False" => Token::Bool(false),
            _ => Token::Word(word),
        }
    }

    /// Splits the whole input into tokens, ending with `Token::Eof`.
    ///
    /// Alternatives are tried in a fixed order at each token start: comment,
    /// character, number, delimiters, string, then word (booleans are words
    /// with a reserved spelling). The first character that starts none of
    /// them is a fatal error carrying a preview of the remaining input.
    pub fn tokenize(&mut self) -> Result<Vec<Spanned>, ParserError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let span = self.span();

            let token = match self.current() {
                None => {
                    tokens.push(Spanned {
                        token: Token::Eof,
                        span,
                    });
                    break;
                }
                Some('-') if self.peek() == Some('-') => self.read_comment(),
                Some('.') => self.read_char(&span)?,
                Some(ch) if ch.is_ascii_digit() => self.read_number(&span)?,
                Some(ch @ ('[' | ']' | '(' | ')')) => {
                    self.advance();
                    match ch {
                        '[' => Token::LBracket,
                        ']' => Token::RBracket,
                        '(' => Token::LParen,
                        _ => Token::RParen,
                    }
                }
                Some(ch) if QUOTE_CHARS.contains(&ch) => self.read_string(&span)?,
                Some(ch) if is_word_start(ch) => self.read_word(),
                Some(ch) => {
                    return Err(
                        self.error_at(&span, &format!("unexpected character: {:?}", ch))
                    );
                }
            };
            tokens.push(Spanned { token, span });
        }

        Ok(tokens)
    }
}
