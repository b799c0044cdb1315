#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(i64),
    Bool(bool),
    Char(char),
    /// String literal contents; the delimiter is not kept.
    Str(std::string::String),

    // Delimiters
    LBracket, // [
    RBracket, // ]
    LParen,   // (
    RParen,   // )

    // Identifier
    Word(std::string::String),

    // Special
    Comment(std::string::String),
    Eof,
}

impl Token {
    /// Returns true for tokens that close a nested form.
    pub fn is_closer(&self) -> bool {
        matches!(self, Token::RBracket | Token::RParen)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Bool(true) => write!(f, "True"),
            Token::Bool(false) => write!(f, "False"),
            Token::Char(c) => write!(f, ".{}", c),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Word(s) => write!(f, "{}", s),
            Token::Comment(s) => write!(f, "-- {}", s),
            Token::Eof => write!(f, "EOF"),
        }
    }
}
