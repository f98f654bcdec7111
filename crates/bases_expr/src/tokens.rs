use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Number(pub f64);

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.to_bits());
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Token {
    Ident(String),
    Number(Number),
    Str(String),
    True,
    False,
    Null,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Dot,
    FatArrow,
    Bang,
    Plus,
    Minus,
    AndAnd,
    OrOr,
    CmpEq,
    CmpNeq,
    CmpGt,
    CmpGte,
    CmpLt,
    CmpLte,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "identifier `{}`", s),
            Token::Number(n) => write!(f, "number `{}`", n),
            Token::Str(s) => write!(f, "string `{}`", s),
            Token::True => write!(f, "'true'"),
            Token::False => write!(f, "'false'"),
            Token::Null => write!(f, "'null'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::Dot => write!(f, "'.'"),
            Token::FatArrow => write!(f, "'=>'"),
            Token::Bang => write!(f, "'!'"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::AndAnd => write!(f, "'&&'"),
            Token::OrOr => write!(f, "'||'"),
            Token::CmpEq => write!(f, "'=='"),
            Token::CmpNeq => write!(f, "'!='"),
            Token::CmpGt => write!(f, "'>'"),
            Token::CmpGte => write!(f, "'>='"),
            Token::CmpLt => write!(f, "'<'"),
            Token::CmpLte => write!(f, "'<='"),
        }
    }
}
