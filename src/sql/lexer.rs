//! SQL lexer
//!
//! Splits raw SQL text into tokens, tracking byte positions for error
//! reporting.

use crate::error::{Error, Result};
use std::fmt;

/// SQL keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Select,
    From,
    Where,
    Insert,
    Into,
    Values,
    Delete,
    Update,
    Set,
    Null,
    True,
    False,
}

impl Keyword {
    fn from_ident(ident: &str) -> Option<Keyword> {
        match ident.to_ascii_uppercase().as_str() {
            "SELECT" => Some(Keyword::Select),
            "FROM" => Some(Keyword::From),
            "WHERE" => Some(Keyword::Where),
            "INSERT" => Some(Keyword::Insert),
            "INTO" => Some(Keyword::Into),
            "VALUES" => Some(Keyword::Values),
            "DELETE" => Some(Keyword::Delete),
            "UPDATE" => Some(Keyword::Update),
            "SET" => Some(Keyword::Set),
            "NULL" => Some(Keyword::Null),
            "TRUE" => Some(Keyword::True),
            "FALSE" => Some(Keyword::False),
            _ => None,
        }
    }
}

/// A lexical token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Keyword(Keyword),
    Ident(String),
    Integer(i64),
    Decimal(f64),
    String(String),
    Comma,
    Dot,
    Star,
    LParen,
    RParen,
    Semicolon,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(k) => write!(f, "{:?}", k),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Integer(i) => write!(f, "{}", i),
            Token::Decimal(d) => write!(f, "{}", d),
            Token::String(s) => write!(f, "'{}'", s),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Star => write!(f, "*"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Semicolon => write!(f, ";"),
            Token::Eq => write!(f, "="),
            Token::NotEq => write!(f, "<>"),
            Token::Lt => write!(f, "<"),
            Token::LtEq => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::GtEq => write!(f, ">="),
        }
    }
}

/// Tokenize SQL text
pub fn tokenize(sql: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = sql.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        match c {
            c if c.is_whitespace() => pos += 1,
            ',' => {
                tokens.push(Token::Comma);
                pos += 1;
            }
            '.' => {
                tokens.push(Token::Dot);
                pos += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                pos += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                pos += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                pos += 1;
            }
            ';' => {
                tokens.push(Token::Semicolon);
                pos += 1;
            }
            '=' => {
                tokens.push(Token::Eq);
                pos += 1;
            }
            '<' => {
                pos += 1;
                match chars.get(pos) {
                    Some('=') => {
                        tokens.push(Token::LtEq);
                        pos += 1;
                    }
                    Some('>') => {
                        tokens.push(Token::NotEq);
                        pos += 1;
                    }
                    _ => tokens.push(Token::Lt),
                }
            }
            '>' => {
                pos += 1;
                if chars.get(pos) == Some(&'=') {
                    tokens.push(Token::GtEq);
                    pos += 1;
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '\'' => {
                let start = pos;
                pos += 1;
                let mut s = String::new();
                loop {
                    match chars.get(pos) {
                        None => return Err(Error::UnterminatedString(start)),
                        Some('\'') => {
                            // Doubled quote escapes a quote.
                            if chars.get(pos + 1) == Some(&'\'') {
                                s.push('\'');
                                pos += 2;
                            } else {
                                pos += 1;
                                break;
                            }
                        }
                        Some(&ch) => {
                            s.push(ch);
                            pos += 1;
                        }
                    }
                }
                tokens.push(Token::String(s));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let start = pos;
                pos += 1;
                let mut is_decimal = false;
                while let Some(&ch) = chars.get(pos) {
                    if ch.is_ascii_digit() {
                        pos += 1;
                    } else if ch == '.' && !is_decimal {
                        is_decimal = true;
                        pos += 1;
                    } else {
                        break;
                    }
                }
                let text: String = chars[start..pos].iter().collect();
                if is_decimal {
                    let value = text.parse().map_err(|_| Error::InvalidNumber(start))?;
                    tokens.push(Token::Decimal(value));
                } else {
                    let value = text.parse().map_err(|_| Error::InvalidNumber(start))?;
                    tokens.push(Token::Integer(value));
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = pos;
                while let Some(&ch) = chars.get(pos) {
                    if ch.is_ascii_alphanumeric() || ch == '_' {
                        pos += 1;
                    } else {
                        break;
                    }
                }
                let ident: String = chars[start..pos].iter().collect();
                match Keyword::from_ident(&ident) {
                    Some(keyword) => tokens.push(Token::Keyword(keyword)),
                    None => tokens.push(Token::Ident(ident)),
                }
            }
            other => return Err(Error::UnexpectedCharacter(other, pos)),
        }
    }

    Ok(tokens)
}
