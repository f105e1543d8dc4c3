//! Recursive-descent SQL parser
//!
//! Covers the statement subset the pipeline drives: single-table
//! SELECT, INSERT ... VALUES, DELETE, and UPDATE, each with an optional
//! column-op-literal WHERE clause. Malformed SQL fails with a parse
//! error and retains no partial state.

use super::ast::*;
use super::lexer::{tokenize, Keyword, Token};
use crate::error::{Error, Result};

/// Build a parse tree from raw SQL text
pub fn build_parse_tree(sql: &str) -> Result<ParseTree> {
    let tokens = tokenize(sql)?;
    let mut parser = Parser { tokens, pos: 0 };
    let tree = parser.parse_statement()?;
    parser.expect_end()?;
    Ok(tree)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn parse_statement(&mut self) -> Result<ParseTree> {
        match self.peek() {
            Some(Token::Keyword(Keyword::Select)) => self.parse_select().map(ParseTree::Select),
            Some(Token::Keyword(Keyword::Insert)) => self.parse_insert().map(ParseTree::Insert),
            Some(Token::Keyword(Keyword::Delete)) => self.parse_delete().map(ParseTree::Delete),
            Some(Token::Keyword(Keyword::Update)) => self.parse_update().map(ParseTree::Update),
            Some(other) => Err(Error::UnexpectedToken {
                expected: "SELECT, INSERT, DELETE, or UPDATE".to_string(),
                found: other.to_string(),
            }),
            None => Err(Error::UnexpectedEof("a statement".to_string())),
        }
    }

    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect_keyword(Keyword::Select)?;

        let columns = if self.consume(&Token::Star) {
            None
        } else {
            Some(self.parse_ident_list()?)
        };

        self.expect_keyword(Keyword::From)?;
        let table = self.parse_table_ref()?;
        let where_clause = self.parse_optional_where()?;

        Ok(SelectStatement {
            table,
            columns,
            where_clause,
        })
    }

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect_keyword(Keyword::Insert)?;
        self.expect_keyword(Keyword::Into)?;
        let table = self.parse_table_ref()?;

        let columns = if self.consume(&Token::LParen) {
            let list = self.parse_ident_list()?;
            self.expect(&Token::RParen)?;
            Some(list)
        } else {
            None
        };

        self.expect_keyword(Keyword::Values)?;
        let mut values = Vec::new();
        loop {
            self.expect(&Token::LParen)?;
            let mut row = vec![self.parse_literal()?];
            while self.consume(&Token::Comma) {
                row.push(self.parse_literal()?);
            }
            self.expect(&Token::RParen)?;
            values.push(row);
            if !self.consume(&Token::Comma) {
                break;
            }
        }

        Ok(InsertStatement {
            table,
            columns,
            values,
        })
    }

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        self.expect_keyword(Keyword::Delete)?;
        self.expect_keyword(Keyword::From)?;
        let table = self.parse_table_ref()?;
        let where_clause = self.parse_optional_where()?;

        Ok(DeleteStatement {
            table,
            where_clause,
        })
    }

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        self.expect_keyword(Keyword::Update)?;
        let table = self.parse_table_ref()?;
        self.expect_keyword(Keyword::Set)?;

        let mut assignments = vec![self.parse_assignment()?];
        while self.consume(&Token::Comma) {
            assignments.push(self.parse_assignment()?);
        }

        let where_clause = self.parse_optional_where()?;

        Ok(UpdateStatement {
            table,
            assignments,
            where_clause,
        })
    }

    fn parse_assignment(&mut self) -> Result<Assignment> {
        let column = self.parse_ident()?;
        self.expect(&Token::Eq)?;
        let value = self.parse_literal()?;
        Ok(Assignment { column, value })
    }

    fn parse_optional_where(&mut self) -> Result<Option<Predicate>> {
        if !self.consume(&Token::Keyword(Keyword::Where)) {
            return Ok(None);
        }
        let column = self.parse_ident()?;
        let op = self.parse_compare_op()?;
        let value = self.parse_literal()?;
        Ok(Some(Predicate { column, op, value }))
    }

    fn parse_compare_op(&mut self) -> Result<CompareOp> {
        let op = match self.peek() {
            Some(Token::Eq) => CompareOp::Eq,
            Some(Token::NotEq) => CompareOp::NotEq,
            Some(Token::Lt) => CompareOp::Lt,
            Some(Token::LtEq) => CompareOp::LtEq,
            Some(Token::Gt) => CompareOp::Gt,
            Some(Token::GtEq) => CompareOp::GtEq,
            Some(other) => {
                return Err(Error::UnexpectedToken {
                    expected: "a comparison operator".to_string(),
                    found: other.to_string(),
                })
            }
            None => return Err(Error::UnexpectedEof("a comparison operator".to_string())),
        };
        self.pos += 1;
        Ok(op)
    }

    fn parse_table_ref(&mut self) -> Result<TableRef> {
        let first = self.parse_ident()?;
        if self.consume(&Token::Dot) {
            let table = self.parse_ident()?;
            Ok(TableRef {
                database: Some(first),
                table,
            })
        } else {
            Ok(TableRef {
                database: None,
                table: first,
            })
        }
    }

    fn parse_ident_list(&mut self) -> Result<Vec<String>> {
        let mut idents = vec![self.parse_ident()?];
        while self.consume(&Token::Comma) {
            idents.push(self.parse_ident()?);
        }
        Ok(idents)
    }

    fn parse_ident(&mut self) -> Result<String> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            Some(other) => Err(Error::UnexpectedToken {
                expected: "an identifier".to_string(),
                found: other.to_string(),
            }),
            None => Err(Error::UnexpectedEof("an identifier".to_string())),
        }
    }

    fn parse_literal(&mut self) -> Result<Literal> {
        let literal = match self.peek() {
            Some(Token::Integer(i)) => Literal::Integer(*i),
            Some(Token::Decimal(d)) => Literal::Decimal(*d),
            Some(Token::String(s)) => Literal::String(s.clone()),
            Some(Token::Keyword(Keyword::Null)) => Literal::Null,
            Some(Token::Keyword(Keyword::True)) => Literal::Boolean(true),
            Some(Token::Keyword(Keyword::False)) => Literal::Boolean(false),
            Some(other) => {
                return Err(Error::UnexpectedToken {
                    expected: "a literal".to_string(),
                    found: other.to_string(),
                })
            }
            None => return Err(Error::UnexpectedEof("a literal".to_string())),
        };
        self.pos += 1;
        Ok(literal)
    }

    fn expect_end(&mut self) -> Result<()> {
        self.consume(&Token::Semicolon);
        match self.peek() {
            None => Ok(()),
            Some(other) => Err(Error::UnexpectedToken {
                expected: "end of statement".to_string(),
                found: other.to_string(),
            }),
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        self.expect(&Token::Keyword(keyword))
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        match self.peek() {
            Some(found) if found == token => {
                self.pos += 1;
                Ok(())
            }
            Some(found) => Err(Error::UnexpectedToken {
                expected: token.to_string(),
                found: found.to_string(),
            }),
            None => Err(Error::UnexpectedEof(token.to_string())),
        }
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }
}
