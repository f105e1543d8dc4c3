//! SQL front end: lexer, parse tree, and parser

pub mod ast;
mod lexer;
mod parser;

pub use lexer::{tokenize, Keyword, Token};
pub use parser::build_parse_tree;
