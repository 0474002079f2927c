//! Lexical analysis.
//!
//! Converts source text into a stream of tokens. Patterns are tried in
//! order against the remaining input and the first anchored match wins.
//! Reserved words are recognised after an identifier match, and `//`
//! comments and whitespace are skipped.

pub mod lexer;
pub mod tokens;
