//! Parser module for building the Abstract Syntax Tree (AST).
//!
//! This module transforms a stream of tokens into top-level statements. It
//! uses a Pratt parser for expressions with operator precedence and handles:
//!
//! - Definition parsing (`valdef` constants, `funcdef` functions)
//! - Expression parsing (operators, conditionals, calls, literals)
//! - Type parsing for annotations
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;
