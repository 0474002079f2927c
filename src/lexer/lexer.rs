use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_SPAN, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex);

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

macro_rules! pattern {
    ($regex:literal, $handler:expr) => {
        RegexPattern {
            regex: Regex::new(concat!("^", $regex)).unwrap(),
            handler: $handler,
        }
    };
}

lazy_static! {
    // Longer operators must precede their prefixes
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern!("[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
        pattern!("[0-9]+", number_handler),
        pattern!("\\s+", skip_handler),
        pattern!("//[^\n]*", skip_handler),
        pattern!("\\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        pattern!("\\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        pattern!("==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        pattern!("!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        pattern!("!", MK_DEFAULT_HANDLER!(TokenKind::Not, "!")),
        pattern!("=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        pattern!("<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        pattern!("<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        pattern!(">=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        pattern!(">", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        pattern!("\\|\\|", MK_DEFAULT_HANDLER!(TokenKind::Or, "||")),
        pattern!("&&", MK_DEFAULT_HANDLER!(TokenKind::And, "&&")),
        pattern!(";", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        pattern!(":", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        pattern!(",", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        pattern!("->", MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->")),
        pattern!("\\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        pattern!("-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        pattern!("/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        pattern!("\\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        pattern!("%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            pos: 0,
            tokens: vec![],
            source,
            file: file_name,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn at(&self) -> Option<char> {
        self.remainder().chars().next()
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn matched_text(&self, regex: &Regex) -> String {
        regex
            .find(self.remainder())
            .map(|found| found.as_str().to_string())
            .unwrap_or_default()
    }
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = lexer.matched_text(regex);

    let span = MK_SPAN!(lexer, matched.len());
    lexer.advance_n(matched.len());
    lexer.push(MK_TOKEN!(TokenKind::Number, matched, span));
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = lexer.matched_text(regex);
    lexer.advance_n(matched.len());
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) {
    let value = lexer.matched_text(regex);
    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    let span = MK_SPAN!(lexer, value.len());
    lexer.advance_n(value.len());
    lexer.push(MK_TOKEN!(kind, value, span));
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let pattern = PATTERNS
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()));

        match pattern {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex),
            None => {
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken {
                        token: lex.at().map(String::from).unwrap_or_default(),
                    },
                    Position(lex.pos as u32, Rc::clone(&lex.file)),
                ));
            }
        }
    }

    let span = MK_SPAN!(lex, 0);
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), span));
    Ok(lex.tokens)
}
