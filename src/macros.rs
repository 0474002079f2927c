//! Token construction shorthands used by the lexer tables.

#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// Creates a Span that starts at the lexer's cursor and covers `$len` bytes.
#[macro_export]
macro_rules! MK_SPAN {
    ($lexer:expr, $len:expr) => {
        Span {
            start: Position($lexer.pos as u32, Rc::clone(&$lexer.file)),
            end: Position(($lexer.pos + $len) as u32, Rc::clone(&$lexer.file)),
        }
    };
}

/// Handler for fixed-text tokens such as `(` or `==`: pushes one token of
/// `$kind` and steps over `$value`.
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| {
            let span = MK_SPAN!(lexer, $value.len());
            lexer.push(MK_TOKEN!($kind, String::from($value), span));
            lexer.advance_n($value.len());
        }
    };
}
