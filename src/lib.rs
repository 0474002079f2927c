#![allow(clippy::module_inception)]

use std::rc::Rc;

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod program;
pub mod session;
pub mod type_checker;

extern crate regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }

    pub fn is_null(&self) -> bool {
        self.1.as_str() == "<null>"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn null() -> Self {
        Span {
            start: Position::null(),
            end: Position::null(),
        }
    }
}

/// Finds the line containing a byte offset.
///
/// Returns the 1-based line number, the line text and the offset of
/// `position` inside that line, or `None` when `position` is past the end
/// of `content`.
pub fn get_line_at_position(content: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    if pos > content.len() {
        return None;
    }

    let mut start = 0;
    let mut line_number = 1;

    for line in content.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            let line_pos = pos - start;
            return Some((line_number, line.to_string(), line_pos));
        }

        start = end;
        line_number += 1;
    }

    // Offset sitting exactly at EOF points past the last character
    content
        .split_inclusive('\n')
        .last()
        .map(|line| (line_number - 1, line.to_string(), line.len()))
}

/// Renders an error report for `error` against `source`.
///
/// ```text
/// Error: TypeMatchError (Expected type `int`, received `bool`)
/// -> final.kari
///    |
/// 20 | valdef a: int = true;
///    | ----------------^
/// ```
pub fn render_error(error: &Error, source: &str, file: &str) -> String {
    let mut report = String::new();

    if let ErrorTip::None = error.get_tip() {
        report.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        report.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_tip()
        ));
    }

    let position = error.get_position();
    if position.is_null() {
        report.push_str(&format!("-> {}\n", file));
        return report;
    }

    let Some((line, line_text, line_pos)) = get_line_at_position(source, position.0) else {
        report.push_str(&format!("-> {}\n", file));
        return report;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    report.push_str(&format!("-> {}\n", file));
    report.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    report.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;
    report.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));

    report
}

/// Prints the rendered error report to stderr.
pub fn display_error(error: &Error, source: &str, file: &str) {
    eprint!("{}", render_error(error, source, file));
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count();

    (String::from(&string[start..]), start)
}
