use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::NumberParseError { .. }
            | ErrorImpl::TopLevelExpression => ErrorKind::Syntax,
            ErrorImpl::TypeMatchError { .. }
            | ErrorImpl::VariableNotDeclared { .. }
            | ErrorImpl::FunctionNotDeclared { .. }
            | ErrorImpl::UnexpectedArguments { .. }
            | ErrorImpl::MissingArguments { .. }
            | ErrorImpl::ReturnTypeMatchError { .. }
            | ErrorImpl::DuplicateParameter { .. }
            | ErrorImpl::VariableAlreadyDeclared { .. }
            | ErrorImpl::FunctionAlreadyDeclared { .. }
            | ErrorImpl::NotVerified { .. } => ErrorKind::Semantic,
            ErrorImpl::DivisionByZero
            | ErrorImpl::ArithmeticOverflow { .. }
            | ErrorImpl::UnresolvedName { .. } => ErrorKind::Runtime,
            ErrorImpl::EntryFunctionNotFound { .. } | ErrorImpl::InvalidEntryFunction { .. } => {
                ErrorKind::Configuration
            }
            ErrorImpl::CodegenError { .. } | ErrorImpl::FileReadError { .. } => ErrorKind::Backend,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::TopLevelExpression => "TopLevelExpression",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::FunctionNotDeclared { .. } => "FunctionNotDeclared",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::ReturnTypeMatchError { .. } => "ReturnTypeMatchError",
            ErrorImpl::DuplicateParameter { .. } => "DuplicateParameter",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::NotVerified { .. } => "NotVerified",
            ErrorImpl::DivisionByZero => "DivisionByZero",
            ErrorImpl::ArithmeticOverflow { .. } => "ArithmeticOverflow",
            ErrorImpl::UnresolvedName { .. } => "UnresolvedName",
            ErrorImpl::EntryFunctionNotFound { .. } => "EntryFunctionNotFound",
            ErrorImpl::InvalidEntryFunction { .. } => "InvalidEntryFunction",
            ErrorImpl::CodegenError { .. } => "CodegenError",
            ErrorImpl::FileReadError { .. } => "FileReadError",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::TopLevelExpression => ErrorTip::Suggestion(String::from(
                "Only `valdef` and `funcdef` definitions are allowed at the top level of a file",
            )),
            ErrorImpl::TypeMatchError {
                expression,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}` in `{}`",
                expected, received, expression
            )),
            ErrorImpl::VariableNotDeclared { variable } => {
                ErrorTip::Suggestion(format!("Could not find `{}` variable", variable))
            }
            ErrorImpl::FunctionNotDeclared { function } => {
                ErrorTip::Suggestion(format!("Could not find `{}` function", function))
            }
            ErrorImpl::UnexpectedArguments {
                function,
                expected,
                received,
            }
            | ErrorImpl::MissingArguments {
                function,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "`{}` expected {} arguments, received {}",
                function, expected, received
            )),
            ErrorImpl::ReturnTypeMatchError {
                function,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "Expected return type of `{}` to be `{}`, but it returns `{}`",
                function, expected, received
            )),
            ErrorImpl::DuplicateParameter {
                function,
                parameter,
            } => ErrorTip::Suggestion(format!(
                "Parameter `{}` is declared more than once in `{}`",
                parameter, function
            )),
            ErrorImpl::VariableAlreadyDeclared { variable } => {
                ErrorTip::Suggestion(format!("Constant `{}` already declared", variable))
            }
            ErrorImpl::FunctionAlreadyDeclared { function } => {
                ErrorTip::Suggestion(format!("Function `{}` already declared", function))
            }
            ErrorImpl::NotVerified { name } => ErrorTip::Suggestion(format!(
                "Definition `{}` must pass verification first",
                name
            )),
            ErrorImpl::DivisionByZero => ErrorTip::None,
            ErrorImpl::ArithmeticOverflow { operation } => {
                ErrorTip::Suggestion(format!("`{}` does not fit in an int", operation))
            }
            ErrorImpl::UnresolvedName { name } => ErrorTip::Suggestion(format!(
                "`{}` passed verification but could not be resolved",
                name
            )),
            ErrorImpl::EntryFunctionNotFound { function } => ErrorTip::Suggestion(format!(
                "Define `funcdef {}(input: int) -> int = ...;`",
                function
            )),
            ErrorImpl::InvalidEntryFunction {
                function,
                signature,
            } => ErrorTip::Suggestion(format!(
                "`{}` must have signature `(int) -> int`, found `{}`",
                function, signature
            )),
            ErrorImpl::CodegenError { message } => ErrorTip::Suggestion(message.clone()),
            ErrorImpl::FileReadError { path, message } => {
                ErrorTip::Suggestion(format!("Could not read `{}`: {}", path, message))
            }
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.internal_error)
    }
}

impl std::error::Error for Error {}

/// Broad classification of an [`Error`], matching the phase that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Semantic,
    Runtime,
    Configuration,
    Backend,
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("expressions are not allowed at the top level")]
    TopLevelExpression,
    #[error("expected type {expected} but got {received} in `{expression}`")]
    TypeMatchError {
        expression: String,
        expected: String,
        received: String,
    },
    #[error("could not find {variable:?} variable")]
    VariableNotDeclared { variable: String },
    #[error("could not find {function:?} function")]
    FunctionNotDeclared { function: String },
    #[error("too many arguments to {function:?}: expected {expected} arguments but supplied {received}")]
    UnexpectedArguments {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("missing arguments to {function:?}: expected {expected} arguments but supplied {received}")]
    MissingArguments {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("expected return type of {function:?} to be {expected} but actual return type is {received}")]
    ReturnTypeMatchError {
        function: String,
        expected: String,
        received: String,
    },
    #[error("parameter {parameter:?} of {function:?} declared more than once")]
    DuplicateParameter { function: String, parameter: String },
    #[error("constant {variable:?} already declared")]
    VariableAlreadyDeclared { variable: String },
    #[error("function {function:?} already declared")]
    FunctionAlreadyDeclared { function: String },
    #[error("{name:?} has not been verified")]
    NotVerified { name: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("arithmetic overflow in {operation}")]
    ArithmeticOverflow { operation: String },
    #[error("{name:?} could not be resolved at runtime")]
    UnresolvedName { name: String },
    #[error("entry function {function:?} not found")]
    EntryFunctionNotFound { function: String },
    #[error("entry function {function:?} has signature {signature}, expected (int) -> int")]
    InvalidEntryFunction { function: String, signature: String },
    #[error("code generation failed: {message}")]
    CodegenError { message: String },
    #[error("could not read {path:?}: {message}")]
    FileReadError { path: String, message: String },
}
