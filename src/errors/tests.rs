//! Unit tests for error names, tips and classification.

use crate::errors::errors::{Error, ErrorImpl, ErrorKind, ErrorTip};
use crate::Position;
use std::rc::Rc;

fn at_test_file(error: ErrorImpl) -> Error {
    Error::new(error, Position(0, Rc::new("test.kari".to_string())))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        Position(10, Rc::new("test.kari".to_string())),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_kind(), ErrorKind::Syntax);
}

#[test]
fn test_error_position() {
    let pos = Position(42, Rc::new("test.kari".to_string()));
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "then".to_string(),
        },
        pos.clone(),
    );

    assert_eq!(error.get_position().0, 42);
    assert_eq!(error.get_position(), &pos);
}

#[test]
fn test_type_mismatch_error_names_expression() {
    let error = at_test_file(ErrorImpl::TypeMatchError {
        expression: "x + 1".to_string(),
        expected: "bool".to_string(),
        received: "int".to_string(),
    });

    assert_eq!(error.get_error_name(), "TypeMatchError");
    assert_eq!(error.get_kind(), ErrorKind::Semantic);
    assert_eq!(
        error.to_string(),
        "expected type bool but got int in `x + 1`"
    );
    assert_eq!(
        error.get_tip().to_string(),
        "Expected type `bool`, received `int` in `x + 1`"
    );
}

#[test]
fn test_not_declared_errors() {
    let variable = at_test_file(ErrorImpl::VariableNotDeclared {
        variable: "foo".to_string(),
    });
    let function = at_test_file(ErrorImpl::FunctionNotDeclared {
        function: "bar".to_string(),
    });

    assert_eq!(variable.get_error_name(), "VariableNotDeclared");
    assert_eq!(variable.to_string(), "could not find \"foo\" variable");
    assert_eq!(function.get_error_name(), "FunctionNotDeclared");
    assert_eq!(function.to_string(), "could not find \"bar\" function");
}

#[test]
fn test_already_declared_errors() {
    let constant = at_test_file(ErrorImpl::VariableAlreadyDeclared {
        variable: "x".to_string(),
    });
    let function = at_test_file(ErrorImpl::FunctionAlreadyDeclared {
        function: "main".to_string(),
    });

    assert_eq!(constant.get_error_name(), "VariableAlreadyDeclared");
    assert_eq!(function.get_error_name(), "FunctionAlreadyDeclared");
    assert_eq!(function.get_kind(), ErrorKind::Semantic);
}

#[test]
fn test_arity_errors() {
    let too_many = at_test_file(ErrorImpl::UnexpectedArguments {
        function: "f".to_string(),
        expected: 2,
        received: 3,
    });
    let too_few = at_test_file(ErrorImpl::MissingArguments {
        function: "f".to_string(),
        expected: 3,
        received: 1,
    });

    assert_eq!(too_many.get_error_name(), "UnexpectedArguments");
    assert_eq!(
        too_many.get_tip().to_string(),
        "`f` expected 2 arguments, received 3"
    );
    assert_eq!(too_few.get_error_name(), "MissingArguments");
    assert!(too_few.to_string().contains("expected 3 arguments but supplied 1"));
}

#[test]
fn test_runtime_and_configuration_kinds() {
    assert_eq!(
        at_test_file(ErrorImpl::DivisionByZero).get_kind(),
        ErrorKind::Runtime
    );
    assert_eq!(
        at_test_file(ErrorImpl::EntryFunctionNotFound {
            function: "main".to_string()
        })
        .get_kind(),
        ErrorKind::Configuration
    );
    assert_eq!(
        at_test_file(ErrorImpl::CodegenError {
            message: "bad module".to_string()
        })
        .get_kind(),
        ErrorKind::Backend
    );
}

#[test]
fn test_error_tip_none() {
    let error = at_test_file(ErrorImpl::UnrecognisedToken {
        token: "@".to_string(),
    });

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = at_test_file(ErrorImpl::UnexpectedToken {
        token: ")".to_string(),
    });

    match error.get_tip() {
        ErrorTip::Suggestion(_) => (),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}
