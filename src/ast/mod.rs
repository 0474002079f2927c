/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Expression nodes, statements and verification state
/// - expressions: Operators, node constructors and pretty printing
/// - statements: Constant and function definitions
/// - types: The `int` and `bool` types
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
