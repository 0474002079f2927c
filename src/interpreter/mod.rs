//! Tree-walking evaluator for verified programs.

pub mod interpreter;
pub mod value;

#[cfg(test)]
mod tests;
