//! LLVM code generation.
//!
//! Lowers a verified program to LLVM IR through inkwell. From there the
//! module can be written as textual IR or as a host object file, or run
//! in-process through the JIT.

pub mod compiler;
pub mod expr;
pub mod jit;
pub mod runtime;
pub mod stmt;

#[cfg(test)]
mod tests;
