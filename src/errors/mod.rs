//! Error types shared by every phase.
//!
//! - `Error` pairs an `ErrorImpl` with the source position it was raised at
//! - `ErrorImpl` enumerates syntax, semantic, runtime, configuration and
//!   backend failures
//! - `ErrorTip` carries the suggestion printed next to the error name

pub mod errors;

#[cfg(test)]
mod tests;
