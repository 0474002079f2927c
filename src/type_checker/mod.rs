//! Type deduction and semantic verification.
//!
//! Definitions are checked against their declared types before they may be
//! evaluated or compiled. This module:
//!
//! - Deduces the type of closed top-level expressions
//! - Verifies expressions against an expected type, in a silent and a
//!   diagnostic flavour that always agree
//! - Checks call arity, argument types and callee return types
//! - Rejects duplicate parameter names
//! - Runs whole-program verification in batch or exhaustive mode

pub mod environment;
pub mod type_checker;
