//! SQL AST types, helpers for building them and their low-level string representation.

pub mod ast;
pub mod convert;
pub mod helpers;
pub mod string;
