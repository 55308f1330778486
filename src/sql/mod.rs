//! SQL generation.
//!
//! - [`token`] - Token types every compiled statement is built from
//! - [`dialect`] - Quoting, literal and cast rules per target engine
//! - [`emit`] - The plan compiler

pub mod dialect;
pub mod emit;
pub mod token;


pub use dialect::{Dialect, SqlDialect};
pub use emit::{compile_column_listing, compile_select};
pub use token::{Token, TokenStream};
