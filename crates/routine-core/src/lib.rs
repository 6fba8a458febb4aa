//! Core types and trait definitions for Reset Routine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The streak engine lives here as a set of pure functions so that the
//! server and the terminal client compute identical numbers.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod addiction;
pub mod check_in;
pub mod clock;
pub mod error;
pub mod identity;
pub mod store;
pub mod streak;

pub use error::{Error, Result};
