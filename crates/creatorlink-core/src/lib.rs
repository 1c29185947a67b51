//! Core types and trait definitions for the creatorlink marketplace.
//!
//! This crate is deliberately free of HTTP and database dependencies. It holds
//! the domain model, validation rules, the listing filter engine and the
//! local listing state, and the workflow operations that drive any backend
//! implementing the traits in [`store`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod board;
pub mod engagement;
pub mod error;
pub mod filter;
pub mod posting;
pub mod profile;
pub mod random;
pub mod registration;
pub mod session;
pub mod store;
pub mod workflow;

#[cfg(test)]
mod memory;

pub use error::{Error, FieldErrors, Result};
