//! Core types and trait definitions for the ringpage demo-call service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod credential;
pub mod demo_page;
pub mod error;
pub mod form;
pub mod phone;
pub mod provider_entity;
pub mod slug;
pub mod store;
pub mod variables;

pub use error::{Error, Result, StoreError};
