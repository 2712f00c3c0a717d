//! Core types and trait definitions for the dayplan preference calendar.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it: the preference model and its validation
//! rules, the [`store::PreferenceStore`] abstraction, and the access gate that
//! decides whether a request may write.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod calendar;
pub mod error;
pub mod gate;
pub mod preference;
pub mod roster;
pub mod store;

pub use error::{Error, InvalidInput, Result};
