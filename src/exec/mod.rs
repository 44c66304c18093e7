// src/exec/mod.rs

//! Execution layer.
//!
//! - [`context`] is the shared, read-only build context.
//! - [`action`] runs a single leaf action.
//! - [`backend`] provides the `ExecutorBackend` trait and the production
//!   `ActionExecutor`; tests replace it with a fake.

pub mod action;
pub mod backend;
pub mod context;

pub use backend::{ActionExecutor, ExecutorBackend};
pub use context::{BuildContext, SourceWrites};
