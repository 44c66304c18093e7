// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Binding source trees to the tasks they rebuild ([`patterns`]).
//! - Wiring up a cross-platform filesystem watcher per tree ([`watcher`]).
//! - Ignoring events that did not change file contents ([`hash`]).
//! - Running the rebuild loop ([`session`]).

pub mod hash;
pub mod path_utils;
pub mod patterns;
pub mod session;
pub mod watcher;

pub use hash::ContentHashes;
pub use patterns::{AfterBuild, WatchBinding, default_bindings, tasks_for_path};
pub use session::{SessionReport, WatchSession, watch};
pub use watcher::{WatchEvent, WatcherHandle, spawn_watcher, spawn_watchers};
