// src/watch/mod.rs

//! File watching: turn filesystem changes under the project root into
//! debounced task triggers for the watch runtime.

pub mod binding;
pub mod debounce;
pub mod path_utils;
pub mod watcher;

pub use binding::{WatchBinding, bindings_from_config};
pub use debounce::debounce_triggers;
pub use watcher::{WatcherHandle, spawn_watcher};
