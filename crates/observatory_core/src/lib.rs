//! Observatory Core Runtime
//!
//! Foundational primitives shared by the Observatory host and site crates:
//!
//! - **Reactive Signals**: values with automatic dependency tracking
//! - **Effects**: callbacks that re-run only when a signal they read changes
//! - **Geometry**: rectangles and edge insets used for viewport math
//!
//! # Example
//!
//! ```rust
//! use observatory_core::reactive::ReactiveGraph;
//! use std::sync::{Arc, Mutex};
//!
//! let mut graph = ReactiveGraph::new();
//! let path = graph.create_signal(String::from("/"));
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! let _effect = graph.create_effect(move |g| {
//!     if let Some(p) = g.get(path) {
//!         sink.lock().unwrap().push(p);
//!     }
//! });
//!
//! graph.set_if_changed(path, String::from("/team"));
//! graph.set_if_changed(path, String::from("/team"));
//! assert_eq!(*seen.lock().unwrap(), vec!["/", "/team"]);
//! ```

pub mod geometry;
pub mod reactive;

pub use geometry::{EdgeInsets, Rect};
pub use reactive::{DirtyFlag, Effect, EffectId, ReactiveGraph, Signal, SignalId};
