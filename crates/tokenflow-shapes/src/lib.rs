//! Composable process-shape constructors over the tokenflow engine.
//!
//! Business-process scenarios keep reusing the same handful of
//! building blocks: an arrival source minting case tokens, tasks that
//! hold a case and a pooled resource while work is in progress,
//! exclusive gateways routing cases between branches, and sinks
//! capturing finished cases. Each block here is a plain constructor
//! function that registers ordinary places and events on a
//! [`Simulation`] -- no registration hierarchy, no special event
//! kinds; everything the constructors build can also be written by
//! hand through the core API.
//!
//! # Modules
//!
//! - [`process`] -- Sources, tasks, sinks, and exclusive gateways
//! - [`pool`] -- Shared resource pools
//! - [`stochastic`] -- Normal-distribution duration sampling
//!
//! [`Simulation`]: tokenflow_core::Simulation

pub mod pool;
pub mod process;
pub mod stochastic;

pub use pool::resource_pool;
pub use process::{TaskHandles, exclusive_join, exclusive_split, handoff, sink, source, task};
pub use stochastic::{service_time, service_time_with};
