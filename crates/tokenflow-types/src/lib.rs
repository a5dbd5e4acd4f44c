//! Shared type definitions for the tokenflow scheduler.
//!
//! This crate holds the types that flow between the engine and its
//! callers: token payloads, timestamped tokens, and the identifiers of
//! registered places and events.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe index wrappers for places and events
//! - [`value`] -- The token payload enum and milestone-counter helpers
//! - [`token`] -- Timestamped tokens

pub mod ids;
pub mod token;
pub mod value;

pub use ids::{EventId, PlaceId};
pub use token::Token;
pub use value::Value;
