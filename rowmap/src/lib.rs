//! Concurrent hash maps built on separate chaining.
//!
//! [`StripedHashMap`] keeps one reader/writer lock per row plus one
//! table-wide reader/writer lock. Row-level work (`get`, `put`, `remove`)
//! holds the table lock shared and locks only the row it touches;
//! `clear` and `resize` hold the table lock exclusively.
//!
//! [`CoarseMap`] serializes everything on a single mutex and serves as a
//! baseline.

mod chain;
mod config;
mod error;
pub mod map;

pub use config::Builder;
pub use error::{Error, Result};
pub use map::{CoarseMap, Map, StripedHashMap};
