//! Types shared by the hbnb logging and error facilities
//!
//! Holds the canonical field keys and event names used by structured logging,
//! so every crate in the workspace emits the same shape of event.

pub mod schema;
