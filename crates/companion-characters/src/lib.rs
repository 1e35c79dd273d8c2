//! Character profiles and the event adapter that manages them.
//!
//! Clients drive the adapter with named events (`character:get`,
//! `voice:selectPreset`, ...). Every event is answered with at most one
//! reply event; failures come back as `error` events and never tear down
//! the connection.
//!
//! The adapter runs with or without a database. Without one, every
//! store-backed event is answered with "Database not configured".

pub mod error;
pub mod events;
pub mod service;
pub mod store;

pub use error::CharacterError;
pub use events::{IncomingEvent, OutgoingEvent};
pub use service::CharacterService;
