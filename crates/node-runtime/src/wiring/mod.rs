//! # Event Wiring
//!
//! Background consumers of the store event bus.

pub mod event_log;

pub use event_log::log_store_events;
