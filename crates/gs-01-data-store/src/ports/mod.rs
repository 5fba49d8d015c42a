//! Ports (Hexagonal Architecture)
//!
//! - `inbound`: the API other subsystems drive the store through
//! - `outbound`: crypto, persistence and time dependencies

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
