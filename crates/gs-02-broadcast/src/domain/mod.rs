//! Domain layer for the Broadcaster subsystem.

pub mod entities;
pub mod errors;
pub mod seen_cache;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use seen_cache::*;
pub use services::*;
pub use value_objects::*;
