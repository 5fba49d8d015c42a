//! Domain layer for the Protocol Handler.

pub mod config;
pub mod errors;
pub mod outcome;
pub mod sync;

pub use config::*;
pub use errors::*;
pub use outcome::*;
pub use sync::*;
