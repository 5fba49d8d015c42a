//! # Gossip Store Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs      # In-process nodes joined by memory links
//! ├── integration/    # Cross-subsystem flows across several nodes
//! └── exploits/       # Replay, forgery and flooding attempts
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gs-tests
//! cargo test -p gs-tests integration::
//! cargo test -p gs-tests exploits::
//! ```

pub mod harness;

#[cfg(test)]
mod exploits;
#[cfg(test)]
mod integration;
