//! # Attack Scenarios
//!
//! Each test plays a hostile or broken peer against a correct node and checks
//! that the node's state and the rest of the overlay stay intact.
//!
//! | Attack | Defense |
//! |--------|---------|
//! | Replay of an old mutation | strict sequence check against retained marks |
//! | Stale overwrite | same |
//! | Removal by a non-owner | signature and owner-key checks |
//! | Forged payload under a valid signature | signature covers payload and sequence |
//! | Store flooding | capacity limit, TTL ceilings |
//! | Oversized frames | frame size check before decoding |

mod flooding;
mod forgery;
mod replay;
