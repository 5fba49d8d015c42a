//! Cross-subsystem flows across several in-process nodes.

mod concurrency;
mod persistence;
mod propagation;
mod sync;
