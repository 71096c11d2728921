//! # Runtime Module
//!
//! Runtime components: process initialization, the retrying bootstrap and
//! its backoff.

pub mod backoff;
pub mod bootstrap;
pub mod initialization;

pub use backoff::FibonacciBackoff;
pub use bootstrap::run_bootstrap;
pub use initialization::*;
