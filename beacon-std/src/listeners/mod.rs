//! Standard listener implementations.

pub mod filter;
pub mod logging;
pub mod timeout;
