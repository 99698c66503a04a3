//! Error handling for the disk cache
//!
//! Every fallible operation returns [`CacheError`], which carries enough
//! context to log the failure and a [`RecoveryHint`] telling the caller what
//! to do about it.

mod conversions;
mod display;
mod recovery;
mod types;

pub use types::*;
