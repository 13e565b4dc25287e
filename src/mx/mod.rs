//! MX resolution and mail-exchanger selection.
//!
//! Resolvers are built per call from [`build_resolver`]; DNS server
//! overrides never leak into other verifications.

mod error;
mod resolver;
mod types;

pub use error::MxError as Error;
pub use resolver::build_resolver;
pub use types::{LookupFailure, MxRecord, select_preferred};

pub(crate) use resolver::{LookupMx, resolve_with};
