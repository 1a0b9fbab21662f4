//! Record repositories.
//!
//! Services that read and write entity records under the configured data directory.

pub(crate) mod helpers;
pub mod registry;
