//! Command handlers.

mod init;
#[cfg(feature = "api")]
mod serve;

pub use init::handle_init;
#[cfg(feature = "api")]
pub use serve::handle_serve;
