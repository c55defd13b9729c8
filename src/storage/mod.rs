//! Persistence layer.
//!
//! [`FileStorage`] keeps every collection as YAML documents on disk;
//! the repository traits are the seams services and tests depend on.

mod file;
mod repository;

pub use file::FileStorage;
pub use repository::{
    TicketExpand, TicketFilter, TicketPatch, TicketRepository, TicketView, UserDirectory,
};

#[cfg(test)]
pub use repository::MockUserDirectory;

/// Paging defaults shared by the ticket and timeline listings.
pub const DEFAULT_LIST_OFFSET: usize = 0;
pub const DEFAULT_LIST_LIMIT: usize = 50;
