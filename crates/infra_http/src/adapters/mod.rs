//! Port implementations over the HTTP transport

mod directory;
mod ledger;

pub use directory::HttpDirectory;
pub use ledger::HttpLedger;
