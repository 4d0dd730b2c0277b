//! Wire data transfer objects
//!
//! The ledger backend speaks Spanish camelCase (`idRecibo`, `fechaEmision`,
//! `saldo`); the directory tenant speaks Graph-style English camelCase.
//! Everything crossing the wire is declared here and converted explicitly
//! into domain types; a response field the domain cannot represent is a
//! `PortError::Transformation`, never a silent default.

pub mod directory;
pub mod ledger;
