//! Dialog workflows of the console.
//!
//! Each workflow owns its confirmation prompt and its success/error alerts.
//! Callers own the dialog state and the refresh of whatever view they show.

pub mod delete_groups;
pub mod import_key;

pub use delete_groups::DeleteGroups;
pub use import_key::{ImportOutcome, SamlImportKey};
