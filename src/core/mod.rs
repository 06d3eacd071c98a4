pub mod error;
pub mod types;

pub use error::{ConsoleError, Result};
pub use types::{
    CertificateRepresentation, GroupRepresentation, Identifiable, KeyStoreFormat, KeyTypes,
};
