//! Remote administrative API seam.
//!
//! Workflows only depend on [`AdminClient`]. [`HttpAdminClient`] talks to a real
//! server; [`InMemoryAdminClient`] keeps everything in process for tests and
//! dry runs.

pub mod http;
pub mod memory;

use crate::core::{CertificateRepresentation, GroupRepresentation, KeyStoreFormat, KeyTypes, Result};
use async_trait::async_trait;

pub use http::HttpAdminClient;
pub use memory::{AdminCall, InMemoryAdminClient};

/// Keystore upload for a client's SAML key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyUpload {
    pub keystore_format: KeyStoreFormat,
    pub key_alias: Option<String>,
    pub key_password: Option<String>,
    pub store_password: Option<String>,
    pub file_name: String,
    pub file: Vec<u8>,
}

impl KeyUpload {
    /// Text fields of the multipart form, in the order they are sent.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("keystoreFormat", self.keystore_format.as_str().to_string())];
        let optional = [
            ("keyAlias", &self.key_alias),
            ("keyPassword", &self.key_password),
            ("storePassword", &self.store_password),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                fields.push((name, value.clone()));
            }
        }
        fields
    }
}

/// Admin REST operations used by the console, scoped to one realm.
#[async_trait]
pub trait AdminClient: Send + Sync {
    /// Top-level groups of the realm
    async fn list_groups(&self) -> Result<Vec<GroupRepresentation>>;

    /// Deletes a group and its subgroups.
    async fn delete_group(&self, id: &str) -> Result<()>;

    /// Replaces a client's SAML signing or encryption key.
    async fn upload_key(
        &self,
        client_id: &str,
        attr: KeyTypes,
        upload: KeyUpload,
    ) -> Result<CertificateRepresentation>;
}
