use super::{AdminClient, KeyUpload};
use crate::core::{CertificateRepresentation, ConsoleError, GroupRepresentation, KeyTypes, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A call the in-memory server received, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCall {
    ListGroups,
    DeleteGroup(String),
    UploadKey { client_id: String, attr: KeyTypes },
}

#[derive(Default)]
struct State {
    groups: Vec<GroupRepresentation>,
    keys: HashMap<(String, KeyTypes), KeyUpload>,
    calls: Vec<AdminCall>,
    delete_faults: HashMap<String, ConsoleError>,
    upload_fault: Option<ConsoleError>,
}

/// Admin server kept in process.
///
/// Every call is journaled. Failures can be injected per group id for deletes
/// and once for the next key upload.
#[derive(Default)]
pub struct InMemoryAdminClient {
    state: RwLock<State>,
}

impl InMemoryAdminClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds top-level groups with generated ids.
    pub async fn with_groups(names: &[&str]) -> Self {
        let client = Self::new();
        for name in names {
            client.create_group(name).await;
        }
        client
    }

    /// Adds a top-level group and returns it.
    pub async fn create_group(&self, name: &str) -> GroupRepresentation {
        let group = GroupRepresentation::new(Uuid::new_v4().to_string(), name);
        self.state.write().await.groups.push(group.clone());
        group
    }

    pub async fn groups(&self) -> Vec<GroupRepresentation> {
        self.state.read().await.groups.clone()
    }

    /// Calls received so far
    pub async fn calls(&self) -> Vec<AdminCall> {
        self.state.read().await.calls.clone()
    }

    /// Ids passed to `delete_group`, including rejected ones
    pub async fn delete_calls(&self) -> Vec<String> {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter_map(|call| match call {
                AdminCall::DeleteGroup(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Makes every delete of `id` fail with `error`.
    pub async fn fail_delete(&self, id: &str, error: ConsoleError) {
        self.state.write().await.delete_faults.insert(id.to_string(), error);
    }

    /// Makes the next key upload fail with `error`.
    pub async fn fail_next_upload(&self, error: ConsoleError) {
        self.state.write().await.upload_fault = Some(error);
    }

    /// Key currently stored for a client attribute
    pub async fn stored_key(&self, client_id: &str, attr: KeyTypes) -> Option<KeyUpload> {
        self.state
            .read()
            .await
            .keys
            .get(&(client_id.to_string(), attr))
            .cloned()
    }
}

#[async_trait]
impl AdminClient for InMemoryAdminClient {
    async fn list_groups(&self) -> Result<Vec<GroupRepresentation>> {
        let mut state = self.state.write().await;
        state.calls.push(AdminCall::ListGroups);
        Ok(state.groups.clone())
    }

    async fn delete_group(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.calls.push(AdminCall::DeleteGroup(id.to_string()));

        if let Some(err) = state.delete_faults.get(id) {
            return Err(err.clone());
        }

        let before = state.groups.len();
        state.groups.retain(|group| group.id.as_deref() != Some(id));
        if state.groups.len() == before {
            return Err(ConsoleError::api(404, "Could not find group by id"));
        }
        Ok(())
    }

    async fn upload_key(
        &self,
        client_id: &str,
        attr: KeyTypes,
        upload: KeyUpload,
    ) -> Result<CertificateRepresentation> {
        let mut state = self.state.write().await;
        state.calls.push(AdminCall::UploadKey {
            client_id: client_id.to_string(),
            attr,
        });

        if let Some(err) = state.upload_fault.take() {
            return Err(err);
        }
        if upload.file.is_empty() {
            return Err(ConsoleError::api(400, "Uploaded file is empty"));
        }

        let certificate = CertificateRepresentation {
            certificate: Some(format!("{}:{}", upload.keystore_format, upload.file_name)),
            kid: Some(Uuid::new_v4().to_string()),
            ..Default::default()
        };
        state.keys.insert((client_id.to_string(), attr), upload);
        Ok(certificate)
    }
}
