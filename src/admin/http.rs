use super::{AdminClient, KeyUpload};
use crate::config::ConsoleConfig;
use crate::core::{CertificateRepresentation, ConsoleError, GroupRepresentation, KeyTypes, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};
use tracing::{Level, event};

/// Admin client over the server's REST API.
#[derive(Debug, Clone)]
pub struct HttpAdminClient {
    http: Client,
    base: Url,
    realm: String,
    access_token: Option<String>,
}

impl HttpAdminClient {
    pub fn new(config: &ConsoleConfig) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            base: config.base_url()?,
            realm: config.realm.clone(),
            access_token: config.access_token.clone(),
        })
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// `{base}/admin/realms/{realm}/{segments...}`, each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ConsoleError::Config(format!("Server url '{}' cannot be a base", self.base))
            })?
            .pop_if_empty()
            .extend(["admin", "realms", self.realm.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        event!(Level::DEBUG, status = status.as_u16(), url = %response.url(), "admin response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
        Err(ConsoleError::api(status.as_u16(), message))
    }
}

/// Extracts the human readable message from an admin error body.
///
/// The server answers with `{"errorMessage": ..}` for domain errors and the
/// OAuth shape `{"error": .., "error_description": ..}` for auth failures.
pub fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(json) => ["errorMessage", "error_description", "error", "message"]
            .iter()
            .find_map(|key| json.get(*key).and_then(|value| value.as_str()))
            .map(str::to_string)
            .or_else(|| Some(trimmed.to_string())),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[async_trait]
impl AdminClient for HttpAdminClient {
    async fn list_groups(&self) -> Result<Vec<GroupRepresentation>> {
        let url = self.endpoint(&["groups"])?;
        let response = self.send(self.http.get(url)).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn delete_group(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&["groups", id])?;
        event!(Level::INFO, group_id = %id, "deleting group");
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn upload_key(
        &self,
        client_id: &str,
        attr: KeyTypes,
        upload: KeyUpload,
    ) -> Result<CertificateRepresentation> {
        let url = self.endpoint(&["clients", client_id, "certificates", attr.as_str(), "upload"])?;

        let mut form = Form::new();
        for (name, value) in upload.form_fields() {
            form = form.text(name, value);
        }
        form = form.part("file", Part::bytes(upload.file).file_name(upload.file_name));

        event!(Level::INFO, client_id = %client_id, attr = %attr, "uploading client key");
        let response = self.send(self.http.post(url).multipart(form)).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
