// ============================================================================
// realmconsole Library
// ============================================================================

pub mod core;
pub mod batch;
pub mod confirm;
pub mod alerts;
pub mod messages;
pub mod admin;
pub mod form;
pub mod workflows;
pub mod config;

// Re-export main types for convenience
pub use crate::core::{
    ConsoleError, GroupRepresentation, Identifiable, KeyStoreFormat, KeyTypes, Result,
};
pub use batch::{BatchFailure, BatchResult, MutationOutcome, Selection, run_batch, run_batch_with};
pub use confirm::{
    AssumeYes, ButtonVariant, ConfirmDecision, ConfirmGate, ConfirmPrompt, DialogState,
    TerminalConfirm, confirm,
};
pub use alerts::{Alert, AlertLog, AlertSink, AlertVariant, Alerts, TerminalAlerts};
pub use messages::{Args, Messages};
pub use admin::{AdminClient, HttpAdminClient, InMemoryAdminClient, KeyUpload};
pub use form::{FieldErrors, FormHandle, KeyForm, SamlKeysDialogForm};
pub use workflows::{DeleteGroups, ImportOutcome, SamlImportKey};
pub use config::ConsoleConfig;

use std::sync::Arc;

// ============================================================================
// High-level Console API
// ============================================================================

/// Admin console bound to one realm
///
/// Bundles the admin API client and the alert front the dialog workflows
/// report to.
///
/// # Examples
///
/// ```no_run
/// use realmconsole::{AdminClient, AssumeYes, Console, ConsoleConfig, DialogState, TerminalAlerts};
/// use std::sync::Arc;
///
/// # async fn demo() -> realmconsole::Result<()> {
/// let config = ConsoleConfig::new("https://sso.example.com", "acme").access_token("...");
/// let console = Console::connect(&config, Arc::new(TerminalAlerts))?;
///
/// let groups = console.client().list_groups().await?;
/// let mut dialog = DialogState::default();
/// console
///     .delete_groups(groups.into_iter().take(2).collect())
///     .run(&AssumeYes, &mut dialog, || async {})
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Console {
    client: Arc<dyn AdminClient>,
    alerts: Alerts,
}

impl Console {
    /// Console over the HTTP admin API described by `config`
    pub fn connect(config: &ConsoleConfig, sink: Arc<dyn AlertSink>) -> Result<Self> {
        let client = HttpAdminClient::new(config)?;
        Ok(Self::with_client(Arc::new(client), Alerts::with_sink(sink)))
    }

    /// Console over any admin client, e.g. [`InMemoryAdminClient`]
    pub fn with_client(client: Arc<dyn AdminClient>, alerts: Alerts) -> Self {
        Self { client, alerts }
    }

    pub fn client(&self) -> &dyn AdminClient {
        self.client.as_ref()
    }

    pub fn alerts(&self) -> &Alerts {
        &self.alerts
    }

    /// Group deletion dialog for the selected rows
    pub fn delete_groups(
        &self,
        selected_rows: Selection<GroupRepresentation>,
    ) -> DeleteGroups<'_, dyn AdminClient> {
        DeleteGroups::new(self.client.as_ref(), &self.alerts, selected_rows)
    }

    /// SAML key import dialog for a client
    pub fn import_saml_key(
        &self,
        client_id: &str,
        attr: KeyTypes,
    ) -> SamlImportKey<'_, dyn AdminClient> {
        SamlImportKey::new(self.client.as_ref(), &self.alerts, client_id, attr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn console_runs_workflows_over_any_client() {
        let memory = Arc::new(InMemoryAdminClient::with_groups(&["ops", "dev"]).await);
        let log = Arc::new(AlertLog::new());
        let console = Console::with_client(memory.clone(), Alerts::with_sink(log.clone()));

        let groups = console.client().list_groups().await.unwrap();
        let mut dialog = DialogState::default();
        let result = console
            .delete_groups(Selection::from(groups))
            .run(&AssumeYes, &mut dialog, || async {})
            .await
            .unwrap()
            .unwrap();

        assert!(result.is_success());
        assert!(memory.groups().await.is_empty());
        assert_eq!(log.last().unwrap().message, "2 groups deleted");
    }

    #[test]
    fn connect_validates_config() {
        let config = ConsoleConfig::new("http://localhost:8080", "");
        assert!(Console::connect(&config, Arc::new(AlertLog::new())).is_err());
    }
}
