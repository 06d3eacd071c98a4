use crate::admin::AdminClient;
use crate::alerts::{AlertVariant, Alerts};
use crate::confirm::{ConfirmGate, ConfirmPrompt, DialogState, confirm};
use crate::core::{CertificateRepresentation, ConsoleError, KeyTypes, Result};
use crate::form::{FieldErrors, FormHandle, KeyForm, SamlKeysDialogForm};
use tracing::{Level, event};

/// How an import attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported(CertificateRepresentation),
    /// The server rejected the upload
    Failed(ConsoleError),
    /// Nothing was sent because fields are missing
    Invalid(FieldErrors),
}

impl ImportOutcome {
    pub fn is_imported(&self) -> bool {
        matches!(self, ImportOutcome::Imported(_))
    }
}

/// Import of a client's SAML signing or encryption key from a keystore file.
pub struct SamlImportKey<'a, C: ?Sized> {
    client: &'a C,
    alerts: &'a Alerts,
    id: String,
    attr: KeyTypes,
    form: FormHandle<SamlKeysDialogForm>,
}

impl<'a, C> SamlImportKey<'a, C>
where
    C: AdminClient + ?Sized,
{
    pub fn new(client: &'a C, alerts: &'a Alerts, id: &str, attr: KeyTypes) -> Self {
        Self {
            client,
            alerts,
            id: id.to_string(),
            attr,
            form: FormHandle::default(),
        }
    }

    /// Shares an existing form instead of starting from empty values.
    pub fn with_form(mut self, form: FormHandle<SamlKeysDialogForm>) -> Self {
        self.form = form;
        self
    }

    pub fn form(&self) -> &FormHandle<SamlKeysDialogForm> {
        &self.form
    }

    /// Key fields bound to this dialog's form, with file upload and PEM
    pub fn key_form(&self) -> KeyForm {
        KeyForm::new(self.form.clone()).use_file().has_pem()
    }

    pub fn prompt(&self) -> ConfirmPrompt {
        let messages = self.alerts.messages();
        ConfirmPrompt::new(messages.text("clients:importKey"), String::new())
            .continue_label(messages.text("clients:import"))
            .cancel_label(messages.text("cancel"))
    }

    /// Validates the form and uploads it, announcing the result.
    ///
    /// Invalid forms are not sent and raise no alert; the field errors are
    /// returned for display next to the fields.
    pub async fn submit(&self) -> ImportOutcome {
        let submitted = self
            .form
            .handle_submit(|values| {
                self.client
                    .upload_key(&self.id, self.attr, values.into_upload())
            })
            .await;

        match submitted {
            Err(errors) => ImportOutcome::Invalid(errors),
            Ok(Err(err)) => {
                self.alerts.add_error("clients:importError", &err);
                ImportOutcome::Failed(err)
            }
            Ok(Ok(certificate)) => {
                event!(Level::INFO, client_id = %self.id, attr = %self.attr, "key imported");
                let message = self.alerts.messages().text("importSuccess");
                self.alerts.add_alert(message, AlertVariant::Success);
                ImportOutcome::Imported(certificate)
            }
        }
    }

    /// Confirm, submit, then close the caller's dialog in every case.
    pub async fn run<G>(
        &self,
        gate: &G,
        dialog: &mut DialogState,
    ) -> Result<Option<ImportOutcome>>
    where
        G: ConfirmGate + ?Sized,
    {
        let outcome = confirm(gate, &self.prompt(), || self.submit()).await;
        dialog.close();
        outcome
    }
}
