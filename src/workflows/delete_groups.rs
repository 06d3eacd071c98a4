use crate::admin::AdminClient;
use crate::alerts::{AlertVariant, Alerts};
use crate::batch::{BatchResult, Selection, run_batch};
use crate::confirm::{ButtonVariant, ConfirmGate, ConfirmPrompt, DialogState, confirm};
use crate::core::{ConsoleError, GroupRepresentation, Identifiable, Result};
use crate::messages::Args;
use std::future::Future;
use tracing::{Level, event};

/// Bulk group deletion behind a confirmation dialog.
pub struct DeleteGroups<'a, C: ?Sized> {
    client: &'a C,
    alerts: &'a Alerts,
    selected_rows: Selection<GroupRepresentation>,
}

impl<'a, C> DeleteGroups<'a, C>
where
    C: AdminClient + ?Sized,
{
    pub fn new(
        client: &'a C,
        alerts: &'a Alerts,
        selected_rows: Selection<GroupRepresentation>,
    ) -> Self {
        Self {
            client,
            alerts,
            selected_rows,
        }
    }

    pub fn selected_rows(&self) -> &Selection<GroupRepresentation> {
        &self.selected_rows
    }

    /// Dialog text, pluralized on the selection size
    pub fn prompt(&self) -> ConfirmPrompt {
        let messages = self.alerts.messages();
        let count = self.selected_rows.len();
        let group_name = self
            .selected_rows
            .first()
            .and_then(|group| group.name())
            .unwrap_or_default();

        ConfirmPrompt::new(
            messages.t("deleteConfirmTitle", &Args::new().count(count)),
            messages.t(
                "deleteConfirmGroup",
                &Args::new().count(count).with("groupName", group_name),
            ),
        )
        .continue_label(messages.text("common:delete"))
        .cancel_label(messages.text("cancel"))
        .variant(ButtonVariant::Danger)
    }

    /// Deletes the selection one group at a time, then reports.
    ///
    /// A full success refreshes the view and announces the count. The first
    /// failure stops the run and is announced as is, without refreshing.
    pub async fn multi_delete<R, RFut>(&self, refresh: R) -> BatchResult<ConsoleError>
    where
        R: FnOnce() -> RFut,
        RFut: Future<Output = ()>,
    {
        let client = self.client;
        let result = run_batch(&self.selected_rows, |group| async move {
            let id = group.require_id()?;
            client.delete_group(id).await
        })
        .await;

        match result.cause() {
            None => {
                refresh().await;
                self.alerts.add_alert(
                    self.alerts
                        .messages()
                        .t("groupDeleted", &Args::new().count(self.selected_rows.len())),
                    AlertVariant::Success,
                );
            }
            Some(cause) => {
                if result.succeeded() > 0 {
                    event!(
                        Level::WARN,
                        deleted = result.succeeded(),
                        requested = self.selected_rows.len(),
                        "groups were deleted before the failure and stay deleted"
                    );
                }
                self.alerts.add_error("groups:groupDeleteError", cause);
            }
        }

        result
    }

    /// Asks for confirmation, deletes on approval, and closes the dialog
    /// whatever happened. Opening the dialog is up to the caller.
    ///
    /// Returns `None` when the user did not confirm.
    pub async fn run<G, R, RFut>(
        &self,
        gate: &G,
        dialog: &mut DialogState,
        refresh: R,
    ) -> Result<Option<BatchResult<ConsoleError>>>
    where
        G: ConfirmGate + ?Sized,
        R: FnOnce() -> RFut,
        RFut: Future<Output = ()>,
    {
        let outcome = confirm(gate, &self.prompt(), || self.multi_delete(refresh)).await;
        dialog.close();
        outcome
    }
}
