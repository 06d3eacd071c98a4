use super::{Cli, ClientsCommand, Command, ConnectionArgs, GroupsCommand, ImportKeyArgs};
use anyhow::{Context, Result, bail};
use realmconsole::{
    AdminClient, AssumeYes, BatchResult, ConfirmGate, Console, ConsoleConfig, ConsoleError,
    DialogState, GroupRepresentation, ImportOutcome, Selection, TerminalAlerts, TerminalConfirm,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Flags override `REALMCONSOLE_*` variables, which override defaults.
fn config_from(args: &ConnectionArgs) -> Result<ConsoleConfig> {
    let mut config = ConsoleConfig::from_env().context("failed to read environment")?;

    if let Some(server) = &args.server {
        config = config.server_url(server);
    }
    if let Some(realm) = &args.realm {
        config = config.realm(realm);
    }
    if let Some(token) = &args.token {
        config = config.access_token(token);
    }
    if let Some(secs) = args.timeout_secs {
        config = config.request_timeout(Duration::from_secs(secs));
    }

    config.validate().context("invalid connection settings")?;
    Ok(config)
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = config_from(&cli.connection)?;
    info!(server = %config.server_url, realm = %config.realm, "connecting");
    let console = Console::connect(&config, Arc::new(TerminalAlerts))?;

    let gate: Box<dyn ConfirmGate> = if cli.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalConfirm::stdio())
    };

    match cli.command {
        Command::Groups(GroupsCommand::List) => {
            print_groups(&console.client().list_groups().await?);
            Ok(())
        }
        Command::Groups(GroupsCommand::Delete { ids }) => {
            delete_groups(&console, gate.as_ref(), ids).await
        }
        Command::Clients(ClientsCommand::ImportKey(args)) => {
            import_key(&console, gate.as_ref(), args).await
        }
    }
}

fn print_groups(groups: &[GroupRepresentation]) {
    if groups.is_empty() {
        println!("(no groups)");
    }
    for group in groups {
        println!(
            "{}\t{}",
            group.id.as_deref().unwrap_or("-"),
            group.path.as_deref().or(group.name.as_deref()).unwrap_or("-")
        );
    }
}

/// Selection in the order given on the command line, with names taken from
/// the server listing when the id is known.
fn select(listing: Vec<GroupRepresentation>, ids: Vec<String>) -> Selection<GroupRepresentation> {
    ids.into_iter()
        .map(|id| {
            listing
                .iter()
                .find(|group| group.id.as_deref() == Some(id.as_str()))
                .cloned()
                .unwrap_or(GroupRepresentation {
                    id: Some(id),
                    ..Default::default()
                })
        })
        .collect()
}

async fn delete_groups(console: &Console, gate: &dyn ConfirmGate, ids: Vec<String>) -> Result<()> {
    let listing = console.client().list_groups().await?;
    let dialog = console.delete_groups(select(listing, ids));
    let mut state = DialogState::opened();

    let client = console.client();
    let outcome = dialog
        .run(gate, &mut state, || async move {
            match client.list_groups().await {
                Ok(groups) => print_groups(&groups),
                Err(err) => tracing::warn!(error = %err, "could not refresh groups"),
            }
        })
        .await?;

    match outcome {
        None => {
            info!("deletion cancelled");
            Ok(())
        }
        Some(result) => batch_error(result),
    }
}

/// Exit status of a confirmed deletion: the cause of the failure, if any.
fn batch_error(result: BatchResult<ConsoleError>) -> Result<()> {
    result
        .into_outcome()
        .map(|_| ())
        .map_err(|failure| failure.cause.into())
}

async fn import_key(console: &Console, gate: &dyn ConfirmGate, args: ImportKeyArgs) -> Result<()> {
    let dialog = console.import_saml_key(&args.client_id, args.attr.into());

    let key_form = dialog.key_form();
    key_form.select_format(args.format.into())?;
    key_form.set_key_alias(args.key_alias.as_deref().unwrap_or_default());
    key_form.set_key_password(args.key_password.as_deref().unwrap_or_default());
    key_form.set_store_password(args.store_password.as_deref().unwrap_or_default());
    key_form
        .load_file(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let mut state = DialogState::opened();
    match dialog.run(gate, &mut state).await? {
        None => {
            info!("import cancelled");
            Ok(())
        }
        Some(ImportOutcome::Imported(_)) => Ok(()),
        Some(ImportOutcome::Failed(err)) => Err(err.into()),
        Some(ImportOutcome::Invalid(errors)) => bail!("missing fields: {}", errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_keeps_command_line_order() {
        let listing = vec![
            GroupRepresentation::new("g1", "ops"),
            GroupRepresentation::new("g2", "dev"),
        ];
        let ids = vec!["g2".to_string(), "zz".to_string(), "g1".to_string()];
        let selection = select(listing, ids);

        let names: Vec<_> = selection.iter().map(|g| g.name().unwrap_or("?")).collect();
        assert_eq!(names, vec!["dev", "?", "ops"]);
        assert_eq!(selection[1].id.as_deref(), Some("zz"));
    }

    #[tokio::test]
    async fn failed_batch_exits_with_the_cause_only() {
        let selection: Selection<&str> = vec!["g1", "g-locked", "g2"].into();
        let result = realmconsole::run_batch(&selection, |id| async move {
            match *id {
                "g-locked" => Err(ConsoleError::api(403, "HTTP 403 Forbidden")),
                _ => Ok(()),
            }
        })
        .await;
        assert_eq!(result.succeeded(), 1);

        let err = batch_error(result).unwrap_err();
        assert_eq!(err.to_string(), "HTTP 403 Forbidden");
        assert!(!err.to_string().contains("of 3"));
        assert!(matches!(
            err.downcast_ref::<ConsoleError>(),
            Some(ConsoleError::Api { status: 403, .. })
        ));
    }

    #[tokio::test]
    async fn successful_batch_exits_cleanly() {
        let selection: Selection<&str> = vec!["g1", "g2"].into();
        let result =
            realmconsole::run_batch(&selection, |_| async { Ok::<(), ConsoleError>(()) }).await;
        assert!(batch_error(result).is_ok());
    }
}
