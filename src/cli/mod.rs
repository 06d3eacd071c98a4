pub mod app;

use clap::{Args, Parser, Subcommand, ValueEnum};
use realmconsole::{KeyStoreFormat, KeyTypes};
use std::path::PathBuf;

/// Administer realms of an identity server from the terminal
#[derive(Debug, Parser)]
#[command(name = "realmconsole", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Base URL of the identity server
    #[arg(long, env = "REALMCONSOLE_SERVER_URL", global = true)]
    pub server: Option<String>,

    /// Realm to administer
    #[arg(long, env = "REALMCONSOLE_REALM", global = true)]
    pub realm: Option<String>,

    /// Bearer token for the admin API
    #[arg(long, env = "REALMCONSOLE_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "REALMCONSOLE_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage groups
    #[command(subcommand)]
    Groups(GroupsCommand),

    /// Manage clients
    #[command(subcommand)]
    Clients(ClientsCommand),
}

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// List top-level groups
    List,

    /// Delete groups, stopping at the first failure
    Delete {
        /// Group ids, deleted in the given order
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// Import a SAML signing or encryption key from a keystore file
    ImportKey(ImportKeyArgs),
}

#[derive(Debug, Args)]
pub struct ImportKeyArgs {
    /// Internal id of the client
    pub client_id: String,

    #[arg(long, value_enum, default_value_t = KeyAttr::Signing)]
    pub attr: KeyAttr,

    #[arg(long, value_enum, default_value_t = FormatArg::Jks)]
    pub format: FormatArg,

    /// Keystore or certificate file
    #[arg(long)]
    pub file: PathBuf,

    #[arg(long)]
    pub key_alias: Option<String>,

    #[arg(long)]
    pub key_password: Option<String>,

    #[arg(long)]
    pub store_password: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KeyAttr {
    Signing,
    Encryption,
}

impl From<KeyAttr> for KeyTypes {
    fn from(attr: KeyAttr) -> Self {
        match attr {
            KeyAttr::Signing => KeyTypes::SamlSigning,
            KeyAttr::Encryption => KeyTypes::SamlEncryption,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Jks,
    Pkcs12,
    Pem,
}

impl From<FormatArg> for KeyStoreFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Jks => KeyStoreFormat::Jks,
            FormatArg::Pkcs12 => KeyStoreFormat::Pkcs12,
            FormatArg::Pem => KeyStoreFormat::CertificatePem,
        }
    }
}
