use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use client_core::{
    list_transactions_key, ChangeStatus, HttpOperationClient, RemoteOperationClient,
    RequestLifecycleController, SelectionSource, TagChange, TagMembershipQuery, TaggingWorkflow,
};
use shared::{
    domain::{DateFilter, FISHY_TAG},
    protocol::TransactionRow,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;

use config::{load_settings, Settings};
use terminal::{render_rows, TerminalNotifier};

#[derive(Parser, Debug)]
#[command(name = "fishy-console", about = "Flag and review suspicious transactions")]
struct Args {
    /// Config file; defaults to ./console.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mark a transaction as fishy.
    Mark {
        #[arg(long)]
        transaction_id: String,
    },
    /// Remove the fishy tag from a transaction.
    Clear {
        #[arg(long)]
        transaction_id: String,
    },
    /// Print the ids of every fishy transaction.
    Tagged,
    /// List transactions, marking the fishy ones.
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value_t = DateFilter::All)]
        date_filter: DateFilter,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(api_base_url) = args.api_base_url {
        settings.api_base_url = api_base_url;
    }
    info!(api = %settings.api_base_url, "starting console");

    let client: Arc<dyn RemoteOperationClient> = Arc::new(HttpOperationClient::new(
        &settings.api_base_url,
        settings.api_token.clone(),
        settings.request_timeout(),
    )?);
    let tags = Arc::new(TagMembershipQuery::new(client.clone(), FISHY_TAG)?);

    match args.command {
        Command::Mark { transaction_id } => {
            change_tag(&settings, client, tags, transaction_id, TagChange::MarkAsFishy).await
        }
        Command::Clear { transaction_id } => {
            change_tag(&settings, client, tags, transaction_id, TagChange::ClearTag).await
        }
        Command::Tagged => {
            tags.refresh().await.context("failed to load fishy transactions")?;
            for id in tags.data().unwrap_or_default().current.iter() {
                println!("{id}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::List {
            search,
            date_filter,
        } => {
            let key = list_transactions_key(&search, date_filter, Utc::now())?;
            let (rows, tagged) =
                tokio::join!(client.invoke(key.name(), key.params()), tags.refresh());
            let rows: Vec<TransactionRow> =
                serde_json::from_value(rows.context("failed to list transactions")?)
                    .context("unexpected transaction list shape")?;
            if let Err(err) = tagged {
                warn!(error = %err, "could not load fishy tags");
            }
            for line in render_rows(&rows, tags.data().as_ref()) {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn change_tag(
    settings: &Settings,
    client: Arc<dyn RemoteOperationClient>,
    tags: Arc<TagMembershipQuery>,
    transaction_id: String,
    change: TagChange,
) -> Result<ExitCode> {
    let requests = RequestLifecycleController::new(client, Arc::new(TerminalNotifier::stderr()))
        .with_timings(settings.timings())
        .with_dismiss_policy(settings.dismiss_policy);
    let selection = Arc::new(SelectionSource::new());
    selection.select(transaction_id);
    let workflow = TaggingWorkflow::new(requests, tags, selection);

    match workflow.handle_change(change).await {
        ChangeStatus::Applied => {
            if let Some(snapshot) = workflow.tags().data() {
                println!("{} fishy transaction(s)", snapshot.current.len());
            }
            Ok(ExitCode::SUCCESS)
        }
        ChangeStatus::Skipped | ChangeStatus::Failed => Ok(ExitCode::FAILURE),
    }
}
