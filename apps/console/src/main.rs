use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, load_settings_from, ClientSettings},
    AlwaysConfirm, CommandOutcome, ConfirmationPrompt, Draft, HttpItemGateway, ItemController,
};
use shared::domain::{ItemId, ItemStatus};
use tracing_subscriber::EnvFilter;

mod prompt;
mod render;

use prompt::StdinConfirmation;

#[derive(Parser, Debug)]
#[command(name = "item-console", about = "Browse and edit the remote item collection")]
struct Args {
    /// Base URL of the item service, e.g. http://localhost:8080
    #[arg(long, global = true)]
    api_base: Option<String>,
    #[arg(long, global = true)]
    page_size: Option<u32>,
    /// Settings file to read instead of ./client.toml
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show one page, optionally narrowed by a case-insensitive filter.
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        filter: Option<String>,
    },
    Get {
        id: i64,
    },
    Create {
        #[command(flatten)]
        fields: ItemFields,
    },
    Update {
        id: i64,
        #[command(flatten)]
        fields: ItemFields,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(clap::Args, Debug, Default)]
struct ItemFields {
    #[arg(long)]
    nome: Option<String>,
    #[arg(long)]
    descricao: Option<String>,
    #[arg(long)]
    status: Option<ItemStatus>,
    #[arg(long)]
    preco: Option<f64>,
    #[arg(long)]
    categoria: Option<String>,
}

impl ItemFields {
    fn apply(self, draft: &mut Draft) {
        if let Some(nome) = self.nome {
            draft.nome = nome;
        }
        if let Some(descricao) = self.descricao {
            draft.descricao = descricao;
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        if self.preco.is_some() {
            draft.preco = self.preco;
        }
        if let Some(categoria) = self.categoria {
            draft.categoria = categoria;
        }
    }
}

fn resolve_settings(args: &Args) -> Result<ClientSettings> {
    let mut settings = match &args.settings {
        Some(path) => load_settings_from(path),
        None => load_settings(),
    };
    if let Some(api_base) = &args.api_base {
        settings.set_api_base(api_base)?;
    }
    if let Some(page_size) = args.page_size {
        if page_size == 0 {
            bail!("--page-size must be positive");
        }
        settings.page_size = page_size;
    }
    Ok(settings)
}

async fn finish(controller: &ItemController, outcome: CommandOutcome) -> Result<()> {
    let message = controller.message().await;
    if let Some(message) = &message {
        println!("{}", render::render_message(message));
    }
    match outcome {
        CommandOutcome::Failed => Err(anyhow!(message
            .map(|m| m.text)
            .unwrap_or_else(|| "command failed".to_string()))),
        CommandOutcome::Declined => {
            println!("Cancelled.");
            Ok(())
        }
        CommandOutcome::Completed | CommandOutcome::Skipped => Ok(()),
    }
}

/// Looks `id` up and returns the stored item, reporting failures like any other command.
async fn lookup(controller: &ItemController, id: i64) -> Result<Option<Draft>> {
    let outcome = controller.fetch_by_id(Some(ItemId(id))).await;
    if outcome == CommandOutcome::Failed {
        finish(controller, outcome).await?;
    }
    Ok(controller.lookup().await)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let settings = resolve_settings(&args)?;
    tracing::debug!(api_base = %settings.api_base, page_size = settings.page_size, "console: settings resolved");

    let confirmation: Arc<dyn ConfirmationPrompt> = match &args.command {
        Command::Delete { yes: true, .. } => Arc::new(AlwaysConfirm),
        _ => Arc::new(StdinConfirmation),
    };
    let gateway = HttpItemGateway::with_timeout(settings.api_base.clone(), settings.request_timeout())?;
    let controller = ItemController::new_with_dependencies(
        Arc::new(gateway),
        confirmation,
        settings.controller_options(),
    );

    match args.command {
        Command::List { page, filter } => {
            let outcome = controller.load_page(page).await;
            if let Some(filter) = filter {
                controller.set_filter(filter).await;
            }
            if outcome == CommandOutcome::Completed {
                println!("{}", render::render_page(&controller.snapshot().await));
            }
            finish(&controller, outcome).await
        }
        Command::Get { id } => {
            if let Some(item) = lookup(&controller, id).await? {
                println!("{}", render::render_item(&item));
            }
            Ok(())
        }
        Command::Create { fields } => {
            controller.update_draft(|draft| fields.apply(draft)).await;
            let outcome = controller.save().await;
            if outcome == CommandOutcome::Completed {
                println!("{}", render::render_page(&controller.snapshot().await));
            }
            finish(&controller, outcome).await
        }
        Command::Update { id, fields } => {
            let Some(item) = lookup(&controller, id).await? else {
                return Ok(());
            };
            controller.edit(&item).await;
            controller.update_draft(|draft| fields.apply(draft)).await;
            let outcome = controller.save().await;
            if outcome == CommandOutcome::Completed {
                println!("{}", render::render_item(&controller.draft().await));
            }
            finish(&controller, outcome).await
        }
        Command::Delete { id, .. } => {
            let Some(item) = lookup(&controller, id).await? else {
                return Ok(());
            };
            let outcome = controller.remove(&item).await;
            finish(&controller, outcome).await
        }
    }
}
