use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lazyup::api::ApiClient;
use lazyup::config::Config;
use lazyup::models::{format_file_size, ConfigKind, ShortUrl, Upload};
use lazyup::notify::ConsoleNotifier;
use lazyup::state::{CollectionState, Identified, UserState};
use lazyup::storage::{CredentialStore, FileStore};
use lazyup::sync::{ListState, Poller};
use lazyup::views::{
    AccountView, ConfigView, DomainsView, ImageView, SessionView, UploadView, UploadsView,
    UrlsView, ViewContext,
};

#[derive(Parser)]
#[command(name = "lazyup")]
#[command(about = "Client for a lazyup file host and URL shortener", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with an existing API key
    Login { api_key: String },
    /// Create an account and sign in with its new API key
    Register { display_name: String },
    /// Forget the stored API key
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Manage uploaded files
    Uploads {
        #[command(subcommand)]
        command: UploadsCommand,
    },
    /// Upload a file
    Upload { path: PathBuf },
    /// Manage shortened URLs
    Urls {
        #[command(subcommand)]
        command: UrlsCommand,
    },
    /// Download a ShareX config (upload, url or text)
    Config {
        kind: ConfigKind,
        /// Directory to write the .sxcu file into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Account settings
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },
    /// Domains the account can serve files from
    Domains {
        #[command(subcommand)]
        command: DomainsCommand,
    },
    /// Show public details of a hosted file
    Image { slug: String },
}

#[derive(Subcommand)]
enum UploadsCommand {
    List,
    Delete { file_name: String },
    /// Keep the list in sync until interrupted
    Watch,
}

#[derive(Subcommand)]
enum UrlsCommand {
    List,
    Create { url: String },
    Rename { slug: String, new_slug: String },
    Delete { slug: String },
    Watch,
}

#[derive(Subcommand)]
enum AccountCommand {
    /// Change the display name
    Rename { display_name: String },
    /// Replace the API key with a new one
    RegenToken,
    /// Permanently delete the account
    Delete {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum DomainsCommand {
    List,
    Select { domain: String },
    Add {
        domain: String,
        /// Let other accounts use this domain too
        #[arg(long)]
        public: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let backend = Arc::new(FileStore::new(
        &config.storage.credentials_path,
        config.storage.credential_ttl(),
    ));
    let credentials = Arc::new(
        CredentialStore::load(backend).with_context(|| {
            format!(
                "failed to read credentials from {}",
                config.storage.credentials_path.display()
            )
        })?,
    );
    info!("Using backend at {}", config.api.base_url);

    let state = UserState::new(Arc::clone(&credentials));
    let client = ApiClient::new(&config.api, credentials)?;
    let ctx = ViewContext::new(
        client,
        state,
        Arc::new(ConsoleNotifier),
        config.polling.clone(),
    );

    let ok = match cli.command {
        Commands::Login { api_key } => SessionView::new(ctx).login(&api_key).await.is_some(),
        Commands::Register { display_name } => SessionView::new(ctx)
            .create_account(&display_name)
            .await
            .is_some(),
        Commands::Logout => {
            SessionView::new(ctx).logout();
            true
        }
        Commands::Whoami => whoami(&SessionView::new(ctx)),
        Commands::Uploads { command } => uploads(ctx, command).await,
        Commands::Upload { path } => UploadView::new(ctx).upload_file(&path).await.is_some(),
        Commands::Urls { command } => urls(ctx, command).await,
        Commands::Config { kind, dir } => ConfigView::new(ctx).generate(kind, &dir).await.is_some(),
        Commands::Account { command } => account(ctx, command).await,
        Commands::Domains { command } => domains(ctx, command).await,
        Commands::Image { slug } => match ImageView::new(ctx).lookup(&slug).await {
            Some(image) => {
                println!("{:<12} {}", "File", image.file_name);
                println!("{:<12} {}", "Uploader", image.display_name);
                println!("{:<12} {}", "Type", image.metadata.file_type);
                println!("{:<12} {}", "Size", format_file_size(image.metadata.file_size));
                println!("{:<12} {}", "Views", image.metadata.views);
                true
            }
            None => false,
        },
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn whoami(session: &SessionView) -> bool {
    let credential = session.credential();
    if !credential.is_authenticated() {
        println!("Not signed in.");
        return false;
    }
    let name = if credential.display_name.is_empty() {
        "(no display name)"
    } else {
        credential.display_name.as_str()
    };
    println!("Signed in as {}", name);
    if !credential.domain.is_empty() {
        println!("Active domain: {}", credential.domain);
    }
    true
}

async fn uploads(ctx: ViewContext, command: UploadsCommand) -> bool {
    let store = Arc::clone(&ctx.state.uploads);
    let view = UploadsView::new(ctx);
    match command {
        UploadsCommand::List => {
            let poller = view.start_polling();
            let settled = settle(&poller).await;
            poller.stop().await;
            print_uploads(view.uploads().iter());
            settled
        }
        UploadsCommand::Delete { file_name } => view.delete(&file_name).await,
        UploadsCommand::Watch => {
            let poller = view.start_polling();
            let ok = watch_until_interrupted(&poller, store.subscribe(), |state| {
                print_uploads(state.items().iter())
            })
            .await;
            poller.stop().await;
            ok
        }
    }
}

async fn urls(ctx: ViewContext, command: UrlsCommand) -> bool {
    let domain = ctx.state.credentials.credential().domain;
    let store = Arc::clone(&ctx.state.urls);
    let view = UrlsView::new(ctx);
    match command {
        UrlsCommand::List => {
            let poller = view.start_polling();
            let settled = settle(&poller).await;
            poller.stop().await;
            print_urls(view.urls().iter(), &domain);
            settled
        }
        UrlsCommand::Create { url } => match view.create(&url).await {
            Some(created) => {
                if !domain.is_empty() {
                    println!("{}", created.public_link(&domain));
                }
                true
            }
            None => false,
        },
        UrlsCommand::Rename { slug, new_slug } => view.rename(&slug, &new_slug).await,
        UrlsCommand::Delete { slug } => view.delete(&slug).await,
        UrlsCommand::Watch => {
            let poller = view.start_polling();
            let ok = watch_until_interrupted(&poller, store.subscribe(), |state| {
                print_urls(state.items().iter(), &domain)
            })
            .await;
            poller.stop().await;
            ok
        }
    }
}

async fn account(ctx: ViewContext, command: AccountCommand) -> bool {
    let view = AccountView::new(ctx);
    match command {
        AccountCommand::Rename { display_name } => view.update_display_name(&display_name).await,
        AccountCommand::RegenToken => match view.regenerate_token().await {
            Some(token) => {
                println!("{}", token);
                true
            }
            None => false,
        },
        AccountCommand::Delete { yes } => {
            if !yes {
                eprintln!("⚠ This deletes the account and every upload. Re-run with --yes to confirm.");
                return false;
            }
            view.delete_account().await
        }
    }
}

async fn domains(ctx: ViewContext, command: DomainsCommand) -> bool {
    let view = DomainsView::new(ctx);
    match command {
        DomainsCommand::List => {
            let Some(domains) = view.refresh().await else {
                return false;
            };
            let active = view.active();
            for domain in domains {
                let marker = if domain == active { "*" } else { " " };
                println!("{} {}", marker, domain);
            }
            true
        }
        DomainsCommand::Select { domain } => {
            // The eligible set lives server-side; load it before validating
            if view.refresh().await.is_none() {
                return false;
            }
            view.select(&domain).await
        }
        DomainsCommand::Add { domain, public } => view.add(&domain, public).await,
    }
}

/// Wait for the first poll to resolve. Returns false if it failed
async fn settle(poller: &Poller) -> bool {
    let mut rx = poller.subscribe();
    let state = match rx.wait_for(ListState::is_settled).await {
        Ok(state) => state.clone(),
        Err(_) => poller.state(),
    };
    matches!(state, ListState::Populated(_) | ListState::Empty)
}

/// Reprint the list every time it changes, until ctrl-c or the poller gives up
async fn watch_until_interrupted<T, F>(
    poller: &Poller,
    mut items: watch::Receiver<CollectionState<T>>,
    mut render: F,
) -> bool
where
    T: Identified + Clone,
    F: FnMut(&CollectionState<T>),
{
    let mut list_state = poller.subscribe();
    loop {
        tokio::select! {
            changed = items.changed() => {
                if changed.is_err() {
                    return false;
                }
                println!();
                render(&items.borrow_and_update());
            }
            changed = list_state.changed() => {
                if changed.is_err() || *list_state.borrow() == ListState::Unauthenticated {
                    return false;
                }
            }
            _ = tokio::signal::ctrl_c() => return true,
        }
    }
}

fn print_uploads<'a>(uploads: impl Iterator<Item = &'a Upload>) {
    let mut any = false;
    for upload in uploads {
        if !any {
            println!("{:<40} {:<24} {:>10} {:>6}", "File", "Type", "Size", "Views");
            println!("{}", "-".repeat(83));
            any = true;
        }
        println!(
            "{:<40} {:<24} {:>10} {:>6}",
            upload.file_name,
            upload.metadata.file_type,
            upload.human_size(),
            upload.metadata.views
        );
    }
    if !any {
        println!("No uploads yet.");
    }
}

fn print_urls<'a>(urls: impl Iterator<Item = &'a ShortUrl>, domain: &str) {
    let mut any = false;
    for url in urls {
        if !any {
            println!("{:<16} {:>7}  {}", "Slug", "Clicks", "Target");
            println!("{}", "-".repeat(80));
            any = true;
        }
        let link = if domain.is_empty() {
            url.slug.clone()
        } else {
            url.public_link(domain)
        };
        println!("{:<16} {:>7}  {}", url.slug, url.clicks, url.url);
        println!("{:<16} {:>7}  → {}", "", "", link);
    }
    if !any {
        println!("No shortened URLs yet.");
    }
}
