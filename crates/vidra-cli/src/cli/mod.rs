//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use vidra_client::config::paths;
use vidra_client::session::{SessionFile, SessionStore};
use vidra_client::{ApiClient, Config};

mod commands;

#[derive(Parser)]
#[command(name = "vidra")]
#[command(version)]
#[command(about = "Terminal client for the vidra streaming platform")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out and discard the stored session
    Logout,
    /// List platform accounts (requires auth)
    Users,
    /// List public streams
    List {
        /// Page size
        #[arg(long)]
        limit: Option<u64>,

        /// Keep fetching pages until the whole listing is loaded
        #[arg(long)]
        all: bool,
    },
    /// Show one stream
    Show {
        /// Stream id
        id: String,
    },
    /// Create a stream
    Create {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// public, private or unlisted
        #[arg(long, default_value = "public")]
        visibility: String,

        /// May be given multiple times
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },
    /// Edit a stream (only the given fields change)
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        visibility: Option<String>,

        /// Replaces the tag set when given
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },
    /// Delete a stream
    Delete {
        id: String,
    },
    /// Upload a video file to a stream
    Upload {
        id: String,

        /// Path to the video file
        file: String,
    },
    /// Download a stream's video
    Download {
        id: String,

        /// Destination path (default: <id>.mp4)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Everything a command needs: config, the API client, and where the
/// session is persisted.
pub(crate) struct App {
    pub config: Config,
    pub client: ApiClient,
}

impl App {
    fn new() -> Result<Self> {
        let config = Config::load().context("load config")?;
        tracing::debug!(base_url = %config.base_url, "config loaded");

        let home = paths::vidra_home();
        let session = match SessionFile::load(&home).context("load session")? {
            Some(file) => SessionStore::restore(file.access_token, file.expires_at_ms),
            None => SessionStore::new(),
        };

        let client = ApiClient::new(&config, session)
            .map_err(anyhow::Error::from)
            .context("build API client")?;

        Ok(Self { config, client })
    }

    /// Writes the session back to disk after a command: a refresh during
    /// the command may have rotated the token, and a failed refresh or a
    /// logout clears it.
    fn persist_session(&self) -> Result<()> {
        let home = paths::vidra_home();
        match self.client.session().state() {
            Some(state) => SessionFile {
                access_token: state.token,
                expires_at_ms: state.expires_at_ms,
            }
            .save(&home),
            None => SessionFile::remove(&home),
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = crate::logging::init()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;

    runtime.block_on(dispatch(cli))
}

async fn dispatch(cli: Cli) -> Result<()> {
    let app = App::new()?;

    let outcome = match cli.command {
        Commands::Login { email, password } => commands::auth::login(&app, email, password).await,
        Commands::Logout => commands::auth::logout(&app).await,
        Commands::Users => commands::auth::users(&app).await,
        Commands::List { limit, all } => commands::streams::list(&app, limit, all).await,
        Commands::Show { id } => commands::streams::show(&app, &id).await,
        Commands::Create {
            title,
            description,
            visibility,
            tags,
        } => commands::streams::create(&app, title, description, &visibility, tags).await,
        Commands::Edit {
            id,
            title,
            description,
            visibility,
            tags,
        } => commands::streams::edit(&app, &id, title, description, visibility, tags).await,
        Commands::Delete { id } => commands::streams::delete(&app, &id).await,
        Commands::Upload { id, file } => commands::streams::upload(&app, &id, &file).await,
        Commands::Download { id, output } => commands::streams::download(&app, &id, output).await,
    };

    // Persist even when the command failed: a failed refresh must leave
    // the cleared session on disk too.
    app.persist_session()?;
    outcome
}
