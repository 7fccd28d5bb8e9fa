use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;
use yatube::{AppState, cache::PageCache, config::Config, db, media::MediaStore};

#[derive(Parser)]
#[command(name = "yatube", about = "Server-rendered blogging platform")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server (the default).
    Serve,
    /// Create a post group.
    AddGroup {
        #[arg(long)]
        slug: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yatube=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("cannot open {}", config.database_url))?;
    db::init(&db_pool).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::AddGroup { slug, title, description } => {
            let group = db::create_group(&db_pool, &slug, &title, &description).await?;
            info!(slug = %group.slug, id = group.id, "group created");
            Ok(())
        }
        Command::Serve => serve(config, db_pool).await,
    }
}

async fn serve(config: Config, db_pool: sqlx::SqlitePool) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(config.media_root.join("posts"))
        .await
        .with_context(|| format!("cannot create {}", config.media_root.display()))?;

    let app_state = AppState {
        db_pool,
        page_cache: PageCache::new(config.index_cache_ttl),
        media: MediaStore::new(config.media_root.clone()),
    };
    let sessions = yatube::session_layer(config.secure_cookies, config.session_inactivity);
    let app = yatube::router(app_state, sessions);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("listening on {}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("shutting down");
        })
        .await?;
    Ok(())
}
