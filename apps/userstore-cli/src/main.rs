use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use runtime::AppConfig;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use store_db::{redact_credentials_in_dsn, DbHandle};
use users::{ensure_schema, NewUser, SeaOrmUsersRepository, User, UsersRepository};

/// Userstore - CRUD access to the users table
#[derive(Parser)]
#[command(name = "userstore")]
#[command(about = "Userstore - CRUD access to the users table")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the users table if it does not exist
    InitSchema,
    /// Insert a user and print it with its id
    Create {
        #[arg(long)]
        login: String,
        #[arg(long)]
        password: String,
    },
    /// Overwrite login and password of an existing user
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        login: String,
        #[arg(long)]
        password: String,
    },
    /// Delete a user by id
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Print all users ordered by id
    List,
    /// Print the user with this id
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Print the user with exactly this login
    Find {
        #[arg(long)]
        login: String,
    },
    /// Print users whose login contains the key
    Search {
        #[arg(long)]
        key: String,
    },
}

/// One output line per user.
#[derive(Serialize)]
struct UserLine<'a> {
    id: i64,
    login: &'a str,
    password: &'a str,
}

impl<'a> From<&'a User> for UserLine<'a> {
    fn from(u: &'a User) -> Self {
        Self {
            id: u.id,
            login: &u.login,
            password: &u.password,
        }
    }
}

fn print_users<'a>(users: impl IntoIterator<Item = &'a User>) -> Result<()> {
    let mut out = std::io::stdout().lock();
    for user in users {
        serde_json::to_writer(&mut out, &UserLine::from(user))?;
        writeln!(out)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_layered(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.verbose);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.home_dir));

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let Some(command) = cli.command else {
        anyhow::bail!("No command given; see --help");
    };

    let base_dir = PathBuf::from(&config.home_dir);
    let dsn = config.database.resolve_dsn(&base_dir)?;
    tracing::info!(dsn = %redact_credentials_in_dsn(Some(&dsn)), "connecting to database");
    let db = DbHandle::connect(&dsn, config.database.connect_opts())
        .await
        .context("Failed to connect to database")?;
    tracing::debug!(engine = ?db.engine(), "database connected");

    let result = execute(&db, command).await;
    db.close().await;
    result
}

async fn execute(db: &DbHandle, command: Commands) -> Result<()> {
    let repo: Arc<dyn UsersRepository> = Arc::new(SeaOrmUsersRepository::new(db.sea()));

    match command {
        Commands::InitSchema => {
            ensure_schema(db.seaorm())
                .await
                .context("Failed to create schema")?;
            tracing::info!("schema ready");
        }
        Commands::Create { login, password } => {
            let user = repo
                .create(NewUser::new(login, password))
                .await
                .context("create failed")?;
            print_users([&user])?;
        }
        Commands::Update {
            id,
            login,
            password,
        } => {
            let user = User {
                id,
                login,
                password,
            };
            if repo.update(&user).await.context("update failed")? {
                print_users([&user])?;
            } else {
                tracing::info!(id, "no user with this id");
            }
        }
        Commands::Delete { id } => {
            if !repo.delete(id).await.context("delete failed")? {
                tracing::info!(id, "no user with this id");
            }
        }
        Commands::List => {
            let users = repo.find_all_order_by_id().await.context("list failed")?;
            print_users(&users)?;
        }
        Commands::Get { id } => match repo.find_by_id(id).await.context("get failed")? {
            Some(user) => print_users([&user])?,
            None => tracing::info!(id, "user not found"),
        },
        Commands::Find { login } => match repo
            .find_by_login(&login)
            .await
            .context("find failed")?
        {
            Some(user) => print_users([&user])?,
            None => tracing::info!(login = %login, "user not found"),
        },
        Commands::Search { key } => {
            let users = repo
                .find_by_like_login(&key)
                .await
                .context("search failed")?;
            print_users(&users)?;
        }
    }
    Ok(())
}
