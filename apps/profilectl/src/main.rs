use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use profile_update::contract::model::{AdditionalFields, NewUser, ProfilePatch, User};
use profile_update::contract::ProfileError;
use profile_update::module::MODULE_NAME;
use profile_update::ProfileModule;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)?;
        }
    }

    // Rebuild DSN with absolute path and normalized slashes
    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Parse `name=value`; the value is read as JSON when it parses, otherwise
/// taken as a plain string (`age=42` is a number, `nick=bob` a string).
fn parse_field(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    if name.trim().is_empty() {
        return Err(format!("empty field name in '{raw}'"));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((name.trim().to_string(), value))
}

/// profilectl - manage user profiles and their additional fields
#[derive(Parser)]
#[command(name = "profilectl")]
#[command(about = "profilectl - manage user profiles and their additional fields")]
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

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check configuration
    Check,
    /// List registered additional fields
    Fields,
    /// Register a new user
    Create {
        #[arg(long)]
        email: String,
        /// Additional field as NAME=VALUE (repeatable)
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, serde_json::Value)>,
    },
    /// Show a profile
    Show { id: Uuid },
    /// Apply a partial update to a profile
    Update {
        id: Uuid,
        #[arg(long)]
        email: Option<String>,
        /// Additional field as NAME=VALUE (repeatable)
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, serde_json::Value)>,
    },
}

/// JSON view of a profile printed on stdout.
#[derive(Serialize)]
struct ProfileView {
    id: Uuid,
    email: String,
    additional_fields: AdditionalFields,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<User> for ProfileView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            additional_fields: u.additional_fields,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    // Initialize logging
    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.home_dir));
    tracing::info!("profilectl starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => check_config(&config),
        command => run_command(&config, command).await,
    }
}

async fn run_command(config: &AppConfig, command: Commands) -> Result<()> {
    let module = init_module(config).await?;
    let api = module.client();

    match command {
        Commands::Check => check_config(config),
        Commands::Fields => {
            for def in module.service().fields().all() {
                println!(
                    "{}\t{}\t{}",
                    def.name(),
                    def.kind(),
                    if def.is_required() { "required" } else { "optional" }
                );
            }
            Ok(())
        }
        Commands::Create { email, fields } => {
            let user = api
                .register_user(NewUser {
                    email,
                    additional_fields: fields.into_iter().collect(),
                })
                .await
                .map_err(report)?;
            print_profile(user)
        }
        Commands::Show { id } => {
            let user = api.get_profile(id).await.map_err(report)?;
            print_profile(user)
        }
        Commands::Update { id, email, fields } => {
            let patch = ProfilePatch {
                email,
                additional_fields: fields.into_iter().collect(),
            };
            if patch.is_empty() {
                bail!("nothing to update: pass --email and/or --field");
            }
            let user = api.update_profile(id, patch).await.map_err(report)?;
            print_profile(user)
        }
    }
}

fn print_profile(user: User) -> Result<()> {
    let view = ProfileView::from(user);
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

/// Turn a contract error into a message listing every rejected field.
fn report(e: ProfileError) -> anyhow::Error {
    match e {
        ProfileError::Validation { errors } => {
            let lines: Vec<String> = errors
                .iter()
                .map(|(field, err)| format!("  {field}: {err} [{}]", err.code()))
                .collect();
            anyhow!("validation failed:\n{}", lines.join("\n"))
        }
        other => anyhow!(other),
    }
}

async fn connect(db_config: &DatabaseConfig, base_dir: &Path) -> Result<DatabaseConnection> {
    let raw = db_config.url.trim();
    if raw.is_empty() {
        bail!("Database URL not configured");
    }
    // Absolutize sqlite DSNs to avoid cwd issues
    let dsn = if raw.starts_with("sqlite:") {
        absolutize_sqlite_dsn(raw, base_dir, true)?
    } else {
        raw.to_string()
    };

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.max_connections(db_config.max_conns.unwrap_or(10))
        .acquire_timeout(Duration::from_millis(
            db_config.acquire_timeout_ms.unwrap_or(5000),
        ))
        .sqlx_logging(false);

    tracing::info!("Connecting to database: {}", dsn);
    Database::connect(opts)
        .await
        .with_context(|| format!("failed to connect to {dsn}"))
}

async fn init_module(config: &AppConfig) -> Result<ProfileModule> {
    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("No database configuration found"))?;
    let conn = connect(db_config, Path::new(&config.home_dir)).await?;
    let module_cfg = ProfileModule::config_from_value(config.module_config(MODULE_NAME))?;
    ProfileModule::init(module_cfg, conn).await
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    ProfileModule::config_from_value(config.module_config(MODULE_NAME))
        .and_then(|cfg| {
            profile_update::domain::fields::FieldRegistry::from_specs(cfg.fields)
                .map_err(Into::into)
        })
        .context("invalid profile_update configuration")?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
