use std::env;
use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};

use neurahive::api::{self, AppState};
use neurahive::auth::{AuthConfig, PasswordHasher, Role, RoleSet};
use neurahive::config::{self as app_config, APP_NAME, AppConfig};
use neurahive::db::Database;
use neurahive::user::{CreateUserRequest, UserInfo, UserRepository, UserService};

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:?}");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn async_serve(ctx: RuntimeContext, cmd: ServeCommand) -> Result<()> {
    handle_serve(&ctx, cmd).await
}

#[tokio::main]
async fn async_create_user(ctx: RuntimeContext, cmd: CreateUserCommand) -> Result<()> {
    handle_create_user(&ctx, cmd).await
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let ctx = RuntimeContext::new(cli.common.clone(), cli.command.creates_default_config())?;
    ctx.init_logging()?;
    debug!("resolved paths: {}", ctx.paths);

    match cli.command {
        Command::Serve(cmd) => async_serve(ctx, cmd),
        Command::Init(cmd) => handle_init(&ctx, cmd),
        Command::Config { command } => handle_config(&ctx, command),
        Command::CreateUser(cmd) => async_create_user(ctx, cmd),
        Command::GenerateSecret => handle_generate_secret(&ctx),
        Command::Completions { shell } => handle_completions(shell),
    }
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Neurahive - agent platform authentication and user service.",
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Args)]
struct CommonOpts {
    /// Override the config file path
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Reduce output to only errors
    #[arg(short, long, action = clap::ArgAction::SetTrue, global = true)]
    quiet: bool,
    /// Increase logging verbosity (stackable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Enable debug logging (equivalent to -vv)
    #[arg(long, global = true)]
    debug: bool,
    /// Enable trace logging (overrides other levels)
    #[arg(long, global = true)]
    trace: bool,
    /// Output machine readable JSON
    #[arg(long, global = true, conflicts_with = "yaml")]
    json: bool,
    /// Output machine readable YAML
    #[arg(long, global = true)]
    yaml: bool,
    /// Disable ANSI colors in output
    #[arg(long = "no-color", global = true, conflicts_with = "color")]
    no_color: bool,
    /// Control color output (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorOption::Auto, global = true)]
    color: ColorOption,
    /// Do not change anything on disk
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,
    /// Assume "yes" for interactive prompts
    #[arg(short = 'y', long = "yes", global = true)]
    assume_yes: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorOption {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP API server
    Serve(ServeCommand),
    /// Create config directories and default files
    Init(InitCommand),
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Create a user directly in the database
    CreateUser(CreateUserCommand),
    /// Print a new random token signing secret
    GenerateSecret,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Command {
    /// Whether a missing config file should be written before running.
    fn creates_default_config(&self) -> bool {
        !matches!(
            self,
            Command::Init(_)
                | Command::Config {
                    command: ConfigCommand::Path
                }
                | Command::GenerateSecret
                | Command::Completions { .. }
        )
    }
}

#[derive(Debug, Clone, Args)]
struct ServeCommand {
    /// Host address to bind to (overrides server.host)
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Debug, Clone, Args)]
struct InitCommand {
    /// Recreate configuration even if it already exists
    #[arg(long = "force")]
    force: bool,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Output the effective configuration
    Show,
    /// Print the resolved config file path
    Path,
}

#[derive(Debug, Clone, Args)]
struct CreateUserCommand {
    /// Email address (login name)
    #[arg(long)]
    email: String,
    /// Display name
    #[arg(long)]
    name: String,
    /// Password
    #[arg(long, env = "NEURAHIVE_PASSWORD", hide_env_values = true)]
    password: String,
    /// Role to grant: admin, curator, client or 1-3 (repeatable)
    #[arg(long = "role", value_name = "ROLE", required = true)]
    roles: Vec<Role>,
}

#[derive(Debug, Clone)]
struct RuntimeContext {
    common: CommonOpts,
    paths: AppPaths,
    config: AppConfig,
}

impl RuntimeContext {
    fn new(common: CommonOpts, create_missing: bool) -> Result<Self> {
        let paths = AppPaths::discover(common.config.clone())?;
        let config = load_or_init_config(&paths, &common, create_missing)?;
        Ok(Self {
            common,
            paths,
            config,
        })
    }

    fn init_logging(&self) -> Result<()> {
        use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

        if self.common.quiet {
            return Ok(());
        }

        let level = self.effective_log_level();
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{APP_NAME}={level},tower_http={level}"))
        });

        // Use JSON output if --json flag is set, otherwise pretty format
        if self.common.json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
                .try_init()
                .ok();
        } else {
            let force_color = matches!(self.common.color, ColorOption::Always)
                || env::var_os("FORCE_COLOR").is_some();
            let disable_color = self.common.no_color
                || matches!(self.common.color, ColorOption::Never)
                || env::var_os("NO_COLOR").is_some()
                || (!force_color && !io::stderr().is_terminal());

            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(io::stderr)
                        .with_ansi(!disable_color),
                )
                .try_init()
                .ok();
        }

        Ok(())
    }

    fn effective_log_level(&self) -> LevelFilter {
        if self.common.trace {
            LevelFilter::TRACE
        } else if self.common.debug {
            LevelFilter::DEBUG
        } else {
            match self.common.verbose {
                0 => self
                    .config
                    .logging
                    .level
                    .parse()
                    .unwrap_or(LevelFilter::INFO),
                1 => LevelFilter::DEBUG,
                _ => LevelFilter::TRACE,
            }
        }
    }

    fn database_path(&self) -> Result<PathBuf> {
        self.config.database_path(&self.paths.data_dir)
    }
}

#[derive(Debug, Clone)]
struct AppPaths {
    config_file: PathBuf,
    data_dir: PathBuf,
}

impl AppPaths {
    fn discover(override_path: Option<PathBuf>) -> Result<Self> {
        let config_file = match override_path {
            Some(path) => {
                let expanded = expand_path(path)?;
                if expanded.is_dir() {
                    expanded.join("config.toml")
                } else {
                    expanded
                }
            }
            None => default_config_dir()?.join("config.toml"),
        };

        if config_file.parent().is_none() {
            return Err(anyhow!("invalid config file path: {config_file:?}"));
        }

        Ok(Self {
            config_file,
            data_dir: default_data_dir()?,
        })
    }
}

impl fmt::Display for AppPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "config: {}, data: {}",
            self.config_file.display(),
            self.data_dir.display()
        )
    }
}

async fn handle_serve(ctx: &RuntimeContext, cmd: ServeCommand) -> Result<()> {
    info!("Starting {APP_NAME} server...");

    let db_path = ctx.database_path()?;
    info!("Database path: {}", db_path.display());
    let database = Database::new(&db_path).await?;

    let state = AppState::from_config(&ctx.config.auth, &database)?;
    info!(
        "Auth mode: {}",
        if state.auth.is_bypass() {
            "disabled (no_auth)"
        } else {
            "enforced"
        }
    );
    info!(
        "Access token lifetime: {} minutes",
        ctx.config.auth.access_token_ttl_minutes
    );

    let app = api::create_router(state);

    let host = cmd.host.unwrap_or_else(|| ctx.config.server.host.clone());
    let port = cmd.port.unwrap_or(ctx.config.server.port);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("invalid address")?;

    info!("Listening on http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .context("binding to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running server")?;

    database.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

fn handle_init(ctx: &RuntimeContext, cmd: InitCommand) -> Result<()> {
    if ctx.paths.config_file.exists() && !(cmd.force || ctx.common.assume_yes) {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            ctx.paths.config_file.display()
        ));
    }

    if ctx.common.dry_run {
        info!(
            "dry-run: would write default config to {}",
            ctx.paths.config_file.display()
        );
        return Ok(());
    }

    app_config::write_config(&ctx.paths.config_file, &AppConfig::initial())?;
    info!("Wrote config to {}", ctx.paths.config_file.display());
    Ok(())
}

fn handle_config(ctx: &RuntimeContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let mut shown = ctx.config.clone();
            if shown.auth.secret_key.is_some() {
                shown.auth.secret_key = Some("<redacted>".to_string());
            }

            let output = if ctx.common.json {
                serde_json::to_string_pretty(&shown).context("serializing config to JSON")?
            } else if ctx.common.yaml {
                serde_yaml::to_string(&shown).context("serializing config to YAML")?
            } else {
                shown.to_toml()?
            };
            println!("{output}");
            Ok(())
        }
        ConfigCommand::Path => {
            println!("{}", ctx.paths.config_file.display());
            Ok(())
        }
    }
}

async fn handle_create_user(ctx: &RuntimeContext, cmd: CreateUserCommand) -> Result<()> {
    let roles: RoleSet = cmd.roles.iter().copied().collect();
    let db_path = ctx.database_path()?;

    if ctx.common.dry_run {
        info!(
            "dry-run: would create user {} with roles {} in {}",
            cmd.email,
            roles,
            db_path.display()
        );
        return Ok(());
    }

    let database = Database::new(&db_path).await?;
    let repo = UserRepository::new(database.pool().clone());
    let users = UserService::new(
        repo,
        PasswordHasher::new(ctx.config.auth.password_hash_cost),
    );

    let user = users
        .create_user(CreateUserRequest {
            name: cmd.name,
            email: cmd.email,
            password: cmd.password,
            role: roles,
        })
        .await?;
    let info = UserInfo::from(user);

    if ctx.common.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&info).context("serializing user to JSON")?
        );
    } else {
        println!("Created user {} ({}) with roles {}", info.id, info.email, info.role);
    }

    database.close().await;
    Ok(())
}

fn handle_generate_secret(ctx: &RuntimeContext) -> Result<()> {
    let secret = AuthConfig::generate_secret_key();
    if ctx.common.json {
        println!("{}", serde_json::json!({ "secret_key": secret }));
    } else {
        println!("{secret}");
    }
    Ok(())
}

fn handle_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
    Ok(())
}

fn load_or_init_config(
    paths: &AppPaths,
    common: &CommonOpts,
    create_missing: bool,
) -> Result<AppConfig> {
    if create_missing && !paths.config_file.exists() {
        if common.dry_run {
            info!(
                "dry-run: would create default config at {}",
                paths.config_file.display()
            );
        } else {
            app_config::write_config(&paths.config_file, &AppConfig::initial())?;
        }
    }

    let config = AppConfig::load(&paths.config_file, &app_config::env_prefix())?;
    if config.auth.no_auth {
        warn!("auth.no_auth is set; authentication will be bypassed");
    }
    Ok(config)
}

fn expand_path(path: PathBuf) -> Result<PathBuf> {
    if let Some(text) = path.to_str() {
        app_config::expand_str_path(text)
    } else {
        Ok(path)
    }
}

fn default_config_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    if let Some(mut dir) = dirs::config_dir() {
        dir.push(APP_NAME);
        return Ok(dir);
    }

    dirs::home_dir()
        .map(|home| home.join(".config").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine configuration directory"))
}

fn default_data_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    if let Some(mut dir) = dirs::data_dir() {
        dir.push(APP_NAME);
        return Ok(dir);
    }

    dirs::home_dir()
        .map(|home| home.join(".local").join("share").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine data directory"))
}
