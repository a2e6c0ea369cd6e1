//! employee-db CLI - numbered modes, interactive menu and the HTTP API server

use anyhow::Context;
use clap::{Parser, Subcommand};
use employee_db::backend::{EmployeeBackend, LocalBackend};
use employee_db::cli::{Command, Menu};
use employee_db::config::{self, AppConfig};
use employee_db::client::DEFAULT_SERVER_URL;
use employee_db::{logging, ui, ApiClient, EmployeeManager};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "employee-db")]
#[command(version)]
#[command(about = "Employee records over SQLite: CLI, interactive menu and HTTP API")]
#[command(long_about = r#"
Manage employee records stored in SQLite, locally or through the HTTP API.

Modes:
  0 (or none)  interactive menu
  1            create/check the employees table
  2            add an employee: "<full name>" <YYYY-MM-DD> <gender>
  3            list employees with their age
  4            generate test data: [count] [special]
  5            male employees whose name starts with 'F' (timed)
  6            create indexes and compare the query time
  7            search: <gender> [name_start]

Example usage:
  employee-db 2 "Ivanov Petr Sergeevich" 2009-07-12 Male
  employee-db 4 100000 50
  employee-db serve --port 8000
  employee-db --remote 5                          (server at http://127.0.0.1:8000)
  employee-db --remote=http://10.0.0.5:8000 5
"#)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the SQLite database file
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Run modes against an employee-db server instead of a local file
    #[arg(
        short,
        long,
        value_name = "URL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = DEFAULT_SERVER_URL
    )]
    remote: Option<String>,

    /// Config file (defaults to ./employee-db.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Mode number (0-7)
    mode: Option<u8>,

    /// Arguments for the mode
    args: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Address to bind (overrides the configured bind address)
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::debug!(error = ?e, "command failed");
        ui::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database = database;
    }
    if let Some(remote) = cli.remote {
        config.remote = Some(remote);
    }

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            logging::init(config.log_level.as_deref(), "info", cli.verbose, config.log_format);
            let mut addr: SocketAddr = config
                .bind
                .parse()
                .with_context(|| format!("invalid bind address {:?} (expected IP:PORT)", config.bind))?;
            if let Some(host) = host {
                addr.set_ip(host);
            }
            if let Some(port) = port {
                addr.set_port(port);
            }
            serve(addr, config.database)
        }
        None => {
            logging::init(config.log_level.as_deref(), "warn", cli.verbose, config.log_format);
            run_mode(&config, cli.mode.unwrap_or(0), &cli.args)
        }
    }
}

fn serve(addr: SocketAddr, database: PathBuf) -> anyhow::Result<()> {
    config::ensure_db_dir(&database)?;
    ui::header(&format!("Serving the employee API on http://{}", addr));
    ui::info("Database", &database.display().to_string());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(employee_db::server::start_server(addr, database))
}

fn open_backend(config: &AppConfig) -> anyhow::Result<Box<dyn EmployeeBackend>> {
    match &config.remote {
        Some(url) => {
            tracing::debug!(url = %url, "using remote backend");
            Ok(Box::new(ApiClient::new(url.as_str())?))
        }
        None => {
            config::ensure_db_dir(&config.database)?;
            let manager = EmployeeManager::open(&config.database)
                .with_context(|| format!("failed to open {}", config.database.display()))?;
            Ok(Box::new(LocalBackend::new(manager, config.database.display().to_string())))
        }
    }
}

fn run_mode(config: &AppConfig, mode: u8, args: &[String]) -> anyhow::Result<()> {
    // validate arguments before touching the database or the network
    let command = match mode {
        0 if !args.is_empty() => anyhow::bail!("the interactive menu takes no arguments"),
        0 => None,
        mode => Some(Command::parse(mode, args)?),
    };
    let mut backend = open_backend(config)?;

    match command {
        Some(command) => command.run(backend.as_mut())?,
        None => {
            let stdin = std::io::stdin();
            Menu::new(backend.as_mut(), stdin.lock()).run()?;
        }
    }
    Ok(())
}
