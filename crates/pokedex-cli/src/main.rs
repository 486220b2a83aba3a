// pokedex-cli/src/main.rs
// ============================================================================
// Module: Pokedex CLI Entry Point
// Description: Command dispatcher for the Pokedex server and client commands.
// Purpose: Serve the search log API and browse Pokémon from the terminal.
// Dependencies: clap, pokedex-config, pokedex-server, reqwest, tokio
// ============================================================================

//! ## Overview
//! `pokedex serve` runs the HTTP API. The client commands (`login`,
//! `search`, `roster`, `history`) call that API and `PokeAPI` using the
//! `[client]` config section. `search` logs its term in the background and
//! never lets a logging failure change the lookup result or exit code. All
//! user-facing strings are routed through the message catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use pokedex_cli::BackendClient;
use pokedex_cli::BackendClientConfig;
use pokedex_cli::BackendClientError;
use pokedex_cli::LoginOutcome;
use pokedex_cli::PokeApiClient;
use pokedex_cli::PokeApiConfig;
use pokedex_cli::PokeApiError;
use pokedex_cli::render::render_card;
use pokedex_cli::render::render_cards;
use pokedex_cli::render::render_history;
use pokedex_cli::t;
use pokedex_config::PokedexConfig;
use pokedex_config::config_toml_example;
use pokedex_config::validate_roster_limit;
use pokedex_core::RecordId;
use pokedex_server::ApiServer;
use thiserror::Error;
use tokio::task::JoinHandle;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "pokedex", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Config file path (defaults to `POKEDEX_CONFIG` or `pokedex.toml`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Pokedex HTTP API.
    Serve,
    /// Check credentials against the backend.
    Login(LoginCommand),
    /// Look up one Pokémon by name and log the search.
    Search(SearchCommand),
    /// List the Pokémon roster as cards.
    Roster(RosterCommand),
    /// Show the most recent searches.
    History,
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `login`.
#[derive(Args, Debug)]
struct LoginCommand {
    /// Username to submit.
    #[arg(long)]
    username: String,
    /// Password to submit.
    #[arg(long)]
    password: String,
}

/// Arguments for `search`.
#[derive(Args, Debug)]
struct SearchCommand {
    /// Pokémon name (trimmed and lowercased).
    name: String,
}

/// Arguments for `roster`.
#[derive(Args, Debug)]
struct RosterCommand {
    /// Number of Pokémon to list (defaults to `client.roster_limit`).
    #[arg(long)]
    limit: Option<u32>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a Pokedex configuration file.
    Validate,
    /// Print a complete example configuration.
    Example,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config_path = cli.config.as_deref();
    match command {
        Commands::Serve => command_serve(config_path).await,
        Commands::Login(command) => command_login(config_path, &command).await,
        Commands::Search(command) => command_search(config_path, &command).await,
        Commands::Roster(command) => command_roster(config_path, &command).await,
        Commands::History => command_history(config_path).await,
        Commands::Config {
            command,
        } => command_config(config_path, &command),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let help = Cli::command().render_help().to_string();
    write_stdout_line(help.trim_end()).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Loads configuration from `path`, the environment, or defaults.
fn load_config(path: Option<&Path>) -> CliResult<PokedexConfig> {
    PokedexConfig::load(path).map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let server = tokio::task::spawn_blocking(move || ApiServer::from_config(config))
        .await
        .map_err(|err| {
            CliError::new(t!("serve.init_failed", error = format!("init join failed: {err}")))
        })?
        .map_err(|err| CliError::new(t!("serve.init_failed", error = err)))?;
    write_stderr_line(&t!("serve.listening", bind = server.bind_addr()))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    server
        .serve_with_shutdown(shutdown_signal())
        .await
        .map_err(|err| CliError::new(t!("serve.failed", error = err)))?;
    write_stderr_line(&t!("serve.stopped"))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Resolves on Ctrl-C; never resolves when the signal cannot be installed.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

// ============================================================================
// SECTION: Client Commands
// ============================================================================

/// Builds the backend client from the `[client]` section.
fn backend_client(config: &PokedexConfig) -> CliResult<BackendClient> {
    BackendClient::new(BackendClientConfig {
        base_url: config.client.backend_url.clone(),
        timeout: Duration::from_millis(config.client.timeout_ms),
        max_response_bytes: config.client.max_response_bytes,
    })
    .map_err(|err| CliError::new(t!("client.init_failed", error = err)))
}

/// Builds the `PokeAPI` client from the `[client]` section.
fn pokeapi_client(config: &PokedexConfig) -> CliResult<PokeApiClient> {
    PokeApiClient::new(PokeApiConfig {
        base_url: config.client.pokeapi_url.clone(),
        timeout: Duration::from_millis(config.client.timeout_ms),
        max_response_bytes: config.client.max_response_bytes,
        concurrency: config.client.concurrency,
    })
    .map_err(|err| CliError::new(t!("client.init_failed", error = err)))
}

/// Executes the `login` command.
async fn command_login(config_path: Option<&Path>, command: &LoginCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let client = backend_client(&config)?;
    let outcome = client
        .login(&command.username, &command.password)
        .await
        .map_err(|err| CliError::new(t!("login.failed", error = err)))?;
    match outcome {
        LoginOutcome::Accepted(message) => {
            write_stdout_line(&message).map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
        LoginOutcome::Rejected(message) => Err(CliError::new(t!("login.rejected", message = message))),
    }
}

/// Normalizes a search name the way the lookup expects it.
fn normalize_search_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Executes the `search` command.
async fn command_search(
    config_path: Option<&Path>,
    command: &SearchCommand,
) -> CliResult<ExitCode> {
    let name = normalize_search_name(&command.name);
    if name.is_empty() {
        return Err(CliError::new(t!("search.empty")));
    }
    let config = load_config(config_path)?;
    let backend = backend_client(&config)?;
    let pokeapi = pokeapi_client(&config)?;

    let log_term = name.clone();
    let log_task = tokio::spawn(async move { backend.log_search(&log_term).await });
    let outcome = match pokeapi.lookup(&name).await {
        Ok(pokemon) => write_stdout_line(&render_card(&pokemon))
            .map_err(|err| CliError::new(output_error("stdout", &err))),
        Err(err) => Err(lookup_error(err)),
    };
    let log_wait = Duration::from_millis(config.client.timeout_ms);
    if let Some(warning) = await_search_log(log_task, log_wait).await {
        let _ = write_stderr_line(&warning);
    }
    outcome.map(|()| ExitCode::SUCCESS)
}

/// Maps a lookup failure onto its catalog message.
fn lookup_error(error: PokeApiError) -> CliError {
    let message = match error {
        PokeApiError::NotFound(name) => t!("search.not_found", name = name),
        PokeApiError::Status(status) => t!("search.api_error", status = status),
        other => t!("search.failed", error = other),
    };
    CliError::new(message)
}

/// Waits up to `wait` for the background log call; returns a warning on failure.
async fn await_search_log(
    task: JoinHandle<Result<RecordId, BackendClientError>>,
    wait: Duration,
) -> Option<String> {
    match tokio::time::timeout(wait, task).await {
        Ok(Ok(Ok(_))) => None,
        Ok(Ok(Err(err))) => Some(t!("search.log_failed", error = err)),
        Ok(Err(err)) => Some(t!("search.log_failed", error = err)),
        Err(_) => Some(t!("search.log_timeout", ms = wait.as_millis())),
    }
}

/// Executes the `roster` command.
async fn command_roster(
    config_path: Option<&Path>,
    command: &RosterCommand,
) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let limit = command.limit.unwrap_or(config.client.roster_limit);
    validate_roster_limit(limit)
        .map_err(|err| CliError::new(t!("roster.limit_invalid", error = err)))?;
    let client = pokeapi_client(&config)?;
    let roster = client
        .roster(limit)
        .await
        .map_err(|err| CliError::new(t!("roster.failed", error = err)))?;
    if roster.skipped > 0 {
        write_stderr_line(&t!("roster.skipped", count = roster.skipped))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    let output =
        if roster.pokemon.is_empty() { t!("roster.empty") } else { render_cards(&roster.pokemon) };
    write_stdout_line(&output).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `history` command.
async fn command_history(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let client = backend_client(&config)?;
    let entries = client
        .history()
        .await
        .map_err(|err| CliError::new(t!("history.failed", error = err)))?;
    write_stdout_line(&render_history(&entries))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(config_path: Option<&Path>, command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => {
            let _config = load_config(config_path)?;
            write_stdout_line(&t!("config.validate.ok"))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        ConfigCommand::Example => {
            write_stdout_line(config_toml_example().trim_end())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
