//! deskchat CLI: helpdesk chat widget for the terminal

use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use deskchat_engine::{
    ChatController, ChatMessage, ChatTransport, ChatView, ClientConfig, HttpTransport, Sender,
    Visibility, DEFAULT_CONFIG_PATH,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Helpdesk chat widget with a terminal UI
#[derive(Parser, Debug)]
#[command(name = "deskchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Helpdesk server URL (origin)
    #[arg(long, global = true, env = "DESKCHAT_SERVER_URL")]
    server: Option<String>,

    /// Session cookie to send, as `name=value`
    #[arg(
        long,
        global = true,
        env = "DESKCHAT_SESSION_COOKIE",
        hide_env_values = true
    )]
    cookie: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Commands {
    /// Open the chat widget (default when no command specified)
    Tui,

    /// Send one message and print the reply
    Send {
        /// Message text
        message: String,
    },

    /// Reset the conversation on the server
    Reset,

    /// Write a default config file
    Init,

    /// Print the effective configuration as JSON
    Config,
}

const LOG_FILE: &str = "deskchat.log";

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let command = cli.command.clone().unwrap_or(Commands::Tui);

    init_logging(
        cli.verbose,
        (command == Commands::Tui).then_some(&config_path),
    )?;

    let config = resolve_config(&cli, &config_path)?;
    debug!(?config_path, server = %config.server_url, "resolved config");

    match command {
        Commands::Tui => {
            let transport: Arc<dyn ChatTransport> = Arc::new(HttpTransport::new(&config)?);
            tokio::runtime::Runtime::new()?.block_on(deskchat_tui::run_tui(&config, transport))
        }
        Commands::Send { message } => cmd_send(&config, message),
        Commands::Reset => cmd_reset(&config),
        Commands::Init => cmd_init(&config_path),
        Commands::Config => cmd_config(&config),
    }
}

/// Install the tracing subscriber.
///
/// With a config path, logs go to a file next to it so they do not draw over
/// the TUI; otherwise they go to stderr.
fn init_logging(verbose: bool, log_beside: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "deskchat={level},deskchat_engine={level},deskchat_tui={level}"
        ))
    });

    match log_beside {
        Some(config_path) => {
            let dir = config_path.parent().unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)?;
            let file = File::options()
                .create(true)
                .append(true)
                .open(dir.join(LOG_FILE))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Config file (or defaults), then flags and environment on top.
fn resolve_config(cli: &Cli, path: &Path) -> Result<ClientConfig, Box<dyn Error>> {
    let mut config = ClientConfig::load_or_default(path)?;

    if let Some(server) = &cli.server {
        config.server_url.clone_from(server);
    }
    if let Some(cookie) = &cli.cookie {
        config.session_cookie = Some(cookie.clone());
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_seconds = Some(timeout);
    }

    config.validate()?;
    Ok(config)
}

/// View for one-shot commands: the input is fixed and bot lines go to stdout.
#[derive(Debug)]
struct StdoutView {
    input: String,
    visibility: Visibility,
}

impl StdoutView {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
            visibility: Visibility::Visible,
        }
    }
}

impl ChatView for StdoutView {
    fn input(&self) -> &str {
        &self.input
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn focus_input(&mut self) {}

    fn append(&mut self, message: ChatMessage) {
        if message.sender == Sender::Bot {
            println!("{}", message.text);
        }
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    fn set_toggle_label(&mut self, _label: &str) {}
}

fn cmd_send(config: &ClientConfig, message: String) -> Result<(), Box<dyn Error>> {
    let failed = tokio::runtime::Runtime::new()?.block_on(send_once(config, &message))?;
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Send one message and print the reply. Returns whether the request failed;
/// blank input sends nothing and is not a failure.
async fn send_once(config: &ClientConfig, message: &str) -> Result<bool, Box<dyn Error>> {
    let transport = Arc::new(HttpTransport::new(config)?);
    let mut controller = ChatController::new(StdoutView::new(message), transport, config);

    let Some(pending) = controller.begin_send() else {
        info!("blank message, nothing sent");
        return Ok(false);
    };

    let outcome = pending.resolve().await;
    let failed = outcome.is_failure();
    controller.complete(outcome);
    Ok(failed)
}

fn cmd_reset(config: &ClientConfig) -> Result<(), Box<dyn Error>> {
    let failed = tokio::runtime::Runtime::new()?.block_on(reset_once(config))?;
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Reset the conversation and print the confirmation. Returns whether the
/// request failed.
async fn reset_once(config: &ClientConfig) -> Result<bool, Box<dyn Error>> {
    let transport = Arc::new(HttpTransport::new(config)?);
    let mut controller = ChatController::new(StdoutView::new(""), transport, config);

    let outcome = controller.begin_reset().resolve().await;
    let failed = outcome.is_failure();
    controller.complete(outcome);
    Ok(failed)
}

/// Write a default config. Flags and environment are not persisted, so a
/// session cookie never lands on disk.
fn cmd_init(path: &Path) -> Result<(), Box<dyn Error>> {
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    ClientConfig::default().save(path)?;
    println!("Created {}", path.display());
    Ok(())
}

fn cmd_config(config: &ClientConfig) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(&redacted(config))?);
    Ok(())
}

/// Copy of the config that is safe to print.
fn redacted(config: &ClientConfig) -> ClientConfig {
    ClientConfig {
        session_cookie: config.session_cookie.as_ref().map(|_| "<redacted>".into()),
        ..config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn json_reply(status: u16, body: &str) -> ResponseTemplate {
        ResponseTemplate::new(status).set_body_raw(body, "application/json")
    }

    fn server_config(mock_server: &MockServer) -> ClientConfig {
        ClientConfig {
            server_url: mock_server.uri(),
            ..Default::default()
        }
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("deskchat").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_tui() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_send_with_global_flags() {
        let cli = parse(&[
            "send",
            "printer broken",
            "--server",
            "https://help.example",
            "-v",
        ]);
        assert_eq!(
            cli.command,
            Some(Commands::Send {
                message: "printer broken".into()
            })
        );
        assert_eq!(cli.server.as_deref(), Some("https://help.example"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_send_requires_message() {
        assert!(Cli::try_parse_from(["deskchat", "send"]).is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&[
            "--server",
            "https://help.example",
            "--cookie",
            "session=abc",
            "--timeout",
            "5",
            "config",
        ]);
        let config = resolve_config(&cli, Path::new("/nonexistent/deskchat/config.json")).unwrap();
        assert_eq!(config.server_url, "https://help.example");
        assert_eq!(config.session_cookie.as_deref(), Some("session=abc"));
        assert_eq!(config.timeout_seconds, Some(5));
        assert_eq!(config.chat_path, "/chat");
    }

    #[test]
    fn test_invalid_server_rejected() {
        let cli = parse(&["--server", "ftp://help.example", "config"]);
        assert!(resolve_config(&cli, Path::new("/nonexistent/deskchat/config.json")).is_err());
    }

    #[test]
    fn test_redacted_hides_cookie() {
        let config = ClientConfig {
            session_cookie: Some("session=abc".into()),
            ..Default::default()
        };
        let printed = serde_json::to_string(&redacted(&config)).unwrap();
        assert!(!printed.contains("abc"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_stdout_view_clears_input() {
        let mut view = StdoutView::new("hello");
        assert_eq!(view.input(), "hello");
        view.clear_input();
        assert_eq!(view.input(), "");
    }

    #[test]
    fn test_init_writes_defaults_without_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deskchat").join("config.json");
        let cli = parse(&[
            "--server",
            "https://help.example",
            "--cookie",
            "session=abc",
            "--timeout",
            "5",
            "init",
        ]);
        let resolved = resolve_config(&cli, &path).unwrap();
        assert_eq!(resolved.session_cookie.as_deref(), Some("session=abc"));

        cmd_init(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("session=abc"));
        assert_eq!(ClientConfig::load(&path).unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"server_url":"https://help.example"}"#).unwrap();

        cmd_init(&path).unwrap();

        let saved = ClientConfig::load(&path).unwrap();
        assert_eq!(saved.server_url, "https://help.example");
    }

    #[tokio::test]
    async fn test_send_with_reply_succeeds() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(json_reply(200, r#"{"reply":"hi there"}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let failed = send_once(&server_config(&mock_server), "hello")
            .await
            .unwrap();
        assert!(!failed);
    }

    #[tokio::test]
    async fn test_send_failures_are_reported() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(json_reply(500, "{}"))
            .mount(&mock_server)
            .await;

        let failed = send_once(&server_config(&mock_server), "hello")
            .await
            .unwrap();
        assert!(failed);
    }

    #[tokio::test]
    async fn test_send_to_login_page_is_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("<html>Login</html>", "text/html"),
            )
            .mount(&mock_server)
            .await;

        let failed = send_once(&server_config(&mock_server), "hello")
            .await
            .unwrap();
        assert!(failed);
    }

    #[tokio::test]
    async fn test_blank_send_makes_no_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(json_reply(200, r#"{"reply":"unexpected"}"#))
            .expect(0)
            .mount(&mock_server)
            .await;

        let failed = send_once(&server_config(&mock_server), "   ")
            .await
            .unwrap();
        assert!(!failed);
    }

    #[tokio::test]
    async fn test_reset_outcomes() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/reset"))
            .respond_with(json_reply(200, r#"{"status":"ok"}"#))
            .expect(1)
            .mount(&mock_server)
            .await;
        assert!(!reset_once(&server_config(&mock_server)).await.unwrap());

        let denied = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/reset"))
            .respond_with(json_reply(401, r#"{"status":"error"}"#))
            .mount(&denied)
            .await;
        assert!(reset_once(&server_config(&denied)).await.unwrap());
    }
}
