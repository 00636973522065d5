//! Hiroba chat server.
//!
//! Authenticated clients connect over WebSocket, receive the recent history and
//! exchange messages and typing signals with everyone else in the room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 4000
//! cargo run --bin hiroba-server -- issue-token --user-id u1 --name alice
//! ```

use clap::{Parser, Subcommand};
use hiroba_server::{
    app::App,
    config::ServerConfig,
    domain::{DisplayName, Identity, UserId},
};
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-server", version)]
#[command(about = "Authenticated real-time group chat server", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ServerConfig,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the chat server (default)
    Serve,
    /// Issue a signed token for a user and print it to stdout
    IssueToken {
        /// User ID stored in the token
        #[arg(long)]
        user_id: String,

        /// Display name shown as the author of messages
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() {
    // .env は環境変数より優先しない
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cli.config).await,
        Command::IssueToken { user_id, name } => issue_token(&cli.config, user_id, name),
    }
}

async fn serve(config: ServerConfig) {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET is not set, using the development default secret");
    }

    let app = App::build(&config);
    if let Err(e) = app.server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

fn issue_token(config: &ServerConfig, user_id: String, name: String) {
    if config.uses_default_secret() {
        eprintln!("warning: JWT_SECRET is not set, using the development default secret");
    }

    let identity = match (UserId::new(user_id), DisplayName::new(name)) {
        (Ok(user_id), Ok(display_name)) => Identity::new(user_id, display_name),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    let app = App::build(config);
    match app.auth.issue(&identity) {
        Ok(token) => println!("{}", token.as_str()),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
