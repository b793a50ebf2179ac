use clap::{Parser, Subcommand};

/// Discord relay for a Shapes.inc character.
#[derive(Parser, Debug)]
#[command(name = "shapebot", version)]
#[command(about = "Relay Discord messages to a Shapes.inc character")]
pub struct Cli {
    /// Path to a TOML config file (default: ./shapebot.toml when present)
    #[arg(long, env = "SHAPEBOT_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start the bot and the health server (default)
    Run,

    /// Ping a deployed instance's /health endpoint
    Ping {
        /// Service base URL (defaults to RENDER_EXTERNAL_URL)
        url: Option<String>,

        /// Keep pinging on the keep-alive interval until interrupted
        #[arg(long)]
        watch: bool,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}
