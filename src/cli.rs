use std::path::PathBuf;

mod collection;
mod docs;
mod init;
mod terminal;

use clap::ArgAction;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the project root
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command.run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Generate the Postman collection from the bundled OpenAPI description
    Collection(collection::Command),

    /// Render Mermaid diagrams in a generated HTML page
    ///
    /// Converts fenced `language-mermaid` code blocks into diagram containers
    /// and loads the Mermaid renderer. Safe to run repeatedly.
    #[command(alias = "mermaid")]
    InjectMermaid(docs::Command),

    /// Write a default apisync.toml to the project root
    Init,
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Collection(command) => command.run(&root)?,
            Self::InjectMermaid(command) => command.run(&root)?,
            Self::Init => init::run(&root)?,
        }
        Ok(())
    }
}
