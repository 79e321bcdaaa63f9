use std::path::{Path, PathBuf};

use apisync::{Config, MermaidConfig, docs::ScriptStatus};
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The HTML file to postprocess in place
    // optional: a missing path is a usage error with exit status 1
    #[arg(value_name = "HTML_FILE")]
    html_file: Option<PathBuf>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let Some(html_file) = self.html_file else {
            anyhow::bail!("Usage: apisync inject-mermaid <HTML_FILE>");
        };
        let path = root.join(html_file);

        let config = Config::load_or_default(root).map_err(anyhow::Error::msg)?;
        let report = apisync::docs::postprocess(&path, &MermaidConfig::from(&config.docs))?;

        if report.script == ScriptStatus::MissingBody {
            println!(
                "{}",
                format!(
                    "⚠️  No </body> tag in {}; the Mermaid script was not added",
                    path.display()
                )
                .warning()
            );
        }
        println!("Mermaid injection complete: {}", path.display());
        Ok(())
    }
}
