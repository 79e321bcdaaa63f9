use std::path::Path;

use apisync::{CollectionGenerator, Config, Freshness};
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, Default, clap::Parser)]
pub struct Command {
    /// Check that the committed collection is up to date without writing it
    /// (exits with code 2 if it is stale or missing)
    #[arg(long)]
    check: bool,

    /// Suppress output
    #[arg(long, short)]
    quiet: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config = Config::load_or_default(root).map_err(anyhow::Error::msg)?;
        let input = root.join(&config.collection.input);
        let output = root.join(&config.collection.output);
        let generator = CollectionGenerator::new(&config.collection);

        if self.check {
            let freshness = generator.check(&input, &output)?;
            self.report_freshness(freshness, &output);
            if freshness != Freshness::UpToDate {
                std::process::exit(2);
            }
            return Ok(());
        }

        let generated = generator.generate(&input, &output)?;

        if !self.quiet {
            println!("{}", "✅ Postman collection generated successfully!".success());
            println!("   Output: {}", output.display());

            if !generated.warnings.is_empty() {
                println!();
                println!("{}", "⚠️  Warnings:".warning());
                for warning in &generated.warnings {
                    println!("   - {warning}");
                }
            }
        }
        Ok(())
    }

    fn report_freshness(&self, freshness: Freshness, output: &Path) {
        if self.quiet {
            return;
        }
        match freshness {
            Freshness::UpToDate => {
                println!("{}", "✅ Postman collection is up to date.".success());
            }
            Freshness::Stale => {
                println!(
                    "{}",
                    format!("⚠️  {} is out of date", output.display()).warning()
                );
                println!("   Run 'apisync collection' to regenerate it.");
            }
            Freshness::Missing => {
                println!(
                    "{}",
                    format!("⚠️  {} has not been generated", output.display()).warning()
                );
                println!("   Run 'apisync collection' to generate it.");
            }
        }
    }
}
