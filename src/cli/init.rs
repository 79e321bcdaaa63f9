use std::path::Path;

use apisync::{Config, domain::CONFIG_FILE_NAME};
use tracing::instrument;

#[instrument]
pub fn run(root: &Path) -> anyhow::Result<()> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        anyhow::bail!("Project already initialized (found existing {CONFIG_FILE_NAME})");
    }

    let config = Config::default();
    config
        .save(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to create {CONFIG_FILE_NAME}: {e}"))?;

    println!("Initialized apisync in {}", root.display());
    println!("  Created: {CONFIG_FILE_NAME}");
    println!();
    println!("Next steps:");
    println!(
        "  apisync collection    # Generate {}",
        config.collection.output.display()
    );
    println!("  apisync inject-mermaid <HTML_FILE>");

    Ok(())
}
