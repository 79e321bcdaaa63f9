use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the configuration file at the project root.
pub const FILE_NAME: &str = "apisync.toml";

/// Project configuration.
///
/// Every setting has a default, so a project without a configuration file
/// behaves exactly like one with an empty file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Collection Generator settings.
    pub collection: CollectionConfig,

    /// Docs Postprocessor settings.
    pub docs: DocsConfig,
}

/// Settings for generating the request collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// The bundled API description, relative to the project root.
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// The generated collection, relative to the project root.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Display name written into the collection metadata.
    #[serde(default = "default_name")]
    pub name: String,

    /// Description written into the collection metadata.
    ///
    /// Marks the artifact as generated so nobody edits it by hand.
    #[serde(default = "default_description")]
    pub description: String,

    /// Indentation of the serialized collection.
    #[serde(default = "default_indent")]
    pub indent: String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            name: default_name(),
            description: default_description(),
            indent: default_indent(),
        }
    }
}

/// Settings for postprocessing rendered documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsConfig {
    /// ES module URL of the diagram renderer.
    #[serde(default = "default_mermaid_url")]
    pub mermaid_url: String,

    /// Named visual theme passed to the renderer.
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            mermaid_url: default_mermaid_url(),
            theme: default_theme(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads `apisync.toml` from the project root, falling back to the
    /// defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(root: &Path) -> Result<Self, String> {
        let path = root.join(FILE_NAME);
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            Self::load(&path)
        } else {
            tracing::debug!("No {FILE_NAME} in {}, using defaults", root.display());
            Ok(Self::default())
        }
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }
}

fn default_input() -> PathBuf {
    PathBuf::from("dist/openapi.yaml")
}

fn default_output() -> PathBuf {
    PathBuf::from("postman/collections/openapi-generated.postman_collection.json")
}

fn default_name() -> String {
    "API (Auto-generated)".to_string()
}

fn default_description() -> String {
    "Automatically generated from OpenAPI specification. Do not edit manually.".to_string()
}

fn default_indent() -> String {
    "  ".to_string()
}

fn default_mermaid_url() -> String {
    "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.esm.min.mjs".to_string()
}

fn default_theme() -> String {
    "default".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        collection: CollectionConfig,

        #[serde(default)]
        docs: DocsConfig,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 { collection, docs } => Self { collection, docs },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        let Config { collection, docs } = config;
        Self::V1 { collection, docs }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\n\n[collection]\ninput = \"build/api.yaml\"\nname = \"Bank API (Auto-generated)\"\n\n[docs]\ntheme = \"forest\"\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.collection.input, PathBuf::from("build/api.yaml"));
        assert_eq!(config.collection.name, "Bank API (Auto-generated)");
        assert_eq!(config.collection.output, default_output());
        assert_eq!(config.collection.indent, "  ");
        assert_eq!(config.docs.theme, "forest");
        assert_eq!(config.docs.mermaid_url, default_mermaid_url());
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\n[collection]\nname = 3\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn load_or_default_without_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(tmp.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(FILE_NAME);
        let mut config = Config::default();
        config.docs.theme = "dark".to_string();

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
