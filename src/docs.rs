//! The Docs Postprocessor.
//!
//! Rendered documentation emits Mermaid diagrams as fenced code blocks. This
//! module turns them into `<div class="mermaid">` containers and makes sure the
//! page loads the renderer.

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::{Captures, Regex};
use tracing::instrument;

use crate::{
    artifact::{self, ReadError, WriteError},
    domain::DocsConfig,
};

/// A fenced diagram (group 1 is its escaped source) or an already converted
/// container, which is matched so that its decoded source is skipped.
static FENCED_DIAGRAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<div class="mermaid">.*?</div>|<pre><code class="language-mermaid">(.*?)</code></pre>"#,
    )
    .expect("fenced diagram pattern is valid")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(amp|lt|gt|quot|#39);").expect("entity pattern is valid")
});

/// Marks the injected script so that later runs can find it.
const SCRIPT_MARKER: &str = "data-mermaid-init";

/// How the renderer is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MermaidConfig {
    /// ES module URL of the renderer.
    pub script_url: String,
    /// Theme passed to `mermaid.initialize`.
    pub theme: String,
}

impl Default for MermaidConfig {
    fn default() -> Self {
        Self::from(&DocsConfig::default())
    }
}

impl From<&DocsConfig> for MermaidConfig {
    fn from(config: &DocsConfig) -> Self {
        Self {
            script_url: config.mermaid_url.clone(),
            theme: config.theme.clone(),
        }
    }
}

impl MermaidConfig {
    fn script(&self) -> String {
        format!(
            "<script type=\"module\" {SCRIPT_MARKER}>\n  import mermaid from '{}';\n  mermaid.initialize({{ startOnLoad: true, theme: '{}' }});\n</script>\n",
            self.script_url, self.theme
        )
    }
}

/// What happened to the renderer script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStatus {
    /// The script was added before `</body>`.
    Inserted,
    /// The page already carries the injected script.
    AlreadyPresent,
    /// The page has no `</body>`; nothing was inserted.
    MissingBody,
}

/// The result of rewriting a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    /// The rewritten page.
    pub html: String,
    /// Number of fenced blocks converted.
    pub diagrams: usize,
    /// Outcome for the renderer script.
    pub script: ScriptStatus,
}

/// Rewrites fenced Mermaid blocks in `html` and ensures the renderer script is
/// loaded.
#[must_use]
pub fn inject(html: &str, config: &MermaidConfig) -> Injection {
    let mut diagrams = 0;
    let converted = FENCED_DIAGRAM.replace_all(html, |captures: &Captures| {
        let Some(source) = captures.get(1) else {
            return captures[0].to_string();
        };
        diagrams += 1;
        format!(
            r#"<div class="mermaid">{}</div>"#,
            decode_entities(source.as_str())
        )
    });
    let mut html = converted.into_owned();

    let script = if has_script(&html) {
        ScriptStatus::AlreadyPresent
    } else if let Some(index) = closing_body(&html) {
        html.insert_str(index, &config.script());
        ScriptStatus::Inserted
    } else {
        ScriptStatus::MissingBody
    };

    Injection {
        html,
        diagrams,
        script,
    }
}

fn decode_entities(text: &str) -> Cow<'_, str> {
    ENTITY.replace_all(text, |captures: &Captures| match &captures[1] {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        _ => "'",
    })
}

fn has_script(html: &str) -> bool {
    html.contains(SCRIPT_MARKER)
}

/// Byte offset of the last `</body>`, ignoring case.
fn closing_body(html: &str) -> Option<usize> {
    html.to_ascii_lowercase().rfind("</body>")
}

/// Summary of a postprocessed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The file that was processed.
    pub path: PathBuf,
    /// Number of fenced blocks converted.
    pub diagrams: usize,
    /// Outcome for the renderer script.
    pub script: ScriptStatus,
    /// Whether the file was rewritten.
    pub changed: bool,
}

/// Errors raised by the Docs Postprocessor.
#[derive(Debug, thiserror::Error)]
pub enum PostprocessError {
    /// The page does not exist or cannot be read.
    #[error("input artifact missing: {}", .0.display())]
    InputMissing(PathBuf, #[source] ReadError),

    /// The rewritten page could not be saved.
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Postprocesses the HTML file at `path` in place.
///
/// The file is only rewritten when its contents change.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
#[instrument(level = "debug", skip(config))]
pub fn postprocess(path: &Path, config: &MermaidConfig) -> Result<Report, PostprocessError> {
    let html = artifact::read(path)
        .map_err(|error| PostprocessError::InputMissing(path.to_path_buf(), error))?;

    let injection = inject(&html, config);
    let changed = injection.html != html;
    if changed {
        artifact::write_atomic(path, &injection.html)?;
    }

    tracing::info!(
        "Converted {} diagram(s) in {}",
        injection.diagrams,
        path.display()
    );
    if injection.script == ScriptStatus::MissingBody {
        tracing::debug!("{} has no </body> tag", path.display());
    }

    Ok(Report {
        path: path.to_path_buf(),
        diagrams: injection.diagrams,
        script: injection.script,
        changed,
    })
}
