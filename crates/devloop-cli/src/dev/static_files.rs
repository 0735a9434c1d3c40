//! Static file responder with SPA fallback.
//!
//! Resolves request paths against the site directory, infers a content type
//! from the extension, and patches every markup response with the embedded
//! reload client. Anything that does not name a file under the root gets the
//! entry page instead of a 404.

use crate::config::DevloopConfig;
use crate::error::{CliError, Result};
use rust_embed::RustEmbed;
use std::path::{Component, Path, PathBuf};

#[derive(RustEmbed)]
#[folder = "assets/dev"]
struct DevAssets;

const RELOAD_CLIENT: &str = "reload-client.js";

/// Marker that prevents double injection.
const SNIPPET_MARKER: &str = "<!-- devloop:reload -->";

/// A resolved static response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticResponse {
    pub body: Vec<u8>,
    pub content_type: &'static str,
    /// `false` when the entry page was served in place of the request
    pub matched: bool,
}

/// Serves files from the site directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    entry: PathBuf,
}

impl StaticFiles {
    /// `entry` is relative to `root`.
    pub fn new(root: impl Into<PathBuf>, entry: impl AsRef<Path>) -> Self {
        Self {
            root: root.into(),
            entry: entry.as_ref().to_path_buf(),
        }
    }

    pub fn from_config(config: &DevloopConfig) -> Self {
        Self::new(config.site_dir(), &config.site.entry)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request path onto the site directory.
    ///
    /// The path is percent-decoded first. `/` and the empty path mean the
    /// entry page. Returns `None` for undecodable paths and for paths that try
    /// to leave the root (`..`, absolute or prefixed components).
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let decoded = urlencoding::decode(request_path).ok()?;
        let relative = decoded.trim_start_matches('/');
        if relative.is_empty() {
            return Some(self.root.join(&self.entry));
        }

        let mut sanitized = PathBuf::new();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => sanitized.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }

        Some(self.root.join(sanitized))
    }

    /// Respond to a request path.
    ///
    /// Only a missing or unreadable entry page is an error; every other miss
    /// falls back to it.
    pub async fn respond(&self, request_path: &str) -> Result<StaticResponse> {
        if let Some(path) = self.resolve(request_path) {
            if is_file(&path).await {
                match tokio::fs::read(&path).await {
                    Ok(bytes) => return Ok(Self::render(&path, bytes, true)),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "failed to read file, serving entry page");
                    }
                }
            }
        } else {
            tracing::debug!(request_path, "rejected path outside site root");
        }

        let entry = self.root.join(&self.entry);
        let bytes = tokio::fs::read(&entry).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CliError::FileNotFound(entry.clone()),
            _ => CliError::Io(e),
        })?;
        Ok(Self::render(&entry, bytes, false))
    }

    fn render(path: &Path, bytes: Vec<u8>, matched: bool) -> StaticResponse {
        let content_type = content_type_for(path);
        let body = if is_markup(content_type) {
            inject_reload_snippet(&String::from_utf8_lossy(&bytes)).into_bytes()
        } else {
            bytes
        };

        StaticResponse {
            body,
            content_type,
            matched,
        }
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Determine content type from file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "js" | "mjs" => "application/javascript",
        "css" => "text/css",
        "json" | "map" => "application/json",
        "wasm" => "application/wasm",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

fn is_markup(content_type: &str) -> bool {
    content_type.starts_with("text/html")
}

/// Inline `<script>` bootstrapping the reload channel.
pub fn reload_snippet() -> String {
    let client = DevAssets::get(RELOAD_CLIENT)
        .map(|file| String::from_utf8_lossy(&file.data).into_owned())
        .unwrap_or_default();

    format!("{SNIPPET_MARKER}\n<script>\n{}\n</script>\n", client.trim_end())
}

/// Insert the reload snippet before the last `</body>`, or append it.
pub fn inject_reload_snippet(html: &str) -> String {
    if html.contains(SNIPPET_MARKER) {
        return html.to_owned();
    }

    let snippet = reload_snippet();
    let mut injected = String::with_capacity(html.len() + snippet.len());

    match html.rfind("</body>") {
        Some(pos) => {
            injected.push_str(&html[..pos]);
            injected.push_str(&snippet);
            injected.push_str(&html[pos..]);
        }
        None => {
            injected.push_str(html);
            injected.push('\n');
            injected.push_str(&snippet);
        }
    }

    injected
}
