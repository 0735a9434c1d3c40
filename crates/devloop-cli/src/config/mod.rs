//! Configuration system for devloop with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and `devloop.toml`.
//! Priority: CLI > Environment > File > Defaults
//!
//! Every path in the configuration is relative to the project root (the
//! `--cwd` directory) unless it is absolute.

mod defaults;
mod loading;
mod types;
mod validation;

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub use defaults::*;
pub use types::*;

/// Name of the project-level config file picked up automatically.
pub const CONFIG_FILE_NAME: &str = "devloop.toml";

/// Prefix for environment overrides (`DEVLOOP_SERVER__PORT=4000`).
pub const ENV_PREFIX: &str = "DEVLOOP_";

/// devloop configuration - loaded from devloop.toml, environment and CLI args.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevloopConfig {
    /// Project root all relative paths resolve against
    #[serde(skip)]
    pub root: PathBuf,

    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Static asset root and entry page
    #[serde(default)]
    pub site: SiteConfig,

    /// Native-to-wasm compiler pipeline
    #[serde(default)]
    pub native: NativeConfig,

    /// Script bundler pipeline
    #[serde(default)]
    pub script: ScriptConfig,

    /// File watching and live reload timing
    #[serde(default)]
    pub watch: WatchConfig,
}

impl DevloopConfig {
    /// Resolve a configured path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Directory static files are served from.
    pub fn site_dir(&self) -> PathBuf {
        self.resolve(&self.site.dir)
    }

    /// Absolute path of the entry markup page.
    pub fn entry_page(&self) -> PathBuf {
        self.site_dir().join(&self.site.entry)
    }

    /// Marker file whose absence triggers an initial native build.
    pub fn native_artifact(&self) -> PathBuf {
        self.resolve(&self.native.artifact)
    }

    /// Socket address the server binds to.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    /// Get the server URL as a string.
    pub fn server_url(&self) -> String {
        format!("http://{}", self.addr())
    }
}
