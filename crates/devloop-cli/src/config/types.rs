use crate::config::defaults::*;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// `[server]` in devloop.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface to bind on (loopback by default)
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// `[site]` in devloop.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Asset root served over HTTP; markup changes directly inside it trigger a reload
    #[serde(default = "default_site_dir")]
    pub dir: PathBuf,

    /// Entry page, relative to `dir`; also the fallback for unmatched routes
    #[serde(default = "default_entry_page")]
    pub entry: String,

    /// Stylesheet directory, watched recursively
    #[serde(default = "default_styles_dir")]
    pub styles: PathBuf,

    /// Extensions treated as markup
    #[serde(default = "default_markup_extensions")]
    pub markup_extensions: Vec<String>,

    /// Extensions treated as stylesheets
    #[serde(default = "default_style_extensions")]
    pub style_extensions: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            dir: default_site_dir(),
            entry: default_entry_page(),
            styles: default_styles_dir(),
            markup_extensions: default_markup_extensions(),
            style_extensions: default_style_extensions(),
        }
    }
}

/// `[native]` in devloop.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NativeConfig {
    /// Compiler command; extra words are passed before the generated arguments
    #[serde(default = "default_native_command")]
    pub command: String,

    /// Crate compiled to the binary artifact
    #[serde(default = "default_native_crate_dir")]
    pub crate_dir: PathBuf,

    /// Browser-oriented target identifier (`web`, `bundler`, ...)
    #[serde(default = "default_native_target")]
    pub target: String,

    /// Output directory handed to the compiler as-is
    #[serde(default = "default_native_out_dir")]
    pub out_dir: PathBuf,

    /// Artifact whose absence forces a native build at startup
    #[serde(default = "default_native_artifact")]
    pub artifact: PathBuf,

    /// Source roots watched recursively; missing ones are skipped
    #[serde(default = "default_native_sources")]
    pub sources: Vec<PathBuf>,

    /// Extensions that trigger a native rebuild
    #[serde(default = "default_native_extensions")]
    pub extensions: Vec<String>,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            command: default_native_command(),
            crate_dir: default_native_crate_dir(),
            target: default_native_target(),
            out_dir: default_native_out_dir(),
            artifact: default_native_artifact(),
            sources: default_native_sources(),
            extensions: default_native_extensions(),
        }
    }
}

/// `[script]` in devloop.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptConfig {
    /// Bundler command; extra words are passed before the generated arguments
    #[serde(default = "default_script_command")]
    pub command: String,

    /// Bundle entry point
    #[serde(default = "default_script_entry")]
    pub entry: PathBuf,

    /// Bundle output directory
    #[serde(default = "default_script_out_dir")]
    pub out_dir: PathBuf,

    /// Script source root, watched recursively
    #[serde(default = "default_script_sources")]
    pub sources: PathBuf,

    /// Extensions that trigger a script rebuild
    #[serde(default = "default_script_extensions")]
    pub extensions: Vec<String>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            command: default_script_command(),
            entry: default_script_entry(),
            out_dir: default_script_out_dir(),
            sources: default_script_sources(),
            extensions: default_script_extensions(),
        }
    }
}

/// `[watch]` in devloop.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Rebuild and reload on change
    #[serde(default = "default_watch_enabled")]
    pub enabled: bool,

    /// Quiet window before a burst of changes fires
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Interval between keep-alive frames on push channels
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: default_watch_enabled(),
            debounce_ms: default_debounce_ms(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}
