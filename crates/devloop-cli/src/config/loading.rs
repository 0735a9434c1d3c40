use crate::cli::ProjectArgs;
use crate::config::{DevloopConfig, CONFIG_FILE_NAME, ENV_PREFIX};
use crate::error::{ConfigError, Result, ResultExt};
use figment::{
    providers::{Env, Format as _, Serialized, Toml},
    Figment,
};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

impl DevloopConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(project: &ProjectArgs) -> Result<Self> {
        let root = resolve_root(project.cwd.as_deref())?;
        let config_file = locate_config_file(&root, project.config.as_deref())?;
        Self::from_figment(Self::figment(config_file.as_deref()), root)
    }

    /// Build the layered figment without the CLI layer.
    pub(crate) fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        // DEVLOOP_SERVER__PORT=4000 -> server.port
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub(crate) fn from_figment(figment: Figment, root: PathBuf) -> Result<Self> {
        let mut config: Self = figment.extract().map_err(|e| ConfigError::Extract(e.to_string()))?;
        config.root = root;
        Ok(config)
    }

    /// Apply `dev` command flags on top of the loaded layers.
    pub fn with_overrides(mut self, host: Option<IpAddr>, port: Option<u16>, no_watch: bool) -> Self {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        if no_watch {
            self.watch.enabled = false;
        }
        self
    }
}

fn resolve_root(cwd: Option<&Path>) -> Result<PathBuf> {
    let root = match cwd {
        Some(dir) => std::path::absolute(dir).with_path(dir)?,
        None => std::env::current_dir()?,
    };

    if !root.is_dir() {
        return Err(ConfigError::InvalidValue {
            field: "cwd".to_string(),
            value: root.display().to_string(),
            hint: "Project root must be an existing directory".to_string(),
        }
        .into());
    }

    Ok(root.canonicalize().unwrap_or(root))
}

/// An explicit `--config` must exist; the default file is optional.
fn locate_config_file(root: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) => {
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                root.join(path)
            };
            if !path.is_file() {
                return Err(ConfigError::NotFound(path).into());
            }
            Ok(Some(path))
        }
        None => {
            let default_path = root.join(CONFIG_FILE_NAME);
            Ok(default_path.is_file().then_some(default_path))
        }
    }
}
