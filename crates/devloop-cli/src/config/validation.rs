use crate::config::DevloopConfig;
use crate::error::{ConfigError, Result};

fn require_extensions(field: &str, extensions: &[String]) -> Result<()> {
    if extensions.is_empty() {
        return Err(ConfigError::MissingField {
            field: field.to_string(),
            hint: "List at least one file extension, without the leading dot".to_string(),
        }
        .into());
    }

    if let Some(bad) = extensions.iter().find(|ext| ext.is_empty() || ext.starts_with('.')) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: bad.clone(),
            hint: "Write extensions without the leading dot, e.g. \"rs\"".to_string(),
        }
        .into());
    }

    Ok(())
}

fn require_command(field: &str, command: &str) -> Result<()> {
    if command.split_whitespace().next().is_none() {
        return Err(ConfigError::MissingField {
            field: field.to_string(),
            hint: "Name the executable to run".to_string(),
        }
        .into());
    }
    Ok(())
}

impl DevloopConfig {
    /// Validate configuration for logical consistency.
    ///
    /// Watch roots are intentionally not checked here: a missing source
    /// directory is skipped at watch time rather than rejected.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                value: "0".to_string(),
                hint: "Pick a fixed port between 1 and 65535".to_string(),
            }
            .into());
        }

        if self.watch.debounce_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "watch.debounce_ms".to_string(),
                value: "0".to_string(),
                hint: "A zero window cannot coalesce editor save bursts; 100 is a good start"
                    .to_string(),
            }
            .into());
        }

        if self.watch.keep_alive_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "watch.keep_alive_secs".to_string(),
                value: "0".to_string(),
                hint: "Use a positive interval such as 30".to_string(),
            }
            .into());
        }

        require_command("native.command", &self.native.command)?;
        require_command("script.command", &self.script.command)?;
        require_extensions("native.extensions", &self.native.extensions)?;
        require_extensions("script.extensions", &self.script.extensions)?;
        require_extensions("site.markup_extensions", &self.site.markup_extensions)?;
        require_extensions("site.style_extensions", &self.site.style_extensions)?;

        let site_dir = self.site_dir();
        if !site_dir.is_dir() {
            return Err(ConfigError::InvalidValue {
                field: "site.dir".to_string(),
                value: site_dir.display().to_string(),
                hint: "The asset root must be an existing directory".to_string(),
            }
            .into());
        }

        let entry = self.entry_page();
        if !entry.is_file() {
            return Err(ConfigError::InvalidValue {
                field: "site.entry".to_string(),
                value: self.site.entry.clone(),
                hint: format!("Entry page does not exist: {}", entry.display()),
            }
            .into());
        }

        Ok(())
    }
}
