use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use config::{Config as HierarchicalConfig, Environment};
use serde::{Deserialize, Serialize};
use tracing::debug;
use xdg::BaseDirectories;

/// Name of devshell managed directories
const DEVSHELL_DIR_NAME: &str = "devshell";
const DEVSHELL_CONFIG_DIR_VAR: &str = "DEVSHELL_CONFIG_DIR";
const DEVSHELL_ENV_PREFIX: &str = "DEVSHELL_";
pub const DEVSHELL_CONFIG_FILE: &str = "devshell.toml";

/// Shell document read when neither `--file` nor `default_file` is given
pub const DEFAULT_DOCUMENT: &str = "shell.toml";

#[derive(Clone, Debug, Deserialize, Default, Serialize)]
pub struct Config {
    /// Shell document to read when `--file` is not passed
    pub default_file: Option<PathBuf>,

    /// Format used by `devshell show` when `--format` is not passed
    #[serde(default)]
    pub output_format: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Toml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "toml" => Ok(OutputFormat::Toml),
            other => Err(format!(
                "unknown output format '{other}', expected 'json' or 'toml'"
            )),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Toml => write!(f, "toml"),
        }
    }
}

impl Config {
    /// Creates a [Config] from the environment and config files
    pub fn parse() -> Result<Config> {
        let config_dir = env::var_os(DEVSHELL_CONFIG_DIR_VAR).map(PathBuf::from);
        Self::load(config_dir.as_deref(), env::vars())
    }

    /// Read config from, in increasing order of precedence:
    ///
    /// * `/etc/devshell/devshell.toml`
    /// * `devshell/devshell.toml` in the XDG config directories
    /// * `$DEVSHELL_CONFIG_DIR/devshell.toml`
    /// * `DEVSHELL_*` variables in `vars`
    fn load(
        config_dir: Option<&Path>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Config> {
        let devshell_dirs = BaseDirectories::with_prefix(DEVSHELL_DIR_NAME);

        // read from /etc
        let mut builder = HierarchicalConfig::builder().add_source(
            config::File::from(
                PathBuf::from("/etc")
                    .join(DEVSHELL_DIR_NAME)
                    .join(DEVSHELL_CONFIG_FILE),
            )
            .format(config::FileFormat::Toml)
            .required(false),
        );

        // XDG lists the most preferred location first, it has to be added last
        let xdg_files: Vec<PathBuf> = devshell_dirs.find_config_files(DEVSHELL_CONFIG_FILE).collect();
        for file in xdg_files.into_iter().rev() {
            debug!(file = %file.display(), "reading config file");
            builder = builder.add_source(config::File::from(file).format(config::FileFormat::Toml));
        }

        // Add explicit DEVSHELL_CONFIG_DIR file last
        if let Some(config_dir) = config_dir {
            debug!("`${DEVSHELL_CONFIG_DIR_VAR}` set: {}", config_dir.display());
            builder = builder.add_source(
                config::File::from(config_dir.join(DEVSHELL_CONFIG_FILE))
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }

        // override via env variables
        let devshell_envs: HashMap<String, String> = vars
            .into_iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(DEVSHELL_ENV_PREFIX)
                    .filter(|k| *k != "CONFIG_DIR")
                    .map(|k| (k.to_lowercase(), v))
            })
            .collect();

        let final_config = builder
            .add_source(
                Environment::default()
                    .source(Some(devshell_envs))
                    .try_parsing(true),
            )
            .build()?;

        final_config
            .try_deserialize()
            .context("Could not parse config")
    }
}
