use crate::error::{AppError, Result};
use crate::rules::host_is_case_insensitive;
use log;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_CONFIG_FILENAME: &str = ".packcode.toml";
pub const DEFAULT_OUTPUT_FILENAME: &str = "codebase.txt";
pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Suppress progress and success messages. Warnings and errors still show.
    #[serde(default = "default_false")]
    pub silent: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Artifact file name, relative to the project root.
    #[serde(default = "default_output_filename")]
    pub filename: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FiltersConfig {
    #[serde(default = "default_false")]
    pub include_hidden: bool,
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,
    /// Unset means "follow the host filesystem".
    #[serde(default)]
    pub case_insensitive: Option<bool>,
}

fn default_false() -> bool {
    false
}
fn default_output_filename() -> String {
    DEFAULT_OUTPUT_FILENAME.to_string()
}
fn default_ignore_file() -> String {
    DEFAULT_IGNORE_FILE.to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filename: default_output_filename(),
        }
    }
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            include_hidden: default_false(),
            ignore_file: default_ignore_file(),
            case_insensitive: None,
        }
    }
}

impl Config {
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("PROJECT_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        let canonical = path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize project root '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })?;
        if !canonical.is_dir() {
            return Err(AppError::InvalidArgument(format!(
                "Project root is not a directory: {}",
                canonical.display()
            )));
        }
        Ok(canonical)
    }

    /// Pick the config file to load, if any. A file named on the command line
    /// must exist; the default `.packcode.toml` is optional.
    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        let Some(p_str) = cli_config_file else {
            let default_path = project_root.join(DEFAULT_CONFIG_FILENAME);
            if default_path.is_file() {
                log::debug!("Using default config file path: {}", default_path.display());
                return Ok(Some(default_path));
            }
            log::debug!(
                "No config file specified and default not found at: {}",
                default_path.display()
            );
            return Ok(None);
        };

        let expanded = shellexpand::tilde(p_str);
        let mut path = PathBuf::from(expanded.as_ref());
        let looks_like_path =
            path.is_absolute() || path.components().count() > 1 || p_str.contains(['/', '\\']);

        if !looks_like_path {
            let filename = if path.extension().is_none_or(|e| e != "toml") {
                format!("{}.toml", path.to_string_lossy())
            } else {
                path.to_string_lossy().to_string()
            };
            path = project_root.join(filename);
        } else if !path.exists() && path.extension().is_none() {
            path.set_extension("toml");
        }

        if !path.is_file() {
            return Err(AppError::Config(format!(
                "Specified config file not found: {}",
                path.display()
            )));
        }
        log::debug!("Using specified config file: {}", path.display());
        Ok(Some(path))
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| match e {
            AppError::TomlParse(msg) => AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_toml_str(toml_content: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_content)
            .map_err(|e| AppError::TomlParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.output.filename.trim().is_empty() {
            return Err(AppError::Config(
                "output.filename must not be empty".to_string(),
            ));
        }
        if self.filters.ignore_file.trim().is_empty() {
            return Err(AppError::Config(
                "filters.ignore_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Case mode for every rule set of a run.
    pub fn effective_case_insensitive(&self) -> bool {
        self.filters
            .case_insensitive
            .unwrap_or_else(host_is_case_insensitive)
    }

    /// Absolute location of the artifact. The configured name is taken
    /// relative to the project root unless it is already absolute. `.` and
    /// `..` segments are collapsed so the path compares equal to the one the
    /// walk produces.
    pub fn output_path(&self, project_root: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(&self.output.filename);
        collapse_dots(&project_root.join(expanded.as_ref()))
    }
}

/// Lexical `.`/`..` resolution. Symlinks are not consulted.
fn collapse_dots(path: &Path) -> PathBuf {
    path.components()
        .fold(PathBuf::new(), |mut acc, component| {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if !acc.pop() {
                        acc.push(component);
                    }
                }
                other => acc.push(other),
            }
            acc
        })
}
