//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/dexlink/dexlink.toml`
//! 3. Local config: `<project_dir>/dexlink.toml`
//! 4. Environment variables: `DEXLINK_*` prefix, `__` for nesting
//! 5. Command line flags (applied by the CLI layer)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, OutputOptions};
use crate::domain::{AnnotateOptions, AnnotationPolicy, EvolvesDepth, UnmatchedNodes};
use crate::util::path::expand_env_vars;

pub const DEFAULT_ENTITIES_FILE: &str = "filteredGenerationOnePokemon.json";
pub const DEFAULT_FOREST_FILE: &str = "mappedEvolutionTrees.json";
/// Output directory of the `evolves` policy unless configured.
pub const DEFAULT_EVOLVES_OUTPUT_DIR: &str = "pokemons";
/// Output directory of the `lineage` policy unless configured.
pub const DEFAULT_LINEAGE_OUTPUT_DIR: &str = "pokemon";

const CONFIG_FILE_NAME: &str = "dexlink.toml";
const ENV_PREFIX: &str = "DEXLINK";

/// Raw annotate section for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawAnnotateConfig {
    pub evolves_depth: Option<EvolvesDepth>,
    pub unmatched_nodes: Option<UnmatchedNodes>,
}

/// Raw output section for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutputConfig {
    pub indent: Option<usize>,
    pub ensure_ascii: Option<bool>,
}

/// Raw settings for intermediate parsing.
///
/// Every field is optional so a layer only overrides what it specifies.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub entities_file: Option<PathBuf>,
    pub forest_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub policy: Option<AnnotationPolicy>,
    pub annotate: RawAnnotateConfig,
    pub output: RawOutputConfig,
}

/// Unified configuration for dexlink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Entity records input
    pub entities_file: PathBuf,
    /// Evolution forest input
    pub forest_file: PathBuf,
    /// Output directory; `None` picks the policy default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Which relationship fields are written
    pub policy: AnnotationPolicy,
    /// Traversal options
    pub annotate: AnnotateOptions,
    /// Record file formatting
    pub output: OutputOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            entities_file: PathBuf::from(DEFAULT_ENTITIES_FILE),
            forest_file: PathBuf::from(DEFAULT_FOREST_FILE),
            output_dir: None,
            policy: AnnotationPolicy::default(),
            annotate: AnnotateOptions::default(),
            output: OutputOptions::default(),
        }
    }
}

/// Get the XDG config directory for dexlink.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dexlink").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_FILE_NAME)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Output directory for `policy`, honoring an explicit `output_dir`.
    pub fn output_dir_for(&self, policy: AnnotationPolicy) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            PathBuf::from(match policy {
                AnnotationPolicy::Evolves => DEFAULT_EVOLVES_OUTPUT_DIR,
                AnnotationPolicy::Lineage => DEFAULT_LINEAGE_OUTPUT_DIR,
            })
        })
    }

    /// Expand shell variables and tilde in path fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax.
    fn expand_paths(&mut self) {
        let expand = |p: &Path| PathBuf::from(expand_env_vars(p.to_string_lossy().as_ref()));
        self.entities_file = expand(&self.entities_file);
        self.forest_file = expand(&self.forest_file);
        self.output_dir = self.output_dir.as_deref().map(expand);
    }

    /// Merge overlay config onto self (base).
    ///
    /// Every field: overlay wins if Some, otherwise keep base.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            entities_file: overlay
                .entities_file
                .clone()
                .unwrap_or_else(|| self.entities_file.clone()),
            forest_file: overlay
                .forest_file
                .clone()
                .unwrap_or_else(|| self.forest_file.clone()),
            output_dir: overlay.output_dir.clone().or_else(|| self.output_dir.clone()),
            policy: overlay.policy.unwrap_or(self.policy),
            annotate: AnnotateOptions {
                evolves_depth: overlay
                    .annotate
                    .evolves_depth
                    .unwrap_or(self.annotate.evolves_depth),
                unmatched_nodes: overlay
                    .annotate
                    .unmatched_nodes
                    .unwrap_or(self.annotate.unmatched_nodes),
            },
            output: OutputOptions {
                indent: overlay.output.indent.unwrap_or(self.output.indent),
                ensure_ascii: overlay
                    .output
                    .ensure_ascii
                    .unwrap_or(self.output.ensure_ascii),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Directory holding the local `dexlink.toml` (default: cwd)
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        let local_path = local_config_path(project_dir.unwrap_or(Path::new(".")));
        if local_path.exists() {
            let raw = load_raw_settings(&local_path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply DEXLINK_* environment variables as explicit overrides.
    ///
    /// A variable that is set but cannot be parsed is an error, not ignored.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_value::<String>(&config, "entities_file")? {
            settings.entities_file = PathBuf::from(val);
        }
        if let Some(val) = env_value::<String>(&config, "forest_file")? {
            settings.forest_file = PathBuf::from(val);
        }
        if let Some(val) = env_value::<String>(&config, "output_dir")? {
            settings.output_dir = Some(PathBuf::from(val));
        }
        if let Some(val) = env_value::<String>(&config, "policy")? {
            settings.policy = parse_env("policy", &val)?;
        }
        if let Some(val) = env_value::<String>(&config, "annotate.evolves_depth")? {
            settings.annotate.evolves_depth = parse_env("annotate.evolves_depth", &val)?;
        }
        if let Some(val) = env_value::<String>(&config, "annotate.unmatched_nodes")? {
            settings.annotate.unmatched_nodes = parse_env("annotate.unmatched_nodes", &val)?;
        }
        if let Some(val) = env_value::<String>(&config, "output.indent")? {
            settings.output.indent = parse_env("output.indent", &val)?;
        }
        if let Some(val) = env_value::<String>(&config, "output.ensure_ascii")? {
            settings.output.ensure_ascii = parse_env("output.ensure_ascii", &val)?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# dexlink configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/dexlink/dexlink.toml
#   Local:  <project_dir>/dexlink.toml
#   Env:    DEXLINK_* environment variables, "__" for nesting
#           (e.g. DEXLINK_POLICY=evolves, DEXLINK_OUTPUT__INDENT=2)
#   Flags:  command line options win over everything

# Entity records: JSON array of objects with at least `name` and `order`
# entities_file = "filteredGenerationOnePokemon.json"

# Evolution forest: JSON array of {"speciesName": ..., "evolvesTo": [...]}
# forest_file = "mappedEvolutionTrees.json"

# "lineage" writes evolvedFrom/evolvesTo, "evolves" writes an Evolves list
# policy = "lineage"

# Default: "pokemon" for lineage, "pokemons" for evolves
# output_dir = "pokemon"

[annotate]
# evolves policy: "full-tree" annotates every matched descendant, "root-only" just the roots
# evolves_depth = "full-tree"

# lineage policy at a species missing from the entity records:
# "skip-over" links its matched descendants to the nearest matched ancestor,
# "prune" leaves the whole subtree unannotated
# unmatched_nodes = "skip-over"

[output]
# Spaces per indentation level
# indent = 4

# Write non-ASCII characters as \uXXXX escapes
# ensure_ascii = true
"#
        .to_string()
    }
}

/// Read `key` from the env layer; `None` when unset.
fn env_value<T: DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn parse_env<T>(key: &str, val: &str) -> Result<T, ApplicationError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    val.trim().parse().map_err(|e| ApplicationError::Config {
        message: format!(
            "{}_{}: {}",
            ENV_PREFIX,
            key.replace('.', "__").to_uppercase(),
            e
        ),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
