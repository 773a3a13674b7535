//! Build configuration.
//!
//! A config names the token sources (glob patterns relative to the config file) and the
//! platforms to build. Each platform picks a transform group for naming, an output
//! directory and a list of files, each rendered by a named format:
//!
//! ```yaml
//! source:
//!   - tokens/**/*.json
//! platforms:
//!   css:
//!     transformGroup: css
//!     buildPath: dist/
//!     files:
//!       - destination: tokens.css
//!         format: css/variables
//!         options:
//!           outputReferences: true
//! ```
//!
//! YAML (`.yaml`/`.yml`) and JSON (`.json`) files are accepted.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::formats::FormatRegistry;
use crate::parser::{TokenParser, DEFAULT_SOURCE_PATTERN};
use crate::reference::{ReferenceQualifier, DEFAULT_NAMESPACE_ROOT, QUALIFIED_ROOTS};
use crate::{err_msg, TokensError};

/// File names probed, in order, when no config path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = [
    "tokens.config.yaml",
    "tokens.config.yml",
    "tokens.config.json",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub source: Vec<String>,
    pub platforms: BTreeMap<String, PlatformConfig>,
    #[serde(default)]
    pub parser: ParserConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    pub transform_group: TransformGroup,
    #[serde(default)]
    pub build_path: String,
    pub files: Vec<FileConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    pub destination: String,
    pub format: String,
    #[serde(default)]
    pub options: FormatOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOptions {
    /// Keep references between tokens live in the output instead of inlining values.
    #[serde(default)]
    pub output_references: bool,
    /// Emit the "do not edit" banner.
    #[serde(default = "default_true")]
    pub file_header: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            output_references: false,
            file_header: true,
        }
    }
}

/// Naming scheme applied to token paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformGroup {
    /// kebab-case names, e.g. `colors-primary-700`
    Css,
    /// PascalCase names, e.g. `ColorsPrimary700`
    Js,
}

impl fmt::Display for TransformGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformGroup::Css => f.write_str("css"),
            TransformGroup::Js => f.write_str("js"),
        }
    }
}

/// How source files are parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserConfig {
    #[serde(default = "default_true")]
    pub qualify_references: bool,
    #[serde(default = "default_namespace_root")]
    pub namespace_root: String,
    #[serde(default = "default_qualified_roots")]
    pub qualified_roots: Vec<String>,
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            qualify_references: true,
            namespace_root: default_namespace_root(),
            qualified_roots: default_qualified_roots(),
            pattern: default_pattern(),
        }
    }
}

impl ParserConfig {
    pub fn build_parser(&self) -> Result<TokenParser, TokensError> {
        let parser = if self.qualify_references {
            TokenParser::with_qualifier(ReferenceQualifier::with_roots(
                self.namespace_root.clone(),
                self.qualified_roots.iter().cloned(),
            ))
        } else {
            TokenParser::without_qualifier()
        };
        parser.with_pattern(&self.pattern)
    }
}

fn default_true() -> bool {
    true
}

fn default_namespace_root() -> String {
    DEFAULT_NAMESPACE_ROOT.to_string()
}

fn default_qualified_roots() -> Vec<String> {
    QUALIFIED_ROOTS.iter().map(|r| r.to_string()).collect()
}

fn default_pattern() -> String {
    DEFAULT_SOURCE_PATTERN.to_string()
}

// ============================================================================
// LOADING
// ============================================================================

impl BuildConfig {
    /// The three stock platforms: CSS variables with live references, an ES module and a
    /// flat JSON map, all written to `dist/` from `tokens/**/*.json`.
    pub fn default_config() -> Self {
        let platform = |group, destination: &str, format: &str, output_references| {
            PlatformConfig {
                transform_group: group,
                build_path: "dist/".to_string(),
                files: vec![FileConfig {
                    destination: destination.to_string(),
                    format: format.to_string(),
                    options: FormatOptions {
                        output_references,
                        ..FormatOptions::default()
                    },
                }],
            }
        };

        let mut platforms = BTreeMap::new();
        platforms.insert(
            "css".to_string(),
            platform(TransformGroup::Css, "tokens.css", "css/variables", true),
        );
        platforms.insert(
            "js".to_string(),
            platform(TransformGroup::Js, "tokens.js", "javascript/es6", false),
        );
        platforms.insert(
            "json".to_string(),
            platform(TransformGroup::Js, "tokens.flat.json", "json/flat", false),
        );

        Self {
            source: vec!["tokens/**/*.json".to_string()],
            platforms,
            parser: ParserConfig::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, TokensError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            err_msg!(Io, "failed to read config '{}'", path.display()).caused_by(e)
        })?;
        Self::from_str_with_format(&contents, ConfigFormat::from_path(path)?)
            .map_err(|e| e.with_help(format!("while loading '{}'", path.display())))
    }

    pub fn from_str_with_format(contents: &str, format: ConfigFormat) -> Result<Self, TokensError> {
        match format {
            ConfigFormat::Yaml => serde_yaml::from_str(contents)
                .map_err(|e| err_msg!(Config, "invalid YAML config: {}", e).caused_by(e)),
            ConfigFormat::Json => serde_json::from_str(contents)
                .map_err(|e| err_msg!(Config, "invalid JSON config: {}", e).caused_by(e)),
        }
    }

    /// Looks for one of [`DEFAULT_CONFIG_FILES`] in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    pub fn to_yaml(&self) -> Result<String, TokensError> {
        serde_yaml::to_string(self)
            .map_err(|e| err_msg!(Internal, "failed to serialize config: {}", e).caused_by(e))
    }

    /// Checks the parts of the config the pipeline relies on.
    pub fn validate(&self, formats: &FormatRegistry) -> Result<(), TokensError> {
        if self.source.is_empty() {
            return Err(err_msg!(Config, "`source` must list at least one pattern"));
        }
        if self.platforms.is_empty() {
            return Err(err_msg!(Config, "`platforms` must define at least one platform"));
        }
        for (name, platform) in &self.platforms {
            if platform.files.is_empty() {
                return Err(err_msg!(Config, "platform '{}' has no files", name));
            }
            for file in &platform.files {
                let destination = Path::new(&file.destination);
                if file.destination.trim().is_empty() {
                    return Err(err_msg!(Config, "platform '{}' has a file with no destination", name));
                }
                if destination.is_absolute() {
                    return Err(err_msg!(
                        Config,
                        "destination '{}' of platform '{}' must be relative to buildPath",
                        file.destination,
                        name
                    ));
                }
                if formats.get(&file.format).is_none() {
                    return Err(err_msg!(
                        Config,
                        "unknown format '{}' in platform '{}'",
                        file.format,
                        name
                    )
                    .with_help(format!("known formats: {}", formats.names().join(", "))));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, TokensError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            _ => Err(err_msg!(
                Config,
                "unsupported config file '{}': expected .yaml, .yml or .json",
                path.display()
            )),
        }
    }
}
