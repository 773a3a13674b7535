//! Build pipeline: config → sources → merged tree → dictionary → platform files.

use std::path::{Path, PathBuf};

use difference::{Changeset, Difference};

use crate::config::{BuildConfig, FileConfig, PlatformConfig};
use crate::dictionary::Dictionary;
use crate::discovery::SourceDiscoverer;
use crate::formats::{FormatContext, FormatRegistry};
use crate::parser::TokenParser;
use crate::tree::TokenTree;
use crate::{err_msg, TokensError};

// ============================================================================
// REPORTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// Write every output file.
    #[default]
    Write,
    /// Compare outputs with what is on disk without writing anything.
    Check,
}

#[derive(Debug, PartialEq)]
pub enum OutputStatus {
    Written,
    UpToDate,
    Missing,
    Stale { diffs: Vec<Difference> },
}

#[derive(Debug, PartialEq)]
pub struct OutputReport {
    pub platform: String,
    pub format: String,
    pub path: PathBuf,
    pub status: OutputStatus,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub sources: Vec<PathBuf>,
    pub token_count: usize,
    pub outputs: Vec<OutputReport>,
}

impl BuildReport {
    /// Outputs that differ from disk in check mode.
    pub fn out_of_date(&self) -> impl Iterator<Item = &OutputReport> {
        self.outputs
            .iter()
            .filter(|o| matches!(o.status, OutputStatus::Missing | OutputStatus::Stale { .. }))
    }

    pub fn is_up_to_date(&self) -> bool {
        self.out_of_date().next().is_none()
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Runs whole builds. Each run is independent; nothing is cached between runs.
#[derive(Debug)]
pub struct BuildPipeline<'r> {
    formats: &'r FormatRegistry,
    mode: BuildMode,
}

impl<'r> BuildPipeline<'r> {
    pub fn new(formats: &'r FormatRegistry) -> Self {
        Self {
            formats,
            mode: BuildMode::Write,
        }
    }

    pub fn with_mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builds every platform in `config`. Relative source patterns and build paths are
    /// resolved against `root`.
    pub fn run(&self, config: &BuildConfig, root: &Path) -> Result<BuildReport, TokensError> {
        config.validate(self.formats)?;
        let parser = config.parser.build_parser()?;
        let sources = SourceDiscoverer::new(root, &parser).discover(&config.source)?;
        tracing::info!(count = sources.len(), "discovered token sources");

        let tree = load_tree(&parser, &sources)?;
        let dictionary = Dictionary::from_tree(&tree)?;

        let mut report = BuildReport {
            token_count: dictionary.len(),
            sources,
            outputs: Vec::new(),
        };
        for (name, platform) in &config.platforms {
            for file in &platform.files {
                let output = self.build_file(&dictionary, name, platform, file, root)?;
                report.outputs.push(output);
            }
        }
        Ok(report)
    }

    /// Renders one file of a platform without touching the file system.
    pub fn render(
        &self,
        dictionary: &Dictionary,
        platform: &PlatformConfig,
        file: &FileConfig,
    ) -> Result<String, TokensError> {
        let format = self
            .formats
            .get(&file.format)
            .ok_or_else(|| err_msg!(Format, "unknown format '{}'", file.format))?;
        let ctx = FormatContext {
            destination: &file.destination,
            transform_group: platform.transform_group,
            options: &file.options,
        };
        format.render(dictionary, &ctx)
    }

    fn build_file(
        &self,
        dictionary: &Dictionary,
        platform_name: &str,
        platform: &PlatformConfig,
        file: &FileConfig,
        root: &Path,
    ) -> Result<OutputReport, TokensError> {
        let contents = self.render(dictionary, platform, file)?;
        let path = root.join(&platform.build_path).join(&file.destination);
        let status = match self.mode {
            BuildMode::Write => {
                write_output(&path, &contents)?;
                tracing::info!(platform = platform_name, path = %path.display(), "wrote output");
                OutputStatus::Written
            }
            BuildMode::Check => compare_output(&path, &contents),
        };
        Ok(OutputReport {
            platform: platform_name.to_string(),
            format: file.format.clone(),
            path,
            status,
        })
    }
}

/// Parses every source in order and deep-merges the results. Later files win on collision.
pub fn load_tree(parser: &TokenParser, sources: &[PathBuf]) -> Result<TokenTree, TokensError> {
    let mut merged = TokenTree::new();
    for source in sources {
        tracing::debug!(file = %source.display(), "parsing token source");
        let tree = parser.parse_file(source)?;
        for path in merged.merge(tree) {
            tracing::warn!(
                token = %path,
                file = %source.display(),
                "token collision: value overwritten by a later source"
            );
        }
    }
    Ok(merged)
}

fn write_output(path: &Path, contents: &str) -> Result<(), TokensError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            err_msg!(Io, "failed to create directory '{}'", parent.display()).caused_by(e)
        })?;
    }
    std::fs::write(path, contents)
        .map_err(|e| err_msg!(Io, "failed to write '{}'", path.display()).caused_by(e))
}

fn compare_output(path: &Path, contents: &str) -> OutputStatus {
    match std::fs::read_to_string(path) {
        Ok(existing) if existing == contents => OutputStatus::UpToDate,
        Ok(existing) => OutputStatus::Stale {
            diffs: Changeset::new(&existing, contents, "\n").diffs,
        },
        Err(_) => OutputStatus::Missing,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn later_sources_win_collisions() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", r##"{"colors": {"red": {"$value": "#f00"}}}"##);
        write(dir.path(), "b.json", r##"{"colors": {"red": {"$value": "#e00"}, "blue": {"$value": "#00f"}}}"##);
        let sources = vec![dir.path().join("a.json"), dir.path().join("b.json")];

        let tree = load_tree(&TokenParser::default(), &sources).unwrap();
        assert_eq!(tree.token_count(), 2);
        let dict = Dictionary::from_tree(&tree).unwrap();
        assert_eq!(dict.get("colors.red").unwrap().value, "#e00");
    }

    #[test]
    fn check_mode_reports_missing_then_up_to_date() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "tokens/colors.json", r##"{"colors": {"red": {"$value": "#f00"}}}"##);
        let config = BuildConfig::default_config();
        let formats = FormatRegistry::standard();

        let check = BuildPipeline::new(&formats).with_mode(BuildMode::Check);
        let report = check.run(&config, dir.path()).unwrap();
        assert_eq!(report.out_of_date().count(), 3);
        assert!(!dir.path().join("dist").exists());

        BuildPipeline::new(&formats).run(&config, dir.path()).unwrap();
        assert!(check.run(&config, dir.path()).unwrap().is_up_to_date());

        write(dir.path(), "tokens/colors.json", r##"{"colors": {"red": {"$value": "#e00"}}}"##);
        let report = check.run(&config, dir.path()).unwrap();
        let stale: Vec<_> = report.out_of_date().collect();
        assert_eq!(stale.len(), 3);
        assert!(matches!(stale[0].status, OutputStatus::Stale { .. }));
    }
}
