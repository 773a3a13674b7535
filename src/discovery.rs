use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::parser::TokenParser;
use crate::{err_msg, TokensError};

/// Expands the configured source patterns into the list of token files to build.
///
/// The discovery process follows this flow:
/// 1. Resolve each pattern against the config directory
/// 2. Expand it with `glob`; a pattern naming a directory is walked recursively
/// 3. Keep only files the parser is registered for
/// 4. Sort and deduplicate for a deterministic merge order
#[derive(Debug)]
pub struct SourceDiscoverer<'p> {
    root: PathBuf,
    parser: &'p TokenParser,
}

impl<'p> SourceDiscoverer<'p> {
    pub fn new(root: impl Into<PathBuf>, parser: &'p TokenParser) -> Self {
        Self {
            root: root.into(),
            parser,
        }
    }

    /// Returns every matching source file. Finding nothing at all is an error.
    pub fn discover(&self, patterns: &[String]) -> Result<Vec<PathBuf>, TokensError> {
        let mut files = Vec::new();
        for pattern in patterns {
            let matched = self.expand(pattern)?;
            if matched.is_empty() {
                tracing::warn!(pattern = %pattern, "source pattern matched no token files");
            }
            files.extend(matched);
        }
        files.sort();
        files.dedup();

        if files.is_empty() {
            return Err(err_msg!(
                Config,
                "no token files found for source patterns [{}] under '{}'",
                patterns.join(", "),
                self.root.display()
            ));
        }
        Ok(files)
    }

    fn expand(&self, pattern: &str) -> Result<Vec<PathBuf>, TokensError> {
        let full_pattern = if Path::new(pattern).is_absolute() {
            pattern.to_string()
        } else {
            self.root.join(pattern).display().to_string()
        };

        let entries = glob::glob(&full_pattern).map_err(|e| {
            err_msg!(Config, "invalid source pattern '{}': {}", pattern, e.msg).caused_by(e)
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| {
                err_msg!(Io, "failed to read '{}'", e.path().display()).caused_by(e)
            })?;
            if path.is_dir() {
                files.extend(self.walk(&path)?);
            } else if self.is_token_file(&path) {
                files.push(path);
            }
        }
        Ok(files)
    }

    fn walk(&self, dir: &Path) -> Result<Vec<PathBuf>, TokensError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir) {
            let entry = entry
                .map_err(|e| err_msg!(Io, "failed to walk '{}'", dir.display()).caused_by(e))?;
            if entry.file_type().is_file() && self.is_token_file(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
        Ok(files)
    }

    fn is_token_file(&self, path: &Path) -> bool {
        path.is_file() && self.parser.matches(path)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::diagnostics::ErrorType;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    #[test]
    fn recursive_glob_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "tokens/z.json");
        touch(dir.path(), "tokens/colors/a.json");
        touch(dir.path(), "tokens/notes.md");

        let parser = TokenParser::default();
        let files = SourceDiscoverer::new(dir.path(), &parser)
            .discover(&["tokens/**/*.json".to_string()])
            .unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["tokens/colors/a.json", "tokens/z.json"]);
    }

    #[test]
    fn directory_patterns_are_walked_and_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "tokens/base/a.json");

        let parser = TokenParser::default();
        let files = SourceDiscoverer::new(dir.path(), &parser)
            .discover(&["tokens".to_string(), "tokens/base/*.json".to_string()])
            .unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn nothing_found_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let parser = TokenParser::default();
        let err = SourceDiscoverer::new(dir.path(), &parser)
            .discover(&["tokens/**/*.json".to_string()])
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
