//! Configuration loading for the parsec driver.
//!
//! `defaults/parsec.default.toml` is embedded into the binary so that the
//! documented defaults and the runtime behavior stay in sync. A `parsec.toml`
//! in the working directory, a `--config` file and `--format` are layered on
//! top via [`Loader`] before deserializing into [`ParsecConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/parsec.default.toml");

/// Top-level configuration consumed by the driver.
#[derive(Debug, Clone, Deserialize)]
pub struct ParsecConfig {
    pub output: OutputConfig,
    pub driver: DriverConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub label_width: usize,
}

/// How a parsed tree is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Treeviz,
    Sexp,
    Debug,
    /// Grammar-specific value: JSON document or evaluated expression
    Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriverConfig {
    pub grammar: GrammarKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrammarKind {
    Json,
    Expr,
}

/// File name picked up from the working directory when present
pub const LOCAL_CONFIG: &str = "parsec.toml";

/// Layers, lowest priority first: embedded defaults, a `parsec.toml` found in
/// a directory, an explicit `--config` file, then command-line flags.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let defaults = File::from_str(DEFAULT_TOML, FileFormat::Toml);
        Self {
            builder: Config::builder().add_source(defaults),
        }
    }

    /// Layer `dir/parsec.toml`, skipped when the file does not exist.
    pub fn with_local_file(self, dir: impl AsRef<Path>) -> Self {
        self.layer(&dir.as_ref().join(LOCAL_CONFIG), false)
    }

    /// Layer a file the user named explicitly; building fails if it is missing.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    /// Replace `output.format` with a value given on the command line.
    pub fn with_format(mut self, format: &str) -> Result<Self, ConfigError> {
        self.builder = self.builder.set_override("output.format", format)?;
        Ok(self)
    }

    pub fn build(self) -> Result<ParsecConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }

    fn layer(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// A fresh directory under the system temp dir for one test
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("parsec-config-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_default_config() {
        let config = Loader::default().build().expect("defaults to deserialize");
        assert_eq!(config.output.format, OutputFormat::Treeviz);
        assert_eq!(config.output.label_width, 30);
        assert_eq!(config.driver.grammar, GrammarKind::Json);
    }

    #[test]
    fn format_flag_overrides_files() {
        let dir = scratch_dir("flag");
        std::fs::write(dir.join(LOCAL_CONFIG), "[output]\nformat = \"debug\"\n").unwrap();

        let config = Loader::new()
            .with_local_file(&dir)
            .with_format("sexp")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.output.format, OutputFormat::Sexp);
    }

    #[test]
    fn rejects_unknown_format() {
        let result = Loader::new()
            .with_format("yaml")
            .expect("override to apply")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn local_file_is_layered_when_present() {
        let dir = scratch_dir("local");
        std::fs::write(
            dir.join(LOCAL_CONFIG),
            "[driver]\ngrammar = \"expr\"\n[output]\nlabel_width = 12\n",
        )
        .unwrap();

        let config = Loader::new().with_local_file(&dir).build().expect("config to build");
        assert_eq!(config.driver.grammar, GrammarKind::Expr);
        assert_eq!(config.output.label_width, 12);
        assert_eq!(config.output.format, OutputFormat::Treeviz);
    }

    #[test]
    fn local_file_may_be_missing() {
        let config = Loader::new()
            .with_local_file("does/not/exist")
            .build()
            .expect("missing local file is ignored");
        assert_eq!(config.output.label_width, 30);
    }

    #[test]
    fn explicit_file_must_exist() {
        assert!(Loader::new().with_file("does/not/exist.toml").build().is_err());
    }

    #[test]
    fn explicit_file_wins_over_local_file() {
        let dir = scratch_dir("order");
        std::fs::write(dir.join(LOCAL_CONFIG), "[driver]\ngrammar = \"expr\"\n").unwrap();
        let explicit = dir.join("explicit.toml");
        std::fs::write(&explicit, "[driver]\ngrammar = \"json\"\n").unwrap();

        let config = Loader::new()
            .with_local_file(&dir)
            .with_file(&explicit)
            .build()
            .expect("config to build");
        assert_eq!(config.driver.grammar, GrammarKind::Json);
    }
}
