//! Bridge to the external MyST parser.
//!
//! Parsing itself happens outside this process. [`CommandParser`] runs the
//! configured command with the source path appended and reads the JSON tree
//! from stdout. [`JsonFileParser`] reads trees that were generated ahead of
//! time, which keeps offline runs and tests free of the Node.js toolchain.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use crate::ast::Document;

/// Error from the parser bridge.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Parser command could not be started.
    #[error("failed to run parser `{program}`: {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Parser exited with a non-zero status.
    #[error("parser failed for {} (exit code {code:?}): {stderr}", path.display())]
    Failed {
        /// Source file that was being parsed.
        path: PathBuf,
        /// Exit code, `None` when killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// Parser command line is empty.
    #[error("parser command is empty")]
    EmptyCommand,

    /// I/O error reading a pre-generated tree.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Output was not a valid document tree.
    #[error("invalid parser output for {}: {source}", path.display())]
    Json {
        /// Source file the output belongs to.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Turns a content file into a parsed [`Document`].
pub trait DocumentParser {
    /// Parse the content file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the file cannot be parsed.
    fn parse(&self, path: &Path) -> Result<Document, ParseError>;
}

/// Runs an external parser process per file.
#[derive(Clone, Debug)]
pub struct CommandParser {
    program: String,
    args: Vec<String>,
}

impl CommandParser {
    /// Create a parser from a command line (`argv[0]` is the program).
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::EmptyCommand`] if `command` is empty.
    pub fn new(command: &[String]) -> Result<Self, ParseError> {
        let (program, args) = command.split_first().ok_or(ParseError::EmptyCommand)?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl DocumentParser for CommandParser {
    fn parse(&self, path: &Path) -> Result<Document, ParseError> {
        let start = Instant::now();
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .map_err(|source| ParseError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ParseError::Failed {
                path: path.to_path_buf(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let document = Document::from_json(&stdout).map_err(|source| ParseError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(
            path = %path.display(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Parsed document"
        );
        Ok(document)
    }
}

/// Reads pre-generated JSON trees.
///
/// The tree for `<source_dir>/a/b.md` is looked up as `<json_dir>/a/b.json`.
/// Without a JSON directory the tree is expected next to the source file.
#[derive(Clone, Debug)]
pub struct JsonFileParser {
    source_dir: PathBuf,
    json_dir: Option<PathBuf>,
}

impl JsonFileParser {
    /// Create a parser reading trees next to their sources.
    #[must_use]
    pub fn new(source_dir: PathBuf) -> Self {
        Self {
            source_dir,
            json_dir: None,
        }
    }

    /// Read trees from a separate directory mirroring the source layout.
    #[must_use]
    pub fn with_json_dir(mut self, json_dir: PathBuf) -> Self {
        self.json_dir = Some(json_dir);
        self
    }

    fn json_path(&self, path: &Path) -> PathBuf {
        let with_ext = path.with_extension("json");
        match &self.json_dir {
            Some(json_dir) => match with_ext.strip_prefix(&self.source_dir) {
                Ok(relative) => json_dir.join(relative),
                Err(_) => json_dir.join(with_ext.file_name().unwrap_or_default()),
            },
            None => with_ext,
        }
    }
}

impl DocumentParser for JsonFileParser {
    fn parse(&self, path: &Path) -> Result<Document, ParseError> {
        let json_path = self.json_path(path);
        let json = std::fs::read_to_string(&json_path).map_err(|source| ParseError::Io {
            path: json_path.clone(),
            source,
        })?;
        Document::from_json(&json).map_err(|source| ParseError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::ast::NodeKind;

    #[test]
    fn test_command_parser_rejects_empty_command() {
        let err = CommandParser::new(&[]).unwrap_err();
        assert!(matches!(err, ParseError::EmptyCommand));
    }

    #[test]
    fn test_command_parser_reports_missing_program() {
        let parser = CommandParser::new(&["mystpub-no-such-parser".to_owned()]).unwrap();

        let err = parser.parse(Path::new("index.md")).unwrap_err();

        assert!(matches!(err, ParseError::Spawn { .. }));
        assert!(err.to_string().contains("mystpub-no-such-parser"));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_parser_reads_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("page.json");
        fs::write(&source, r#"{"type": "root", "children": []}"#).unwrap();
        let parser = CommandParser::new(&["cat".to_owned()]).unwrap();

        let doc = parser.parse(&source).unwrap();

        assert_eq!(doc.root().kind, NodeKind::Root);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_parser_reports_failure_status() {
        let parser = CommandParser::new(&["false".to_owned()]).unwrap();

        let err = parser.parse(Path::new("index.md")).unwrap_err();

        assert!(matches!(err, ParseError::Failed { .. }));
    }

    #[test]
    fn test_json_file_parser_reads_sibling_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("intro.json"),
            r#"{"type": "root", "children": [{"type": "thematicBreak"}]}"#,
        )
        .unwrap();
        let parser = JsonFileParser::new(dir.path().to_path_buf());

        let doc = parser.parse(&dir.path().join("intro.md")).unwrap();

        assert_eq!(doc.root().children.len(), 1);
        assert_eq!(doc.root().children[0].kind, NodeKind::ThematicBreak);
    }

    #[test]
    fn test_json_file_parser_mirrors_layout_in_json_dir() {
        let dir = tempfile::tempdir().unwrap();
        let source_dir = dir.path().join("docs");
        let json_dir = dir.path().join("ast");
        fs::create_dir_all(json_dir.join("guide")).unwrap();
        fs::write(
            json_dir.join("guide/setup.json"),
            r#"{"type": "root", "children": []}"#,
        )
        .unwrap();
        let parser = JsonFileParser::new(source_dir.clone()).with_json_dir(json_dir);

        let doc = parser.parse(&source_dir.join("guide/setup.md")).unwrap();

        assert!(doc.root().children.is_empty());
    }

    #[test]
    fn test_json_file_parser_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let parser = JsonFileParser::new(dir.path().to_path_buf());

        let err = parser.parse(&dir.path().join("missing.md")).unwrap_err();

        assert!(matches!(err, ParseError::Io { .. }));
    }

    #[test]
    fn test_json_file_parser_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), "not json").unwrap();
        let parser = JsonFileParser::new(dir.path().to_path_buf());

        let err = parser.parse(&dir.path().join("bad.md")).unwrap_err();

        assert!(matches!(err, ParseError::Json { .. }));
    }
}
