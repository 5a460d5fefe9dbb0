//! Env file loading and the ambient environment view
//!
//! `.env`-style files are parsed into an overlay that sits *beneath* the
//! real process environment: [`Environment::get`] consults the process
//! environment first and falls back to file-sourced pairs, so a variable
//! set by the calling process always outranks anything read from a file.
//! The process environment itself is never written.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EnflagError;

/// File names probed by auto-discovery, in load order.
const AUTO_ENV_FILES: &[&str] = &[".env", ".env.local", ".env.development", ".env.production"];

/// Environment lookup used by the tier resolver: the process environment
/// layered over values adopted from env files.
#[derive(Debug, Default)]
pub(crate) struct Environment {
    file_values: HashMap<String, String>,
}

impl Environment {
    pub(crate) fn get(&self, key: &str) -> Option<String> {
        env::var(key)
            .ok()
            .or_else(|| self.file_values.get(key).cloned())
    }

    /// Adopt a file-sourced pair unless the key is already visible, either
    /// in the process environment or from an earlier file.
    fn adopt(&mut self, key: &str, value: String) {
        if env::var_os(key).is_none() && !self.file_values.contains_key(key) {
            self.file_values.insert(key.to_owned(), value);
        }
    }

    /// Test constructor: a pure overlay, independent of the process
    /// environment (as long as the chosen keys are not set in it).
    #[cfg(test)]
    pub(crate) fn with_values<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            file_values: pairs
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
        }
    }
}

/// Load the requested env files into `env`.
///
/// Explicitly requested files must exist; auto-discovered conventional
/// files are probed and silently skipped when absent. On error, pairs
/// adopted from files parsed so far remain in place — the caller decides
/// whether the error aborts the load.
pub(crate) fn load_env_files(
    explicit: &[PathBuf],
    auto_load: bool,
    env: &mut Environment,
) -> Result<(), EnflagError> {
    let mut files: Vec<PathBuf> = explicit.to_vec();
    if auto_load {
        for name in AUTO_ENV_FILES {
            let path = PathBuf::from(name);
            if path.exists() {
                files.push(path);
            }
        }
    }
    for path in &files {
        load_env_file(path, env)?;
    }
    Ok(())
}

fn load_env_file(path: &Path, env: &mut Environment) -> Result<(), EnflagError> {
    let contents = fs::read_to_string(path).map_err(|source| EnflagError::EnvFile {
        path: path.to_owned(),
        source,
    })?;

    for (idx, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(EnflagError::EnvFileSyntax {
                path: path.to_owned(),
                line: idx + 1,
                content: line.to_owned(),
            });
        };

        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }

        env.adopt(key, unquote(value));
    }

    Ok(())
}

/// Strip a fully quoted value.
///
/// Double quotes unescape `\"`, `\\`, `\n`, `\r` and `\t`; single quotes
/// are verbatim; anything else passes through unchanged.
fn unquote(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"' {
        return value[1..value.len() - 1]
            .replace("\\\"", "\"")
            .replace("\\\\", "\\")
            .replace("\\n", "\n")
            .replace("\\r", "\r")
            .replace("\\t", "\t");
    }
    if bytes.len() >= 2 && bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\'' {
        return value[1..value.len() - 1].to_owned();
    }
    value.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_env_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    fn load_one(contents: &str) -> Result<Environment, EnflagError> {
        let file = write_env_file(contents);
        let mut env = Environment::default();
        load_env_files(&[file.path().to_owned()], false, &mut env)?;
        Ok(env)
    }

    #[test]
    fn parses_key_value_pairs() {
        let env = load_one("ENFLAG_T_HOST=localhost\nENFLAG_T_PORT=5432\n").unwrap();
        assert_eq!(env.get("ENFLAG_T_HOST").unwrap(), "localhost");
        assert_eq!(env.get("ENFLAG_T_PORT").unwrap(), "5432");
    }

    #[test]
    fn skips_blank_lines_and_comments() {
        let env = load_one("\n# a comment\n   # indented comment\nENFLAG_T_KEY=v\n\n").unwrap();
        assert_eq!(env.get("ENFLAG_T_KEY").unwrap(), "v");
    }

    #[test]
    fn trims_whitespace_around_key_and_value() {
        let env = load_one("  ENFLAG_T_PAD  =  padded value  \n").unwrap();
        assert_eq!(env.get("ENFLAG_T_PAD").unwrap(), "padded value");
    }

    #[test]
    fn splits_on_first_equals_only() {
        let env = load_one("ENFLAG_T_URL=postgres://u:p@host/db?a=1\n").unwrap();
        assert_eq!(env.get("ENFLAG_T_URL").unwrap(), "postgres://u:p@host/db?a=1");
    }

    #[test]
    fn line_without_equals_is_an_error_with_line_number() {
        let err = load_one("ENFLAG_T_OK=1\nJUST_A_WORD\n").unwrap_err();
        match err {
            EnflagError::EnvFileSyntax { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "JUST_A_WORD");
            }
            other => panic!("expected EnvFileSyntax, got {other:?}"),
        }
    }

    #[test]
    fn empty_key_or_value_is_skipped() {
        let env = load_one("=orphan\nENFLAG_T_EMPTY=\nENFLAG_T_KEPT=yes\n").unwrap();
        assert!(env.get("ENFLAG_T_EMPTY").is_none());
        assert_eq!(env.get("ENFLAG_T_KEPT").unwrap(), "yes");
    }

    #[test]
    fn double_quotes_unescape() {
        let env = load_one(r#"ENFLAG_T_MSG="line1\nline2 \"quoted\" \t end""#).unwrap();
        assert_eq!(
            env.get("ENFLAG_T_MSG").unwrap(),
            "line1\nline2 \"quoted\" \t end"
        );
    }

    #[test]
    fn single_quotes_are_verbatim() {
        let env = load_one(r"ENFLAG_T_RAW='raw\nstring'").unwrap();
        assert_eq!(env.get("ENFLAG_T_RAW").unwrap(), r"raw\nstring");
    }

    #[test]
    fn unquoted_value_passes_through() {
        let env = load_one(r"ENFLAG_T_PLAIN=a\nb").unwrap();
        assert_eq!(env.get("ENFLAG_T_PLAIN").unwrap(), r"a\nb");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let mut env = Environment::default();
        let err = load_env_files(
            &[PathBuf::from("/nonexistent/enflag/.env")],
            false,
            &mut env,
        )
        .unwrap_err();
        assert!(matches!(err, EnflagError::EnvFile { .. }));
    }

    #[test]
    fn earlier_file_wins_within_overlay() {
        let first = write_env_file("ENFLAG_T_DUP=first\n");
        let second = write_env_file("ENFLAG_T_DUP=second\n");
        let mut env = Environment::default();
        load_env_files(
            &[first.path().to_owned(), second.path().to_owned()],
            false,
            &mut env,
        )
        .unwrap();
        assert_eq!(env.get("ENFLAG_T_DUP").unwrap(), "first");
    }

    #[test]
    fn pairs_before_a_failing_file_are_retained() {
        let good = write_env_file("ENFLAG_T_BEFORE=kept\n");
        let mut env = Environment::default();
        let result = load_env_files(
            &[good.path().to_owned(), PathBuf::from("/nonexistent/enflag/.env")],
            false,
            &mut env,
        );
        assert!(result.is_err());
        assert_eq!(env.get("ENFLAG_T_BEFORE").unwrap(), "kept");
    }

    #[test]
    #[serial]
    fn real_environment_wins_over_file_value() {
        env::set_var("ENFLAG_T_REAL", "from-process");
        let env_view = load_one("ENFLAG_T_REAL=from-file\n").unwrap();
        assert_eq!(env_view.get("ENFLAG_T_REAL").unwrap(), "from-process");
        env::remove_var("ENFLAG_T_REAL");
    }

    #[test]
    #[serial]
    fn auto_discovered_files_are_optional() {
        // Run from a directory with none of the conventional files present.
        let dir = tempfile::tempdir().unwrap();
        let original = env::current_dir().unwrap();
        env::set_current_dir(dir.path()).unwrap();

        let mut env_view = Environment::default();
        let result = load_env_files(&[], true, &mut env_view);

        env::set_current_dir(original).unwrap();
        result.unwrap();
    }

    #[test]
    #[serial]
    fn auto_discovery_picks_up_conventional_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "ENFLAG_T_AUTO=base\n").unwrap();
        std::fs::write(dir.path().join(".env.local"), "ENFLAG_T_AUTO=local\nENFLAG_T_ONLY_LOCAL=1\n")
            .unwrap();
        let original = env::current_dir().unwrap();
        env::set_current_dir(dir.path()).unwrap();

        let mut env_view = Environment::default();
        let result = load_env_files(&[], true, &mut env_view);

        env::set_current_dir(original).unwrap();
        result.unwrap();
        // .env loads first, so its value sticks.
        assert_eq!(env_view.get("ENFLAG_T_AUTO").unwrap(), "base");
        assert_eq!(env_view.get("ENFLAG_T_ONLY_LOCAL").unwrap(), "1");
    }
}
