//! Character dictionary loading.
//!
//! The recognizer's vocabulary comes from a UTF-8 text file with one symbol
//! per line; line order defines symbol index 1..N, index 0 being the implicit
//! CTC blank. The dictionary is loaded once at startup and shared read-only
//! by every decode.

use crate::core::AnprError;
use std::path::Path;

/// Immutable symbol table for CTC decoding.
#[derive(Debug, Clone)]
pub struct Dictionary {
    symbols: Vec<String>,
}

impl Dictionary {
    /// Loads a dictionary file.
    ///
    /// Trailing CR/LF on each line is stripped. A missing or empty file is a
    /// fatal configuration error: the recognizer cannot produce text without
    /// a vocabulary.
    ///
    /// # Errors
    ///
    /// Returns `AnprError::ConfigError` if the file cannot be read or
    /// contains no symbols.
    pub fn load(path: &Path) -> Result<Self, AnprError> {
        let content = std::fs::read_to_string(path).map_err(|e| AnprError::ConfigError {
            message: format!(
                "failed to read character dictionary from '{}': {}",
                path.display(),
                e
            ),
        })?;

        let symbols: Vec<String> = content
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect();

        if symbols.is_empty() {
            return Err(AnprError::ConfigError {
                message: format!("character dictionary '{}' is empty", path.display()),
            });
        }

        Ok(Self { symbols })
    }

    /// Builds a dictionary from an in-memory symbol list.
    pub fn from_symbols(symbols: Vec<String>) -> Result<Self, AnprError> {
        if symbols.is_empty() {
            return Err(AnprError::config_error("symbol list is empty"));
        }
        Ok(Self { symbols })
    }

    /// Number of symbols (excluding the implicit blank).
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True when the dictionary holds no symbols. Construction forbids this;
    /// provided for completeness.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol at the given zero-based dictionary index.
    ///
    /// The decoder maps CTC class id `c` to dictionary index `c - 1`; class 0
    /// is the blank and never reaches this lookup.
    pub fn symbol(&self, index: usize) -> Option<&str> {
        self.symbols.get(index).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_dictionary() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "京").unwrap();
        writeln!(file, "A").unwrap();
        writeln!(file, "1").unwrap();

        let dict = Dictionary::load(file.path()).unwrap();
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.symbol(0), Some("京"));
        assert_eq!(dict.symbol(2), Some("1"));
        assert_eq!(dict.symbol(3), None);
    }

    #[test]
    fn test_load_strips_carriage_returns() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "A\r\nB\r\n").unwrap();

        let dict = Dictionary::load(file.path()).unwrap();
        assert_eq!(dict.symbol(0), Some("A"));
        assert_eq!(dict.symbol(1), Some("B"));
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let result = Dictionary::load(Path::new("/nonexistent/keys.txt"));
        assert!(matches!(result, Err(AnprError::ConfigError { .. })));
    }

    #[test]
    fn test_load_empty_file_is_fatal() {
        let file = NamedTempFile::new().unwrap();
        let result = Dictionary::load(file.path());
        assert!(matches!(result, Err(AnprError::ConfigError { .. })));
    }
}
