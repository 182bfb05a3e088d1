//! Extract parser registry
//!
//! Each source bank registers a parser that recognizes its export filenames,
//! reads the covered date range out of the name and returns the rows of one
//! calendar month. The resolver only ever talks to the registry, so adding a
//! bank means registering one more parser.

pub mod inter;
pub mod layout;
pub mod nubank;

use chrono::NaiveDate;
use std::path::Path;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{MonthKey, MonthRows, RawExtractFile};

pub use inter::InterParser;
pub use layout::DelimitedLayout;
pub use nubank::NubankParser;

/// A bank-specific strategy for reading raw extracts
pub trait ExtractParser: Send + Sync {
    /// Bank name attached to every extract this parser accepts
    fn bank(&self) -> &str;

    /// Check whether a filename has this bank's shape
    ///
    /// This is a shape check only; the date tokens are validated by
    /// [`ExtractParser::parse_range`].
    fn can_parse(&self, filename: &str) -> bool;

    /// Read the inclusive covered range out of a filename
    fn parse_range(&self, filename: &str) -> LedgerResult<(NaiveDate, NaiveDate)>;

    /// Read the rows of `path` whose date falls in `month`
    fn read_month(&self, path: &Path, month: MonthKey) -> LedgerResult<MonthRows>;
}

/// Ordered set of registered parsers
pub struct ParserRegistry {
    parsers: Vec<Box<dyn ExtractParser>>,
}

impl ParserRegistry {
    /// Create a registry with no parsers
    pub fn empty() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Register a parser; earlier registrations win when shapes overlap
    pub fn register(&mut self, parser: Box<dyn ExtractParser>) {
        self.parsers.push(parser);
    }

    /// Builder-style registration
    pub fn with(mut self, parser: Box<dyn ExtractParser>) -> Self {
        self.register(parser);
        self
    }

    /// Find the parser whose filename shape matches
    pub fn detect(&self, filename: &str) -> Option<&dyn ExtractParser> {
        self.parsers
            .iter()
            .find(|p| p.can_parse(filename))
            .map(|p| p.as_ref())
    }

    /// Find the parser registered for a bank
    pub fn for_bank(&self, bank: &str) -> Option<&dyn ExtractParser> {
        self.parsers
            .iter()
            .find(|p| p.bank() == bank)
            .map(|p| p.as_ref())
    }

    /// Turn a path into a raw extract using the matching parser
    ///
    /// Returns `Ok(None)` when no parser recognizes the filename and a
    /// `Parse` error when the shape matches but the range is malformed.
    pub fn identify(&self, path: &Path) -> LedgerResult<Option<RawExtractFile>> {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return Ok(None),
        };

        let parser = match self.detect(filename) {
            Some(parser) => parser,
            None => return Ok(None),
        };

        let (start_date, end_date) = parser.parse_range(filename)?;
        if start_date > end_date {
            return Err(LedgerError::Parse(format!(
                "{}: range starts after it ends ({} > {})",
                filename, start_date, end_date
            )));
        }

        Ok(Some(RawExtractFile {
            bank: parser.bank().to_string(),
            path: path.to_path_buf(),
            start_date,
            end_date,
        }))
    }

    pub fn banks(&self) -> Vec<&str> {
        self.parsers.iter().map(|p| p.bank()).collect()
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl Default for ParserRegistry {
    /// Registry with every built-in bank
    fn default() -> Self {
        Self::empty()
            .with(Box::new(NubankParser::new()))
            .with(Box::new(InterParser::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_registry_detects_builtin_banks() {
        let registry = ParserRegistry::default();
        assert_eq!(registry.banks(), vec!["nubank", "inter"]);

        assert_eq!(
            registry.detect("NU_123_01JAN2023_31JAN2023.csv").map(|p| p.bank()),
            Some("nubank")
        );
        assert_eq!(
            registry
                .detect("Extrato-01-01-2023-a-31-01-2023.csv")
                .map(|p| p.bank()),
            Some("inter")
        );
        assert!(registry.detect("statement.pdf").is_none());
    }

    #[test]
    fn test_identify() {
        let registry = ParserRegistry::default();
        let path = PathBuf::from("raw/sub/NU_9_15JAN2023_10FEB2023.csv");

        let file = registry.identify(&path).unwrap().unwrap();
        assert_eq!(file.bank, "nubank");
        assert_eq!(file.path, path);
        assert_eq!(file.start_date, NaiveDate::from_ymd_opt(2023, 1, 15).unwrap());
        assert_eq!(file.end_date, NaiveDate::from_ymd_opt(2023, 2, 10).unwrap());
    }

    #[test]
    fn test_identify_unmatched_and_malformed() {
        let registry = ParserRegistry::default();
        assert!(registry.identify(Path::new("notes.txt")).unwrap().is_none());

        let err = registry
            .identify(Path::new("NU_1_99XYZ2023_31JAN2023.csv"))
            .unwrap_err();
        assert!(err.is_parse());

        let err = registry
            .identify(Path::new("NU_1_31MAR2023_01JAN2023.csv"))
            .unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_empty_registry_matches_nothing() {
        let registry = ParserRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry
            .identify(Path::new("NU_1_01JAN2023_31JAN2023.csv"))
            .unwrap()
            .is_none());
    }
}
