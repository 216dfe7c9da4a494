use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use bigdecimal::BigDecimal;
use csv::StringRecord;

use crate::error::{LoadError, LoadResult};
use crate::normalize;

/// The CSV sources of a dataset directory, in loading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFile {
    Countries,
    Planes,
    Airports,
    Airlines,
}

impl SourceFile {
    /// All sources a dataset directory must contain. Countries come before the entities
    /// referencing them.
    pub const ALL: [SourceFile; 4] = [
        SourceFile::Countries,
        SourceFile::Planes,
        SourceFile::Airports,
        SourceFile::Airlines,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            SourceFile::Countries => "countries.csv",
            SourceFile::Planes => "planes.csv",
            SourceFile::Airports => "airports.csv",
            SourceFile::Airlines => "airlines.csv",
        }
    }

    /// Name of the entity table filled from this source.
    pub fn entity(&self) -> &'static str {
        match self {
            SourceFile::Countries => "countries",
            SourceFile::Planes => "planes",
            SourceFile::Airports => "airports",
            SourceFile::Airlines => "airlines",
        }
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Paths of the four sources of a dataset directory, checked to exist.
#[derive(Debug, Clone)]
pub struct SourcePaths {
    data_dir: PathBuf,
}

impl SourcePaths {
    /// Resolves the sources under `data_dir`, failing on the first one that is missing.
    pub fn resolve(data_dir: &Path) -> LoadResult<Self> {
        for source in SourceFile::ALL {
            let path = data_dir.join(source.file_name());
            if !path.is_file() {
                return Err(LoadError::MissingSource(path));
            }
        }

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    pub fn path(&self, source: SourceFile) -> PathBuf {
        self.data_dir.join(source.file_name())
    }
}

/// A typed entity built from one row of a source.
pub trait SourceRow: Sized {
    /// The source this entity is read from.
    const SOURCE: SourceFile;

    /// Builds the entity, or returns `Ok(None)` when the row has to be skipped.
    fn from_record(record: &SourceRecord<'_>) -> LoadResult<Option<Self>>;
}

/// One data row of a source together with the header lookup.
pub struct SourceRecord<'a> {
    file: &'static str,
    columns: &'a HashMap<String, usize>,
    record: &'a StringRecord,
    line: u64,
}

impl<'a> SourceRecord<'a> {
    /// Returns the raw field of a column that the header must declare.
    fn declared_field(&self, column: &'static str) -> LoadResult<Option<&'a str>> {
        let index = self
            .columns
            .get(column)
            .ok_or(LoadError::MissingColumn {
                file: self.file,
                column,
            })?;

        Ok(self.record.get(*index))
    }

    /// Returns the raw field of a column, treating undeclared columns and short rows as missing.
    fn field(&self, column: &str) -> Option<&'a str> {
        self.columns
            .get(column)
            .and_then(|index| self.record.get(*index))
    }

    fn malformed(&self, column: &'static str, raw: Option<&str>) -> LoadError {
        LoadError::MalformedField {
            file: self.file,
            line: self.line,
            column,
            value: raw.unwrap_or_default().to_string(),
        }
    }

    fn missing(&self, column: &'static str) -> LoadError {
        LoadError::MissingRequiredField {
            file: self.file,
            line: self.line,
            column,
        }
    }

    pub fn required_int(&self, column: &'static str) -> LoadResult<i64> {
        let raw = self.declared_field(column)?;
        normalize::to_int(raw)
            .map_err(|_| self.malformed(column, raw))?
            .ok_or_else(|| self.missing(column))
    }

    pub fn required_string(&self, column: &'static str) -> LoadResult<String> {
        let raw = self.declared_field(column)?;
        normalize::to_string(raw).ok_or_else(|| self.missing(column))
    }

    pub fn optional_int(&self, column: &'static str) -> LoadResult<Option<i64>> {
        let raw = self.field(column);
        normalize::to_int(raw).map_err(|_| self.malformed(column, raw))
    }

    /// Parses an integer that, when malformed, makes the caller skip the row instead of failing.
    pub fn lenient_int(&self, column: &str) -> Option<i64> {
        normalize::to_int(self.field(column)).ok().flatten()
    }

    pub fn optional_string(&self, column: &str) -> Option<String> {
        normalize::to_string(self.field(column))
    }

    pub fn optional_decimal(&self, column: &str) -> Option<BigDecimal> {
        normalize::to_decimal(self.field(column))
    }

    pub fn line(&self) -> u64 {
        self.line
    }
}

/// Rows built from a source, plus the number of rows that were skipped.
#[derive(Debug)]
pub struct ParsedSource<T> {
    pub rows: Vec<T>,
    pub skipped: usize,
}

/// Parses the CSV `contents` of `T::SOURCE` into typed rows.
///
/// The first line is the header and columns are addressed by name. A source without any
/// content yields no rows.
pub fn parse_source<T>(contents: &[u8]) -> LoadResult<ParsedSource<T>>
where
    T: SourceRow,
{
    let file = T::SOURCE.file_name();
    let csv_error = |source| LoadError::Csv { file, source };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(contents);

    let columns: HashMap<String, usize> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .enumerate()
        .map(|(index, name)| (name.trim().to_string(), index))
        .collect();

    let mut rows = Vec::new();
    let mut skipped = 0;
    let mut record = StringRecord::new();
    while reader.read_record(&mut record).map_err(csv_error)? {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let source_record = SourceRecord {
            file,
            columns: &columns,
            record: &record,
            line,
        };

        match T::from_record(&source_record)? {
            Some(row) => rows.push(row),
            None => skipped += 1,
        }
    }

    Ok(ParsedSource { rows, skipped })
}

/// Reads and parses `T::SOURCE` from `paths`.
pub async fn read_source<T>(paths: &SourcePaths) -> LoadResult<ParsedSource<T>>
where
    T: SourceRow,
{
    let path = paths.path(T::SOURCE);
    let contents = tokio::fs::read(&path)
        .await
        .map_err(|source| LoadError::Io { path, source })?;

    parse_source(&contents)
}
