use std::path::PathBuf;

/// Failure to turn the source file into a [`SalesTable`](crate::table::SalesTable).
///
/// Every variant is fatal at startup; there is no partial-data fallback.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The extension is not one of the supported spreadsheet formats.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The CSV text could not be split into records.
    #[error("cannot parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The workbook container itself is corrupt or unreadable.
    #[error("cannot parse workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// The workbook has no worksheets.
    #[error("workbook {0} contains no worksheets")]
    EmptyWorkbook(PathBuf),

    /// The sheet was read but does not match the sales layout.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Mismatch between the sheet contents and the expected sales columns.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// Nothing follows the banner rows.
    #[error("no header row found after the banner")]
    MissingHeader,

    /// A required column name does not appear in the header.
    #[error("header is missing column \"{0}\"")]
    MissingColumn(String),

    /// The header carries more (or fewer) columns than expected.
    #[error("expected {expected} columns, header has {found}")]
    ColumnCount { expected: usize, found: usize },

    /// Header names are all present but out of order.
    #[error("column {position} should be \"{expected}\", found \"{found}\"")]
    HeaderMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    /// A cell could not be converted to its column type.
    #[error("row {row}, column \"{column}\": cannot read \"{value}\" as {expected}")]
    Coercion {
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },

    /// The header is followed by no data rows.
    #[error("sheet has a header but no data rows")]
    NoRecords,
}

/// Failure while drawing a chart or rendering the page template.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("chart drawing failed: {0}")]
    Chart(String),

    #[cfg(feature = "web")]
    #[error("template rendering failed: {0}")]
    Template(#[from] handlebars::RenderError),
}

/// Top-level error for the dashboard binary.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[cfg(feature = "web")]
    #[error("template registration failed: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
