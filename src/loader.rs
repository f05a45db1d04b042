#![cfg(not(tarpaulin_include))]
use crate::error::{LoadError, SchemaError};
use crate::record::{COLUMNS, Money, SalesRecord};
use crate::table::SalesTable;
use chrono::{Days, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use std::fs;
use std::path::Path;

/// Rows above the header that carry the sheet's title banner.
pub const BANNER_ROWS: usize = 3;

/// Throwaway columns to the left of the data.
pub const LEADING_COLUMNS: usize = 1;

/// A cell as read from the source file, before column typing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl RawCell {
    fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn describe(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(s) => s.clone(),
            RawCell::Number(n) => n.to_string(),
            RawCell::Date(d) => d.to_string(),
        }
    }
}

/// Detect file type and load the sales table from it
///
/// CSV files are read with the csv crate; Excel and OpenDocument
/// workbooks go through calamine. Both paths share the same cleaning pass.
///
/// # Examples
/// ```no_run
/// use sales_dashboard::loader::load_table;
///
/// match load_table("Adidas_US_Sales_Datasets.xlsx") {
///     Ok(table) => println!("Loaded {} sales records", table.len()),
///     Err(e) => eprintln!("Error loading file: {}", e),
/// }
/// ```
pub fn load_table(filepath: impl AsRef<Path>) -> Result<SalesTable, LoadError> {
    let path = filepath.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    let table = match extension.as_deref() {
        Some("csv") => from_csv(path)?,
        #[cfg(feature = "web")]
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => from_excel(path)?,
        #[cfg(not(feature = "web"))]
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => {
            return Err(LoadError::UnsupportedFormat(
                "spreadsheet support requires the 'web' feature".to_string(),
            ));
        }
        Some(ext) => return Err(LoadError::UnsupportedFormat(ext.to_string())),
        None => {
            return Err(LoadError::UnsupportedFormat(format!(
                "{} has no extension",
                path.display()
            )));
        }
    };

    log::info!("loaded {} sales records from {}", table.len(), path.display());
    Ok(table)
}

/// Load the sales table from a CSV export of the sheet.
///
/// Quoted fields may span lines. Zero-length lines carry no record and are
/// dropped by the reader; a blank sheet row is a line of bare separators.
pub fn from_csv(filepath: impl AsRef<Path>) -> Result<SalesTable, LoadError> {
    let path = filepath.as_ref();
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        grid.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(clean(grid)?)
}

/// Load the sales table from the first worksheet of a workbook.
#[cfg(feature = "web")]
pub fn from_excel(filepath: impl AsRef<Path>) -> Result<SalesTable, LoadError> {
    use calamine::{Data, Reader, open_workbook_auto};

    let path = filepath.as_ref();
    let workbook_error = |e: calamine::Error| match e {
        calamine::Error::Io(source) => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => LoadError::Workbook {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    };

    // calamine folds open failures into its per-format errors
    fs::metadata(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LoadError::EmptyWorkbook(path.to_path_buf()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(workbook_error)?;

    // The used range may start below or right of A1; pad it back so the
    // banner offsets are measured from the sheet origin.
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut grid: Vec<Vec<RawCell>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![RawCell::Empty; col_offset];
        cells.extend(row.iter().map(|cell| match cell {
            Data::Empty => RawCell::Empty,
            Data::String(s) => RawCell::Text(s.clone()),
            Data::Int(i) => RawCell::Number(*i as f64),
            Data::Float(f) => RawCell::Number(*f),
            Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
                Some(date) => RawCell::Date(date),
                None => RawCell::Number(dt.as_f64()),
            },
            other => RawCell::Text(other.to_string()),
        }));
        grid.push(cells);
    }

    Ok(clean(grid)?)
}

/// Turn a raw sheet grid into typed records
///
/// Drops the banner rows and the leading column, skips blank rows, checks the
/// header against [`COLUMNS`] and coerces every data row. Row numbers in
/// errors are 1-based sheet rows.
pub fn clean(grid: Vec<Vec<RawCell>>) -> Result<SalesTable, SchemaError> {
    let mut rows = grid
        .into_iter()
        .enumerate()
        .skip(BANNER_ROWS)
        .map(|(index, row)| {
            let cells: Vec<RawCell> = row.into_iter().skip(LEADING_COLUMNS).collect();
            (index + 1, cells)
        })
        .filter(|(_, cells)| !cells.iter().all(RawCell::is_empty));

    let (_, header) = rows.next().ok_or(SchemaError::MissingHeader)?;
    validate_header(&header)?;

    let records = rows
        .map(|(row, cells)| parse_record(row, &cells))
        .collect::<Result<Vec<_>, _>>()?;

    if records.is_empty() {
        return Err(SchemaError::NoRecords);
    }

    Ok(SalesTable::new(records))
}

fn validate_header(header: &[RawCell]) -> Result<(), SchemaError> {
    let mut names: Vec<String> = header
        .iter()
        .map(|cell| cell.describe().trim().to_string())
        .collect();
    while names.last().is_some_and(|name| name.is_empty()) {
        names.pop();
    }

    if let Some(missing) = COLUMNS
        .iter()
        .find(|column| !names.iter().any(|name| name == *column))
    {
        return Err(SchemaError::MissingColumn(missing.to_string()));
    }

    if names.len() != COLUMNS.len() {
        return Err(SchemaError::ColumnCount {
            expected: COLUMNS.len(),
            found: names.len(),
        });
    }

    for (position, (expected, found)) in COLUMNS.iter().zip(&names).enumerate() {
        if expected != found {
            return Err(SchemaError::HeaderMismatch {
                position: position + 1,
                expected: expected.to_string(),
                found: found.clone(),
            });
        }
    }

    Ok(())
}

fn parse_record(row: usize, cells: &[RawCell]) -> Result<SalesRecord, SchemaError> {
    // Data past the last header column has nowhere to go
    if let Some(last) = cells
        .iter()
        .rposition(|cell| !cell.is_empty())
        .filter(|&last| last >= COLUMNS.len())
    {
        return Err(SchemaError::ColumnCount {
            expected: COLUMNS.len(),
            found: last + 1,
        });
    }

    let reader = RowReader { row, cells };
    Ok(SalesRecord {
        retailer: reader.string(0)?,
        retailer_id: reader.integer(1)?,
        invoice_date: reader.date(2)?,
        region: reader.string(3)?,
        state: reader.string(4)?,
        city: reader.string(5)?,
        product: reader.string(6)?,
        price_per_unit: reader.money(7)?,
        units_sold: reader.integer(8)?,
        total_sales: reader.money(9)?,
        operating_profit: reader.money(10)?,
        operating_margin: reader.fraction(11)?,
        sales_method: reader.string(12)?,
    })
}

struct RowReader<'a> {
    row: usize,
    cells: &'a [RawCell],
}

impl RowReader<'_> {
    fn cell(&self, column: usize) -> &RawCell {
        self.cells.get(column).unwrap_or(&RawCell::Empty)
    }

    fn fail(&self, column: usize, expected: &'static str) -> SchemaError {
        SchemaError::Coercion {
            row: self.row,
            column: COLUMNS[column].to_string(),
            value: self.cell(column).describe(),
            expected,
        }
    }

    fn string(&self, column: usize) -> Result<String, SchemaError> {
        match self.cell(column) {
            RawCell::Text(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            RawCell::Number(n) if n.fract() == 0.0 => Ok(format!("{}", *n as i64)),
            RawCell::Number(n) => Ok(n.to_string()),
            _ => Err(self.fail(column, "text")),
        }
    }

    fn integer(&self, column: usize) -> Result<i64, SchemaError> {
        let value = match self.cell(column) {
            RawCell::Number(n) => Some(*n),
            RawCell::Text(s) => s.trim().replace(',', "").parse::<f64>().ok(),
            _ => None,
        };
        match value {
            Some(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                Ok(n as i64)
            }
            _ => Err(self.fail(column, "an integer")),
        }
    }

    fn money(&self, column: usize) -> Result<Money, SchemaError> {
        let value = match self.cell(column) {
            RawCell::Number(n) => Money::from_f64(*n),
            RawCell::Text(s) => Money::parse(s),
            _ => None,
        };
        value.ok_or_else(|| self.fail(column, "a currency amount"))
    }

    fn date(&self, column: usize) -> Result<NaiveDate, SchemaError> {
        let value = match self.cell(column) {
            RawCell::Date(d) => Some(*d),
            RawCell::Number(n) => excel_serial_to_date(*n),
            RawCell::Text(s) => parse_date_text(s),
            RawCell::Empty => None,
        };
        value.ok_or_else(|| self.fail(column, "a date"))
    }

    fn fraction(&self, column: usize) -> Result<f64, SchemaError> {
        let value = match self.cell(column) {
            RawCell::Number(n) => Some(*n),
            RawCell::Text(s) => {
                let s = s.trim();
                match s.strip_suffix('%') {
                    Some(percent) => percent.trim().parse::<f64>().ok().map(|p| p / 100.0),
                    None => s.parse::<f64>().ok(),
                }
            }
            _ => None,
        };
        value
            .filter(|n| n.is_finite())
            .ok_or_else(|| self.fail(column, "a fraction"))
    }
}

/// Excel stores dates as days since 1899-12-30 (the epoch absorbs the
/// phantom 1900-02-29). The time-of-day fraction is discarded.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    // %y before %Y so that "1/5/21" is not read as the year 21
    for format in ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }
    None
}
