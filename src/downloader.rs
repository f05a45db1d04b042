#![cfg(not(tarpaulin_include))]
use crate::loader::{BANNER_ROWS, LEADING_COLUMNS};
use crate::record::{COLUMNS, SalesRecord};
use crate::table::SalesTable;
use chrono::{Datelike, NaiveDate};

const BANNER_TITLE: &str = "Sales Export";

/// Convert a sales table to CSV format
///
/// The output keeps the source layout (title banner, leading blank column,
/// header row) so an exported file can be fed straight back to the loader.
/// Fields containing commas, quotes or newlines are quoted.
///
/// # Examples
/// ```
/// use sales_dashboard::downloader::to_csv;
/// use sales_dashboard::table::SalesTable;
///
/// let csv = to_csv(&SalesTable::default());
/// assert!(csv.contains(",Retailer,Retailer ID,Invoice Date"));
/// ```
pub fn to_csv(table: &SalesTable) -> String {
    let mut csv_content = String::new();

    // Blank banner rows keep their separator so CSV readers still count them
    for row in 0..BANNER_ROWS {
        csv_content.push_str(&",".repeat(LEADING_COLUMNS));
        if row == 0 {
            csv_content.push_str(BANNER_TITLE);
        }
        csv_content.push('\n');
    }

    push_csv_row(&mut csv_content, COLUMNS.iter().map(|c| c.to_string()));
    for record in table {
        push_csv_row(&mut csv_content, export_fields(record));
    }

    csv_content
}

fn push_csv_row(csv_content: &mut String, fields: impl Iterator<Item = String>) {
    csv_content.push_str(&",".repeat(LEADING_COLUMNS));
    for (i, value) in fields.enumerate() {
        if i > 0 {
            csv_content.push(',');
        }
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            let escaped = value.replace('"', "\"\"");
            csv_content.push_str(&format!("\"{}\"", escaped));
        } else {
            csv_content.push_str(&value);
        }
    }
    csv_content.push('\n');
}

// Machine-readable values: plain decimals, ISO dates, full-precision margin
fn export_fields(record: &SalesRecord) -> impl Iterator<Item = String> {
    [
        record.retailer.clone(),
        record.retailer_id.to_string(),
        record.invoice_date.format("%Y-%m-%d").to_string(),
        record.region.clone(),
        record.state.clone(),
        record.city.clone(),
        record.product.clone(),
        record.price_per_unit.to_string(),
        record.units_sold.to_string(),
        record.total_sales.to_string(),
        record.operating_profit.to_string(),
        record.operating_margin.to_string(),
        record.sales_method.clone(),
    ]
    .into_iter()
}

/// Convert a sales table to XLSX format
///
/// Uses the same layout as [`to_csv`]. Invoice dates are written as Excel
/// serial numbers with a date format so spreadsheet tools show them as dates.
#[cfg(feature = "web")]
pub fn to_xlsx(table: &SalesTable) -> Result<Vec<u8>, rust_xlsxwriter::XlsxError> {
    use rust_xlsxwriter::{Format, Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name("Sales")?;

    let first_col = LEADING_COLUMNS as u16;
    let header_row = BANNER_ROWS as u32;
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    worksheet.write_string(0, first_col, BANNER_TITLE)?;
    for (c, name) in COLUMNS.iter().enumerate() {
        worksheet.write_string(header_row, first_col + c as u16, *name)?;
    }

    for (r, record) in table.iter().enumerate() {
        let row = header_row + 1 + r as u32;
        let col = |offset: u16| first_col + offset;

        worksheet.write_string(row, col(0), &record.retailer)?;
        worksheet.write_number(row, col(1), record.retailer_id as f64)?;
        worksheet.write_number_with_format(
            row,
            col(2),
            excel_serial(record.invoice_date),
            &date_format,
        )?;
        worksheet.write_string(row, col(3), &record.region)?;
        worksheet.write_string(row, col(4), &record.state)?;
        worksheet.write_string(row, col(5), &record.city)?;
        worksheet.write_string(row, col(6), &record.product)?;
        worksheet.write_number(row, col(7), record.price_per_unit.to_f64())?;
        worksheet.write_number(row, col(8), record.units_sold as f64)?;
        worksheet.write_number(row, col(9), record.total_sales.to_f64())?;
        worksheet.write_number(row, col(10), record.operating_profit.to_f64())?;
        worksheet.write_number(row, col(11), record.operating_margin)?;
        worksheet.write_string(row, col(12), &record.sales_method)?;
    }

    workbook.push_worksheet(worksheet);

    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}

// Days from 0001-01-01 to the Excel epoch, 1899-12-30
#[cfg(feature = "web")]
const EXCEL_EPOCH_DAYS_FROM_CE: i32 = 693_594;

#[cfg(feature = "web")]
fn excel_serial(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce() - EXCEL_EPOCH_DAYS_FROM_CE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Money;

    fn record(retailer: &str) -> SalesRecord {
        SalesRecord {
            retailer: retailer.to_string(),
            retailer_id: 1185732,
            invoice_date: NaiveDate::from_ymd_opt(2021, 1, 5).unwrap(),
            region: "West".to_string(),
            state: "California".to_string(),
            city: "San Francisco".to_string(),
            product: "Men's Street Footwear".to_string(),
            price_per_unit: Money::from_cents(5000),
            units_sold: 20,
            total_sales: Money::from_cents(100_000),
            operating_profit: Money::from_cents(35_000),
            operating_margin: 0.35,
            sales_method: "In-store".to_string(),
        }
    }

    #[test]
    fn csv_keeps_loader_layout() {
        let csv = to_csv(&SalesTable::new(vec![record("Foot Locker")]));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], ",Sales Export");
        assert_eq!(lines[1], ",");
        assert_eq!(lines[2], ",");
        assert!(lines[3].starts_with(",Retailer,Retailer ID,Invoice Date,Region"));
        assert!(lines[4].starts_with(",Foot Locker,1185732,2021-01-05,West"));
    }

    #[test]
    fn csv_quotes_awkward_fields() {
        let csv = to_csv(&SalesTable::new(vec![record("Kohl's, \"Outlet\"")]));
        assert!(csv.contains(",\"Kohl's, \"\"Outlet\"\"\",1185732"));
    }

    #[cfg(feature = "web")]
    #[test]
    fn serial_matches_excel_epoch() {
        assert_eq!(excel_serial(NaiveDate::from_ymd_opt(2021, 1, 5).unwrap()), 44201.0);
    }
}
