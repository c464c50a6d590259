//! CSV export of transactions.

use std::io;

use chrono::NaiveDate;
use csv::{QuoteStyle, WriterBuilder};

use super::record::Transaction;

const CSV_HEADERS: [&str; 6] = ["Date", "Vendor", "Category", "Type", "Amount", "Currency"];

/// Writes transactions as CSV with every field quoted.
pub fn write_csv<'a, W, I>(writer: W, transactions: I) -> Result<(), csv::Error>
where
    W: io::Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut out = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);
    out.write_record(CSV_HEADERS)?;

    for t in transactions {
        let amount = t.amount.to_string();
        out.write_record([
            t.date.as_str(),
            t.vendor.as_str(),
            t.category.as_str(),
            t.kind.as_str(),
            amount.as_str(),
            t.currency.as_str(),
        ])?;
    }

    out.flush()?;
    Ok(())
}

/// Renders transactions as a CSV string.
pub fn to_csv<'a, I>(transactions: I) -> Result<String, csv::Error>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut buffer = Vec::new();
    write_csv(&mut buffer, transactions)?;
    String::from_utf8(buffer)
        .map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Default export filename for the given day, e.g. `FinVision_Export_2024-01-15.csv`.
pub fn export_filename(day: NaiveDate) -> String {
    format!("FinVision_Export_{}.csv", day.format("%Y-%m-%d"))
}
