//! Bhavcopy CSV parsing.
//!
//! Columns are matched by header name, not position. Numeric cells that do
//! not parse are stored as zero and reported in `ParsedRow::defaulted`, so a
//! single malformed cell never drops the row. Cells that are not valid UTF-8
//! are decoded lossily.

use std::borrow::Cow;

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};

use crate::errors::Result;
use crate::stocks::Stock;

/// One parsed record plus the columns whose value had to be defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub stock: Stock,
    pub defaulted: Vec<&'static str>,
}

/// All records read from a CSV member.
#[derive(Debug, Clone, Default)]
pub struct ParsedBatch {
    pub stocks: Vec<Stock>,
    pub rows_read: usize,
    /// Rows with at least one defaulted field
    pub defaulted_rows: usize,
}

fn parse_price(cell: &str, column: &'static str, defaulted: &mut Vec<&'static str>) -> f64 {
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => {
            defaulted.push(column);
            0.0
        }
    }
}

fn parse_amount(cell: &str, column: &'static str, defaulted: &mut Vec<&'static str>) -> f64 {
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            defaulted.push(column);
            0.0
        }
    }
}

fn parse_count(cell: &str, column: &'static str, defaulted: &mut Vec<&'static str>) -> i64 {
    match cell.parse::<i64>() {
        Ok(value) if value >= 0 => value,
        _ => {
            defaulted.push(column);
            0
        }
    }
}

/// Maps a header and a data row to a stock. Never fails.
///
/// Unknown columns are ignored. Cells past the end of the header, and header
/// columns past the end of the row, are skipped.
pub fn parse_row(header: &[String], row: &[String]) -> ParsedRow {
    let mut stock = Stock::default();
    let mut defaulted = Vec::new();

    for (column, cell) in header.iter().zip(row.iter()) {
        let cell = cell.trim();
        match column.trim().to_ascii_uppercase().as_str() {
            "SC_CODE" => stock.code = cell.to_string(),
            "SC_NAME" => stock.name = cell.to_string(),
            "SC_GROUP" => stock.group = cell.to_string(),
            "SC_TYPE" => stock.stock_type = cell.to_string(),
            "OPEN" => stock.open = parse_price(cell, "OPEN", &mut defaulted),
            "HIGH" => stock.high = parse_price(cell, "HIGH", &mut defaulted),
            "LOW" => stock.low = parse_price(cell, "LOW", &mut defaulted),
            "CLOSE" => stock.close = parse_price(cell, "CLOSE", &mut defaulted),
            "LAST" => stock.last = parse_price(cell, "LAST", &mut defaulted),
            "PREVCLOSE" => stock.prev_close = parse_price(cell, "PREVCLOSE", &mut defaulted),
            "NO_TRADES" => stock.no_trades = parse_count(cell, "NO_TRADES", &mut defaulted),
            "NO_OF_SHRS" => stock.no_of_shares = parse_count(cell, "NO_OF_SHRS", &mut defaulted),
            // Turnover is published with thousands separators
            "NET_TURNOV" => {
                stock.net_turnover =
                    parse_amount(&cell.replace(',', ""), "NET_TURNOV", &mut defaulted)
            }
            _ => {}
        }
    }

    ParsedRow { stock, defaulted }
}

/// Decodes a cell, replacing invalid UTF-8 sequences. Returns true when a
/// replacement was needed.
fn decode_cell(bytes: &[u8]) -> (String, bool) {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => (text.to_string(), false),
        Cow::Owned(text) => (text, true),
    }
}

/// Reads a whole CSV member. The first record is the header.
///
/// Only structural CSV failures are errors; bad field values are defaulted.
pub fn parse_csv(bytes: &[u8]) -> Result<ParsedBatch> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let header: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|cell| decode_cell(cell).0)
        .collect();
    let mut batch = ParsedBatch::default();
    let mut lossy_rows = 0usize;

    for record in reader.byte_records() {
        let record = record?;
        if record.iter().all(|cell| cell.iter().all(u8::is_ascii_whitespace)) {
            continue;
        }
        let mut lossy = false;
        let row: Vec<String> = record
            .iter()
            .map(|cell| {
                let (text, replaced) = decode_cell(cell);
                lossy |= replaced;
                text
            })
            .collect();
        let parsed = parse_row(&header, &row);
        batch.rows_read += 1;
        if lossy {
            lossy_rows += 1;
            debug!(
                "Row {} ({}): invalid UTF-8 replaced",
                batch.rows_read, parsed.stock.code
            );
        }
        if !parsed.defaulted.is_empty() {
            batch.defaulted_rows += 1;
            debug!(
                "Row {} ({}): defaulted {:?}",
                batch.rows_read, parsed.stock.code, parsed.defaulted
            );
        }
        batch.stocks.push(parsed.stock);
    }

    if lossy_rows > 0 {
        warn!(
            "{} of {} rows contained invalid UTF-8",
            lossy_rows, batch.rows_read
        );
    }
    if batch.defaulted_rows > 0 {
        warn!(
            "{} of {} rows had fields defaulted to zero",
            batch.defaulted_rows, batch.rows_read
        );
    }
    Ok(batch)
}

/// Reads the trade date from a bhavcopy member name such as `EQ250124.CSV`.
pub fn trade_date_from_member_name(name: &str) -> Option<NaiveDate> {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let upper = file_name.to_ascii_uppercase();
    let digits = upper.strip_prefix("EQ")?.get(..6)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(digits, "%d%m%y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    const SAMPLE: &str = "SC_CODE,SC_NAME,SC_GROUP,SC_TYPE,OPEN,HIGH,LOW,CLOSE,LAST,PREVCLOSE,NO_TRADES,NO_OF_SHRS,NET_TURNOV,TDCLOINDI\n\
500002,ABB LTD.    ,A ,Q,4300.00,4391.50,4285.05,4370.65,4370.65,4296.15,2846,14527,\"63,201,812.00\",\n\
500003,AEGISLOG    ,A ,Q,abc,512.00,498.10,505.95,506.00,500.20,5110,75123,38017524.00,\n";

    #[test]
    fn test_parse_row_maps_by_name_not_position() {
        let header = strings(&["CLOSE", "SC_NAME", "SC_CODE"]);
        let row = strings(&["12.5", "ACME", "A1"]);
        let parsed = parse_row(&header, &row);
        assert_eq!(parsed.stock.code, "A1");
        assert_eq!(parsed.stock.name, "ACME");
        assert_eq!(parsed.stock.close, 12.5);
        assert!(parsed.defaulted.is_empty());
    }

    #[test]
    fn test_unparsable_open_defaults_to_zero() {
        let header = strings(&["SC_CODE", "OPEN", "CLOSE", "NO_TRADES"]);
        let row = strings(&["X", "abc", "10.0", "7"]);
        let parsed = parse_row(&header, &row);
        assert_eq!(parsed.stock.open, 0.0);
        assert_eq!(parsed.stock.close, 10.0);
        assert_eq!(parsed.stock.no_trades, 7);
        assert_eq!(parsed.stock.code, "X");
        assert_eq!(parsed.defaulted, vec!["OPEN"]);
    }

    #[test]
    fn test_negative_and_non_finite_values_default() {
        let header = strings(&["HIGH", "LOW", "NO_OF_SHRS"]);
        let row = strings(&["-1", "NaN", "-5"]);
        let parsed = parse_row(&header, &row);
        assert_eq!(parsed.stock.high, 0.0);
        assert_eq!(parsed.stock.low, 0.0);
        assert_eq!(parsed.stock.no_of_shares, 0);
        assert_eq!(parsed.defaulted, vec!["HIGH", "LOW", "NO_OF_SHRS"]);
    }

    #[test]
    fn test_net_turnover_strips_commas() {
        let header = strings(&["NET_TURNOV"]);
        let row = strings(&["1,234,567.50"]);
        assert_eq!(parse_row(&header, &row).stock.net_turnover, 1_234_567.5);
    }

    #[test]
    fn test_negative_net_turnover_is_kept() {
        let header = strings(&["NET_TURNOV", "CLOSE"]);
        let row = strings(&["-1,250.75", "4.0"]);
        let parsed = parse_row(&header, &row);
        assert_eq!(parsed.stock.net_turnover, -1_250.75);
        assert!(parsed.defaulted.is_empty());
    }

    #[test]
    fn test_unknown_columns_and_short_rows() {
        let header = strings(&["SC_CODE", "MYSTERY", "CLOSE", "LAST"]);
        let row = strings(&["A", "whatever", "3.5"]);
        let parsed = parse_row(&header, &row);
        assert_eq!(parsed.stock.code, "A");
        assert_eq!(parsed.stock.close, 3.5);
        assert_eq!(parsed.stock.last, 0.0);
        assert!(parsed.defaulted.is_empty());
    }

    #[test]
    fn test_parse_csv_sample() {
        let batch = parse_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(batch.rows_read, 2);
        assert_eq!(batch.defaulted_rows, 1);

        let abb = &batch.stocks[0];
        assert_eq!(abb.code, "500002");
        assert_eq!(abb.name, "ABB LTD.");
        assert_eq!(abb.group, "A");
        assert_eq!(abb.stock_type, "Q");
        assert_eq!(abb.close, 4370.65);
        assert_eq!(abb.no_trades, 2846);
        assert_eq!(abb.net_turnover, 63_201_812.0);
        assert!(!abb.is_favorite);

        let aegis = &batch.stocks[1];
        assert_eq!(aegis.open, 0.0);
        assert_eq!(aegis.close, 505.95);
    }

    #[test]
    fn test_parse_csv_skips_blank_lines() {
        let csv = "SC_CODE,CLOSE\nA,1\n,\nB,2\n";
        let batch = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(batch.stocks.len(), 2);
    }

    #[test]
    fn test_parse_csv_decodes_invalid_utf8_lossily() {
        let csv: &[u8] =
            b"SC_CODE,SC_NAME,CLOSE\n500001,GOOD LTD,10\n500002,SOCI\xC9TE LTD,20\n500003,OTHER,30\n";
        let batch = parse_csv(csv).unwrap();
        assert_eq!(batch.rows_read, 3);
        assert_eq!(batch.defaulted_rows, 0);

        let codes: Vec<&str> = batch.stocks.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["500001", "500002", "500003"]);
        assert_eq!(batch.stocks[1].name, "SOCI\u{FFFD}TE LTD");
        assert_eq!(batch.stocks[1].close, 20.0);
    }

    #[test]
    fn test_trade_date_from_member_name() {
        assert_eq!(
            trade_date_from_member_name("EQ250124.CSV"),
            NaiveDate::from_ymd_opt(2024, 1, 25)
        );
        assert_eq!(
            trade_date_from_member_name("folder/eq010223.csv"),
            NaiveDate::from_ymd_opt(2023, 2, 1)
        );
        assert_eq!(trade_date_from_member_name("prices.csv"), None);
        assert_eq!(trade_date_from_member_name("EQ999999.CSV"), None);
    }
}
