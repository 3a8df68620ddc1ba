//! CSV rendering of stock listings.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, TimeZone, Utc};

use crate::types::Stock;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

pub const CSV_HEADERS: [&str; 6] = ["ID", "商品名", "価格", "在庫数", "作成日時", "更新日時"];

/// Render `price` with a `,` between every group of three digits.
///
/// Anything below 1000, negative values included, is rendered as a plain
/// integer.
pub fn format_price_with_comma(price: i64) -> String {
    let digits = price.to_string();
    if price < 1000 {
        return digits;
    }

    let n = digits.len();
    let mut out = String::with_capacity(n + n / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (n - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Neutralize values that a spreadsheet would evaluate as a formula.
pub fn sanitize_csv_field(field: &str) -> Cow<'_, str> {
    match field.as_bytes().first() {
        Some(b'=' | b'+' | b'-' | b'@') => Cow::Owned(format!("'{field}")),
        _ => Cow::Borrowed(field),
    }
}

/// `YYYY/MM/DD HH:MM:SS` in the timestamp's own offset.
pub fn format_date_time<Tz>(t: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    t.format("%Y/%m/%d %H:%M:%S").to_string()
}

/// Attachment name for an export taken at `now`.
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("stocks_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Write the header row followed by one row per stock, preserving order.
pub fn write_stocks_csv(stocks: &[Stock]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for stock in stocks {
        writer.write_record([
            stock.id.to_string(),
            sanitize_csv_field(&stock.name).into_owned(),
            format_price_with_comma(stock.price),
            stock.quantity.to_string(),
            format_date_time(&stock.created_at),
            format_date_time(&stock.updated_at),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn stock(id: i64, name: &str, price: i64, quantity: i64) -> Stock {
        let created = Utc.with_ymd_and_hms(2024, 8, 1, 9, 5, 3).unwrap();
        let updated = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        Stock {
            id,
            name: name.to_string(),
            price,
            quantity,
            store_id: "store-1".to_string(),
            user_id: "user-1".to_string(),
            created_at: created,
            updated_at: updated,
        }
    }

    #[test]
    fn test_format_price_with_comma() {
        assert_eq!(format_price_with_comma(0), "0");
        assert_eq!(format_price_with_comma(999), "999");
        assert_eq!(format_price_with_comma(1000), "1,000");
        assert_eq!(format_price_with_comma(12345), "12,345");
        assert_eq!(format_price_with_comma(123456), "123,456");
        assert_eq!(format_price_with_comma(1234567), "1,234,567");
    }

    #[test]
    fn test_format_price_negative_is_plain() {
        assert_eq!(format_price_with_comma(-5), "-5");
        assert_eq!(format_price_with_comma(-1234567), "-1234567");
    }

    #[test]
    fn test_sanitize_csv_field() {
        assert_eq!(sanitize_csv_field("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(sanitize_csv_field("+81-3"), "'+81-3");
        assert_eq!(sanitize_csv_field("-1"), "'-1");
        assert_eq!(sanitize_csv_field("@cmd"), "'@cmd");
        assert_eq!(sanitize_csv_field("normal"), "normal");
        assert_eq!(sanitize_csv_field("a=b"), "a=b");
        assert_eq!(sanitize_csv_field(""), "");
        assert!(matches!(sanitize_csv_field("お茶"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_format_date_time() {
        let t = Utc.with_ymd_and_hms(2024, 3, 7, 4, 9, 1).unwrap();
        assert_eq!(format_date_time(&t), "2024/03/07 04:09:01");

        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(format_date_time(&t.with_timezone(&jst)), "2024/03/07 13:09:01");
    }

    #[test]
    fn test_export_filename() {
        let now = Utc.with_ymd_and_hms(2024, 8, 15, 14, 30, 5).unwrap();
        assert_eq!(export_filename(now), "stocks_20240815_143005.csv");
    }

    #[test]
    fn test_write_stocks_csv_rows_in_order() {
        let stocks = vec![
            stock(3, "緑茶", 1_234_567, 10),
            stock(1, "=HYPERLINK(\"x\")", 500, 0),
            stock(2, "Plain", 1000, 7),
        ];

        let bytes = write_stocks_csv(&stocks).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "ID,商品名,価格,在庫数,作成日時,更新日時");
        assert_eq!(
            lines[1],
            "3,緑茶,\"1,234,567\",10,2024/08/01 09:05:03,2024/12/31 23:59:59"
        );
        assert_eq!(
            lines[2],
            "1,\"'=HYPERLINK(\"\"x\"\")\",500,0,2024/08/01 09:05:03,2024/12/31 23:59:59"
        );
        assert!(lines[3].starts_with("2,Plain,\"1,000\",7,"));
        assert!(text.ends_with('\n'));
        assert!(!text.contains('\r'));
    }

    #[test]
    fn test_write_stocks_csv_empty_has_header_only() {
        let bytes = write_stocks_csv(&[]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "ID,商品名,価格,在庫数,作成日時,更新日時\n"
        );
    }

    #[test]
    fn test_write_stocks_csv_parses_back() {
        let stocks = vec![stock(1, "Comma, inside", 2500, 4)];
        let bytes = write_stocks_csv(&stocks).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADERS.to_vec());

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][1], "Comma, inside");
        assert_eq!(&records[0][2], "2,500");
    }
}
