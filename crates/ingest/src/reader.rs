//! CSV ingestion.
//!
//! The upload is decoded as UTF-8 and split into lines. The first line is
//! the header and is dropped; each of the next lines (at most
//! [`MAX_BOOK_RECORDS`]) is parsed as one CSV row and becomes a
//! [`BookRecord`] read by position. A blank line is a row with no columns.
//! There is no schema detection and no delimiter sniffing.

use crate::book::BookRecord;
use readchat_core::error::IngestError;
use tracing::debug;

/// Data rows read from an upload; anything after is never inspected.
pub const MAX_BOOK_RECORDS: usize = 10;

/// Parse an uploaded reading-history CSV.
///
/// A narrow or blank row among the first [`MAX_BOOK_RECORDS`] data rows
/// fails the whole upload; no partial list is returned.
pub fn ingest_csv(bytes: &[u8]) -> Result<Vec<BookRecord>, IngestError> {
    let text = std::str::from_utf8(bytes).map_err(|e| IngestError::Encoding(e.to_string()))?;

    let mut lines = text.lines();
    if lines.next().is_none() {
        debug!("Empty upload, no header row");
        return Ok(Vec::new());
    }

    let mut books = Vec::with_capacity(MAX_BOOK_RECORDS);
    for (index, line) in lines.take(MAX_BOOK_RECORDS).enumerate() {
        let row_number = index + 1;
        let row = parse_row(row_number, line)?;
        books.push(BookRecord::from_row(row_number, &row)?);
    }

    debug!(count = books.len(), "Ingested reading history");
    Ok(books)
}

/// Parse a single line as one CSV row. A blank line yields an empty record.
fn parse_row(row: usize, line: &str) -> Result<csv::StringRecord, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    match reader.records().next() {
        None => Ok(csv::StringRecord::new()),
        Some(record) => record.map_err(|e| IngestError::Malformed {
            row,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "title,sub,author,x,publisher,y,completed\n";

    fn csv_with_rows(n: usize) -> String {
        let mut out = String::from(HEADER);
        for i in 0..n {
            out.push_str(&format!("T{i},_,A{i},_,P{i},_,2024-01-{:02}\n", i + 1));
        }
        out
    }

    #[test]
    fn sample_row_maps_columns_0_2_4_6() {
        let input = "a,b,c,d,e,f,g\nT,x,A,y,P,2024-01-01,z\n";
        let books = ingest_csv(input.as_bytes()).unwrap();
        assert_eq!(
            books,
            vec![BookRecord {
                title: "T".into(),
                author: "A".into(),
                publisher: "P".into(),
                completed_date: "z".into(),
            }]
        );
    }

    #[test]
    fn record_count_is_capped_at_ten() {
        for n in [0, 1, 9, 10, 11, 25] {
            let books = ingest_csv(csv_with_rows(n).as_bytes()).unwrap();
            assert_eq!(books.len(), n.min(MAX_BOOK_RECORDS), "rows = {n}");
        }
    }

    #[test]
    fn records_keep_source_order() {
        let books = ingest_csv(csv_with_rows(3).as_bytes()).unwrap();
        let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["T0", "T1", "T2"]);
        assert_eq!(books[2].completed_date, "2024-01-03");
    }

    #[test]
    fn empty_upload_yields_nothing() {
        assert!(ingest_csv(b"").unwrap().is_empty());
        assert!(ingest_csv(HEADER.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn short_row_fails_whole_upload() {
        let input = format!("{HEADER}T,_,A,_,P,_,D\nonly,five,columns,here,x\n");
        let err = ingest_csv(input.as_bytes()).unwrap_err();
        assert_eq!(err, IngestError::ShortRow { row: 2, columns: 5 });
    }

    #[test]
    fn short_row_after_cap_is_never_read() {
        let input = format!("{}short,row\n", csv_with_rows(10));
        let books = ingest_csv(input.as_bytes()).unwrap();
        assert_eq!(books.len(), 10);
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let input = format!("{HEADER}\"Dune, Part One\",_,Herbert,_,Ace,_,2023-05-02\n");
        let books = ingest_csv(input.as_bytes()).unwrap();
        assert_eq!(books[0].title, "Dune, Part One");
    }

    #[test]
    fn non_ascii_text_survives() {
        let input = "書名,_,著者,_,出版社,_,読了日\n吾輩は猫である,_,夏目漱石,_,岩波書店,_,2024-02-03\n";
        let books = ingest_csv(input.as_bytes()).unwrap();
        assert_eq!(books[0].author, "夏目漱石");
    }

    #[test]
    fn blank_line_is_a_short_row() {
        let input = "a,b,c,d,e,f,g\nT1,_,A,_,P,_,D\n\nT2,_,A,_,P,_,D\n";
        let err = ingest_csv(input.as_bytes()).unwrap_err();
        assert_eq!(err, IngestError::ShortRow { row: 2, columns: 0 });
    }

    #[test]
    fn blank_lines_count_toward_the_cap() {
        // nine books, one blank row, then a tenth book that is never read
        let mut input = csv_with_rows(9);
        input.push_str("\nlate,_,A,_,P,_,D\n");
        let err = ingest_csv(input.as_bytes()).unwrap_err();
        assert_eq!(err, IngestError::ShortRow { row: 10, columns: 0 });

        let mut input = csv_with_rows(10);
        input.push_str("\n\n");
        assert_eq!(ingest_csv(input.as_bytes()).unwrap().len(), 10);
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let input = "a,b,c,d,e,f,g\r\nT,_,A,_,P,_,2024-03-04\r\n";
        let books = ingest_csv(input.as_bytes()).unwrap();
        assert_eq!(books[0].completed_date, "2024-03-04");
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = ingest_csv(&[0x66, 0x6f, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, IngestError::Encoding(_)));
    }
}
