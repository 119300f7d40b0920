//! CSV payload reader.

use std::io;

use crate::error::{ProcessorError, ProcessorResult};

use super::TIME_COLUMN;

/// A payload split into its header row and data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parse a raw payload into a [`Table`].
///
/// Rules:
///
/// - The first line is the header and column 0 must be named `time`.
/// - Every data row must be well formed and have as many fields as the header. Quoting is strict:
///   a quoted field must be closed, a closing quote must end the field, and an unquoted field
///   may not contain `"`.
/// - At least one data column and one data row are required.
///
/// Any violation rejects the whole payload.
pub fn read_table(payload: &[u8]) -> ProcessorResult<Table> {
    // The csv crate reads stray and unterminated quotes as literal text.
    let quote_fault = check_quoting(payload).err();
    if let Some(fault) = &quote_fault {
        if fault.record == 0 {
            return Err(ProcessorError::Header(fault.to_csv_error()));
        }
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(payload);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(ProcessorError::Header)?
        .iter()
        .map(str::to_owned)
        .collect();

    if let Some(fault) = &quote_fault {
        return Err(ProcessorError::Rows(fault.to_csv_error()));
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(ProcessorError::Rows)?;
        rows.push(record.iter().map(str::to_owned).collect::<Vec<_>>());
    }

    if headers.len() <= 1 || rows.is_empty() {
        return Err(ProcessorError::NoData);
    }

    if headers[0] != TIME_COLUMN {
        return Err(ProcessorError::MissingTimeColumn {
            found: headers[0].clone(),
        });
    }

    Ok(Table { headers, rows })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct QuoteFault {
    /// 0-based record index; the header is record 0.
    record: usize,
    /// 1-based line number.
    line: usize,
    message: &'static str,
}

impl QuoteFault {
    fn to_csv_error(&self) -> csv::Error {
        csv::Error::from(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} (line {})", self.message, self.line),
        ))
    }
}

#[derive(Debug, Clone, Copy)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// A `"` inside a quoted field: either an escaped quote or the closing one.
    QuoteInQuoted,
}

/// Find the first quoting violation in `payload`.
fn check_quoting(payload: &[u8]) -> Result<(), QuoteFault> {
    use QuoteState::*;

    let body = payload.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(payload);
    let mut state = FieldStart;
    let mut record = 0;
    let mut line = 1;
    let mut opened_at = 1;

    for &b in body {
        state = match (state, b) {
            (Quoted, b'"') => QuoteInQuoted,
            (Quoted, _) => Quoted,
            (QuoteInQuoted, b'"') => Quoted,
            (QuoteInQuoted, b',' | b'\r') => FieldStart,
            (_, b'\n') => {
                record += 1;
                FieldStart
            }
            (QuoteInQuoted, _) => {
                return Err(QuoteFault {
                    record,
                    line,
                    message: "unexpected character after closing quote",
                });
            }
            (FieldStart, b'"') => {
                opened_at = line;
                Quoted
            }
            (Unquoted, b'"') => {
                return Err(QuoteFault {
                    record,
                    line,
                    message: "bare quote in unquoted field",
                });
            }
            (FieldStart | Unquoted, b',' | b'\r') => FieldStart,
            (FieldStart | Unquoted, _) => Unquoted,
        };
        if b == b'\n' {
            line += 1;
        }
    }

    if matches!(state, Quoted) {
        return Err(QuoteFault {
            record,
            line: opened_at,
            message: "unterminated quoted field",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::read_table;
    use crate::error::ProcessorError;

    #[test]
    fn reads_header_and_rows() {
        let table = read_table(b"time,a,b\n1,2,3\n4,5,6\n").unwrap();
        assert_eq!(table.headers, vec!["time", "a", "b"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["4", "5", "6"]);
    }

    #[test]
    fn empty_payload_is_no_data() {
        assert!(matches!(read_table(b""), Err(ProcessorError::NoData)));
    }

    #[test]
    fn header_only_is_no_data() {
        assert!(matches!(read_table(b"time,a\n"), Err(ProcessorError::NoData)));
    }

    #[test]
    fn single_column_is_no_data() {
        assert!(matches!(read_table(b"time\n1\n"), Err(ProcessorError::NoData)));
    }

    #[test]
    fn first_column_must_be_time() {
        let err = read_table(b"timestamp,a\n1,2\n").unwrap_err();
        assert!(matches!(
            err,
            ProcessorError::MissingTimeColumn { ref found } if found == "timestamp"
        ));
    }

    #[test]
    fn ragged_row_rejects_payload() {
        let err = read_table(b"time,a,b\n1,2,3\n4,5\n").unwrap_err();
        assert!(matches!(err, ProcessorError::Rows(_)));
    }

    #[test]
    fn unterminated_quote_rejects_payload() {
        let err = read_table(b"time,a\n10,\"1\n20,2\n30,3\n").unwrap_err();
        assert!(matches!(err, ProcessorError::Rows(_)));
        assert!(err.to_string().contains("unterminated quoted field (line 2)"));
    }

    #[test]
    fn bare_quote_in_unquoted_field_rejects_payload() {
        let err = read_table(b"time,a\n10,1\n20,2\"5\n").unwrap_err();
        assert!(matches!(err, ProcessorError::Rows(_)));
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn text_after_closing_quote_rejects_payload() {
        let err = read_table(b"time,a\n10,\"1\"5\n").unwrap_err();
        assert!(matches!(err, ProcessorError::Rows(_)));
    }

    #[test]
    fn bad_quoting_in_header_is_a_header_error() {
        let err = read_table(b"time,\"a\n10,1\n").unwrap_err();
        assert!(matches!(err, ProcessorError::Header(_)));
    }

    #[test]
    fn well_formed_quoting_is_accepted() {
        let table = read_table(
            b"time,\"a,b\",_tags\r\n10,\"1.5\",\"say \"\"hi\"\"\nthere\"\r\n20,2,\n",
        )
        .unwrap();
        assert_eq!(table.headers, vec!["time", "a,b", "_tags"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["10", "1.5", "say \"hi\"\nthere"]);
        assert_eq!(table.rows[1], vec!["20", "2", ""]);
    }
}
