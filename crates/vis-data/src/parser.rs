//! `~`-delimited text parsing.
//!
//! Splits the raw export into a [`Header`] and one [`RawRecord`] per data
//! line. Rows are never rejected: short rows leave trailing columns absent and
//! long rows lose their extra values. Quotes carry no meaning; a `"` is kept
//! as part of the value.

use csv::{ReaderBuilder, Terminator, Trim};
use tracing::{debug, warn};
use vis_core::error::{Result, VisError};
use vis_core::models::{Header, RawRecord};
use vis_core::settings::DelimiterPolicy;

/// Column separator used by purchase exports.
pub const DEFAULT_DELIMITER: char = '~';

/// Prefix of the optional spreadsheet delimiter directive line.
const SEP_DIRECTIVE: &str = "sep=";

/// The result of parsing one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    pub header: Header,
    pub records: Vec<RawRecord>,
    /// Separator actually used to split the lines.
    pub delimiter: char,
    /// Character named by a leading `sep=` line, if there was one.
    pub declared_delimiter: Option<char>,
}

/// Parse `text`, always splitting on [`DEFAULT_DELIMITER`].
pub fn parse(text: &str) -> Result<ParsedFile> {
    parse_with(text, DelimiterPolicy::Fixed)
}

/// Parse `text` with an explicit `sep=` handling policy.
///
/// Blank lines are skipped wherever they occur. Fails when there is no
/// content at all ([`VisError::EmptyInput`]), when nothing follows the
/// `sep=` directive ([`VisError::MissingHeader`]), or when a declared
/// separator that would be honoured is not a single ASCII character
/// ([`VisError::UnsupportedDelimiter`]).
pub fn parse_with(text: &str, policy: DelimiterPolicy) -> Result<ParsedFile> {
    let mut lines = text
        .split('\n')
        .map(str::trim)
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(idx, line)| (idx + 1, line))
        .peekable();

    if lines.peek().is_none() {
        return Err(VisError::EmptyInput);
    }

    let declared_delimiter = match lines.peek() {
        Some((_, first)) if first.starts_with(SEP_DIRECTIVE) => {
            let declared = first[SEP_DIRECTIVE.len()..].chars().next();
            lines.next();
            declared
        }
        _ => None,
    };

    let delimiter = match policy {
        DelimiterPolicy::Fixed => DEFAULT_DELIMITER,
        DelimiterPolicy::Declared => declared_delimiter.unwrap_or(DEFAULT_DELIMITER),
    };
    if !delimiter.is_ascii() {
        return Err(VisError::UnsupportedDelimiter(delimiter));
    }
    if let Some(declared) = declared_delimiter {
        if declared != delimiter {
            debug!(
                "Ignoring declared delimiter {:?}; splitting on {:?}",
                declared, delimiter
            );
        }
    }

    let (line_numbers, body): (Vec<usize>, Vec<&str>) = lines.unzip();
    if body.is_empty() {
        return Err(VisError::MissingHeader);
    }

    let joined = body.join("\n");
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(joined.as_bytes());

    let header = Header::new(reader.headers()?.iter().map(String::from).collect());

    let missing = header.missing_fields();
    if !missing.is_empty() {
        warn!("Header does not declare {:?}; those values will be empty", missing);
    }

    let mut short_rows = 0usize;
    let mut long_rows = 0usize;
    let mut records = Vec::with_capacity(line_numbers.len().saturating_sub(1));

    for (row, line_no) in reader.records().zip(line_numbers.into_iter().skip(1)) {
        let row = row?;
        if row.len() < header.len() {
            short_rows += 1;
        } else if row.len() > header.len() {
            long_rows += 1;
        }
        let fields = header
            .columns()
            .iter()
            .zip(row.iter())
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();
        records.push(RawRecord::new(line_no, fields));
    }

    debug!(
        "Parsed {} records over {} columns ({} short, {} long)",
        records.len(),
        header.len(),
        short_rows,
        long_rows
    );

    Ok(ParsedFile {
        header,
        records,
        delimiter,
        declared_delimiter,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "dateTime~storeName~productName~totalCost~quantity~weight";

    fn columns(parsed: &ParsedFile) -> Vec<&str> {
        parsed.header.columns().iter().map(String::as_str).collect()
    }

    // ── header handling ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_header_columns() {
        let parsed = parse(HEADER).unwrap();
        assert_eq!(
            columns(&parsed),
            vec!["dateTime", "storeName", "productName", "totalCost", "quantity", "weight"]
        );
        assert!(parsed.records.is_empty());
    }

    #[test]
    fn test_parse_trims_header_tokens() {
        let parsed = parse("  dateTime ~ storeName \t\n").unwrap();
        assert_eq!(columns(&parsed), vec!["dateTime", "storeName"]);
    }

    #[test]
    fn test_sep_directive_is_stripped() {
        let text = format!("sep=~\n{HEADER}\n2024-01-01T10:00~A~Apple~500~2~1.0");
        let parsed = parse(&text).unwrap();

        assert_eq!(parsed.header.columns()[0], "dateTime");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].get("storeName"), Some("A"));
        assert_eq!(parsed.declared_delimiter, Some('~'));
        assert!(parsed
            .records
            .iter()
            .all(|r| r.iter().all(|(_, v)| !v.starts_with("sep="))));
    }

    // ── rows ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_records_keep_input_order_and_line_numbers() {
        let text = format!("{HEADER}\n2024-01-01~A~Apple~1~1~1\n2024-01-02~B~Pear~2~2~2");
        let parsed = parse(&text).unwrap();

        let stores: Vec<_> = parsed.records.iter().map(|r| r.get("storeName")).collect();
        assert_eq!(stores, vec![Some("A"), Some("B")]);
        assert_eq!(parsed.records[0].line, 2);
        assert_eq!(parsed.records[1].line, 3);
    }

    #[test]
    fn test_short_row_leaves_trailing_fields_absent() {
        let text = format!("{HEADER}\n2024-01-01~A~Apple");
        let parsed = parse(&text).unwrap();
        let rec = &parsed.records[0];

        assert_eq!(rec.len(), 3);
        assert_eq!(rec.get("productName"), Some("Apple"));
        assert_eq!(rec.get("totalCost"), None);
        assert_eq!(rec.get("weight"), None);
    }

    #[test]
    fn test_long_row_drops_extra_values() {
        let parsed = parse("a~b\n1~2~3~4").unwrap();
        let rec = &parsed.records[0];

        assert_eq!(rec.len(), 2);
        assert_eq!(rec.get("a"), Some("1"));
        assert_eq!(rec.get("b"), Some("2"));
    }

    #[test]
    fn test_values_are_trimmed() {
        let parsed = parse("a~b\r\n  x ~ y  \r\n").unwrap();
        assert_eq!(parsed.records[0].get("a"), Some("x"));
        assert_eq!(parsed.records[0].get("b"), Some("y"));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let text = format!("\n{HEADER}\n\n2024-01-01~A~Apple~1~1~1\n   \n");
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].line, 4);
    }

    #[test]
    fn test_quotes_are_literal() {
        let parsed = parse("a~b\n\"x~y\"~z").unwrap();
        let rec = &parsed.records[0];

        assert_eq!(rec.get("a"), Some("\"x"));
        assert_eq!(rec.get("b"), Some("y\""));
        assert_eq!(rec.len(), 2);
    }

    #[test]
    fn test_carriage_return_inside_line_is_kept() {
        let parsed = parse("a~b\nx\ry~z\n1~2").unwrap();

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].get("a"), Some("x\ry"));
        assert_eq!(parsed.records[1].line, 3);
    }

    #[test]
    fn test_empty_values_between_delimiters() {
        let parsed = parse("a~b~c\n~~3").unwrap();
        let rec = &parsed.records[0];

        assert_eq!(rec.get("a"), Some(""));
        assert_eq!(rec.get("b"), Some(""));
        assert_eq!(rec.get("c"), Some("3"));
    }

    // ── delimiter policy ──────────────────────────────────────────────────────

    #[test]
    fn test_fixed_policy_ignores_declared_delimiter() {
        let parsed = parse_with("sep=;\na;b~c\n1;2~3", DelimiterPolicy::Fixed).unwrap();
        assert_eq!(parsed.delimiter, '~');
        assert_eq!(parsed.declared_delimiter, Some(';'));
        assert_eq!(columns(&parsed), vec!["a;b", "c"]);
    }

    #[test]
    fn test_declared_policy_honours_directive() {
        let parsed = parse_with("sep=;\na;b\n1;2", DelimiterPolicy::Declared).unwrap();
        assert_eq!(parsed.delimiter, ';');
        assert_eq!(parsed.records[0].get("b"), Some("2"));
    }

    #[test]
    fn test_declared_policy_without_char_falls_back() {
        let parsed = parse_with("sep=\na~b\n1~2", DelimiterPolicy::Declared).unwrap();
        assert_eq!(parsed.delimiter, DEFAULT_DELIMITER);
        assert_eq!(parsed.declared_delimiter, None);
    }

    #[test]
    fn test_declared_policy_rejects_non_ascii_delimiter() {
        let text = "sep=\u{a7}\na\u{a7}b\n1\u{a7}2";
        assert!(matches!(
            parse_with(text, DelimiterPolicy::Declared),
            Err(VisError::UnsupportedDelimiter('\u{a7}'))
        ));

        let parsed = parse_with(text, DelimiterPolicy::Fixed).unwrap();
        assert_eq!(parsed.declared_delimiter, Some('\u{a7}'));
        assert_eq!(parsed.records.len(), 1);
    }

    // ── errors ────────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_input_is_error() {
        assert!(matches!(parse(""), Err(VisError::EmptyInput)));
        assert!(matches!(parse(" \n\t\n"), Err(VisError::EmptyInput)));
    }

    #[test]
    fn test_directive_only_is_missing_header() {
        assert!(matches!(parse("sep=~\n"), Err(VisError::MissingHeader)));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let text = format!("sep=~\n{HEADER}\n2024-01-01~A~Apple~1~1~1\nbad line");
        assert_eq!(parse(&text).unwrap(), parse(&text).unwrap());
    }
}
