use tabtext_core::{Encoding, LineBreak, QuoteFault, Reader, Record, TextError};

/// Helper: build a record from string cells, `None` for absent ones.
fn rec(cells: &[Option<&str>]) -> Record {
    cells.iter().map(|c| c.map(str::to_string)).collect()
}

/// Helper: read everything from UTF-8 input with the given delimiter.
fn read_all_with(input: &str, delimiter: char) -> (Vec<Record>, Option<LineBreak>) {
    let mut reader = Reader::new(input.as_bytes(), Encoding::Utf8)
        .unwrap()
        .with_delimiter(delimiter);
    let records = reader.read_all().unwrap();
    (records, reader.detected_line_break())
}

fn read_all(input: &str) -> (Vec<Record>, Option<LineBreak>) {
    read_all_with(input, ',')
}

fn read_err(input: &str) -> TextError {
    let mut reader = Reader::new(input.as_bytes(), Encoding::Utf8).unwrap();
    reader.read_all().expect_err("input should be rejected")
}

// ============================================================================
// Line breaks
// ============================================================================

#[test]
fn read_lf_records() {
    let (records, lb) = read_all("a,b,c\nd,e,f");
    assert_eq!(
        records,
        vec![
            rec(&[Some("a"), Some("b"), Some("c")]),
            rec(&[Some("d"), Some("e"), Some("f")]),
        ]
    );
    assert_eq!(lb, Some(LineBreak::Lf));
}

#[test]
fn read_cr_records() {
    let (records, lb) = read_all("a,b,c\rd,e,f");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1], rec(&[Some("d"), Some("e"), Some("f")]));
    assert_eq!(lb, Some(LineBreak::Cr));
}

#[test]
fn read_crlf_records() {
    let (records, lb) = read_all("a,b,c\r\nd,e,f");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], rec(&[Some("a"), Some("b"), Some("c")]));
    assert_eq!(lb, Some(LineBreak::Crlf));
}

#[test]
fn mixed_terminators_all_split_records() {
    let (records, lb) = read_all("a\r\nb\nc\rd");
    assert_eq!(
        records,
        vec![rec(&[Some("a")]), rec(&[Some("b")]), rec(&[Some("c")]), rec(&[Some("d")])]
    );
    // Only the first terminator counts.
    assert_eq!(lb, Some(LineBreak::Crlf));
}

#[test]
fn line_break_inside_quotes_is_not_detected() {
    let (records, lb) = read_all("a,b,\"c\r\nd\"\ne,f,g");
    assert_eq!(
        records,
        vec![
            rec(&[Some("a"), Some("b"), Some("c\r\nd")]),
            rec(&[Some("e"), Some("f"), Some("g")]),
        ]
    );
    assert_eq!(lb, Some(LineBreak::Lf));
}

#[test]
fn single_value_has_no_line_break() {
    let (records, lb) = read_all("a");
    assert_eq!(records, vec![rec(&[Some("a")])]);
    assert_eq!(lb, None);
}

#[test]
fn empty_input_yields_nothing() {
    let (records, lb) = read_all("");
    assert!(records.is_empty());
    assert_eq!(lb, None);
}

// ============================================================================
// Delimiters and quoting
// ============================================================================

#[test]
fn tab_delimiter() {
    let (records, lb) = read_all_with("a\tb\tc\nd\te\tf", '\t');
    assert_eq!(records[0], rec(&[Some("a"), Some("b"), Some("c")]));
    assert_eq!(records[1], rec(&[Some("d"), Some("e"), Some("f")]));
    assert_eq!(lb, Some(LineBreak::Lf));
}

#[test]
fn comma_is_data_with_tab_delimiter() {
    let (records, _) = read_all_with("a,b\tc", '\t');
    assert_eq!(records, vec![rec(&[Some("a,b"), Some("c")])]);
}

#[test]
fn quoted_string_with_embedded_newline() {
    let (records, lb) = read_all("a,\"b\",\"ccc\ncc\"\nd,e,");
    assert_eq!(
        records,
        vec![
            rec(&[Some("a"), Some("b"), Some("ccc\ncc")]),
            rec(&[Some("d"), Some("e"), None]),
        ]
    );
    assert_eq!(lb, Some(LineBreak::Lf));
}

#[test]
fn escaped_double_quote() {
    let (records, _) = read_all("a,\"b\",\"ccc\"\"cc\"\nd,e,\"\"");
    assert_eq!(
        records,
        vec![
            rec(&[Some("a"), Some("b"), Some("ccc\"cc")]),
            rec(&[Some("d"), Some("e"), Some("")]),
        ]
    );
}

#[test]
fn doubled_quote_followed_by_delimiter() {
    let (records, _) = read_all("\"x\"\"\",y");
    assert_eq!(records, vec![rec(&[Some("x\""), Some("y")])]);
}

#[test]
fn quote_inside_unquoted_field_is_data() {
    let (records, _) = read_all("a,b,ccc\"cc\nd,e,");
    assert_eq!(
        records,
        vec![
            rec(&[Some("a"), Some("b"), Some("ccc\"cc")]),
            rec(&[Some("d"), Some("e"), None]),
        ]
    );
}

#[test]
fn quoted_field_keeps_delimiters() {
    let (records, _) = read_all("\"a,b\",\"c\rd\"");
    assert_eq!(records, vec![rec(&[Some("a,b"), Some("c\rd")])]);
}

#[test]
fn absent_cells_at_every_position() {
    let (records, _) = read_all(",b,\nd,,f");
    assert_eq!(
        records,
        vec![rec(&[None, Some("b"), None]), rec(&[Some("d"), None, Some("f")])]
    );
}

#[test]
fn without_null_turns_absent_into_empty() {
    let mut reader = Reader::new("a,,\"\"\n,b,c".as_bytes(), Encoding::Utf8)
        .unwrap()
        .with_without_null(true);
    let records = reader.read_all().unwrap();
    assert_eq!(
        records,
        vec![
            rec(&[Some("a"), Some(""), Some("")]),
            rec(&[Some(""), Some("b"), Some("c")]),
        ]
    );
}

// ============================================================================
// Blank lines
// ============================================================================

#[test]
fn trailing_empty_lines_are_dropped() {
    let (records, lb) = read_all("a,b,c\nd,e,f\n\n");
    assert_eq!(records.len(), 2);
    assert_eq!(lb, Some(LineBreak::Lf));
}

#[test]
fn trailing_crlf_blank_lines_are_dropped() {
    let (records, lb) = read_all("a\r\nb\r\n\r\n\r\n");
    assert_eq!(records, vec![rec(&[Some("a")]), rec(&[Some("b")])]);
    assert_eq!(lb, Some(LineBreak::Crlf));
}

#[test]
fn blank_line_between_records_is_an_absent_cell() {
    let (records, _) = read_all("a\n\nb");
    assert_eq!(records, vec![rec(&[Some("a")]), rec(&[None]), rec(&[Some("b")])]);
}

#[test]
fn blank_line_between_wide_records_is_short() {
    match read_err("a,b\n\nc,d") {
        TextError::FieldCountMismatch { line, column } => {
            assert_eq!((line, column), (2, 0));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn extraneous_quote() {
    let err = read_err("a,\"b\",\"ccc\ncc\nd,e,");
    assert_eq!(err.to_string(), "line 3, column 5: extraneous \" in field");
    assert!(matches!(
        err,
        TextError::MalformedQuote {
            line: 3,
            column: 5,
            kind: QuoteFault::Extraneous
        }
    ));
}

#[test]
fn unexpected_quote() {
    let err = read_err("a,\"b\",\"ccc\"cc\nd,e,");
    assert_eq!(err.to_string(), "line 1, column 11: unexpected \" in field");
    assert!(matches!(
        err,
        TextError::MalformedQuote {
            kind: QuoteFault::Unexpected,
            ..
        }
    ));
}

#[test]
fn fewer_fields_than_first_record() {
    let err = read_err("a,b,c\nd,e\nf,g,h");
    assert_eq!(
        err.to_string(),
        "line 2, column 0: wrong number of fields in line"
    );
}

#[test]
fn more_fields_than_first_record() {
    let err = read_err("a,b,c\nd,e,f,g\nh,i,j");
    assert_eq!(
        err.to_string(),
        "line 2, column 6: wrong number of fields in line"
    );
}

#[test]
fn trailing_delimiter_counts_as_extra_field() {
    let err = read_err("a,b\nc,d,");
    assert!(matches!(
        err,
        TextError::FieldCountMismatch { line: 2, column: 4 }
    ));
}

#[test]
fn short_record_after_multiline_field_reports_its_first_line() {
    let err = read_err("a,b\n\"x\ny\"\nc,d");
    assert!(matches!(
        err,
        TextError::FieldCountMismatch { line: 2, column: 0 }
    ));
}

#[test]
fn crlf_terminator_advances_one_line() {
    let err = read_err("a,b\r\nc,d,e");
    assert_eq!(
        err.to_string(),
        "line 2, column 4: wrong number of fields in line"
    );
}

#[test]
fn crlf_inside_quotes_advances_one_line() {
    let err = read_err("a,\"x\r\ny");
    assert_eq!(err.to_string(), "line 2, column 2: extraneous \" in field");
}

#[test]
fn cr_terminators_count_lines() {
    let err = read_err("a,b\rc\rd,e");
    assert!(matches!(
        err,
        TextError::FieldCountMismatch { line: 2, column: 0 }
    ));
}

#[test]
fn error_ends_the_stream() {
    let mut reader = Reader::new("a,b\nc\nd,e".as_bytes(), Encoding::Utf8).unwrap();
    assert!(reader.read().unwrap().is_some());
    assert!(reader.read().is_err());
    assert!(reader.read().unwrap().is_none());
}

// ============================================================================
// Record-at-a-time and header
// ============================================================================

#[test]
fn read_one_record_at_a_time() {
    let mut reader = Reader::new("a,b\nc,d\n".as_bytes(), Encoding::Utf8).unwrap();
    assert_eq!(reader.field_count(), None);
    assert_eq!(reader.read().unwrap(), Some(rec(&[Some("a"), Some("b")])));
    assert_eq!(reader.field_count(), Some(2));
    assert_eq!(reader.read().unwrap(), Some(rec(&[Some("c"), Some("d")])));
    assert_eq!(reader.read().unwrap(), None);
    assert_eq!(reader.line(), 3);
}

#[test]
fn reader_is_an_iterator() {
    let reader = Reader::new("1\n2\n3".as_bytes(), Encoding::Utf8).unwrap();
    let cells: Vec<String> = reader
        .map(|r| r.unwrap().remove(0).unwrap())
        .collect();
    assert_eq!(cells, vec!["1", "2", "3"]);
}

#[test]
fn read_header_then_records() {
    let mut reader = Reader::new("h1,h2 ,h3\na,b,c\nd,e,f".as_bytes(), Encoding::Utf8).unwrap();
    let header = reader.read_header().unwrap();
    assert_eq!(header, vec!["h1", "h2 ", "h3"]);

    let records = reader.read_all().unwrap();
    assert_eq!(
        records,
        vec![
            rec(&[Some("a"), Some("b"), Some("c")]),
            rec(&[Some("d"), Some("e"), Some("f")]),
        ]
    );
}

#[test]
fn header_fixes_field_count() {
    let mut reader = Reader::new("h1,h2\na,b,c".as_bytes(), Encoding::Utf8).unwrap();
    reader.read_header().unwrap();
    let err = reader.read_all().unwrap_err();
    assert_eq!(
        err.to_string(),
        "line 2, column 4: wrong number of fields in line"
    );
}

#[test]
fn header_with_unclosed_quote() {
    let mut reader = Reader::new("h1,\"h2 ,h3\na,b,c\nd,e,f".as_bytes(), Encoding::Utf8).unwrap();
    let err = reader.read_header().unwrap_err();
    assert_eq!(err.to_string(), "line 3, column 6: extraneous \" in field");
}

#[test]
fn header_absent_label_is_empty() {
    let mut reader = Reader::new("a,,c".as_bytes(), Encoding::Utf8).unwrap();
    assert_eq!(reader.read_header().unwrap(), vec!["a", "", "c"]);
}

// ============================================================================
// Encodings
// ============================================================================

#[test]
fn decode_shift_jis() {
    let mut input = b"a,b,c\nd,".to_vec();
    input.extend_from_slice(&[0x93, 0xfa, 0x96, 0x7b, 0x8c, 0xea]);
    input.extend_from_slice(b",f");

    let mut reader = Reader::new(input.as_slice(), Encoding::Sjis).unwrap();
    let records = reader.read_all().unwrap();
    assert_eq!(
        records,
        vec![
            rec(&[Some("a"), Some("b"), Some("c")]),
            rec(&[Some("d"), Some("日本語"), Some("f")]),
        ]
    );
    assert_eq!(reader.detected_line_break(), Some(LineBreak::Lf));
}

#[test]
fn utf8_bom_is_skipped() {
    let mut input = vec![0xEF, 0xBB, 0xBF];
    input.extend_from_slice("x,y".as_bytes());
    let mut reader = Reader::new(input.as_slice(), Encoding::Utf8).unwrap();
    assert_eq!(reader.read_all().unwrap(), vec![rec(&[Some("x"), Some("y")])]);
}

#[test]
fn positions_count_characters_not_bytes() {
    let err = read_err("日本,\"語\"x");
    assert!(matches!(
        err,
        TextError::MalformedQuote { line: 1, column: 6, .. }
    ));
}
