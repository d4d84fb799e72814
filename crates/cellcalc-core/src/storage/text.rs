//! Comma-delimited text import/export.
//!
//! Rows are separated by line breaks and fields by commas. A field holding a
//! comma, double quote or line break is wrapped in double quotes with inner
//! quotes doubled. Line breaks inside quoted fields belong to the field.
//! Blank lines are skipped.

use thiserror::Error;

/// Malformed delimited text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct FormatError {
    pub line: usize,
    pub message: String,
}

/// Split `content` into records of raw fields.
pub fn parse_records(content: &str) -> Result<Vec<Vec<String>>, FormatError> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut current = String::new();
    // Whether anything (even a lone comma or quote) has been seen on this record.
    let mut record_started = false;
    let mut in_quotes = false;
    let mut quote_line = 0;
    let mut line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                // Check for escaped quote
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                if c == '\n' {
                    line += 1;
                }
                current.push(c);
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                quote_line = line;
                record_started = true;
            }
            ',' => {
                fields.push(std::mem::take(&mut current));
                record_started = true;
            }
            '\r' | '\n' => {
                if c == '\n' {
                    line += 1;
                }
                if record_started {
                    fields.push(std::mem::take(&mut current));
                    records.push(std::mem::take(&mut fields));
                    record_started = false;
                }
            }
            _ => {
                current.push(c);
                record_started = true;
            }
        }
    }

    if in_quotes {
        return Err(FormatError {
            line: quote_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if record_started {
        fields.push(current);
        records.push(fields);
    }

    Ok(records)
}

/// Escape a field for delimited output.
pub fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Join records into text, one line per record.
///
/// A record made of a single empty field is written as `""` so it does not
/// read back as a skipped blank line.
pub fn write_records<I, R, S>(records: I) -> String
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for record in records {
        let fields: Vec<String> = record
            .into_iter()
            .map(|field| escape_field(field.as_ref()))
            .collect();
        match fields.as_slice() {
            [only] if only.is_empty() => out.push_str("\"\""),
            _ => out.push_str(&fields.join(",")),
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple() {
        assert_eq!(
            parse_records("a,b,c\n1,2\n").unwrap(),
            vec![vec!["a", "b", "c"], vec!["1", "2"]]
        );
    }

    #[test]
    fn test_parse_quoted() {
        assert_eq!(
            parse_records(r#"a,"hello, world",c"#).unwrap(),
            vec![vec!["a", "hello, world", "c"]]
        );
    }

    #[test]
    fn test_parse_escaped_quotes() {
        assert_eq!(
            parse_records(r#"a,"say ""hello""",c"#).unwrap(),
            vec![vec!["a", r#"say "hello""#, "c"]]
        );
    }

    #[test]
    fn test_parse_preserves_whitespace() {
        assert_eq!(
            parse_records("  keep me  , x").unwrap(),
            vec![vec!["  keep me  ", " x"]]
        );
    }

    #[test]
    fn test_parse_quoted_line_break() {
        assert_eq!(
            parse_records("\"two\nlines\",x\r\ny,z\r\n").unwrap(),
            vec![vec!["two\nlines", "x"], vec!["y", "z"]]
        );
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        assert_eq!(
            parse_records("\n\na\r\n\r\n,\n\n").unwrap(),
            vec![vec!["a"], vec!["", ""]]
        );
        assert!(parse_records("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_unterminated_quote() {
        let err = parse_records("a,b\nc,\"open\nstill open").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.to_string(), "line 2: unterminated quoted field");
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("simple"), "simple");
        assert_eq!(escape_field("=A1+1"), "=A1+1");
        assert_eq!(escape_field("with,comma"), "\"with,comma\"");
        assert_eq!(escape_field("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_write_then_parse_preserves_fields() {
        let rows = vec![
            vec!["a,b", "\"q\"", ""],
            vec!["line\nbreak", "=A1*2", "plain"],
        ];
        let text = write_records(rows.clone());
        assert_eq!(text, "\"a,b\",\"\"\"q\"\"\",\n\"line\nbreak\",=A1*2,plain\n");
        assert_eq!(parse_records(&text).unwrap(), rows);
    }

    #[test]
    fn test_single_empty_field_survives() {
        let rows = vec![vec!["a"], vec![""], vec!["b"]];
        let text = write_records(rows.clone());
        assert_eq!(text, "a\n\"\"\nb\n");
        assert_eq!(parse_records(&text).unwrap(), rows);
    }
}
