//! CSV field splitting and escaping.
//!
//! The importer accepts comma-separated lines with optional double-quote
//! wrapping and `""` as an escaped quote inside a quoted field. The exporter
//! wraps every field in quotes and doubles internal quotes.

/// Split one CSV line into fields. Quotes are unwrapped, `""` inside a quoted
/// field becomes a literal `"`.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Wrap a field for export: always quoted, internal quotes doubled.
pub fn escape_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_fields() {
        assert_eq!(split_line("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_line("a,,c"), vec!["a", "", "c"]);
        assert_eq!(split_line(""), vec![""]);
    }

    #[test]
    fn splits_quoted_fields_with_commas() {
        assert_eq!(
            split_line(r#""Pump, portable","P100",SN1"#),
            vec!["Pump, portable", "P100", "SN1"]
        );
    }

    #[test]
    fn unescapes_doubled_quotes() {
        assert_eq!(
            split_line(r#""He said ""ok""",x"#),
            vec![r#"He said "ok""#, "x"]
        );
    }

    #[test]
    fn escape_is_inverse_of_split() {
        let values = ["plain", "with, comma", r#"with "quotes""#, ""];
        let line = values
            .iter()
            .map(|v| escape_field(v))
            .collect::<Vec<_>>()
            .join(",");
        assert_eq!(split_line(&line), values);
    }
}
