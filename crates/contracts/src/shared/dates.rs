//! Разбор и нормализация дат годности.
//!
//! Импорт принимает `DD-MM-YYYY` и `DD/MM/YYYY`; в хранилище дата всегда
//! лежит как `YYYY-MM-DD`, экспорт в CSV рендерит обратно `DD-MM-YYYY`.

use chrono::NaiveDate;

/// Parse an import-format expiry date (`05-12-2025` or `05/12/2025`) into a
/// calendar-checked date. Day/month/year ranges are validated before the
/// calendar check, so `31-04-2025` fails while `31-03-2025` passes.
pub fn parse_import_date(text: &str) -> Option<NaiveDate> {
    let sep = if text.contains('-') {
        '-'
    } else if text.contains('/') {
        '/'
    } else {
        return None;
    };

    let mut parts = text.split(sep);
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let year: i32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    if !(1..=31).contains(&day) || !(1..=12).contains(&month) || !(1900..=9999).contains(&year) {
        return None;
    }

    // from_ymd_opt отбрасывает несуществующие комбинации (31 апреля и т.п.)
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Canonical storage form, `YYYY-MM-DD`.
pub fn normalize(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// CSV export rendering of a stored `YYYY-MM-DD` date as `DD-MM-YYYY`.
/// Anything that is not in canonical form is passed through unchanged.
pub fn to_export_format(stored: &str) -> String {
    if let Some((year, rest)) = stored.split_once('-') {
        if let Some((month, day)) = rest.split_once('-') {
            if year.len() == 4 && !month.is_empty() && !day.is_empty() {
                return format!("{}-{}-{}", day, month, year);
            }
        }
    }
    stored.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_separators() {
        let a = parse_import_date("05-12-2025").unwrap();
        let b = parse_import_date("05/12/2025").unwrap();
        assert_eq!(a, b);
        assert_eq!(normalize(a), "2025-12-05");
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert!(parse_import_date("00-01-2025").is_none());
        assert!(parse_import_date("32-01-2025").is_none());
        assert!(parse_import_date("01-13-2025").is_none());
        assert!(parse_import_date("01-01-1899").is_none());
        assert!(parse_import_date("01-01-10000").is_none());
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        assert!(parse_import_date("31-04-2025").is_none());
        assert!(parse_import_date("29-02-2025").is_none());
        assert!(parse_import_date("29-02-2024").is_some()); // leap year
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_import_date("").is_none());
        assert!(parse_import_date("2025-12-05T00:00").is_none());
        assert!(parse_import_date("05.12.2025").is_none());
        assert!(parse_import_date("05-12").is_none());
        assert!(parse_import_date("05-12-2025-01").is_none());
        assert!(parse_import_date("aa-bb-cccc").is_none());
    }

    #[test]
    fn export_format_round_trips() {
        let d = parse_import_date("05-12-2025").unwrap();
        let stored = normalize(d);
        assert_eq!(to_export_format(&stored), "05-12-2025");
        // normalize(parse(export(x))) == x
        let back = parse_import_date(&to_export_format(&stored)).unwrap();
        assert_eq!(normalize(back), stored);
    }

    #[test]
    fn export_format_passes_junk_through() {
        assert_eq!(to_export_format("not a date"), "not a date");
    }
}
