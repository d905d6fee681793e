//! Calendar dates pulled out of free-form cell text.

use chrono::NaiveDate;

/// Accepted whole-string date layouts. `%B` also accepts abbreviated months.
const CALENDAR_FORMATS: [&str; 4] = ["%B %d, %Y", "%d %B %Y", "%Y-%m-%d", "%B %d %Y"];

/// Month-first layouts, with and without the comma after the day.
const LABELED_FORMATS: [&str; 2] = ["%B %d, %Y", "%B %d %Y"];

/// Parse a standalone date such as `January 1, 1970` or `(1970-01-01)`.
///
/// Surrounding parentheses and extra whitespace are ignored.
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim();
    let normalized = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");

    CALENDAR_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&normalized, format).ok())
}

/// Date written as `Month D, YYYY` or `Month D YYYY` immediately after
/// `label` in `text`.
///
/// Takes the three whitespace-separated tokens following the first
/// occurrence of `label`. Anything after the year's digits (punctuation,
/// footnote markers) is ignored.
pub fn date_after_label(text: &str, label: &str) -> Option<NaiveDate> {
    let (_, rest) = text.split_once(label)?;
    let tokens: Vec<&str> = rest.split_whitespace().take(3).collect();
    let [month, day, year] = tokens.as_slice() else {
        return None;
    };
    let year = &year[..year.find(|c: char| !c.is_ascii_digit()).unwrap_or(year.len())];

    let date = format!("{month} {day} {year}");
    LABELED_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&date, format).ok())
}

/// Date after the first of `labels` that occurs in `text`.
///
/// Labels are tried in order. Once one is found its date is the answer,
/// even if it does not parse.
pub fn date_after_any_label<S: AsRef<str>>(text: &str, labels: &[S]) -> Option<NaiveDate> {
    labels
        .iter()
        .map(AsRef::as_ref)
        .find(|label| text.contains(label))
        .and_then(|label| date_after_label(text, label))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn date_after_label_reads_next_three_tokens() {
        assert_eq!(
            date_after_label("...Campaign: January 5, 2019...", "Campaign: "),
            ymd(2019, 1, 5)
        );
    }

    #[test]
    fn date_after_label_ignores_footnote_after_year() {
        assert_eq!(
            date_after_label("Campaign: January 5, 2019[2] Website", "Campaign: "),
            ymd(2019, 1, 5)
        );
    }

    #[test]
    fn date_after_label_accepts_missing_comma() {
        assert_eq!(
            date_after_label("Campaign: January 5 2019", "Campaign: "),
            ymd(2019, 1, 5)
        );
        assert_eq!(
            date_after_label("Campaign: January 5 2019", "Campaign: "),
            parse_calendar_date("January 5 2019")
        );
    }

    #[test]
    fn date_after_label_without_label_is_none() {
        assert_eq!(date_after_label("Announced: January 5, 2019", "Campaign: "), None);
    }

    #[test]
    fn date_after_label_with_too_few_tokens_is_none() {
        assert_eq!(date_after_label("Campaign: January 5,", "Campaign: "), None);
    }

    #[test]
    fn date_after_label_with_garbage_is_none() {
        assert_eq!(date_after_label("Campaign: to be announced", "Campaign: "), None);
    }

    #[test]
    fn date_after_label_accepts_abbreviated_month() {
        assert_eq!(
            date_after_label("Campaign: Feb 19, 2019 Website", "Campaign: "),
            ymd(2019, 2, 19)
        );
    }

    #[test]
    fn first_present_label_wins() {
        let labels = ["Exploratory committee announced: ", "Exploratory committee: "];
        let text = "Exploratory committee: December 31, 2018 Campaign: February 9, 2019";
        assert_eq!(date_after_any_label(text, &labels), ymd(2018, 12, 31));
        assert_eq!(date_after_any_label("Campaign: February 9, 2019", &labels), None);
    }

    #[test]
    fn parse_calendar_date_formats() {
        assert_eq!(parse_calendar_date("January 1, 1970"), ymd(1970, 1, 1));
        assert_eq!(parse_calendar_date("Jan 1, 1970"), ymd(1970, 1, 1));
        assert_eq!(parse_calendar_date("1 January 1970"), ymd(1970, 1, 1));
        assert_eq!(parse_calendar_date("(1970-01-01)"), ymd(1970, 1, 1));
        assert_eq!(parse_calendar_date("  November  20, 1942 "), ymd(1942, 11, 20));
    }

    #[test]
    fn parse_calendar_date_rejects_non_dates() {
        assert_eq!(parse_calendar_date(""), None);
        assert_eq!(parse_calendar_date("age 77"), None);
        assert_eq!(parse_calendar_date("February 30, 2019"), None);
    }
}
