//! Calendar arithmetic for weekly menus and letters.

use chrono::{Datelike, Duration, IsoWeek, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// `LUNI - [DATA]` style placeholders left in generated menus. Diacritics are
/// optional since generated text is inconsistent about them.
static DAY_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(LUNI|MAR[TȚŢ]I|MIERCURI|JOI|VINERI|S[AÂ]MB[AĂ]T[AĂ]|DUMINIC[AĂ])\s*-\s*\[DATA\]")
        .expect("day placeholder pattern")
});

/// A menu covers seven consecutive days starting on `start`.
pub fn week_end(start: NaiveDate) -> NaiveDate {
    start + Duration::days(6)
}

pub fn iso_week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Inclusive overlap of two date ranges.
pub fn overlaps(a: (NaiveDate, NaiveDate), b: (NaiveDate, NaiveDate)) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}

fn weekday_of(name: &str) -> Option<Weekday> {
    let folded: String = name
        .to_uppercase()
        .chars()
        .map(|c| match c {
            'Ă' | 'Â' => 'A',
            'Ț' | 'Ţ' => 'T',
            c => c,
        })
        .collect();
    let weekday = match folded.as_str() {
        "LUNI" => Weekday::Mon,
        "MARTI" => Weekday::Tue,
        "MIERCURI" => Weekday::Wed,
        "JOI" => Weekday::Thu,
        "VINERI" => Weekday::Fri,
        "SAMBATA" => Weekday::Sat,
        "DUMINICA" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

/// The date inside `[start, start + 6]` falling on `weekday`.
pub fn date_in_week(start: NaiveDate, weekday: Weekday) -> NaiveDate {
    let offset = (7 + weekday.num_days_from_monday() as i64 - start.weekday().num_days_from_monday() as i64) % 7;
    start + Duration::days(offset)
}

/// Replaces every `<DAY> - [DATA]` with `<DAY> - dd.mm.yyyy` for the matching
/// day of the week starting at `start`. Day names keep their original spelling.
pub fn substitute_placeholders(html: &str, start: NaiveDate) -> String {
    DAY_PLACEHOLDER
        .replace_all(html, |caps: &Captures| {
            let day = &caps[1];
            match weekday_of(day) {
                Some(weekday) => format!("{} - {}", day, date_in_week(start, weekday).format("%d.%m.%Y")),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// `YYYY-Www` for the ISO week containing `date`.
pub fn week_id(date: NaiveDate) -> String {
    format_week(date.iso_week())
}

fn format_week(week: IsoWeek) -> String {
    format!("{}-W{:02}", week.year(), week.week())
}

/// Monday of the week named by a `YYYY-Www` id.
pub fn parse_week_id(raw: &str) -> Option<NaiveDate> {
    let (year, week) = raw.trim().split_once("-W")?;
    let year: i32 = year.parse().ok()?;
    let week: u32 = week.parse().ok()?;
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
}
