// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Dates, times and durations
//!
//! `DateTime` and `Date` try a list of `chrono` formats in order; `Time`
//! and `Duration` search the text with a regular expression.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::text::clean_text;
use super::{filter_common, Context, Filter, Selector, Value};
use crate::error::{Error, Result};

lazy_static! {
    static ref FRENCH_MONTHS: Regex = Regex::new(
        r"(?i)\b(janv(?:ier)?|f[ée]vr?(?:ier)?|mars|avr(?:il)?|mai|juin|juil(?:let)?|ao[uû]t|sept(?:embre)?|oct(?:obre)?|nov(?:embre)?|d[ée]c(?:embre)?)\b\.?"
    )
    .unwrap();
    static ref FRENCH_WEEKDAYS: Regex =
        Regex::new(r"(?i)\b(lundi|mardi|mercredi|jeudi|vendredi|samedi|dimanche)\b,?").unwrap();
    static ref FRENCH_FIRST: Regex = Regex::new(r"\b1er\b").unwrap();
    static ref TIME: Regex =
        Regex::new(r"(?P<hh>\d{1,2})[:hH]?(?P<mm>\d{2})(:(?P<ss>\d{2}))?").unwrap();
    static ref DURATION: Regex =
        Regex::new(r"((?P<hh>\d+)[:;])?(?P<mm>\d+)[;:](?P<ss>\d+)").unwrap();
}

const DAY_FIRST_DATES: &[&str] = &[
    "%d/%m/%Y", "%d/%m/%y", "%d-%m-%Y", "%d-%m-%y", "%d.%m.%Y", "%d.%m.%y",
];
const MONTH_FIRST_DATES: &[&str] = &[
    "%m/%d/%Y", "%m/%d/%y", "%m-%d-%Y", "%m-%d-%y", "%m.%d.%Y", "%m.%d.%y",
];
const UNAMBIGUOUS_DATES: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d %B %Y", "%B %d %Y", "%B %d, %Y", "%d %m %Y",
];
const TIME_SUFFIXES: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M", "%Hh%M"];

/// Format list and locale handling shared by `DateTime` and `Date`
#[derive(Debug, Clone)]
struct DateParser {
    formats: Option<Vec<String>>,
    dayfirst: bool,
    french: bool,
}

impl DateParser {
    fn new() -> Self {
        Self {
            formats: None,
            dayfirst: false,
            french: false,
        }
    }

    fn date_formats(&self) -> Vec<String> {
        if let Some(formats) = &self.formats {
            return formats.clone();
        }
        let (first, second) = if self.dayfirst {
            (DAY_FIRST_DATES, MONTH_FIRST_DATES)
        } else {
            (MONTH_FIRST_DATES, DAY_FIRST_DATES)
        };
        first
            .iter()
            .chain(UNAMBIGUOUS_DATES)
            .chain(second)
            .map(|f| f.to_string())
            .collect()
    }

    fn prepare(&self, text: &str) -> String {
        if !self.french {
            return clean_text(text);
        }
        let text = FRENCH_WEEKDAYS.replace_all(text, "");
        let text = FRENCH_FIRST.replace_all(&text, "1");
        let text = FRENCH_MONTHS.replace_all(&text, |caps: &Captures| english_month(&caps[1]).to_string());
        clean_text(&text)
    }

    fn parse_datetime(&self, raw: &str) -> Result<NaiveDateTime> {
        let text = self.prepare(raw);
        if text.is_empty() {
            return Err(Error::conversion(raw, "datetime"));
        }

        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&text) {
            return Ok(dt.naive_local());
        }

        for date_format in self.date_formats() {
            for time_format in TIME_SUFFIXES {
                for sep in [" ", "T", " - ", " à "] {
                    let format = format!("{}{}{}", date_format, sep, time_format);
                    if let Ok(dt) = NaiveDateTime::parse_from_str(&text, &format) {
                        if plausible(&format, dt.year()) {
                            return Ok(dt);
                        }
                    }
                }
            }
        }

        self.parse_date_text(&text)
            .map(|d| d.and_time(NaiveTime::MIN))
            .ok_or_else(|| Error::conversion(raw, "datetime"))
    }

    fn parse_date(&self, raw: &str) -> Result<NaiveDate> {
        let text = self.prepare(raw);
        if text.is_empty() {
            return Err(Error::conversion(raw, "date"));
        }
        match self.parse_date_text(&text) {
            Some(date) => Ok(date),
            None => self.parse_datetime(raw).map(|dt| dt.date()),
        }
    }

    fn parse_date_text(&self, text: &str) -> Option<NaiveDate> {
        self.date_formats().iter().find_map(|format| {
            NaiveDate::parse_from_str(text, format)
                .ok()
                .filter(|d| plausible(format, d.year()))
        })
    }
}

/// `%Y` also accepts two-digit years; leave those to the `%y` formats
fn plausible(format: &str, year: i32) -> bool {
    !format.contains("%Y") || year >= 1000
}

fn english_month(french: &str) -> &'static str {
    let lower = french.to_lowercase();
    match lower.as_str() {
        s if s.starts_with("janv") => "January",
        s if s.starts_with('f') => "February",
        "mars" => "March",
        s if s.starts_with("av") => "April",
        "mai" => "May",
        "juin" => "June",
        s if s.starts_with("juil") => "July",
        s if s.starts_with("ao") => "August",
        s if s.starts_with('s') => "September",
        s if s.starts_with('o') => "October",
        s if s.starts_with('n') => "November",
        _ => "December",
    }
}

macro_rules! date_builders {
    ($($ty:ident),+) => {
        $(
            impl $ty {
                pub fn new(selector: impl Into<Selector>) -> Self {
                    Self {
                        selector: selector.into(),
                        parser: DateParser::new(),
                        default: None,
                    }
                }

                /// Read ambiguous numeric dates as day/month
                pub fn dayfirst(mut self) -> Self {
                    self.parser.dayfirst = true;
                    self
                }

                /// Translate French month and weekday names first
                pub fn french(mut self) -> Self {
                    self.parser.french = true;
                    self.parser.dayfirst = true;
                    self
                }

                /// Replace the built-in format list
                pub fn formats<I, S>(mut self, formats: I) -> Self
                where
                    I: IntoIterator<Item = S>,
                    S: Into<String>,
                {
                    self.parser.formats = Some(formats.into_iter().map(Into::into).collect());
                    self
                }
            }
        )+
    };
}

/// Date and time of day
#[derive(Debug)]
pub struct DateTime {
    selector: Selector,
    parser: DateParser,
    default: Option<Value>,
}

/// Calendar date
#[derive(Debug)]
pub struct Date {
    selector: Selector,
    parser: DateParser,
    default: Option<Value>,
}

date_builders!(DateTime, Date);

impl Filter for DateTime {
    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn filter(&self, value: Value, _ctx: &Context<'_>) -> Result<Value> {
        match value {
            Value::DateTime(dt) => Ok(Value::DateTime(dt)),
            Value::Date(d) => Ok(Value::DateTime(d.and_time(NaiveTime::MIN))),
            other => self.parser.parse_datetime(&other.text()).map(Value::DateTime),
        }
    }
}

impl Filter for Date {
    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn filter(&self, value: Value, _ctx: &Context<'_>) -> Result<Value> {
        match value {
            Value::Date(d) => Ok(Value::Date(d)),
            Value::DateTime(dt) => Ok(Value::Date(dt.date())),
            other => self.parser.parse_date(&other.text()).map(Value::Date),
        }
    }
}

/// Numeric capture; an absent optional group counts as zero
fn group(caps: &Captures<'_>, name: &str) -> Result<u32> {
    match caps.name(name) {
        Some(m) => m
            .as_str()
            .parse()
            .map_err(|_| Error::conversion(m.as_str(), "integer")),
        None => Ok(0),
    }
}

/// Time of day found with `hh:mm[:ss]`
#[derive(Debug)]
pub struct Time {
    selector: Selector,
    default: Option<Value>,
}

impl Time {
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self {
            selector: selector.into(),
            default: None,
        }
    }
}

impl Filter for Time {
    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn filter(&self, value: Value, _ctx: &Context<'_>) -> Result<Value> {
        let text = value.text();
        let caps = TIME
            .captures(&text)
            .ok_or_else(|| Error::conversion(text.as_str(), "time"))?;
        NaiveTime::from_hms_opt(group(&caps, "hh")?, group(&caps, "mm")?, group(&caps, "ss")?)
            .map(Value::Time)
            .ok_or_else(|| Error::conversion(text.as_str(), "time"))
    }
}

/// Duration found with `[hh:]mm:ss`
#[derive(Debug)]
pub struct Duration {
    selector: Selector,
    default: Option<Value>,
}

impl Duration {
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self {
            selector: selector.into(),
            default: None,
        }
    }
}

impl Filter for Duration {
    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn filter(&self, value: Value, _ctx: &Context<'_>) -> Result<Value> {
        let text = value.text();
        let caps = DURATION
            .captures(&text)
            .ok_or_else(|| Error::conversion(text.as_str(), "duration"))?;
        let seconds = i64::from(group(&caps, "hh")?) * 3600
            + i64::from(group(&caps, "mm")?) * 60
            + i64::from(group(&caps, "ss")?);
        TimeDelta::try_seconds(seconds)
            .map(Value::Duration)
            .ok_or_else(|| Error::conversion(text.as_str(), "duration"))
    }
}

filter_common!(DateTime, Date, Time, Duration);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Node;
    use crate::filters::{CleanText, FilterExt};

    fn text(s: &str) -> Node {
        Node::Text(s.to_string())
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_dayfirst_ordering() {
        let d: NaiveDate = Date::new(".").dayfirst().extract_from(&text("03/02/2024")).unwrap();
        assert_eq!(d, ymd(2024, 2, 3));

        let d: NaiveDate = Date::new(".").extract_from(&text("03/02/2024")).unwrap();
        assert_eq!(d, ymd(2024, 3, 2));

        let d: NaiveDate = Date::new(".").dayfirst().extract_from(&text("13/08/88")).unwrap();
        assert_eq!(d, ymd(1988, 8, 13));
    }

    #[test]
    fn test_iso_and_datetime() {
        let d: NaiveDate = Date::new(".").extract_from(&text("2024-02-29")).unwrap();
        assert_eq!(d, ymd(2024, 2, 29));

        let dt: NaiveDateTime = DateTime::new(".")
            .dayfirst()
            .extract_from(&text("01/02/2024 14:30"))
            .unwrap();
        assert_eq!(dt, ymd(2024, 2, 1).and_hms_opt(14, 30, 0).unwrap());

        let dt: NaiveDateTime = DateTime::new(".")
            .extract_from(&text("2024-02-01T08:15:00+01:00"))
            .unwrap();
        assert_eq!(dt, ymd(2024, 2, 1).and_hms_opt(8, 15, 0).unwrap());
    }

    #[test]
    fn test_french_month_names() {
        let f = Date::new(CleanText::new(".")).french();
        let d: NaiveDate = f.extract_from(&text("lundi 1er févr. 2021")).unwrap();
        assert_eq!(d, ymd(2021, 2, 1));

        let d: NaiveDate = f.extract_from(&text("15 décembre 2020")).unwrap();
        assert_eq!(d, ymd(2020, 12, 15));
    }

    #[test]
    fn test_empty_input_default_or_error() {
        let node = text("   ");
        assert!(Date::new(".").apply(&Context::new(&node)).unwrap_err().is_extraction());

        let v = Date::new(".")
            .default(Value::NotAvailable)
            .apply(&Context::new(&node))
            .unwrap();
        assert_eq!(v, Value::NotAvailable);

        let none: Option<NaiveDate> = Date::new(".")
            .default(Value::NotAvailable)
            .extract_from(&node)
            .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_time_and_duration() {
        let t: NaiveTime = Time::new(".").extract_from(&text("départ 14h05")).unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(14, 5, 0).unwrap());

        let t: NaiveTime = Time::new(".").extract_from(&text("08:30:15")).unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(8, 30, 15).unwrap());

        let d: TimeDelta = Duration::new(".").extract_from(&text("1:02:03")).unwrap();
        assert_eq!(d, TimeDelta::try_seconds(3723).unwrap());

        let d: TimeDelta = Duration::new(".").extract_from(&text("4;05")).unwrap();
        assert_eq!(d, TimeDelta::try_seconds(245).unwrap());

        assert!(Time::new(".").apply(&Context::new(&text("soon"))).is_err());
    }

    #[test]
    fn test_oversized_duration_is_an_error() {
        let node = text("99999999999:00");
        let err = Duration::new(".").apply(&Context::new(&node)).unwrap_err();
        assert!(matches!(err, Error::Conversion { target: "integer", .. }));

        let v = Duration::new(".")
            .default(Value::NotAvailable)
            .apply(&Context::new(&node))
            .unwrap();
        assert_eq!(v, Value::NotAvailable);
    }
}
