//! `MM-YYYY` calendar months, stored as the first day of the month.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{AppError, AppResult};

static MONTH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})-(\d{4})$").expect("valid month-year pattern"));

/// Parses `MM-YYYY` into the first day of that month.
pub fn parse_month_year(input: &str) -> AppResult<NaiveDate> {
    let invalid = || AppError::ValidationError(format!("invalid date {input:?}, expected MM-YYYY"));

    let caps = MONTH_YEAR_RE.captures(input).ok_or_else(invalid)?;
    let month: u32 = caps[1].parse().map_err(|_| invalid())?;
    let year: i32 = caps[2].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// Like [`parse_month_year`], but names the offending field in the error.
pub fn parse_month_year_field(field: &str, input: &str) -> AppResult<NaiveDate> {
    parse_month_year(input)
        .map_err(|_| AppError::ValidationError(format!("invalid {field} format, expected MM-YYYY")))
}

pub fn format_month_year(date: NaiveDate) -> String {
    date.format("%m-%Y").to_string()
}

/// First day of the month following `date`'s month.
pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // day 1 exists in every month
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

/// Serde adapter rendering dates as `MM-YYYY`.
pub mod serde_month_year {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_month_year(*date))
    }

    pub mod option {
        use chrono::NaiveDate;
        use serde::Serializer;

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => serializer.serialize_some(&super::super::format_month_year(*date)),
                None => serializer.serialize_none(),
            }
        }
    }
}
