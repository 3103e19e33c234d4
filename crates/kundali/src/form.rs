//! Birth data form: raw text fields in, typed [`BirthDataInput`] out.
//!
//! Every field is checked before anything reaches the engine. Errors are
//! collected across all fields so the caller can report them together.

use crate::error::{FieldCoercionError, FieldError};
use crate::types::{BirthDataInput, CalendarDate, ClockTime, Gender, MONTH_NAMES};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

pub const MONTH_RANGE: RangeInclusive<u32> = 1..=12;
pub const DAY_RANGE: RangeInclusive<u32> = 1..=31;
pub const HOUR_RANGE: RangeInclusive<u32> = 0..=23;
pub const MINUTE_RANGE: RangeInclusive<u32> = 0..=59;
pub const SECOND_RANGE: RangeInclusive<u32> = 0..=59;
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const TIMEZONE_RANGE: RangeInclusive<f64> = -12.0..=14.0;

/// Raw form values, exactly as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirthDataForm {
    pub name: String,
    pub gender: String,
    pub year: String,
    /// Month number (`8`) or English name (`August`, `aug`).
    pub month: String,
    pub day: String,
    pub hour: String,
    pub minute: String,
    pub second: String,
    pub place: String,
    pub longitude: String,
    pub latitude: String,
    pub timezone: String,
}

impl Default for BirthDataForm {
    fn default() -> Self {
        Self {
            name: "Shyam Bhat".to_string(),
            gender: "male".to_string(),
            year: "1991".to_string(),
            month: "8".to_string(),
            day: "8".to_string(),
            hour: "14".to_string(),
            minute: "47".to_string(),
            second: "9".to_string(),
            place: "Honavar".to_string(),
            longitude: "+74.4439".to_string(),
            latitude: "+14.2798".to_string(),
            timezone: "+5.5".to_string(),
        }
    }
}

impl BirthDataForm {
    /// Coerce every field, or report all the fields that failed.
    pub fn parse(&self) -> Result<BirthDataInput, FieldCoercionError> {
        let mut errors = Vec::new();

        let name = required_text("name", &self.name, &mut errors);
        let gender = match Gender::from_str(&self.gender) {
            Ok(g) => Some(g),
            Err(message) => {
                errors.push(FieldError::Unrecognized {
                    field: "gender",
                    message,
                });
                None
            }
        };
        let year = integer::<i32>("year", &self.year, None, &mut errors);
        let month = parse_month(&self.month, &mut errors);
        let day = integer("day", &self.day, Some(DAY_RANGE), &mut errors);
        let hour = integer("hour", &self.hour, Some(HOUR_RANGE), &mut errors);
        let minute = integer("minute", &self.minute, Some(MINUTE_RANGE), &mut errors);
        let second = integer("second", &self.second, Some(SECOND_RANGE), &mut errors);
        let place = required_text("place", &self.place, &mut errors);
        let longitude = decimal("longitude", &self.longitude, LONGITUDE_RANGE, &mut errors);
        let latitude = decimal("latitude", &self.latitude, LATITUDE_RANGE, &mut errors);
        let timezone = decimal("timezone", &self.timezone, TIMEZONE_RANGE, &mut errors);

        match (
            name, gender, year, month, day, hour, minute, second, place, longitude, latitude,
            timezone,
        ) {
            (
                Some(name),
                Some(gender),
                Some(year),
                Some(month),
                Some(day),
                Some(hour),
                Some(minute),
                Some(second),
                Some(place),
                Some(longitude),
                Some(latitude),
                Some(timezone),
            ) if errors.is_empty() => Ok(BirthDataInput {
                name,
                gender,
                date: CalendarDate { year, month, day },
                time: ClockTime {
                    hour,
                    minute,
                    second,
                },
                place,
                longitude,
                latitude,
                timezone,
            }),
            _ => Err(FieldCoercionError { errors }),
        }
    }
}

fn required_text(field: &'static str, raw: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        errors.push(FieldError::Empty { field });
        return None;
    }
    Some(value.to_string())
}

fn integer<T>(
    field: &'static str,
    raw: &str,
    range: Option<RangeInclusive<T>>,
    errors: &mut Vec<FieldError>,
) -> Option<T>
where
    T: FromStr + PartialOrd + Display,
{
    let value = raw.trim();
    if value.is_empty() {
        errors.push(FieldError::Empty { field });
        return None;
    }
    let Ok(parsed) = value.parse::<T>() else {
        errors.push(FieldError::NotAnInteger {
            field,
            value: value.to_string(),
        });
        return None;
    };
    check_range(field, parsed, range, errors)
}

fn decimal(
    field: &'static str,
    raw: &str,
    range: RangeInclusive<f64>,
    errors: &mut Vec<FieldError>,
) -> Option<f64> {
    let value = raw.trim();
    if value.is_empty() {
        errors.push(FieldError::Empty { field });
        return None;
    }
    // f64 parsing accepts "inf" and "NaN"; neither is a coordinate.
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => check_range(field, parsed, Some(range), errors),
        _ => {
            errors.push(FieldError::NotADecimal {
                field,
                value: value.to_string(),
            });
            None
        }
    }
}

fn check_range<T>(
    field: &'static str,
    value: T,
    range: Option<RangeInclusive<T>>,
    errors: &mut Vec<FieldError>,
) -> Option<T>
where
    T: PartialOrd + Display,
{
    match range {
        Some(range) if !range.contains(&value) => {
            errors.push(FieldError::OutOfRange {
                field,
                value: value.to_string(),
                min: range.start().to_string(),
                max: range.end().to_string(),
            });
            None
        }
        _ => Some(value),
    }
}

fn parse_month(raw: &str, errors: &mut Vec<FieldError>) -> Option<u32> {
    let value = raw.trim();
    if value.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        let lowered = value.to_ascii_lowercase();
        let found = MONTH_NAMES.iter().position(|name| {
            let name = name.to_ascii_lowercase();
            name == lowered || (lowered.len() == 3 && name.starts_with(&lowered))
        });
        return match found {
            Some(idx) => Some(idx as u32 + 1),
            None => {
                errors.push(FieldError::Unrecognized {
                    field: "month",
                    message: format!("unknown month '{value}'"),
                });
                None
            }
        };
    }
    integer("month", value, Some(MONTH_RANGE), errors)
}
