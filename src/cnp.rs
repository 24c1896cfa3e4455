//! Romanian personal numeric code (CNP) used as the child document id.
//!
//! Layout: `S YY MM DD JJ NNN C` where `S` encodes sex and century, `JJ` the
//! county, `NNN` a sequence number and `C` the control digit.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONTROL_WEIGHTS: [u32; 12] = [2, 7, 9, 1, 4, 6, 3, 5, 8, 2, 7, 9];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CnpError {
    #[error("CNP must have exactly 13 digits")]
    InvalidLength,
    #[error("CNP may only contain digits")]
    NonDigit,
    #[error("CNP first digit {0} does not encode a sex/century")]
    InvalidSexDigit(u32),
    #[error("CNP encodes an impossible birth date")]
    InvalidDate,
    #[error("CNP control digit mismatch (expected {expected}, found {found})")]
    ControlDigit { expected: u32, found: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

/// A validated CNP with the fields derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cnp {
    raw: String,
    birth_date: NaiveDate,
    sex: Sex,
}

/// Age split into whole years and remaining months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Age {
    pub years: u32,
    pub months: u32,
}

impl Cnp {
    pub fn parse(raw: &str) -> Result<Self, CnpError> {
        let raw = raw.trim();
        if raw.len() != 13 {
            return Err(CnpError::InvalidLength);
        }
        let digits: Vec<u32> = raw
            .chars()
            .map(|c| c.to_digit(10).ok_or(CnpError::NonDigit))
            .collect::<Result<_, _>>()?;

        let expected = control_digit(&digits[..12]);
        if expected != digits[12] {
            return Err(CnpError::ControlDigit { expected, found: digits[12] });
        }

        let (century, sex) = match digits[0] {
            1 => (1900, Sex::Male),
            2 => (1900, Sex::Female),
            3 => (1800, Sex::Male),
            4 => (1800, Sex::Female),
            5 => (2000, Sex::Male),
            6 => (2000, Sex::Female),
            // Foreign residents; the code does not encode a century.
            7 | 9 => (1900, Sex::Male),
            8 => (1900, Sex::Female),
            other => return Err(CnpError::InvalidSexDigit(other)),
        };

        let year = century + (digits[1] * 10 + digits[2]) as i32;
        let month = digits[3] * 10 + digits[4];
        let day = digits[5] * 10 + digits[6];
        let birth_date = NaiveDate::from_ymd_opt(year, month, day).ok_or(CnpError::InvalidDate)?;

        Ok(Self {
            raw: raw.to_string(),
            birth_date,
            sex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn age_on(&self, reference: NaiveDate) -> Age {
        age_between(self.birth_date, reference)
    }
}

fn control_digit(first_twelve: &[u32]) -> u32 {
    let sum: u32 = first_twelve
        .iter()
        .zip(CONTROL_WEIGHTS.iter())
        .map(|(d, w)| d * w)
        .sum();
    match sum % 11 {
        10 => 1,
        r => r,
    }
}

/// Whole years and months elapsed from `birth` to `reference` (zero if the
/// reference precedes the birth date).
pub fn age_between(birth: NaiveDate, reference: NaiveDate) -> Age {
    if reference <= birth {
        return Age { years: 0, months: 0 };
    }
    let mut months = (reference.year() - birth.year()) * 12 + reference.month() as i32 - birth.month() as i32;
    if reference.day() < birth.day() {
        months -= 1;
    }
    let months = months.max(0) as u32;
    Age {
        years: months / 12,
        months: months % 12,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifth_series_is_born_in_the_2000s() {
        let cnp = Cnp::parse("5030615123456").unwrap();
        assert_eq!(cnp.birth_date(), NaiveDate::from_ymd_opt(2003, 6, 15).unwrap());
        assert_eq!(cnp.sex(), Sex::Male);

        let age = cnp.age_on(NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());
        assert_eq!(age, Age { years: 21, months: 11 });
        let age = cnp.age_on(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        assert_eq!(age, Age { years: 22, months: 0 });
    }

    #[test]
    fn other_centuries() {
        // 1 -> 1900s, 4 -> 1800s (control digits computed with the standard weights)
        let cnp = Cnp::parse("1800101221144").unwrap();
        assert_eq!(cnp.birth_date().year(), 1980);
        let cnp = Cnp::parse("4800101221141").unwrap();
        assert_eq!(cnp.birth_date().year(), 1880);
        assert_eq!(cnp.sex(), Sex::Female);
    }

    #[test]
    fn rejects_malformed_codes() {
        assert_eq!(Cnp::parse("503061512345"), Err(CnpError::InvalidLength));
        assert_eq!(Cnp::parse("50306151234a6"), Err(CnpError::NonDigit));
        assert!(matches!(Cnp::parse("5030615123457"), Err(CnpError::ControlDigit { expected: 6, found: 7 })));
        assert!(matches!(Cnp::parse("0030615123456"), Err(CnpError::ControlDigit { .. }) | Err(CnpError::InvalidSexDigit(0))));
    }

    #[test]
    fn age_before_birth_is_zero() {
        let birth = NaiveDate::from_ymd_opt(2022, 3, 10).unwrap();
        assert_eq!(age_between(birth, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()), Age { years: 0, months: 0 });
        assert_eq!(age_between(birth, NaiveDate::from_ymd_opt(2023, 3, 9).unwrap()), Age { years: 0, months: 11 });
    }
}
