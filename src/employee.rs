//! Employee model and normalization rules
//!
//! Every record that reaches storage goes through [`Employee::new`], which
//! normalizes the name, the gender and the birth date. The read model
//! [`EmployeeRecord`] carries the row id and the age computed on read.

use crate::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Storage and wire format for birth dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Binary gender as persisted in the `gender` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Get the string representation stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    pub fn all() -> &'static [Gender] {
        &[Gender::Male, Gender::Female]
    }
}

impl FromStr for Gender {
    type Err = Error;

    /// Accepts Latin and Cyrillic initials, the full words and the
    /// numeric menu codes.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "m" | "м" | "male" | "1" => Ok(Gender::Male),
            "f" | "ж" | "female" | "2" => Ok(Gender::Female),
            _ => Err(Error::InvalidGender(s.to_string())),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Capitalize every whitespace-delimited token: first character upper-case,
/// the rest lower-case. Runs of whitespace collapse to a single space.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Parse a `YYYY-MM-DD` birth date.
pub fn parse_birth_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| Error::InvalidDate(input.to_string()))
}

/// Whole years between `birth_date` and `today`, minus one when this year's
/// birthday has not happened yet.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// A validated, normalized employee ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
}

impl Employee {
    /// Build an employee from an already-typed date and gender.
    pub fn new(full_name: impl AsRef<str>, birth_date: NaiveDate, gender: Gender) -> Self {
        Self {
            full_name: normalize_name(full_name.as_ref()),
            birth_date,
            gender,
        }
    }

    /// Build an employee from raw user input, validating date and gender.
    pub fn parse(full_name: &str, birth_date: &str, gender: &str) -> Result<Self> {
        let birth_date = parse_birth_date(birth_date)?;
        let gender: Gender = gender.parse()?;
        Ok(Self::new(full_name, birth_date, gender))
    }
}

/// Raw employee input as received from the CLI or the HTTP body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub full_name: String,
    pub birth_date: String,
    pub gender: String,
}

impl NewEmployee {
    pub fn new(
        full_name: impl Into<String>,
        birth_date: impl Into<String>,
        gender: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            birth_date: birth_date.into(),
            gender: gender.into(),
        }
    }

    /// Validate and normalize into an [`Employee`]
    pub fn validate(&self) -> Result<Employee> {
        Employee::parse(&self.full_name, &self.birth_date, &self.gender)
    }
}

/// A stored employee as returned by list and filter queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: i64,
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub age: i32,
}

impl EmployeeRecord {
    pub fn new(id: i64, employee: Employee, today: NaiveDate) -> Self {
        Self {
            id,
            age: age_on(employee.birth_date, today),
            full_name: employee.full_name,
            birth_date: employee.birth_date,
            gender: employee.gender,
        }
    }
}
