//! Synthetic employee generation
//!
//! Produces random adults (18 to 65 years old) with plausible names, plus
//! "special" records that always satisfy the male/F filter so the benchmark
//! query has something to return.

use chrono::{Duration, Local, NaiveDate};
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use rand::Rng;
use crate::employee::{Employee, Gender};

/// Default number of random records
pub const DEFAULT_COUNT: usize = 1_000_000;
/// Default number of guaranteed filter matches
pub const DEFAULT_SPECIAL: usize = 100;
/// Records inserted per transaction
pub const BATCH_SIZE: usize = 10_000;

// 18 * 366 days is never short of 18 full years, leap days included
const MIN_AGE_DAYS: i64 = 18 * 366;
const MAX_AGE_DAYS: i64 = 65 * 365;

const LAST_NAMES: &[&str] = &[
    "Ivanov", "Smirnov", "Kuznetsov", "Popov", "Vasiliev", "Petrov", "Sokolov",
    "Mikhailov", "Novikov", "Morozov", "Volkov", "Alekseev", "Lebedev", "Semenov",
    "Egorov", "Pavlov", "Kozlov", "Stepanov", "Nikolaev", "Orlov", "Andreev",
    "Makarov", "Nikitin", "Zakharov", "Zaitsev", "Solovyov", "Borisov", "Yakovlev",
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis",
    "Wilson", "Anderson", "Taylor", "Thomas", "Moore", "Martin", "Jackson", "White",
];

/// Surnames used for the guaranteed filter matches
const F_LAST_NAMES: &[&str] = &[
    "Fedorov", "Filatov", "Fomin", "Frolov", "Fadeev", "Filippov", "Fokin",
    "Fisher", "Ford", "Foster", "Fleming", "Fletcher", "Fox", "Franklin",
];

const MALE_FIRST_NAMES: &[&str] = &[
    "Ivan", "Petr", "Alexei", "Dmitry", "Sergei", "Andrei", "Nikolai", "Mikhail",
    "Yuri", "Oleg", "Pavel", "Boris", "James", "John", "Robert", "Michael",
    "William", "David", "Richard", "Joseph", "Charles", "Thomas", "Daniel",
];

const FEMALE_FIRST_NAMES: &[&str] = &[
    "Anna", "Maria", "Elena", "Olga", "Natalia", "Irina", "Svetlana", "Tatiana",
    "Ekaterina", "Yulia", "Daria", "Sofia", "Mary", "Patricia", "Jennifer",
    "Linda", "Elizabeth", "Barbara", "Susan", "Jessica", "Sarah", "Karen",
];

/// Random employee source. Generic over the RNG so tests can seed it.
pub struct EmployeeGenerator<R: Rng> {
    rng: R,
    today: NaiveDate,
}

impl EmployeeGenerator<ThreadRng> {
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng(), Local::now().date_naive())
    }
}

impl Default for EmployeeGenerator<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> EmployeeGenerator<R> {
    pub fn with_rng(rng: R, today: NaiveDate) -> Self {
        Self { rng, today }
    }

    /// A random adult of either gender
    pub fn random_employee(&mut self) -> Employee {
        let gender = *Gender::all().choose(&mut self.rng).unwrap_or(&Gender::Male);
        let first = self.first_name(gender);
        let last = pick(&mut self.rng, LAST_NAMES);
        let birth_date = self.birth_date();
        Employee::new(format!("{last} {first}"), birth_date, gender)
    }

    /// A male whose full name starts with "F"
    pub fn special_employee(&mut self) -> Employee {
        let first = self.first_name(Gender::Male);
        let last = pick(&mut self.rng, F_LAST_NAMES);
        let birth_date = self.birth_date();
        Employee::new(format!("{last} {first}"), birth_date, Gender::Male)
    }

    pub fn random_batch(&mut self, size: usize) -> Vec<Employee> {
        (0..size).map(|_| self.random_employee()).collect()
    }

    pub fn special_batch(&mut self, size: usize) -> Vec<Employee> {
        (0..size).map(|_| self.special_employee()).collect()
    }

    fn first_name(&mut self, gender: Gender) -> &'static str {
        match gender {
            Gender::Male => pick(&mut self.rng, MALE_FIRST_NAMES),
            Gender::Female => pick(&mut self.rng, FEMALE_FIRST_NAMES),
        }
    }

    fn birth_date(&mut self) -> NaiveDate {
        let days = self.rng.gen_range(MIN_AGE_DAYS..=MAX_AGE_DAYS);
        self.today - Duration::days(days)
    }
}

fn pick<R: Rng>(rng: &mut R, pool: &[&'static str]) -> &'static str {
    pool.choose(rng).copied().unwrap_or("Unknown")
}

/// Split `total` into batch sizes of at most [`BATCH_SIZE`]
pub fn batch_sizes(total: usize) -> impl Iterator<Item = usize> {
    (0..total.div_ceil(BATCH_SIZE)).map(move |i| BATCH_SIZE.min(total - i * BATCH_SIZE))
}
