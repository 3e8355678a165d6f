use chrono::{DateTime, NaiveDate, Utc};
use flatgen_error::{FlatgenResult, flatgen_bail, flatgen_err};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::picker::pick;
use crate::record::Record;
use crate::words::WordList;

pub const DEFAULT_RECORD_COUNT: usize = 65536;

const MAX_AGE: i32 = 98;
const BASE_WEIGHT: f32 = 50.0;
const WEIGHT_STEP: f32 = 0.1;

/// Whole days elapsed since the Unix epoch, in UTC.
pub fn today_since_epoch() -> FlatgenResult<i32> {
    days_since_epoch(Utc::now().date_naive())
}

/// `date` as a Date32 value.
pub fn days_since_epoch(date: NaiveDate) -> FlatgenResult<i32> {
    let days = date
        .signed_duration_since(DateTime::<Utc>::UNIX_EPOCH.date_naive())
        .num_days();
    i32::try_from(days).map_err(|_| flatgen_err!("{days} days since the epoch overflows a date"))
}

/// The weight of the record at `index`: a fixed base plus a linear per-record offset.
pub fn weight_at(index: usize) -> f32 {
    BASE_WEIGHT + index as f32 * WEIGHT_STEP
}

/// A fresh 64-bit seed from the operating system's entropy source.
pub fn random_seed() -> u64 {
    rand::random()
}

/// Produces [`Record`]s from a word list and a seeded generator.
///
/// Every random draw comes from one [`StdRng`], so two generators built with the same
/// seed, word list and day produce identical records.
pub struct RecordGenerator<'a> {
    words: &'a WordList,
    rng: StdRng,
    day: i32,
    distinct_names: bool,
}

impl<'a> RecordGenerator<'a> {
    pub fn try_new(words: &'a WordList, seed: u64) -> FlatgenResult<Self> {
        if words.is_empty() {
            flatgen_bail!("cannot generate records from an empty word list");
        }

        Ok(Self {
            words,
            rng: StdRng::seed_from_u64(seed),
            day: today_since_epoch()?,
            distinct_names: false,
        })
    }

    /// Stamps every record with `day` instead of the current date.
    pub fn with_day(mut self, day: i32) -> Self {
        self.day = day;
        self
    }

    /// When set, a record's last name is never the same word as its first name.
    pub fn with_distinct_names(mut self, distinct_names: bool) -> Self {
        self.distinct_names = distinct_names;
        self
    }

    pub fn day(&self) -> i32 {
        self.day
    }

    pub fn next_record(&mut self, index: usize) -> FlatgenResult<Record> {
        let words: &'a [String] = self.words.words();
        let first_name = pick(&mut self.rng, words, &[])?;
        let last_name = if self.distinct_names {
            pick(&mut self.rng, words, &[first_name])?
        } else {
            pick(&mut self.rng, words, &[])?
        };

        Ok(Record {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            age: self.rng.random_range(0..=MAX_AGE),
            external_id: uuid::Builder::from_random_bytes(self.rng.random()).into_uuid(),
            id: self.rng.random_range(0..=i64::MAX),
            weight: weight_at(index),
            sex: self.rng.random_bool(0.5),
            day: self.day,
        })
    }

    pub fn generate(&mut self, count: usize) -> FlatgenResult<Vec<Record>> {
        (0..count).map(|index| self.next_record(index)).collect()
    }
}
