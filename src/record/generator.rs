//! Cooperative synthetic record generation.
//!
//! A [`GenerationJob`] builds a fresh [`RecordStore`] one batch at a time.
//! The store in use is never touched: the caller swaps in the new store only
//! when the job reports [`Step::Done`] under a current token.

use chrono::{Days, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::store::RecordStore;
use super::types::{FieldValue, Record, RecordId};
use crate::engine::token::{CancelToken, Step, TokenCounter};

/// Default number of records produced per scheduling tick.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Look-back window for registration dates (five years).
const REGISTERED_LOOKBACK_DAYS: u64 = 1_825;
/// Look-back window for favourite dates (a century).
const FAVORITE_LOOKBACK_DAYS: u64 = 36_500;

const HOBBIES: &[&str] = &[
    "reading",
    "swimming",
    "cycling",
    "painting",
    "cooking",
    "gaming",
    "hiking",
    "photography",
];

const LONG_TEXT: &str = "This is a long text field that contains more than 100 characters. \
It's used to test how the application handles large amounts of text. \
This sentence is just to make sure we exceed the 100 character limit.";

/// The fourteen optional field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    IsVegan,
    Name,
    Email,
    Age,
    Address,
    About,
    Registered,
    FavoriteDate,
    Hobby,
    Height,
    LongText,
    FavoriteNumber,
    IsActiveUser,
    HasPets,
}

impl FieldKind {
    pub const ALL: [Self; 14] = [
        Self::IsVegan,
        Self::Name,
        Self::Email,
        Self::Age,
        Self::Address,
        Self::About,
        Self::Registered,
        Self::FavoriteDate,
        Self::Hobby,
        Self::Height,
        Self::LongText,
        Self::FavoriteNumber,
        Self::IsActiveUser,
        Self::HasPets,
    ];

    /// Interchangeable names a field of this kind may carry.
    pub const fn synonyms(self) -> [&'static str; 5] {
        match self {
            Self::IsVegan => ["isVegan", "vegetarian", "plantBased", "meatFree", "veganLifestyle"],
            Self::Name => ["name", "fullName", "displayName", "userName", "alias"],
            Self::Email => ["email", "emailAddress", "contactEmail", "userEmail", "primaryEmail"],
            Self::Age => ["age", "yearsOld", "ageInYears", "userAge", "personAge"],
            Self::Address => ["address", "location", "residenceAddress", "livingPlace", "homeAddress"],
            Self::About => ["about", "bio", "description", "personalInfo", "userDescription"],
            Self::Registered => [
                "registered",
                "joinDate",
                "memberSince",
                "registrationDate",
                "accountCreated",
            ],
            Self::FavoriteDate => [
                "favoriteDate",
                "specialDay",
                "memorableDate",
                "significantDate",
                "importantDay",
            ],
            Self::Hobby => ["hobby", "interest", "pastime", "leisure", "recreation"],
            Self::Height => ["height", "heightInCm", "stature", "bodyHeight", "verticalMeasurement"],
            Self::LongText => [
                "longText",
                "biography",
                "detailedDescription",
                "personalStatement",
                "extendedInfo",
            ],
            Self::FavoriteNumber => [
                "favoriteNumber",
                "luckyNumber",
                "preferredDigit",
                "numericalPreference",
                "chosenNumber",
            ],
            Self::IsActiveUser => [
                "isActiveUser",
                "accountActive",
                "currentlyActive",
                "userStatus",
                "engagementStatus",
            ],
            Self::HasPets => ["hasPets", "petOwner", "animalCompanion", "hasFurryFriends", "caresForAnimals"],
        }
    }
}

/// Knobs for one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub batch_size: usize,
    /// Independent probability that each optional field is present.
    pub field_probability: f64,
    /// Fixed RNG seed for reproducible output.
    pub seed: Option<u64>,
    /// "Today" for date look-back windows; defaults to the local date.
    pub reference_date: Option<NaiveDate>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            field_probability: 0.5,
            seed: None,
            reference_date: None,
        }
    }
}

/// A generation run in progress.
#[derive(Debug)]
pub struct GenerationJob {
    token: CancelToken,
    target: usize,
    next: usize,
    batch_size: usize,
    field_probability: f64,
    today: NaiveDate,
    rng: StdRng,
    store: RecordStore,
}

impl GenerationJob {
    pub fn new(token: CancelToken, count: usize, settings: &GenerationSettings) -> Self {
        let rng = settings
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            token,
            target: count,
            next: 0,
            batch_size: settings.batch_size.max(1),
            field_probability: settings.field_probability.clamp(0.0, 1.0),
            today: settings
                .reference_date
                .unwrap_or_else(|| Local::now().date_naive()),
            rng,
            store: RecordStore::with_capacity(count.min(settings.batch_size.max(1))),
        }
    }

    pub const fn token(&self) -> CancelToken {
        self.token
    }

    /// Records produced so far.
    pub fn produced(&self) -> usize {
        self.store.len()
    }

    pub const fn target(&self) -> usize {
        self.target
    }

    /// Produce one batch, or stop if the token went stale.
    pub fn step(&mut self, counter: &TokenCounter) -> Step<RecordStore> {
        if !counter.is_current(self.token) {
            return Step::Superseded(std::mem::take(&mut self.store));
        }
        let limit = (self.next + self.batch_size).min(self.target);
        while self.next < limit {
            let record = self.make_record(self.next);
            self.store.push(record);
            self.next += 1;
        }
        if self.next >= self.target {
            Step::Done(std::mem::take(&mut self.store))
        } else {
            Step::Pending
        }
    }

    /// Drive the job until it finishes or is superseded.
    pub fn run_to_completion(mut self, counter: &TokenCounter) -> Step<RecordStore> {
        loop {
            match self.step(counter) {
                Step::Pending => {}
                finished => return finished,
            }
        }
    }

    fn fresh_id(&mut self) -> RecordId {
        loop {
            let id = RecordId::from_random_bytes(self.rng.r#gen());
            if !self.store.contains(id) {
                return id;
            }
        }
    }

    fn make_record(&mut self, index: usize) -> Record {
        let mut record = Record::new(self.fresh_id());
        let n = index + 1;
        for kind in FieldKind::ALL {
            if !self.rng.gen_bool(self.field_probability) {
                continue;
            }
            let names = kind.synonyms();
            let name = names[self.rng.gen_range(0..names.len())];
            let value = self.value_for(kind, n);
            record.set_field(name, value);
        }
        record
    }

    fn value_for(&mut self, kind: FieldKind, n: usize) -> FieldValue {
        let rng = &mut self.rng;
        match kind {
            FieldKind::IsVegan | FieldKind::IsActiveUser | FieldKind::HasPets => {
                FieldValue::Bool(rng.gen_bool(0.5))
            }
            FieldKind::Name => FieldValue::Text(format!("Person {n}")),
            FieldKind::Email => FieldValue::Text(format!("person{n}@example.com")),
            FieldKind::Age => FieldValue::Number(f64::from(rng.gen_range(20_i32..70))),
            FieldKind::Address => FieldValue::Text(format!(
                "{} Main St, City {n}",
                rng.gen_range(0_u32..1000)
            )),
            FieldKind::About => {
                FieldValue::Text(format!("This is a description about Person {n}."))
            }
            FieldKind::Registered => {
                let back = rng.gen_range(0..=REGISTERED_LOOKBACK_DAYS);
                FieldValue::Date(days_before(self.today, back))
            }
            FieldKind::FavoriteDate => {
                let back = rng.gen_range(0..=FAVORITE_LOOKBACK_DAYS);
                FieldValue::Date(days_before(self.today, back))
            }
            FieldKind::Hobby => FieldValue::Text(HOBBIES[rng.gen_range(0..HOBBIES.len())].to_string()),
            FieldKind::Height => FieldValue::Number(f64::from(rng.gen_range(150_i32..200))),
            FieldKind::LongText => FieldValue::Text(LONG_TEXT.to_string()),
            FieldKind::FavoriteNumber => FieldValue::Number(f64::from(rng.gen_range(0_i32..100))),
        }
    }
}

fn days_before(today: NaiveDate, days: u64) -> NaiveDate {
    today.checked_sub_days(Days::new(days)).unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn settings(probability: f64, batch_size: usize) -> GenerationSettings {
        GenerationSettings {
            batch_size,
            field_probability: probability,
            seed: Some(7),
            reference_date: NaiveDate::from_ymd_opt(2025, 6, 1),
        }
    }

    fn finish(job: GenerationJob, counter: &TokenCounter) -> RecordStore {
        match job.run_to_completion(counter) {
            Step::Done(store) => store,
            other => panic!("generation did not finish: {other:?}"),
        }
    }

    #[test]
    fn test_generates_requested_count_with_unique_ids() {
        let mut counter = TokenCounter::new();
        let job = GenerationJob::new(counter.mint(), 2_500, &settings(0.5, 1_000));
        let store = finish(job, &counter);
        assert_eq!(store.len(), 2_500);
        let unique: HashSet<_> = store.ids().into_iter().collect();
        assert_eq!(unique.len(), 2_500);
    }

    #[test]
    fn test_huge_count_only_builds_one_batch_per_step() {
        let mut counter = TokenCounter::new();
        let mut job = GenerationJob::new(counter.mint(), usize::MAX, &settings(0.5, 16));
        assert!(job.step(&counter).is_pending());
        assert_eq!(job.produced(), 16);
        counter.invalidate();
        match job.step(&counter) {
            Step::Superseded(partial) => assert_eq!(partial.len(), 16),
            other => panic!("expected a superseded run: {other:?}"),
        }
    }

    #[test]
    fn test_full_probability_fills_every_kind() {
        let mut counter = TokenCounter::new();
        let job = GenerationJob::new(counter.mint(), 20, &settings(1.0, 10));
        let store = finish(job, &counter);
        for record in store.iter() {
            assert_eq!(record.len(), FieldKind::ALL.len());
            assert!(
                record
                    .fields()
                    .iter()
                    .any(|f| f.name.to_lowercase().contains("email"))
            );
        }
    }

    #[test]
    fn test_zero_probability_yields_empty_records() {
        let mut counter = TokenCounter::new();
        let job = GenerationJob::new(counter.mint(), 5, &settings(0.0, 10));
        let store = finish(job, &counter);
        assert!(store.iter().all(Record::is_empty));
    }

    #[test]
    fn test_values_stay_in_documented_ranges() {
        let mut counter = TokenCounter::new();
        let job = GenerationJob::new(counter.mint(), 200, &settings(1.0, 50));
        let store = finish(job, &counter);
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        for record in store.iter() {
            for field in record.fields() {
                let kind = FieldKind::ALL
                    .into_iter()
                    .find(|k| k.synonyms().contains(&field.name.as_str()))
                    .unwrap();
                match (kind, &field.value) {
                    (FieldKind::Age, FieldValue::Number(n)) => assert!((20.0..70.0).contains(n)),
                    (FieldKind::Height, FieldValue::Number(n)) => {
                        assert!((150.0..200.0).contains(n));
                    }
                    (FieldKind::FavoriteNumber, FieldValue::Number(n)) => {
                        assert!((0.0..100.0).contains(n));
                    }
                    (FieldKind::Registered, FieldValue::Date(d)) => {
                        assert!(*d <= today);
                        assert!((today - *d).num_days() <= 1_825);
                    }
                    (FieldKind::LongText, FieldValue::Text(s)) => assert!(s.len() > 100),
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let mut counter = TokenCounter::new();
        let a = finish(GenerationJob::new(counter.mint(), 50, &settings(0.5, 7)), &counter);
        let b = finish(GenerationJob::new(counter.mint(), 50, &settings(0.5, 7)), &counter);
        assert_eq!(a.ids(), b.ids());
        assert!(a.iter().zip(b.iter()).all(|(x, y)| x == y));
    }

    #[test]
    fn test_step_processes_one_batch_at_a_time() {
        let mut counter = TokenCounter::new();
        let mut job = GenerationJob::new(counter.mint(), 25, &settings(0.5, 10));
        assert!(job.step(&counter).is_pending());
        assert_eq!(job.produced(), 10);
        assert!(job.step(&counter).is_pending());
        assert_eq!(job.produced(), 20);
        assert!(matches!(job.step(&counter), Step::Done(store) if store.len() == 25));
    }

    #[test]
    fn test_superseded_job_stops_before_next_batch() {
        let mut counter = TokenCounter::new();
        let mut job = GenerationJob::new(counter.mint(), 100, &settings(0.5, 10));
        assert!(job.step(&counter).is_pending());
        let _newer = counter.mint();
        match job.step(&counter) {
            Step::Superseded(partial) => assert_eq!(partial.len(), 10),
            other => panic!("expected superseded, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_count_finishes_immediately() {
        let mut counter = TokenCounter::new();
        let mut job = GenerationJob::new(counter.mint(), 0, &settings(0.5, 10));
        assert!(matches!(job.step(&counter), Step::Done(store) if store.is_empty()));
    }
}
