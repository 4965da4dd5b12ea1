//! Sample patient repository for the reference clinic.
//!
//! All data in this module is hardcoded and fictional. It stands in for the
//! scheduling system that would supply patient metadata in a deployment.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use telespec_contracts::{
    dashboard::{PatientRecord, ReviewStatus},
    session::PatientId,
};

/// Patient metadata keyed by patient id.
#[derive(Debug, Clone, Default)]
pub struct PatientRepository {
    records: BTreeMap<PatientId, PatientRecord>,
}

impl PatientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three reference patients, with appointments on `day` and the day after.
    ///
    /// | id     | name          | specialty        | appointment   | status    |
    /// |--------|---------------|------------------|---------------|-----------|
    /// | pt-001 | Sarah Mitchell| Cardiology       | day 14:00     | pending   |
    /// | pt-002 | James Chen    | Gastroenterology | day 15:30     | pending   |
    /// | pt-003 | Emma Thompson | Endocrinology    | day+1 10:00   | scheduled |
    pub fn sample(day: NaiveDate) -> Self {
        let midnight = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
        let at = |hours: i64, minutes: i64| -> DateTime<Utc> {
            midnight + Duration::hours(hours) + Duration::minutes(minutes)
        };

        let mut repo = Self::new();
        repo.insert(record("pt-001", "Sarah Mitchell", 54, "Female", "Cardiology", at(14, 0), ReviewStatus::Pending));
        repo.insert(record("pt-002", "James Chen", 67, "Male", "Gastroenterology", at(15, 30), ReviewStatus::Pending));
        repo.insert(record("pt-003", "Emma Thompson", 42, "Female", "Endocrinology", at(24 + 10, 0), ReviewStatus::Scheduled));
        repo
    }

    /// Add or replace a record. Returns the replaced record.
    pub fn insert(&mut self, record: PatientRecord) -> Option<PatientRecord> {
        self.records.insert(record.patient_id.clone(), record)
    }

    pub fn get(&self, patient_id: &PatientId) -> Option<&PatientRecord> {
        self.records.get(patient_id)
    }

    /// Records in patient id order.
    pub fn all(&self) -> impl Iterator<Item = &PatientRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn record(
    id: &str,
    name: &str,
    age: u32,
    sex: &str,
    specialty: &str,
    appointment_at: DateTime<Utc>,
    status: ReviewStatus,
) -> PatientRecord {
    let number = id.trim_start_matches("pt-").trim_start_matches('0');
    PatientRecord {
        patient_id: PatientId::new(id),
        name: name.to_string(),
        age: Some(age),
        sex: sex.to_string(),
        specialty: specialty.to_string(),
        mrn: format!("MT-{number}542"),
        appointment_at,
        status,
    }
}
