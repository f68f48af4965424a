use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Lifecycle label on a prescription. Any status may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Pending,
    Completed,
    Cancelled,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::Completed, Status::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Completed => "Completed",
            Status::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown status: {}", s))
    }
}

/// Status predicate used by [`crate::PrescriptionStore::list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn matches(&self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

/// A stored prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: u32,
    pub patient: String,
    pub date: NaiveDate,
    pub medications: Vec<String>,
    pub status: Status,
    pub doctor: String,
}

impl Prescription {
    /// Case-insensitive substring match against patient or doctor.
    /// `needle` must already be lowercased.
    pub(crate) fn matches_search(&self, needle: &str) -> bool {
        self.patient.to_lowercase().contains(needle) || self.doctor.to_lowercase().contains(needle)
    }
}

/// User-entered prescription data that has no id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionDraft {
    pub patient: String,
    pub date: NaiveDate,
    pub medications: Vec<String>,
    pub status: Status,
    pub doctor: String,
}

impl PrescriptionDraft {
    pub fn new(patient: impl Into<String>, doctor: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            patient: patient.into(),
            date,
            medications: Vec::new(),
            status: Status::Pending,
            doctor: doctor.into(),
        }
    }

    pub fn with_medication(mut self, medication: impl Into<String>) -> Self {
        self.medications.push(medication.into());
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Medications that survive a save.
    pub fn kept_medications(&self) -> impl Iterator<Item = &String> {
        self.medications.iter().filter(|m| !m.trim().is_empty())
    }

    /// Attach an id, dropping blank medication entries.
    pub(crate) fn into_record(self, id: u32) -> Prescription {
        let medications = self
            .medications
            .into_iter()
            .filter(|m| !m.trim().is_empty())
            .collect();

        Prescription {
            id,
            patient: self.patient,
            date: self.date,
            medications,
            status: self.status,
            doctor: self.doctor,
        }
    }
}

impl From<&Prescription> for PrescriptionDraft {
    fn from(record: &Prescription) -> Self {
        Self {
            patient: record.patient.clone(),
            date: record.date,
            medications: record.medications.clone(),
            status: record.status,
            doctor: record.doctor.clone(),
        }
    }
}

/// Counts shown on the prescriptions dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub today: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub(crate) fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Column a prescription listing can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Id,
    Patient,
    Doctor,
    Date,
    Status,
}

/// Display ordering for prescriptions. Stable: ties keep storage order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrescriptionSort {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl PrescriptionSort {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn apply(&self, records: &mut [&Prescription]) {
        records.sort_by(|a, b| self.direction.apply(self.compare(a, b)));
    }

    fn compare(&self, a: &Prescription, b: &Prescription) -> Ordering {
        match self.key {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Patient => a.patient.to_lowercase().cmp(&b.patient.to_lowercase()),
            SortKey::Doctor => a.doctor.to_lowercase().cmp(&b.doctor.to_lowercase()),
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::Status => a.status.cmp(&b.status),
        }
    }
}
