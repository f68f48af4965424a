use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::StoreError;
use crate::seed::seed_prescriptions;
use crate::slot::Repository;
use crate::types::{Prescription, PrescriptionDraft, PrescriptionStats, Status, StatusFilter};

/// Blocking yes/no question asked before a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Result of [`PrescriptionStore::delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(Prescription),
    Declined,
}

/// Next free id: one past the largest id ever kept, so ids are not reused.
pub(crate) fn next_id(ids: impl Iterator<Item = u32>) -> Result<u32, StoreError> {
    let max = ids.max().unwrap_or(0);
    max.checked_add(1).ok_or(StoreError::IdsExhausted(max))
}

/// The first id that appears more than once, if any.
pub(crate) fn duplicate_id(mut ids: impl Iterator<Item = u32>) -> Option<u32> {
    let mut seen = HashSet::new();
    ids.find(|id| !seen.insert(*id))
}

/// The prescriptions of the current session, mirrored to a [`Repository`].
pub struct PrescriptionStore<R> {
    repo: R,
    records: Vec<Prescription>,
    seeded: bool,
}

impl<R: Repository<Prescription>> PrescriptionStore<R> {
    /// Load the collection once, seeding it if the repository has nothing
    /// usable. A collection with repeated ids counts as malformed.
    pub fn open(repo: R) -> Self {
        let loaded = repo.load().filter(|records: &Vec<Prescription>| {
            match duplicate_id(records.iter().map(|p| p.id)) {
                Some(id) => {
                    tracing::warn!(id, "Discarding prescriptions with a repeated id");
                    false
                }
                None => true,
            }
        });
        let (records, seeded) = match loaded {
            Some(records) => (records, false),
            None => (seed_prescriptions(), true),
        };

        Self {
            repo,
            records,
            seeded,
        }
    }

    /// Whether the collection came from the seed rather than the repository.
    pub fn was_seeded(&self) -> bool {
        self.seeded
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Every record, in storage order.
    pub fn records(&self) -> &[Prescription] {
        &self.records
    }

    pub fn get(&self, id: u32) -> Option<&Prescription> {
        self.records.iter().find(|p| p.id == id)
    }

    /// Records whose patient or doctor contains `search` (any case) and whose
    /// status passes `filter`. Storage order is kept.
    pub fn list(&self, search: &str, filter: StatusFilter) -> Vec<&Prescription> {
        let needle = search.to_lowercase();
        self.records
            .iter()
            .filter(|p| p.matches_search(&needle) && filter.matches(p.status))
            .collect()
    }

    pub fn create(&mut self, draft: PrescriptionDraft) -> Result<Prescription, StoreError> {
        let id = next_id(self.records.iter().map(|p| p.id))?;
        let record = draft.into_record(id);

        self.records.push(record.clone());
        self.persist()?;

        tracing::info!(id, patient = %record.patient, "Created prescription");
        Ok(record)
    }

    /// Replace every field of record `id` except the id itself.
    pub fn update(&mut self, id: u32, draft: PrescriptionDraft) -> Result<Prescription, StoreError> {
        let slot = self
            .records
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let record = draft.into_record(id);
        *slot = record.clone();
        self.persist()?;

        tracing::info!(id, status = %record.status, "Updated prescription");
        Ok(record)
    }

    /// Remove record `id` once `confirm` agrees. Nothing is asked when the
    /// record does not exist.
    pub fn delete<C: Confirm + ?Sized>(
        &mut self,
        id: u32,
        confirm: &C,
    ) -> Result<DeleteOutcome, StoreError> {
        let index = self
            .records
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let prompt = format!(
            "Delete prescription #{} for {}?",
            id, self.records[index].patient
        );
        if !confirm.confirm(&prompt) {
            tracing::debug!(id, "Delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        let removed = self.records.remove(index);
        self.persist()?;

        tracing::info!(id, "Deleted prescription");
        Ok(DeleteOutcome::Deleted(removed))
    }

    /// Dashboard counts, recomputed on every call.
    pub fn stats(&self, today: NaiveDate) -> PrescriptionStats {
        let count = |status: Status| self.records.iter().filter(|p| p.status == status).count();

        PrescriptionStats {
            total: self.records.len(),
            pending: count(Status::Pending),
            completed: count(Status::Completed),
            today: self.records.iter().filter(|p| p.date == today).count(),
        }
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.repo.save(&self.records)?;
        Ok(())
    }
}
