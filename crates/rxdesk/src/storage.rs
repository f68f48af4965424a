//! Opening the slot backend and the record stores on top of it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Deserialize;

use rxdesk_db::Database;
use rxdesk_logging::{LogEvent, Logger};
use rxdesk_records::{
    JsonFileSlots, JsonSlot, Medicine, MedicineInventory, MemorySlots, Prescription,
    PrescriptionStore, SlotStorage, StockThresholds, StoreError, MEDICINES_SLOT,
    PRESCRIPTIONS_SLOT,
};

use crate::config::Settings;

/// Where slots are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One JSON file per slot
    #[default]
    Json,
    /// A single SQLite database
    Sqlite,
    /// Process memory; nothing is kept after exit
    Memory,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Json => "json",
            Backend::Sqlite => "sqlite",
            Backend::Memory => "memory",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open the slot storage for `backend`. `path` is the slot directory for
/// `json` and the database file for `sqlite`; both fall back to the
/// per-user data directory.
pub fn open_storage(backend: Backend, path: Option<&Path>) -> Result<Arc<dyn SlotStorage>> {
    let storage: Arc<dyn SlotStorage> = match backend {
        Backend::Json => {
            let slots = match path {
                Some(dir) => JsonFileSlots::with_dir(dir),
                None => JsonFileSlots::new(),
            };
            tracing::debug!(dir = %slots.dir().display(), "Using JSON slot files");
            Arc::new(slots)
        }
        Backend::Sqlite => {
            let db = match path {
                Some(file) => {
                    if let Some(parent) = file.parent() {
                        std::fs::create_dir_all(parent).with_context(|| {
                            format!("Failed to create {}", parent.display())
                        })?;
                    }
                    Database::open_at(file)
                        .with_context(|| format!("Failed to open database {}", file.display()))?
                }
                None => Database::open().context("Failed to open database")?,
            };
            for (slot, updated_at) in slot_summary(&db)? {
                tracing::debug!(
                    slot = %slot,
                    updated_at = ?updated_at,
                    "Found stored slot"
                );
            }
            Arc::new(db)
        }
        Backend::Memory => {
            tracing::warn!("Memory backend selected; changes are discarded on exit");
            Arc::new(MemorySlots::new())
        }
    };

    Ok(storage)
}

/// Every slot the database holds, with the time it was last written.
fn slot_summary(db: &Database) -> Result<Vec<(String, Option<DateTime<Utc>>)>> {
    let slots = db.slots();
    let names = slots.names().context("Failed to list stored slots")?;

    names
        .into_iter()
        .map(|name| {
            let updated_at = slots
                .updated_at(&name)
                .with_context(|| format!("Failed to read slot {}", name))?;
            Ok((name, updated_at))
        })
        .collect()
}

/// A repository over one slot of the opened backend.
pub type SlotRepo<T> = JsonSlot<Arc<dyn SlotStorage>, T>;

/// Everything a command needs: the storage, inventory thresholds and the
/// audit logger.
pub struct Desk {
    storage: Arc<dyn SlotStorage>,
    thresholds: StockThresholds,
    logger: Logger,
}

impl Desk {
    pub fn new(storage: Arc<dyn SlotStorage>, thresholds: StockThresholds, logger: Logger) -> Self {
        Self {
            storage,
            thresholds,
            logger,
        }
    }

    pub fn open(settings: &Settings) -> Result<Self> {
        let storage = open_storage(settings.backend, settings.data_path.as_deref())?;

        let logger = match settings.audit_file {
            Some(ref path) => Logger::with_file(settings.log_format, path)
                .with_context(|| format!("Failed to open audit file {}", path.display()))?,
            None => Logger::new(settings.log_format),
        };

        Ok(Self::new(storage, settings.thresholds, logger))
    }

    pub fn prescriptions(&self) -> PrescriptionStore<SlotRepo<Prescription>> {
        PrescriptionStore::open(JsonSlot::new(self.storage.clone(), PRESCRIPTIONS_SLOT))
    }

    pub fn inventory(&self) -> MedicineInventory<SlotRepo<Medicine>> {
        MedicineInventory::open(
            JsonSlot::new(self.storage.clone(), MEDICINES_SLOT),
            self.thresholds,
        )
    }

    pub fn log(&self, event: LogEvent) {
        self.logger.log(&event);
    }

    /// Pass a store write through, reporting the seed as persisted only
    /// when the write went through.
    pub fn after_write<T>(
        &self,
        slot: &str,
        seeded: bool,
        records: usize,
        result: Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        if result.is_ok() {
            self.log_seed_written(slot, seeded, records);
        }
        result
    }

    /// Report that a seeded collection has been written for the first time.
    pub fn log_seed_written(&self, slot: &str, seeded: bool, records: usize) {
        if seeded {
            self.log(LogEvent::SlotSeeded {
                slot: slot.to_string(),
                records,
            });
        }
    }
}
