//! # rxdesk-records
//!
//! Record stores for the rxdesk pharmacy desk.
//!
//! ## Key Types
//!
//! - [`PrescriptionStore`] - Prescriptions held in memory and mirrored to a slot
//! - [`MedicineInventory`] - Medicine stock with search, filter and sort
//! - [`SlotStorage`] - Named text slots (memory, JSON files, or a database)
//! - [`Repository`] - Load/save collaborator injected into the stores
//!
//! Both stores load their collection once when opened, falling back to a
//! fixed seed when the slot is empty or unreadable, and rewrite the whole
//! collection after every mutation.

pub mod error;
pub mod inventory;
pub mod seed;
pub mod slot;
pub mod store;
pub mod types;

pub use error::{SlotError, StoreError};
pub use inventory::{
    Availability, InventoryFilter, InventoryStats, Medicine, MedicineDraft, MedicineInventory,
    MedicineQuery, MedicineSort, MedicineSortKey, StockLevel, StockThresholds,
};
pub use slot::{JsonFileSlots, JsonSlot, MemorySlots, Repository, SlotStorage};
pub use store::{Confirm, DeleteOutcome, PrescriptionStore};
pub use types::{
    Prescription, PrescriptionDraft, PrescriptionSort, PrescriptionStats, SortDirection,
    SortKey, Status, StatusFilter,
};

/// Slot name holding the prescription collection.
pub const PRESCRIPTIONS_SLOT: &str = "prescriptions";

/// Slot name holding the medicine inventory.
pub const MEDICINES_SLOT: &str = "medicines";
