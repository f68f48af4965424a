//! Medicine inventory: stock records with search, filtering and sorting.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::seed::seed_medicines;
use crate::slot::Repository;
use crate::store::{duplicate_id, next_id};
use crate::types::SortDirection;

/// Availability label set on the record. Not derived from `stock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::InStock => "In Stock",
            Availability::LowStock => "Low Stock",
            Availability::OutOfStock => "Out of Stock",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Availability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "in stock" => Ok(Availability::InStock),
            "low stock" => Ok(Availability::LowStock),
            "out of stock" => Ok(Availability::OutOfStock),
            _ => Err(format!("Unknown availability: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub stock: u32,
    pub price: f64,
    pub expiry_date: NaiveDate,
    pub manufacturer: String,
    pub status: Availability,
}

impl Medicine {
    /// Category as a filter keyword: lowercase, spaces as dashes.
    fn category_slug(&self) -> String {
        self.category.to_lowercase().replace(' ', "-")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineDraft {
    pub name: String,
    pub category: String,
    pub stock: u32,
    pub price: f64,
    pub expiry_date: NaiveDate,
    pub manufacturer: String,
    pub status: Availability,
}

impl MedicineDraft {
    fn into_record(self, id: u32) -> Medicine {
        Medicine {
            id,
            name: self.name,
            category: self.category,
            stock: self.stock,
            price: self.price,
            expiry_date: self.expiry_date,
            manufacturer: self.manufacturer,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    Low,
    Medium,
    Healthy,
}

/// Stock bands and the "expiring soon" window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockThresholds {
    /// At or below this many units is low.
    pub low: u32,
    /// At or below this many units (and above `low`) is medium.
    pub medium: u32,
    pub expiring_within_days: u64,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self {
            low: 200,
            medium: 500,
            expiring_within_days: 90,
        }
    }
}

impl StockThresholds {
    pub fn level(&self, stock: u32) -> StockLevel {
        if stock <= self.low {
            StockLevel::Low
        } else if stock <= self.medium {
            StockLevel::Medium
        } else {
            StockLevel::Healthy
        }
    }

    /// Expired items count as expiring.
    pub fn is_expiring(&self, expiry: NaiveDate, today: NaiveDate) -> bool {
        match today.checked_add_days(Days::new(self.expiring_within_days)) {
            Some(limit) => expiry <= limit,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InventoryFilter {
    #[default]
    All,
    LowStock,
    ExpiringSoon,
    /// Category keyword, e.g. `pain-relief`.
    Category(String),
}

impl InventoryFilter {
    fn matches(&self, medicine: &Medicine, thresholds: &StockThresholds, today: NaiveDate) -> bool {
        match self {
            InventoryFilter::All => true,
            InventoryFilter::LowStock => thresholds.level(medicine.stock) == StockLevel::Low,
            InventoryFilter::ExpiringSoon => thresholds.is_expiring(medicine.expiry_date, today),
            InventoryFilter::Category(keyword) => medicine.category_slug().contains(keyword.as_str()),
        }
    }
}

impl FromStr for InventoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keyword = s.trim().to_lowercase().replace(' ', "-");
        match keyword.as_str() {
            "" => Err("Empty inventory filter".to_string()),
            "all" => Ok(InventoryFilter::All),
            "low-stock" => Ok(InventoryFilter::LowStock),
            "expiring-soon" => Ok(InventoryFilter::ExpiringSoon),
            _ => Ok(InventoryFilter::Category(keyword)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MedicineSortKey {
    #[default]
    Name,
    Category,
    Stock,
    Price,
    Expiry,
    Manufacturer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MedicineSort {
    pub key: MedicineSortKey,
    pub direction: SortDirection,
}

impl MedicineSort {
    fn compare(&self, a: &Medicine, b: &Medicine) -> Ordering {
        let ordering = match self.key {
            MedicineSortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            MedicineSortKey::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
            MedicineSortKey::Stock => a.stock.cmp(&b.stock),
            MedicineSortKey::Price => a.price.total_cmp(&b.price),
            MedicineSortKey::Expiry => a.expiry_date.cmp(&b.expiry_date),
            MedicineSortKey::Manufacturer => a
                .manufacturer
                .to_lowercase()
                .cmp(&b.manufacturer.to_lowercase()),
        };
        self.direction.apply(ordering)
    }
}

/// Search, filter and ordering for [`MedicineInventory::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicineQuery {
    pub search: String,
    pub filter: InventoryFilter,
    pub sort: MedicineSort,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryStats {
    pub total_items: usize,
    pub total_units: u64,
    pub low_stock: usize,
    pub expiring_soon: usize,
    pub inventory_value: f64,
}

/// Medicine stock, mirrored to a [`Repository`] like the prescription store.
pub struct MedicineInventory<R> {
    repo: R,
    items: Vec<Medicine>,
    thresholds: StockThresholds,
    seeded: bool,
}

impl<R: Repository<Medicine>> MedicineInventory<R> {
    pub fn open(repo: R, thresholds: StockThresholds) -> Self {
        let loaded = repo.load().filter(|items: &Vec<Medicine>| {
            match duplicate_id(items.iter().map(|m| m.id)) {
                Some(id) => {
                    tracing::warn!(id, "Discarding medicines with a repeated id");
                    false
                }
                None => true,
            }
        });
        let (items, seeded) = match loaded {
            Some(items) => (items, false),
            None => (seed_medicines(), true),
        };

        Self {
            repo,
            items,
            thresholds,
            seeded,
        }
    }

    pub fn was_seeded(&self) -> bool {
        self.seeded
    }

    pub fn items(&self) -> &[Medicine] {
        &self.items
    }

    pub fn thresholds(&self) -> &StockThresholds {
        &self.thresholds
    }

    pub fn stock_level(&self, medicine: &Medicine) -> StockLevel {
        self.thresholds.level(medicine.stock)
    }

    /// Sorted view of the items matching the query's search and filter.
    pub fn list(&self, query: &MedicineQuery, today: NaiveDate) -> Vec<&Medicine> {
        let mut sorted: Vec<&Medicine> = self.items.iter().collect();
        sorted.sort_by(|a, b| query.sort.compare(a, b));

        let needle = query.search.to_lowercase();
        sorted
            .into_iter()
            .filter(|m| m.name.to_lowercase().contains(&needle))
            .filter(|m| query.filter.matches(m, &self.thresholds, today))
            .collect()
    }

    pub fn add(&mut self, draft: MedicineDraft) -> Result<Medicine, StoreError> {
        let id = next_id(self.items.iter().map(|m| m.id))?;
        let medicine = draft.into_record(id);

        self.items.push(medicine.clone());
        self.repo.save(&self.items)?;

        tracing::info!(id, name = %medicine.name, "Added medicine");
        Ok(medicine)
    }

    pub fn stats(&self, today: NaiveDate) -> InventoryStats {
        InventoryStats {
            total_items: self.items.len(),
            total_units: self.items.iter().map(|m| u64::from(m.stock)).sum(),
            low_stock: self
                .items
                .iter()
                .filter(|m| self.stock_level(m) == StockLevel::Low)
                .count(),
            expiring_soon: self
                .items
                .iter()
                .filter(|m| self.thresholds.is_expiring(m.expiry_date, today))
                .count(),
            inventory_value: self
                .items
                .iter()
                .map(|m| f64::from(m.stock) * m.price)
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_level_bands() {
        let thresholds = StockThresholds::default();
        assert_eq!(thresholds.level(0), StockLevel::Low);
        assert_eq!(thresholds.level(200), StockLevel::Low);
        assert_eq!(thresholds.level(201), StockLevel::Medium);
        assert_eq!(thresholds.level(500), StockLevel::Medium);
        assert_eq!(thresholds.level(501), StockLevel::Healthy);
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!("all".parse::<InventoryFilter>().unwrap(), InventoryFilter::All);
        assert_eq!(
            "Low-Stock".parse::<InventoryFilter>().unwrap(),
            InventoryFilter::LowStock
        );
        assert_eq!(
            "expiring soon".parse::<InventoryFilter>().unwrap(),
            InventoryFilter::ExpiringSoon
        );
        assert_eq!(
            "Pain Relief".parse::<InventoryFilter>().unwrap(),
            InventoryFilter::Category("pain-relief".to_string())
        );
        assert!("  ".parse::<InventoryFilter>().is_err());
    }

    #[test]
    fn test_availability_serde_names() {
        let json = serde_json::to_string(&Availability::OutOfStock).unwrap();
        assert_eq!(json, "\"Out of Stock\"");
        assert_eq!(
            "low-stock".parse::<Availability>().unwrap(),
            Availability::LowStock
        );
    }

    #[test]
    fn test_expiring_window_includes_expired() {
        let thresholds = StockThresholds {
            expiring_within_days: 30,
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();

        assert!(thresholds.is_expiring(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(), today));
        assert!(thresholds.is_expiring(NaiveDate::from_ymd_opt(2024, 10, 31).unwrap(), today));
        assert!(!thresholds.is_expiring(NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(), today));
    }
}
