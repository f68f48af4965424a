use std::sync::Arc;

use chrono::NaiveDate;
use rxdesk_records::{
    Availability, InventoryFilter, JsonSlot, Medicine, MedicineDraft, MedicineInventory,
    MedicineQuery, MedicineSort, MedicineSortKey, MemorySlots, SlotStorage, SortDirection,
    StockLevel, StockThresholds, StoreError, MEDICINES_SLOT,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn inventory() -> (MedicineInventory<JsonSlot<Arc<MemorySlots>, Medicine>>, Arc<MemorySlots>) {
    let slots = Arc::new(MemorySlots::new());
    let inventory = MedicineInventory::open(
        JsonSlot::new(slots.clone(), MEDICINES_SLOT),
        StockThresholds::default(),
    );
    (inventory, slots)
}

fn paracetamol() -> MedicineDraft {
    MedicineDraft {
        name: "Paracetamol".to_string(),
        category: "Pain Relief".to_string(),
        stock: 400,
        price: 2.5,
        expiry_date: date(2026, 6, 30),
        manufacturer: "Acme".to_string(),
        status: Availability::InStock,
    }
}

fn names(items: &[&Medicine]) -> Vec<String> {
    items.iter().map(|m| m.name.clone()).collect()
}

#[test]
fn test_seeded_inventory() {
    let (inventory, slots) = inventory();
    assert!(inventory.was_seeded());
    assert_eq!(inventory.items().len(), 2);
    assert_eq!(inventory.items()[1].status, Availability::LowStock);
    assert!(slots.get(MEDICINES_SLOT).unwrap().is_none());
}

#[test]
fn test_default_listing_sorts_by_name() {
    let (mut inventory, _) = inventory();
    inventory.add(paracetamol()).unwrap();

    let listed = inventory.list(&MedicineQuery::default(), date(2024, 1, 1));
    assert_eq!(names(&listed), vec!["Amoxicillin", "Ibuprofen", "Paracetamol"]);
}

#[test]
fn test_sort_by_stock_desc() {
    let (mut inventory, _) = inventory();
    inventory.add(paracetamol()).unwrap();

    let query = MedicineQuery {
        sort: MedicineSort {
            key: MedicineSortKey::Stock,
            direction: SortDirection::Desc,
        },
        ..Default::default()
    };
    let listed = inventory.list(&query, date(2024, 1, 1));
    let stock: Vec<u32> = listed.iter().map(|m| m.stock).collect();
    assert_eq!(stock, vec![2500, 400, 150]);
}

#[test]
fn test_search_and_category_filter() {
    let (mut inventory, _) = inventory();
    inventory.add(paracetamol()).unwrap();
    let today = date(2024, 1, 1);

    let query = MedicineQuery {
        filter: "pain-relief".parse().unwrap(),
        ..Default::default()
    };
    assert_eq!(names(&inventory.list(&query, today)), vec!["Ibuprofen", "Paracetamol"]);

    let query = MedicineQuery {
        search: "PARA".to_string(),
        filter: InventoryFilter::Category("pain".to_string()),
        ..Default::default()
    };
    assert_eq!(names(&inventory.list(&query, today)), vec!["Paracetamol"]);

    let query = MedicineQuery {
        filter: "antibiotics".parse().unwrap(),
        ..Default::default()
    };
    assert_eq!(names(&inventory.list(&query, today)), vec!["Amoxicillin"]);
}

#[test]
fn test_low_stock_and_expiring_filters() {
    let (mut inventory, _) = inventory();
    inventory.add(paracetamol()).unwrap();
    let today = date(2024, 10, 2);

    let low = MedicineQuery {
        filter: InventoryFilter::LowStock,
        ..Default::default()
    };
    assert_eq!(names(&inventory.list(&low, today)), vec!["Ibuprofen"]);

    let expiring = MedicineQuery {
        filter: InventoryFilter::ExpiringSoon,
        ..Default::default()
    };
    // 90 days from 2024-10-02 is 2024-12-31, Amoxicillin's expiry
    assert_eq!(
        names(&inventory.list(&expiring, today)),
        vec!["Amoxicillin", "Ibuprofen"]
    );
    assert_eq!(
        names(&inventory.list(&expiring, date(2024, 10, 1))),
        vec!["Ibuprofen"]
    );
}

#[test]
fn test_add_assigns_next_id_and_persists() {
    let (mut inventory, slots) = inventory();

    let added = inventory.add(paracetamol()).unwrap();
    assert_eq!(added.id, 3);

    let raw = slots.get(MEDICINES_SLOT).unwrap().unwrap();
    let saved: Vec<Medicine> = serde_json::from_str(&raw).unwrap();
    assert_eq!(saved.len(), 3);
    assert!(raw.contains("\"expiryDate\":\"2026-06-30\""));

    let reopened = MedicineInventory::open(
        JsonSlot::new(slots, MEDICINES_SLOT),
        StockThresholds::default(),
    );
    assert!(!reopened.was_seeded());
    assert_eq!(reopened.items(), inventory.items());
}

#[test]
fn test_stats_and_levels() {
    let (mut inventory, _) = inventory();
    inventory.add(paracetamol()).unwrap();

    let stats = inventory.stats(date(2024, 10, 1));
    assert_eq!(stats.total_items, 3);
    assert_eq!(stats.total_units, 3050);
    assert_eq!(stats.low_stock, 1);
    assert_eq!(stats.expiring_soon, 1);
    let expected = 2500.0 * 12.99 + 150.0 * 8.99 + 400.0 * 2.5;
    assert!((stats.inventory_value - expected).abs() < 1e-6);

    let levels: Vec<StockLevel> = inventory
        .items()
        .iter()
        .map(|m| inventory.stock_level(m))
        .collect();
    assert_eq!(
        levels,
        vec![StockLevel::Healthy, StockLevel::Low, StockLevel::Medium]
    );
}

#[test]
fn test_custom_thresholds() {
    let slots = Arc::new(MemorySlots::new());
    let inventory = MedicineInventory::open(
        JsonSlot::new(slots, MEDICINES_SLOT),
        StockThresholds {
            low: 100,
            medium: 3000,
            expiring_within_days: 0,
        },
    );

    assert_eq!(inventory.stats(date(2024, 1, 1)).low_stock, 0);
    assert_eq!(
        inventory.stock_level(&inventory.items()[0]),
        StockLevel::Medium
    );
}

#[test]
fn test_add_after_largest_id_reports_exhaustion() {
    let slots = Arc::new(MemorySlots::new());
    slots
        .put(
            MEDICINES_SLOT,
            r#"[{"id":4294967295,"name":"Zinc","category":"Supplements","stock":10,"price":1.0,"expiryDate":"2026-01-01","manufacturer":"Acme","status":"In Stock"}]"#,
        )
        .unwrap();

    let mut inventory = MedicineInventory::open(
        JsonSlot::new(slots, MEDICINES_SLOT),
        StockThresholds::default(),
    );
    assert!(!inventory.was_seeded());

    let err = inventory.add(paracetamol()).unwrap_err();
    assert!(matches!(err, StoreError::IdsExhausted(_)));
    assert_eq!(inventory.items().len(), 1);
}

#[test]
fn test_repeated_ids_fall_back_to_seed() {
    let slots = Arc::new(MemorySlots::new());
    let item = r#"{"id":1,"name":"Zinc","category":"Supplements","stock":10,"price":1.0,"expiryDate":"2026-01-01","manufacturer":"Acme","status":"In Stock"}"#;
    slots
        .put(MEDICINES_SLOT, &format!("[{},{}]", item, item))
        .unwrap();

    let inventory = MedicineInventory::open(
        JsonSlot::new(slots, MEDICINES_SLOT),
        StockThresholds::default(),
    );
    assert!(inventory.was_seeded());
    assert_eq!(inventory.items()[0].name, "Amoxicillin");
}
