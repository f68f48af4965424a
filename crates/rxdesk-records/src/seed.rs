//! Records used when a slot has nothing usable in it.

use chrono::NaiveDate;

use crate::inventory::{Availability, Medicine};
use crate::types::{Prescription, Status};

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

pub fn seed_prescriptions() -> Vec<Prescription> {
    vec![
        Prescription {
            id: 1,
            patient: "John Doe".to_string(),
            date: ymd(2023, 8, 15),
            medications: vec![
                "Amoxicillin 500mg".to_string(),
                "Ibuprofen 200mg".to_string(),
            ],
            status: Status::Pending,
            doctor: "Dr. Sarah Johnson".to_string(),
        },
        Prescription {
            id: 2,
            patient: "Jane Smith".to_string(),
            date: ymd(2023, 8, 14),
            medications: vec![
                "Paracetamol 500mg".to_string(),
                "Vitamin C 1000mg".to_string(),
            ],
            status: Status::Completed,
            doctor: "Dr. Michael Chen".to_string(),
        },
    ]
}

pub fn seed_medicines() -> Vec<Medicine> {
    vec![
        Medicine {
            id: 1,
            name: "Amoxicillin".to_string(),
            category: "Antibiotics".to_string(),
            stock: 2500,
            price: 12.99,
            expiry_date: ymd(2024, 12, 31),
            manufacturer: "PharmaCorp".to_string(),
            status: Availability::InStock,
        },
        Medicine {
            id: 2,
            name: "Ibuprofen".to_string(),
            category: "Pain Relief".to_string(),
            stock: 150,
            price: 8.99,
            expiry_date: ymd(2024, 10, 15),
            manufacturer: "MediCare".to_string(),
            status: Availability::LowStock,
        },
    ]
}
