use anyhow::Result;
use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use colored::{ColoredString, Colorize};

use rxdesk_logging::LogEvent;
use rxdesk_records::{
    Availability, InventoryFilter, InventoryStats, Medicine, MedicineDraft, MedicineQuery,
    MedicineSort, MedicineSortKey, SortDirection, StockLevel, MEDICINES_SLOT,
};

use crate::form::{parse_date, validate_medicine};
use crate::storage::Desk;

#[derive(Subcommand, Debug)]
pub enum MedicinesAction {
    /// List the inventory
    List {
        /// Match medicine name (any case)
        #[arg(long, default_value = "")]
        search: String,

        /// all, low-stock, expiring-soon, or a category such as pain-relief
        #[arg(long, default_value = "all")]
        filter: InventoryFilter,

        /// Column to order by
        #[arg(long, value_enum, default_value = "name")]
        sort: MedicineSortChoice,

        /// Reverse the order
        #[arg(long)]
        desc: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a medicine to the inventory
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        category: String,

        /// Units in stock
        #[arg(long)]
        stock: u32,

        /// Unit price
        #[arg(long)]
        price: f64,

        /// Expiry date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        expiry: NaiveDate,

        #[arg(long)]
        manufacturer: String,

        /// Availability label (in-stock, low-stock, out-of-stock)
        #[arg(long, default_value = "in-stock")]
        status: Availability,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show inventory totals
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MedicineSortChoice {
    Name,
    Category,
    Stock,
    Price,
    Expiry,
    Manufacturer,
}

impl From<MedicineSortChoice> for MedicineSortKey {
    fn from(choice: MedicineSortChoice) -> Self {
        match choice {
            MedicineSortChoice::Name => MedicineSortKey::Name,
            MedicineSortChoice::Category => MedicineSortKey::Category,
            MedicineSortChoice::Stock => MedicineSortKey::Stock,
            MedicineSortChoice::Price => MedicineSortKey::Price,
            MedicineSortChoice::Expiry => MedicineSortKey::Expiry,
            MedicineSortChoice::Manufacturer => MedicineSortKey::Manufacturer,
        }
    }
}

pub fn handle_medicines_command(action: MedicinesAction, desk: &Desk, today: NaiveDate) -> Result<()> {
    let mut inventory = desk.inventory();

    match action {
        MedicinesAction::List {
            search,
            filter,
            sort,
            desc,
            json,
        } => {
            let query = MedicineQuery {
                search,
                filter,
                sort: MedicineSort {
                    key: sort.into(),
                    direction: if desc {
                        SortDirection::Desc
                    } else {
                        SortDirection::Asc
                    },
                },
            };
            let rows = inventory.list(&query, today);

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("{}", "No medicines found.".dimmed());
            } else {
                print_medicines_table(&rows, |m| inventory.stock_level(m), |m| {
                    inventory.thresholds().is_expiring(m.expiry_date, today)
                });
            }
        }
        MedicinesAction::Add {
            name,
            category,
            stock,
            price,
            expiry,
            manufacturer,
            status,
            json,
        } => {
            let draft = MedicineDraft {
                name: name.trim().to_string(),
                category: category.trim().to_string(),
                stock,
                price,
                expiry_date: expiry,
                manufacturer: manufacturer.trim().to_string(),
                status,
            };
            validate_medicine(&draft)?;

            let seeded = inventory.was_seeded();
            let count = inventory.items().len();
            let medicine = desk.after_write(MEDICINES_SLOT, seeded, count, inventory.add(draft))?;
            desk.log(LogEvent::MedicineAdded {
                id: medicine.id,
                name: medicine.name.clone(),
                stock: medicine.stock,
            });

            if json {
                println!("{}", serde_json::to_string_pretty(&medicine)?);
            } else {
                print_medicines_table(&[&medicine], |m| inventory.stock_level(m), |m| {
                    inventory.thresholds().is_expiring(m.expiry_date, today)
                });
            }
        }
        MedicinesAction::Stats { json } => {
            let stats = inventory.stats(today);

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats);
            }
        }
    }

    Ok(())
}

fn level_colored(level: StockLevel, text: String) -> ColoredString {
    match level {
        StockLevel::Low => text.bright_red(),
        StockLevel::Medium => text.bright_yellow(),
        StockLevel::Healthy => text.bright_green(),
    }
}

fn print_medicines_table(
    rows: &[&Medicine],
    level: impl Fn(&Medicine) -> StockLevel,
    expiring: impl Fn(&Medicine) -> bool,
) {
    println!(
        "{:<5} {:<18} {:<16} {:>7} {:>9} {:<11} {:<14} {}",
        "ID".dimmed(),
        "NAME".dimmed(),
        "CATEGORY".dimmed(),
        "STOCK".dimmed(),
        "PRICE".dimmed(),
        "EXPIRES".dimmed(),
        "MANUFACTURER".dimmed(),
        "STATUS".dimmed(),
    );

    for m in rows {
        let stock = level_colored(level(m), format!("{:>7}", m.stock));
        let expiry = format!("{:<11}", m.expiry_date.to_string());
        let expiry = if expiring(m) {
            expiry.bright_red().to_string()
        } else {
            expiry
        };
        println!(
            "{:<5} {:<18} {:<16} {} {:>9.2} {} {:<14} {}",
            m.id, m.name, m.category, stock, m.price, expiry, m.manufacturer, m.status
        );
    }
}

fn print_stats(stats: &InventoryStats) {
    println!("{}", "=== Inventory Statistics ===".bright_blue().bold());
    println!("{}  {}", "Items:".dimmed(), stats.total_items);
    println!("{}  {}", "Units in stock:".dimmed(), stats.total_units);
    println!(
        "{}  {}",
        "Low stock:".dimmed(),
        if stats.low_stock > 0 {
            stats.low_stock.to_string().bright_red().to_string()
        } else {
            stats.low_stock.to_string()
        }
    );
    println!(
        "{}  {}",
        "Expiring soon:".dimmed(),
        if stats.expiring_soon > 0 {
            stats.expiring_soon.to_string().bright_yellow().to_string()
        } else {
            stats.expiring_soon.to_string()
        }
    );
    println!(
        "{}  {:.2}",
        "Inventory value:".dimmed(),
        stats.inventory_value
    );
}
