use anyhow::Result;
use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use colored::{ColoredString, Colorize};

use rxdesk_logging::LogEvent;
use rxdesk_records::{
    DeleteOutcome, Prescription, PrescriptionDraft, PrescriptionSort, PrescriptionStats,
    SortDirection, SortKey, Status, StatusFilter, PRESCRIPTIONS_SLOT,
};

use crate::form::DraftArgs;
use crate::prompts::{pick_prescription, prompt_draft, TerminalConfirm};
use crate::storage::Desk;

#[derive(Subcommand, Debug)]
pub enum PrescriptionsAction {
    /// List prescriptions
    List {
        /// Match patient or doctor name (any case)
        #[arg(long, default_value = "")]
        search: String,

        /// Filter by status (all, pending, completed, cancelled)
        #[arg(long, default_value = "all")]
        status: StatusFilter,

        /// Column to order by
        #[arg(long, value_enum, default_value = "id")]
        sort: SortChoice,

        /// Reverse the order
        #[arg(long)]
        desc: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one prescription
    Show {
        /// Prescription ID (launches interactive picker if omitted)
        id: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a prescription
    Create {
        #[command(flatten)]
        fields: DraftArgs,

        /// Prompt for each field instead of reading flags
        #[arg(short, long)]
        interactive: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a prescription; fields not given keep their current values
    Update {
        /// Prescription ID (launches interactive picker if omitted)
        id: Option<u32>,

        #[command(flatten)]
        fields: DraftArgs,

        /// Prompt for each field, starting from the current values
        #[arg(short, long)]
        interactive: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a prescription after confirmation
    Delete {
        /// Prescription ID (launches interactive picker if omitted)
        id: Option<u32>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show dashboard counts
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortChoice {
    Id,
    Patient,
    Doctor,
    Date,
    Status,
}

impl From<SortChoice> for SortKey {
    fn from(choice: SortChoice) -> Self {
        match choice {
            SortChoice::Id => SortKey::Id,
            SortChoice::Patient => SortKey::Patient,
            SortChoice::Doctor => SortKey::Doctor,
            SortChoice::Date => SortKey::Date,
            SortChoice::Status => SortKey::Status,
        }
    }
}

pub fn handle_prescriptions_command(
    action: PrescriptionsAction,
    desk: &Desk,
    today: NaiveDate,
) -> Result<()> {
    let mut store = desk.prescriptions();

    match action {
        PrescriptionsAction::List {
            search,
            status,
            sort,
            desc,
            json,
        } => {
            let mut rows = store.list(&search, status);
            let direction = if desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            PrescriptionSort::new(sort.into(), direction).apply(&mut rows);

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("{}", "No prescriptions found.".dimmed());
            } else {
                print_prescriptions_table(&rows);
            }
        }
        PrescriptionsAction::Show { id, json } => {
            let id = resolve_id(id, &store.list("", StatusFilter::All))?;
            let Some(record) = store.get(id) else {
                anyhow::bail!("Prescription #{} not found", id);
            };

            if json {
                println!("{}", serde_json::to_string_pretty(record)?);
            } else {
                print_prescription_detail(record);
            }
        }
        PrescriptionsAction::Create {
            fields,
            interactive,
            json,
        } => {
            let draft = if interactive {
                let blank = PrescriptionDraft::new("", "", today);
                prompt_draft(&fields.apply_over(blank))?
            } else {
                fields.into_draft()?
            };

            let seeded = store.was_seeded();
            let count = store.records().len();
            let record = desk.after_write(PRESCRIPTIONS_SLOT, seeded, count, store.create(draft))?;
            desk.log(LogEvent::PrescriptionCreated {
                id: record.id,
                patient: record.patient.clone(),
                medications: record.medications.len(),
            });

            print_saved(&record, json)?;
        }
        PrescriptionsAction::Update {
            id,
            fields,
            interactive,
            json,
        } => {
            let id = resolve_id(id, &store.list("", StatusFilter::All))?;
            let Some(existing) = store.get(id) else {
                anyhow::bail!("Prescription #{} not found", id);
            };
            let base = PrescriptionDraft::from(existing);

            let draft = if interactive {
                prompt_draft(&fields.apply_over(base))?
            } else {
                if fields.is_empty() {
                    anyhow::bail!("Nothing to update. Pass at least one field or --interactive");
                }
                fields.apply(base)?
            };

            let seeded = store.was_seeded();
            let count = store.records().len();
            let record =
                desk.after_write(PRESCRIPTIONS_SLOT, seeded, count, store.update(id, draft))?;
            desk.log(LogEvent::PrescriptionUpdated {
                id: record.id,
                status: record.status.to_string(),
            });

            print_saved(&record, json)?;
        }
        PrescriptionsAction::Delete { id, yes } => {
            let id = resolve_id(id, &store.list("", StatusFilter::All))?;
            let seeded = store.was_seeded();
            let count = store.records().len();

            let outcome = if yes {
                store.delete(id, &|_: &str| true)?
            } else {
                store.delete(id, &TerminalConfirm)?
            };

            match outcome {
                DeleteOutcome::Deleted(removed) => {
                    desk.log_seed_written(PRESCRIPTIONS_SLOT, seeded, count);
                    desk.log(LogEvent::PrescriptionDeleted {
                        id: removed.id,
                        patient: removed.patient,
                    });
                }
                DeleteOutcome::Declined => desk.log(LogEvent::DeleteDeclined { id }),
            }
        }
        PrescriptionsAction::Stats { json } => {
            let stats = store.stats(today);

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats);
            }
        }
    }

    Ok(())
}

fn resolve_id(id: Option<u32>, records: &[&Prescription]) -> Result<u32> {
    match id {
        Some(id) => Ok(id),
        None => pick_prescription(records),
    }
}

fn print_saved(record: &Prescription, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        print_prescription_detail(record);
    }
    Ok(())
}

fn status_colored(status: Status, text: String) -> ColoredString {
    match status {
        Status::Pending => text.bright_yellow(),
        Status::Completed => text.bright_green(),
        Status::Cancelled => text.bright_red(),
    }
}

fn print_prescriptions_table(rows: &[&Prescription]) {
    println!(
        "{:<5} {:<20} {:<22} {:<11} {:<10} {}",
        "ID".dimmed(),
        "PATIENT".dimmed(),
        "DOCTOR".dimmed(),
        "DATE".dimmed(),
        "STATUS".dimmed(),
        "MEDICATIONS".dimmed(),
    );

    for p in rows {
        let status = status_colored(p.status, format!("{:<10}", p.status));
        println!(
            "{:<5} {:<20} {:<22} {:<11} {} {}",
            p.id,
            truncate(&p.patient, 20),
            truncate(&p.doctor, 22),
            p.date,
            status,
            truncate(&p.medications.join(", "), 50)
        );
    }
}

fn print_prescription_detail(p: &Prescription) {
    println!(
        "{}",
        format!("=== Prescription #{} ===", p.id).bright_blue().bold()
    );
    println!("{}  {}", "Patient:".dimmed(), p.patient);
    println!("{}  {}", "Doctor:".dimmed(), p.doctor);
    println!("{}  {}", "Date:".dimmed(), p.date);
    println!(
        "{}  {}",
        "Status:".dimmed(),
        status_colored(p.status, p.status.to_string())
    );
    println!("{}", "Medications:".dimmed());
    for medication in &p.medications {
        println!("  - {}", medication);
    }
}

fn print_stats(stats: &PrescriptionStats) {
    println!("{}", "=== Prescription Statistics ===".bright_blue().bold());
    println!("{}  {}", "Total:".dimmed(), stats.total);
    println!("{}  {}", "Pending:".dimmed(), stats.pending.to_string().bright_yellow());
    println!(
        "{}  {}",
        "Completed:".dimmed(),
        stats.completed.to_string().bright_green()
    );
    println!("{}  {}", "Dated today:".dimmed(), stats.today);
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Amoxicillin 500mg", 10), "Amoxici...");
        assert_eq!(truncate("Zoë Müller-Schmidt", 8), "Zoë M...");
    }

    #[test]
    fn test_sort_choice_maps_to_key() {
        assert_eq!(SortKey::from(SortChoice::Date), SortKey::Date);
        assert_eq!(SortKey::from(SortChoice::Patient), SortKey::Patient);
    }
}
