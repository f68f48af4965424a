//! Interactive terminal prompts.

use anyhow::Result;
use dialoguer::{Confirm as ConfirmPrompt, FuzzySelect, Input, Select};

use rxdesk_records::{Confirm, Prescription, PrescriptionDraft, Status};

use crate::form::{parse_date, validate_draft, DATE_FORMAT};

/// Asks on the terminal before a delete. Anything but an explicit "yes"
/// keeps the record.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        match ConfirmPrompt::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
        {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("Confirmation prompt failed, keeping record: {}", e);
                false
            }
        }
    }
}

/// Let the user pick a prescription from `records`.
pub fn pick_prescription(records: &[&Prescription]) -> Result<u32> {
    if records.is_empty() {
        anyhow::bail!("No prescriptions found.");
    }

    let items: Vec<String> = records
        .iter()
        .map(|p| {
            format!(
                "#{:<4} {} | {} | {} | {}",
                p.id, p.date, p.patient, p.doctor, p.status
            )
        })
        .collect();

    let selection = FuzzySelect::new()
        .with_prompt("Select a prescription")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(records[selection].id)
}

/// Fill a draft field by field, each prompt starting from `initial`.
pub fn prompt_draft(initial: &PrescriptionDraft) -> Result<PrescriptionDraft> {
    let patient = required_text("Patient name", &initial.patient)?;
    let doctor = required_text("Doctor", &initial.doctor)?;

    let date_text = Input::<String>::new()
        .with_prompt("Date (YYYY-MM-DD)")
        .with_initial_text(initial.date.format(DATE_FORMAT).to_string())
        .validate_with(|input: &String| parse_date(input).map(|_| ()))
        .interact_text()?;
    let date = parse_date(&date_text).map_err(anyhow::Error::msg)?;

    let medications = prompt_medications(&initial.medications)?;

    let current = initial.status;
    let labels: Vec<&str> = Status::ALL.iter().map(|s| s.as_str()).collect();
    let selection = Select::new()
        .with_prompt("Status")
        .items(&labels)
        .default(Status::ALL.iter().position(|s| *s == current).unwrap_or(0))
        .interact()?;

    let draft = PrescriptionDraft {
        patient,
        date,
        medications,
        status: Status::ALL[selection],
        doctor,
    };
    validate_draft(&draft)?;
    Ok(draft)
}

fn required_text(prompt: &str, initial: &str) -> Result<String> {
    let text = Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("This field is required")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    Ok(text.trim().to_string())
}

fn prompt_medications(current: &[String]) -> Result<Vec<String>> {
    let current: Vec<&String> = current.iter().filter(|m| !m.trim().is_empty()).collect();
    if !current.is_empty() {
        let names: Vec<&str> = current.iter().map(|m| m.as_str()).collect();
        let keep = ConfirmPrompt::new()
            .with_prompt(format!("Keep medications ({})?", names.join(", ")))
            .default(true)
            .interact()?;
        if keep {
            return Ok(current.into_iter().cloned().collect());
        }
    }

    eprintln!("Enter medications one per line, empty line to finish.");
    let mut medications = Vec::new();
    loop {
        let entry: String = Input::new()
            .with_prompt(format!("Medication {}", medications.len() + 1))
            .allow_empty(true)
            .interact_text()?;

        let entry = entry.trim();
        if entry.is_empty() {
            if medications.is_empty() {
                eprintln!("At least one medication is required.");
                continue;
            }
            break;
        }
        medications.push(entry.to_string());
    }

    Ok(medications)
}
