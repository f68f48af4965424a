//! Form input: the fields a user types for a prescription or a medicine,
//! and the checks they must pass before reaching a store.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use rxdesk_records::{MedicineDraft, PrescriptionDraft, Status};

/// Date format accepted everywhere a date is typed.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(input: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", input.trim()))
}

/// Prescription fields given as flags. On create the required ones must
/// all be present; on update only the given ones replace the record's.
#[derive(Args, Debug, Default, Clone)]
pub struct DraftArgs {
    /// Patient name
    #[arg(long)]
    pub patient: Option<String>,

    /// Prescribing doctor
    #[arg(long)]
    pub doctor: Option<String>,

    /// Prescription date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Medication, repeat for each one (replaces the whole list on update)
    #[arg(short = 'm', long = "medication")]
    pub medications: Vec<String>,

    /// Status (pending, completed, cancelled)
    #[arg(long)]
    pub status: Option<Status>,
}

impl DraftArgs {
    /// Build a new draft. Status defaults to Pending.
    pub fn into_draft(self) -> Result<PrescriptionDraft> {
        let mut missing = Vec::new();
        if self.patient.is_none() {
            missing.push("--patient");
        }
        if self.doctor.is_none() {
            missing.push("--doctor");
        }
        if self.date.is_none() {
            missing.push("--date");
        }
        let (Some(patient), Some(doctor), Some(date)) =
            (self.patient.clone(), self.doctor.clone(), self.date)
        else {
            anyhow::bail!("Missing required fields: {}", missing.join(", "));
        };

        self.apply(PrescriptionDraft::new(patient, doctor, date))
    }

    /// Override the fields of `base` that were given, then validate.
    pub fn apply(self, base: PrescriptionDraft) -> Result<PrescriptionDraft> {
        let draft = self.apply_over(base);
        validate_draft(&draft)?;
        Ok(draft)
    }

    /// Override the fields of `base` that were given, without validating.
    /// Used to prefill interactive prompts.
    pub fn apply_over(self, mut base: PrescriptionDraft) -> PrescriptionDraft {
        if let Some(patient) = self.patient {
            base.patient = patient.trim().to_string();
        }
        if let Some(doctor) = self.doctor {
            base.doctor = doctor.trim().to_string();
        }
        if let Some(date) = self.date {
            base.date = date;
        }
        if !self.medications.is_empty() {
            base.medications = self.medications;
        }
        if let Some(status) = self.status {
            base.status = status;
        }
        base
    }

    pub fn is_empty(&self) -> bool {
        self.patient.is_none()
            && self.doctor.is_none()
            && self.date.is_none()
            && self.medications.is_empty()
            && self.status.is_none()
    }
}

/// The checks a draft must pass before it is saved.
pub fn validate_draft(draft: &PrescriptionDraft) -> Result<()> {
    if draft.patient.trim().is_empty() {
        anyhow::bail!("Patient name is required");
    }
    if draft.doctor.trim().is_empty() {
        anyhow::bail!("Doctor name is required");
    }
    if draft.kept_medications().next().is_none() {
        anyhow::bail!("At least one medication is required");
    }
    Ok(())
}

pub fn validate_medicine(draft: &MedicineDraft) -> Result<()> {
    for (field, value) in [
        ("name", &draft.name),
        ("category", &draft.category),
        ("manufacturer", &draft.manufacturer),
    ] {
        if value.trim().is_empty() {
            anyhow::bail!("Medicine {} is required", field);
        }
    }
    if !draft.price.is_finite() || draft.price < 0.0 {
        anyhow::bail!("Price must be a non-negative number, got {}", draft.price);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxdesk_records::Availability;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn full_args() -> DraftArgs {
        DraftArgs {
            patient: Some(" Amy Chen ".to_string()),
            doctor: Some("Dr. Lee".to_string()),
            date: Some(date(2024, 3, 9)),
            medications: vec!["Zinc 50mg".to_string(), "".to_string()],
            status: None,
        }
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-02-29").unwrap(), date(2024, 2, 29));
        assert_eq!(parse_date(" 2023-08-15 ").unwrap(), date(2023, 8, 15));
        assert!(parse_date("2023-02-30").is_err());
        assert!(parse_date("15/08/2023").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_into_draft_defaults_to_pending() {
        let draft = full_args().into_draft().unwrap();

        assert_eq!(draft.patient, "Amy Chen");
        assert_eq!(draft.status, Status::Pending);
        assert_eq!(draft.date, date(2024, 3, 9));
        assert_eq!(draft.kept_medications().count(), 1);
    }

    #[test]
    fn test_into_draft_reports_missing_fields() {
        let args = DraftArgs {
            patient: Some("Amy".to_string()),
            medications: vec!["Zinc".to_string()],
            ..Default::default()
        };

        let err = args.into_draft().unwrap_err().to_string();
        assert!(err.contains("--doctor"));
        assert!(err.contains("--date"));
        assert!(!err.contains("--patient"));
    }

    #[test]
    fn test_blank_required_fields_are_rejected() {
        let args = DraftArgs {
            doctor: Some("   ".to_string()),
            ..full_args()
        };
        assert!(args.into_draft().is_err());

        let args = DraftArgs {
            medications: vec!["".to_string(), "  ".to_string()],
            ..full_args()
        };
        let err = args.into_draft().unwrap_err();
        assert!(err.to_string().contains("medication"));
    }

    #[test]
    fn test_apply_overrides_only_given_fields() {
        let base = PrescriptionDraft::new("John Doe", "Dr. Sarah Johnson", date(2023, 8, 15))
            .with_medication("Amoxicillin 500mg");

        let args = DraftArgs {
            status: Some(Status::Completed),
            ..Default::default()
        };
        assert!(!args.is_empty());

        let draft = args.apply(base.clone()).unwrap();
        assert_eq!(draft.status, Status::Completed);
        assert_eq!(draft.patient, base.patient);
        assert_eq!(draft.medications, base.medications);
    }

    #[test]
    fn test_apply_replaces_medication_list() {
        let base = PrescriptionDraft::new("John Doe", "Dr. Sarah Johnson", date(2023, 8, 15))
            .with_medication("Amoxicillin 500mg")
            .with_medication("Ibuprofen 200mg");

        let args = DraftArgs {
            medications: vec!["Cetirizine 10mg".to_string()],
            ..Default::default()
        };

        let draft = args.apply(base).unwrap();
        assert_eq!(draft.medications, vec!["Cetirizine 10mg"]);
    }

    #[test]
    fn test_validate_medicine() {
        let mut draft = MedicineDraft {
            name: "Zinc".to_string(),
            category: "Supplements".to_string(),
            stock: 0,
            price: 1.25,
            expiry_date: date(2026, 1, 1),
            manufacturer: "Acme".to_string(),
            status: Availability::OutOfStock,
        };
        assert!(validate_medicine(&draft).is_ok());

        draft.price = -1.0;
        assert!(validate_medicine(&draft).is_err());

        draft.price = 1.0;
        draft.manufacturer = " ".to_string();
        let err = validate_medicine(&draft).unwrap_err();
        assert!(err.to_string().contains("manufacturer"));
    }
}
