use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Audit events for changes to the record stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    /// A slot had nothing usable and the store started from its seed
    SlotSeeded {
        slot: String,
        records: usize,
    },
    PrescriptionCreated {
        id: u32,
        patient: String,
        medications: usize,
    },
    PrescriptionUpdated {
        id: u32,
        status: String,
    },
    PrescriptionDeleted {
        id: u32,
        patient: String,
    },
    DeleteDeclined {
        id: u32,
    },
    MedicineAdded {
        id: u32,
        name: String,
        stock: u32,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for rxdesk events - handles both console output and an audit file
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger that also appends every event to an audit file
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // The audit file is always JSON lines
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        let mut stderr = std::io::stderr();
        let line = match self.format {
            LogFormat::Json => serde_json::to_string(event).ok(),
            LogFormat::Pretty => Self::pretty(event),
            LogFormat::Compact => Some(Self::compact(event)),
        };
        if let Some(line) = line {
            let _ = writeln!(stderr, "{}", line);
        }
    }

    fn pretty(event: &LogEvent) -> Option<String> {
        let line = match event {
            LogEvent::SlotSeeded { slot, records } => format!(
                "{} No saved {} found, starting from {} sample records",
                "ℹ".bright_blue(),
                slot,
                records
            ),
            LogEvent::PrescriptionCreated {
                id,
                patient,
                medications,
            } => format!(
                "{} Created prescription {} for {} ({} {})",
                "✓".bright_green(),
                format!("#{}", id).bold(),
                patient,
                medications,
                if *medications == 1 {
                    "medication"
                } else {
                    "medications"
                }
            ),
            LogEvent::PrescriptionUpdated { id, status } => format!(
                "{} Updated prescription {} ({})",
                "✓".bright_green(),
                format!("#{}", id).bold(),
                status
            ),
            LogEvent::PrescriptionDeleted { id, patient } => format!(
                "{} Deleted prescription {} for {}",
                "✓".bright_green(),
                format!("#{}", id).bold(),
                patient
            ),
            LogEvent::DeleteDeclined { id } => format!(
                "{} Kept prescription {}",
                "→".bright_yellow(),
                format!("#{}", id).bold()
            ),
            LogEvent::MedicineAdded { id, name, stock } => format!(
                "{} Added {} as medicine {} ({} units)",
                "✓".bright_green(),
                name,
                format!("#{}", id).bold(),
                stock
            ),
        };
        Some(line)
    }

    fn compact(event: &LogEvent) -> String {
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        match event {
            LogEvent::SlotSeeded { slot, records } => {
                format!("[{}] slot:seed:{} {}", timestamp, slot, records)
            }
            LogEvent::PrescriptionCreated { id, .. } => {
                format!("[{}] rx:create:{}", timestamp, id)
            }
            LogEvent::PrescriptionUpdated { id, status } => {
                format!("[{}] rx:update:{} {}", timestamp, id, status)
            }
            LogEvent::PrescriptionDeleted { id, .. } => {
                format!("[{}] rx:delete:{}", timestamp, id)
            }
            LogEvent::DeleteDeclined { id } => format!("[{}] rx:keep:{}", timestamp, id),
            LogEvent::MedicineAdded { id, stock, .. } => {
                format!("[{}] med:add:{} stock={}", timestamp, id, stock)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_event_tagging() {
        let event = LogEvent::PrescriptionDeleted {
            id: 3,
            patient: "Amy".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "prescription_deleted");
        assert_eq!(value["id"], 3);
    }

    #[test]
    fn test_audit_file_gets_timestamped_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("audit").join("events.jsonl");

        let logger = Logger::with_file(LogFormat::Compact, &path).unwrap();
        logger.log(&LogEvent::DeleteDeclined { id: 1 });
        logger.log(&LogEvent::MedicineAdded {
            id: 3,
            name: "Zinc".to_string(),
            stock: 40,
        });

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "delete_declined");
        assert!(lines[1]["timestamp"].is_string());
        assert_eq!(lines[1]["name"], "Zinc");
    }
}
