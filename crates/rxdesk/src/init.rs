//! Interactive initialization for rxdesk.
//!
//! Writes the global config file with user-selected defaults.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Input, Select};
use std::fs;
use std::path::{Path, PathBuf};

use rxdesk_db::Database;
use rxdesk_records::{JsonFileSlots, StockThresholds};

use crate::config::{GLOBAL_CONFIG_DIR, GLOBAL_CONFIG_FILE};
use crate::storage::Backend;

struct BackendInfo {
    display_name: &'static str,
    backend: Backend,
}

const BACKENDS: &[BackendInfo] = &[
    BackendInfo {
        display_name: "JSON files (one file per collection)",
        backend: Backend::Json,
    },
    BackendInfo {
        display_name: "SQLite database",
        backend: Backend::Sqlite,
    },
    BackendInfo {
        display_name: "Memory only (nothing is saved)",
        backend: Backend::Memory,
    },
];

pub fn handle_init() -> Result<()> {
    eprintln!("{}", "Setting up rxdesk...".bold());
    eprintln!();

    // Step 1: Storage backend
    let items: Vec<&str> = BACKENDS.iter().map(|b| b.display_name).collect();
    let selection = Select::new()
        .with_prompt("Where should records be stored?")
        .items(&items)
        .default(0)
        .interact()?;
    let backend = BACKENDS[selection].backend;

    let path = match default_data_path(backend) {
        Some(default) => {
            let path: String = Input::new()
                .with_prompt("Storage location")
                .default(default.display().to_string())
                .interact_text()?;
            Some(PathBuf::from(path.trim()))
        }
        None => None,
    };

    // Step 2: Stock thresholds
    let defaults = StockThresholds::default();
    let low: u32 = Input::new()
        .with_prompt("Low stock at or below")
        .default(defaults.low)
        .interact_text()?;
    let medium: u32 = Input::new()
        .with_prompt("Medium stock at or below")
        .default(defaults.medium.max(low))
        .validate_with(|value: &u32| {
            if *value < low {
                Err(format!("Must be at least {}", low))
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    // Step 3: Write global config
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join(GLOBAL_CONFIG_DIR);

    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;

    let config_path = config_dir.join(GLOBAL_CONFIG_FILE);
    let config_content = render_config(
        backend,
        path.as_deref(),
        &StockThresholds {
            low,
            medium,
            ..defaults
        },
    );

    // Check if config already exists
    if config_path.exists() {
        eprintln!(
            "{} Config already exists at {}",
            "⚠".bright_yellow(),
            config_path.display()
        );

        let overwrite = Select::new()
            .with_prompt("Overwrite existing config?")
            .items(&["No, keep existing", "Yes, replace it"])
            .default(0)
            .interact()?;

        if overwrite == 0 {
            eprintln!();
            eprintln!("Keeping existing config. Edit it manually if needed:");
            eprintln!("  {}", config_path.display().to_string().dimmed());
            return Ok(());
        }
    }

    fs::write(&config_path, &config_content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    eprintln!();
    eprintln!(
        "{} Config saved to {}",
        "✓".bright_green(),
        config_path.display()
    );

    print_getting_started();

    Ok(())
}

fn default_data_path(backend: Backend) -> Option<PathBuf> {
    match backend {
        Backend::Json => Some(JsonFileSlots::default_dir()),
        Backend::Sqlite => Some(Database::default_path()),
        Backend::Memory => None,
    }
}

/// Config file text for the chosen settings, other keys left as comments.
fn render_config(backend: Backend, path: Option<&Path>, thresholds: &StockThresholds) -> String {
    let path_line = match path {
        Some(path) => format!(
            "path = {}",
            toml::Value::String(path.display().to_string())
        ),
        None => "# path = \"\"".to_string(),
    };

    format!(
        r#"[storage]
backend = "{}"
{}

[inventory]
low_stock_threshold = {}
medium_stock_threshold = {}
expiring_within_days = {}

[logging]
level = "warn"
format = "pretty"
# dir = ""         # Optional: daily rolling log files
# audit_file = ""  # Optional: JSON lines record of every change
"#,
        backend,
        path_line,
        thresholds.low,
        thresholds.medium,
        thresholds.expiring_within_days
    )
}

/// Print the getting started guide
pub fn print_getting_started() {
    eprintln!();
    eprintln!("{}", "Getting started:".bold());
    eprintln!(
        "  {} List prescriptions: {}",
        "1.".dimmed(),
        "rxdesk prescriptions list".bright_cyan()
    );
    eprintln!(
        "  {} Add one: {}",
        "2.".dimmed(),
        "rxdesk prescriptions create --interactive".bright_cyan()
    );
    eprintln!(
        "  {} Check stock: {}",
        "3.".dimmed(),
        "rxdesk medicines list --filter low-stock".bright_cyan()
    );
    eprintln!(
        "  {} Per-project overrides go in {}",
        "4.".dimmed(),
        crate::config::CONFIG_FILE_NAME.bright_cyan()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileConfig, Overrides, Settings};

    #[test]
    fn test_rendered_config_parses_back() {
        let thresholds = StockThresholds {
            low: 20,
            medium: 80,
            expiring_within_days: 90,
        };
        let content = render_config(Backend::Sqlite, Some(Path::new("/srv/rx/rx.db")), &thresholds);

        let config: FileConfig = toml::from_str(&content).unwrap();
        assert_eq!(config.storage.backend, Some(Backend::Sqlite));
        assert_eq!(config.storage.path, Some(PathBuf::from("/srv/rx/rx.db")));

        let settings = Settings::resolve(config, &Overrides::default()).unwrap();
        assert_eq!(settings.thresholds, thresholds);
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_quotes_and_backslashes_in_path_survive() {
        let path = Path::new(r#"/home/o'brien/"rx"\data"#);
        let content = render_config(Backend::Json, Some(path), &StockThresholds::default());

        let config: FileConfig = toml::from_str(&content).unwrap();
        assert_eq!(config.storage.path.as_deref(), Some(path));
    }

    #[test]
    fn test_memory_config_has_no_path() {
        let content = render_config(Backend::Memory, None, &StockThresholds::default());

        let config: FileConfig = toml::from_str(&content).unwrap();
        assert_eq!(config.storage.backend, Some(Backend::Memory));
        assert_eq!(config.storage.path, None);
    }
}
