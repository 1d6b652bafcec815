use chrono::{NaiveDate, TimeZone, Utc};
use colored::Colorize;

use crate::cli::{context, output};
use entity_changelog::adapters::audit::json_audit_store::JsonAuditStore;
use entity_changelog::config::app_config::AppConfig;
use entity_changelog::core::errors::{ChangelogError, Result};
use entity_changelog::core::models::audit_record::{AuditAction, AuditRecord};
use entity_changelog::core::models::entity::EntityId;
use entity_changelog::core::traits::audit::{AuditQuery, AuditStore};

/// Filters accepted by `changelog log`.
pub struct LogFilters<'a> {
    pub subject_type: Option<&'a str>,
    pub id: Option<&'a str>,
    pub action: Option<&'a str>,
    pub since: Option<&'a str>,
    pub last: Option<usize>,
}

/// Execute the `changelog log` command.
///
/// Displays the change log with optional filters for subject, action,
/// date, and entry count.
pub fn execute(filters: LogFilters<'_>) -> Result<()> {
    let dir = context::initialized_dir()?;

    let config = AppConfig::load(dir)?;
    let store = JsonAuditStore::from_config(dir, config.audit.as_ref());

    let query = AuditQuery {
        subject_type: filters.subject_type.map(str::to_string),
        subject_id: filters.id.map(parse_id),
        action: filters.action.map(str::parse::<AuditAction>).transpose()?,
        since: filters.since.map(parse_since).transpose()?,
    };

    let records = store.query(&query)?;

    if records.is_empty() {
        output::header("changelog log");
        output::warning("No audit entries found");
        let filtered = filters.subject_type.is_some()
            || filters.id.is_some()
            || filters.action.is_some()
            || filters.since.is_some();
        if filtered {
            output::hint("Try removing filters to see all entries.");
        }
        return Ok(());
    }

    // Apply --last N (take from the end)
    let skip = filters
        .last
        .map(|n| records.len().saturating_sub(n))
        .unwrap_or(0);
    let display = &records[skip..];

    output::header(&format!("changelog log ({} entries)", display.len()));
    println!();

    for record in display {
        print_record(record);
    }

    Ok(())
}

/// Integer ids are matched as numbers, anything else as a string.
fn parse_id(raw: &str) -> EntityId {
    raw.parse::<i64>()
        .map(EntityId::Int)
        .unwrap_or_else(|_| EntityId::Str(raw.to_string()))
}

/// Parse a date string (ISO 8601: `YYYY-MM-DD`) into a UTC DateTime.
fn parse_since(s: &str) -> Result<chrono::DateTime<Utc>> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
        .ok_or_else(|| ChangelogError::InvalidConfig {
            detail: format!(
                "Invalid date format: '{s}'. Expected ISO 8601 (YYYY-MM-DD), e.g. 2026-01-15"
            ),
        })
}

/// Print a single record as a formatted row.
fn print_record(record: &AuditRecord) {
    let date = record.logged_at.format("%Y-%m-%d %H:%M:%S");
    let subject = format!("{}#{}", record.subject_type, record.subject_id);
    let changes = record.changes.as_deref().unwrap_or("").dimmed().to_string();

    println!(
        "  {} {} {:<8} {} {}",
        date.to_string().dimmed(),
        "│".dimmed(),
        format_action(record.action),
        subject,
        changes,
    );
}

/// Format an AuditAction as a colored string.
fn format_action(action: AuditAction) -> String {
    match action {
        AuditAction::Create => "create".green().to_string(),
        AuditAction::Update => "update".yellow().to_string(),
        AuditAction::Remove => "remove".red().to_string(),
    }
}
