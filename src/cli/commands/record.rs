use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::cli::{context, output};
use entity_changelog::adapters::audit::json_audit_store::JsonAuditStore;
use entity_changelog::adapters::metadata::static_metadata::StaticMetadataReader;
use entity_changelog::adapters::parsers::event_log_parser::EventLogParser;
use entity_changelog::adapters::resolvers::prefix_type_resolver::PrefixTypeResolver;
use entity_changelog::config::app_config::AppConfig;
use entity_changelog::core::errors::{ChangelogError, Result};
use entity_changelog::core::services::record_builder::AuditRecordBuilder;
use entity_changelog::core::services::{ChangeObserver, ChangeRecorder, DeferredWriter};

/// Execute the `changelog record` command.
///
/// Replays the event log unit by unit: every event of a unit goes
/// through the observer, then the unit's records are flushed together.
/// A failed flush stops the replay.
pub fn execute(file: &str) -> Result<()> {
    let dir = context::initialized_dir()?;
    let config = AppConfig::load(dir)?;
    let audit_section = config.audit.as_ref();

    if !JsonAuditStore::is_enabled(audit_section) {
        output::warning("Audit logging is disabled in config.toml; nothing recorded");
        return Ok(());
    }

    let events_path = Path::new(file);
    if !events_path.exists() {
        return Err(ChangelogError::FileNotFound {
            path: events_path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(events_path)?;
    let units = EventLogParser::new(events_path).parse(&content)?;

    let store = Arc::new(JsonAuditStore::from_config(dir, audit_section));
    let recorder = build_recorder(&config, store);

    output::header(&format!("changelog record {file}"));

    let mut written = 0;
    for (n, unit) in units.iter().enumerate() {
        let mut session = recorder.begin();
        for event in unit {
            recorder.observe(&mut session, event);
        }
        let count = recorder.complete(&mut session)?;
        debug!(unit = n + 1, events = unit.len(), records = count, "unit of work replayed");
        written += count;
    }

    output::success(&format!("{} of work replayed", output::count(units.len(), "unit")));
    output::success(&format!("{} written", output::count(written, "record")));

    Ok(())
}

/// Wire the recorder from configuration.
fn build_recorder(config: &AppConfig, store: Arc<JsonAuditStore>) -> ChangeRecorder {
    let metadata = Arc::new(StaticMetadataReader::from_config(&config.types));
    let resolver = Arc::new(PrefixTypeResolver::new(
        config.changelog.proxy_prefixes.clone(),
    ));
    let observer = ChangeObserver::new(
        metadata,
        config.ignored_fields(),
        AuditRecordBuilder::new(resolver),
    );
    ChangeRecorder::new(observer, DeferredWriter::new(store))
}
