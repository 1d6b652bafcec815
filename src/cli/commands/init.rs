use crate::cli::{context, output};
use entity_changelog::core::errors::{ChangelogError, Result};

/// Default configuration written by `changelog init`.
const DEFAULT_CONFIG: &str = r#"[changelog]
format_version = 1
# Fields never written to the change log, whatever the type
ignored_fields = ["updatedAt"]
# Prefixes that lazy-loading wrappers add to runtime type names
proxy_prefixes = []

[audit]
enabled = true
log_file = "audit.log"

# Declare each tracked type. Undeclared types are never logged.
# [types.Order]
# auditable = true
# skip_fields = ["internalCache"]
"#;

/// Execute the `changelog init` command.
///
/// Creates the project directory and writes config defaults.
pub fn execute(verbose: bool) -> Result<()> {
    let dir = context::changelog_dir();

    if dir.exists() {
        return Err(ChangelogError::InvalidConfig {
            detail: format!(
                "Change log is already initialized in this project ({} exists)",
                dir.display()
            ),
        });
    }

    output::header("changelog — Initializing project");

    std::fs::create_dir_all(dir)?;
    output::success(&format!("Created {}/", dir.display()));

    std::fs::write(context::config_path(), DEFAULT_CONFIG)?;
    output::success("Generated config.toml with defaults");

    output::success("Project ready.\n");
    print_next_steps(verbose);

    Ok(())
}

/// Print next steps after init.
fn print_next_steps(verbose: bool) {
    println!("  Next steps:");
    println!("     1. Declare your tracked types under [types] in config.toml");
    println!("     2. Run 'changelog record <events.jsonl>' to replay lifecycle events");
    println!("     3. Run 'changelog log' to inspect the change log");

    if verbose {
        println!();
        println!("  Files created:");
        println!("     config.toml   — change log configuration");
    }
}
