//! Snapshot check command - validates every table and prints counts.

use eventvault::storage::StorageSnapshot;

use crate::cli::CheckArgs;
use crate::output::{OutputFormat, print_fields, print_json};

/// Run the check command
pub fn run(args: &CheckArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = StorageSnapshot::load(&args.snapshot)?;
    let summary = snapshot.validate()?;
    tracing::info!(path = %args.snapshot.display(), "snapshot is consistent");

    match format {
        OutputFormat::Human => print_fields(&[
            ("Accounts", summary.accounts.to_string()),
            ("Retired", summary.retired_accounts.to_string()),
            ("Unloaded", summary.unloaded_accounts.to_string()),
            ("Events", summary.events.to_string()),
            ("Anonymous", summary.anonymous_events.to_string()),
            ("Tombstones", summary.tombstones.to_string()),
            ("Secrets", summary.secrets.to_string()),
            ("Orphaned", summary.orphaned_secrets.to_string()),
            ("Users", summary.account_users.to_string()),
            ("Relationships", summary.relationships.to_string()),
        ]),
        OutputFormat::Json => print_json(&summary)?,
    }

    Ok(())
}
