//! Account history command - prints replay order without payloads.

use std::sync::Arc;

use eventvault::{AccountId, Sequence, SystemClock, model::HistoryEntry, storage::StorageSnapshot};
use serde::Serialize;

use crate::cli::HistoryArgs;
use crate::output::{OutputFormat, print_json, print_table};

#[derive(Serialize)]
struct Row<'a> {
    event_id: &'a str,
    sequence: &'a str,
    state: &'static str,
    secret_id: Option<&'a str>,
}

impl<'a> From<&'a HistoryEntry> for Row<'a> {
    fn from(entry: &'a HistoryEntry) -> Self {
        Row {
            event_id: entry.event_id().as_str(),
            sequence: entry.sequence().as_str(),
            state: if entry.is_deleted() { "deleted" } else { "active" },
            secret_id: entry.secret_id().map(|id| id.as_str()),
        }
    }
}

/// Run the history command
pub fn run(args: &HistoryArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = StorageSnapshot::load(&args.snapshot)?;
    let account_id = AccountId::from(args.account.as_str());
    let ledger = snapshot.ledger(&account_id, Arc::new(SystemClock))?;

    let history = ledger.history();
    let entries = match &args.since {
        Some(since) => history.since(&Sequence::from(since.as_str())),
        None => history.ordered(),
    };
    let rows: Vec<Row<'_>> = entries.into_iter().map(Row::from).collect();

    match format {
        OutputFormat::Human => {
            if rows.is_empty() {
                println!("No events found.");
                return Ok(());
            }
            let table: Vec<Vec<String>> = rows
                .iter()
                .map(|row| {
                    vec![
                        row.event_id.to_string(),
                        row.sequence.to_string(),
                        row.state.to_string(),
                        row.secret_id.unwrap_or("anonymous").to_string(),
                    ]
                })
                .collect();
            print_table(&["EVENT ID", "SEQUENCE", "STATE", "SECRET"], &table);
        }
        OutputFormat::Json => print_json(&rows)?,
    }

    Ok(())
}
