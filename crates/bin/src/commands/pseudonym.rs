//! Pseudonym command - derives the secret id a user gets under a salt.

use eventvault::SecretId;

use crate::cli::PseudonymArgs;
use crate::output::{OutputFormat, print_json};

/// Run the pseudonym command
pub fn run(args: &PseudonymArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let secret_id = SecretId::derive(&args.user, &args.salt);

    match format {
        OutputFormat::Human => println!("{secret_id}"),
        OutputFormat::Json => print_json(&serde_json::json!({ "secret_id": secret_id }))?,
    }

    Ok(())
}
