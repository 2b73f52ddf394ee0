//! Predefined catalog commands for CLI.

use clap::Subcommand;
use habitkeeper_core::catalog::PREDEFINED_HABITS;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List the predefined habits
    List,
}

pub fn run(action: CatalogAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CatalogAction::List => {
            println!("{}", serde_json::to_string_pretty(&PREDEFINED_HABITS)?);
        }
    }
    Ok(())
}
