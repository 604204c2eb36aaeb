pub mod integrity;
pub mod manifest;
pub mod run;
pub mod schema;

use crate::cli::{Commands, GlobalFlags};

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Run(args) => run::handle(&args, flags).await,
        Commands::Integrity(args) => integrity::handle(&args, flags),
        Commands::Manifest(args) => manifest::handle(&args),
        Commands::Schema => schema::handle(),
    }
}
