use crate::{
    api,
    cli::actions::Action,
    credentials::{CredentialService, FileStore},
};
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// Handle the server action
///
/// # Errors
/// Returns an error if the server fails to start.
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            data_dir,
            cors_origin,
        } => {
            let store = FileStore::new(&data_dir);

            debug!("Credential file: {}", store.path().display());

            let service = Arc::new(CredentialService::new(Arc::new(store)));

            api::new(port, service, cors_origin.as_deref()).await?;
        }
    }

    Ok(())
}
