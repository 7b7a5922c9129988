use std::sync::Arc;

use tracing::{error, info};

use crate::application::AppContext;
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;

/// Build the shared context, preparing the upload dir and, when configured,
/// the knowledge-base index.
pub fn setup(config: &AppConfig) -> Result<Arc<AppContext>> {
    std::fs::create_dir_all(&config.server.upload_dir).map_err(|err| {
        error!(
            error = %err,
            upload_dir = %config.server.upload_dir.display(),
            "Failed to create upload dir"
        );
        err
    })?;

    let context = Arc::new(AppContext::new(
        config.knowledge_base.clone(),
        &config.session,
    ));

    if config.knowledge_base.eager_load {
        let engine = context.knowledge_base().map_err(|err| {
            error!(
                error = %err,
                corpus = %config.knowledge_base.corpus_path.display(),
                "Failed to load knowledge base"
            );
            err
        })?;
        info!(entries = engine.len(), "Knowledge base ready");
    }

    Ok(context)
}
