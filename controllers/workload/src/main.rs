//! Workload Controller
//!
//! Reconcile engine converging existing workload objects toward desired
//! state derived from configuration. The engine decides minimally and safely
//! whether an update is required and applies only the fields it owns,
//! leaving everything else (status, foreign labels and annotations) to the
//! actors that own them.

mod backoff;
mod desired;
mod engine;
mod error;
mod mutators;
mod options;
mod scheduler;

use crate::desired::OptionsDesiredStateBuilder;
use crate::engine::ReconcileEngine;
use crate::error::ControllerError;
use crate::mutators::MutationPipeline;
use crate::options::WorkloadOptionsBuilder;
use cluster_store::MemoryStore;
use resources::Identity;
use std::env;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt::init();

    info!("Starting Workload Controller");

    // Load configuration from environment variables
    let image_reference = env::var("IMAGE_REFERENCE").unwrap_or_default();
    let release_label = env::var("RELEASE_LABEL").unwrap_or_default();
    let insecure_import = env::var("INSECURE_IMPORT_POLICY")
        .map(|v| v == "true")
        .unwrap_or(false);
    let namespace = env::var("WORKLOAD_NAMESPACE").unwrap_or_else(|_| "default".to_string());
    let name = env::var("WORKLOAD_NAME").unwrap_or_else(|_| "system-memcached".to_string());

    let options = WorkloadOptionsBuilder::new()
        .image_reference(image_reference)
        .release_label(release_label)
        .insecure_import_policy(insecure_import)
        .build()?;

    info!("Configuration:");
    info!("  Image reference: {}", options.image_reference());
    info!("  Release label: {}", options.release_label());
    info!("  Insecure import: {}", options.insecure_import_policy());

    let store = Arc::new(MemoryStore::new());
    let engine = ReconcileEngine::new(
        store,
        Arc::new(OptionsDesiredStateBuilder::new(options)),
        MutationPipeline::workload(),
    );

    let identity = Identity::workload(namespace, name);
    let cancel = CancellationToken::new();
    let outcome = engine.reconcile(&identity, &cancel).await?;
    info!("Reconciled {}: {:?}", identity, outcome);

    Ok(())
}
