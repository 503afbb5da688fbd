//! Pool descriptor file loading.
//!
//! The daemon serves exactly one pool, described in a small TOML file:
//!
//! ```toml
//! name = "llama"
//! namespace = "default"
//!
//! [annotations]
//! "activator.llm-d.ai/target-apiversion" = "apps/v1"
//! "activator.llm-d.ai/target-kind" = "Deployment"
//! "activator.llm-d.ai/target-name" = "llama-server"
//! ```

use std::path::Path;

use poolgate_datastore::InferencePool;

pub fn load_pool(path: &Path) -> anyhow::Result<InferencePool> {
    let content = std::fs::read_to_string(path)?;
    let pool: InferencePool = toml::from_str(&content)?;
    Ok(pool)
}
