//! Pool annotation contract and effective activation settings.
//!
//! All keys are namespaced under `activator.llm-d.ai/`. The three target
//! keys are required and fail closed when missing; the duration keys fall
//! back to the activator defaults when absent or unparseable.

use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use poolgate_datastore::InferencePool;

/// API group/version of the scalable workload behind the pool.
pub const TARGET_API_VERSION_KEY: &str = "activator.llm-d.ai/target-apiversion";
/// Kind of the scalable workload.
pub const TARGET_KIND_KEY: &str = "activator.llm-d.ai/target-kind";
/// Name of the workload, in the pool's namespace.
pub const TARGET_NAME_KEY: &str = "activator.llm-d.ai/target-name";
/// Seconds to wait for readiness after scaling 0→1.
pub const SCALE_FROM_ZERO_GRACE_PERIOD_KEY: &str =
    "activator.llm-d.ai/scale-from-zero-grace-period";
/// Seconds tolerated for replicas to drain after a 1→0 update.
pub const SCALE_TO_ZERO_GRACE_PERIOD_KEY: &str = "activator.llm-d.ai/scale-to-zero-grace-period";
/// Seconds of idleness required before scaling 1→0.
pub const SCALE_DOWN_DELAY_KEY: &str = "activator.llm-d.ai/scale-down-delay";

/// Fallback values for the optional annotations, plus the request-retention
/// hold applied after a cold-start readiness.
#[derive(Debug, Clone)]
pub struct ActivatorDefaults {
    pub scale_from_zero_grace_period: Duration,
    pub scale_to_zero_grace_period: Duration,
    pub scale_down_delay: Duration,
    /// Hold between observed readiness and releasing the request.
    /// `readyReplicas` transitions ahead of the data plane's ability to
    /// accept traffic; the hold absorbs that skew.
    pub request_retention_period: Duration,
}

impl Default for ActivatorDefaults {
    fn default() -> Self {
        Self {
            scale_from_zero_grace_period: Duration::from_secs(60),
            scale_to_zero_grace_period: Duration::from_secs(60),
            scale_down_delay: Duration::from_secs(300),
            request_retention_period: Duration::from_secs(5),
        }
    }
}

/// A required annotation was missing from the pool.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("pool {pool} is missing required annotation {key}")]
pub struct MissingAnnotation {
    pub pool: String,
    pub key: String,
}

/// The workload a pool points at, exactly as annotated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRef {
    pub api_version: String,
    pub kind: String,
    pub name: String,
}

/// Effective per-pool activation settings resolved from annotations.
#[derive(Debug, Clone)]
pub struct ActivationConfig {
    pub target: TargetRef,
    pub scale_from_zero_grace_period: Duration,
    pub scale_to_zero_grace_period: Duration,
    pub scale_down_delay: Duration,
}

impl ActivationConfig {
    /// Resolve the pool's annotations against the defaults.
    ///
    /// Fails only when a required target annotation is absent. Optional
    /// annotations that are present and parse as integer seconds win;
    /// anything else falls back to the default.
    pub fn from_pool(
        pool: &InferencePool,
        defaults: &ActivatorDefaults,
    ) -> Result<Self, MissingAnnotation> {
        let target = TargetRef {
            api_version: required(pool, TARGET_API_VERSION_KEY)?,
            kind: required(pool, TARGET_KIND_KEY)?,
            name: required(pool, TARGET_NAME_KEY)?,
        };

        Ok(Self {
            target,
            scale_from_zero_grace_period: optional_secs(
                pool,
                SCALE_FROM_ZERO_GRACE_PERIOD_KEY,
                defaults.scale_from_zero_grace_period,
            ),
            scale_to_zero_grace_period: optional_secs(
                pool,
                SCALE_TO_ZERO_GRACE_PERIOD_KEY,
                defaults.scale_to_zero_grace_period,
            ),
            scale_down_delay: optional_secs(pool, SCALE_DOWN_DELAY_KEY, defaults.scale_down_delay),
        })
    }
}

fn required(pool: &InferencePool, key: &str) -> Result<String, MissingAnnotation> {
    pool.annotation(key)
        .map(str::to_string)
        .ok_or_else(|| MissingAnnotation {
            pool: pool.id(),
            key: key.to_string(),
        })
}

/// Integer-seconds annotation lookup: present and parseable wins, anything
/// else falls back.
fn optional_secs(pool: &InferencePool, key: &str, default: Duration) -> Duration {
    match pool.annotation(key) {
        None => default,
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    pool = %pool.id(),
                    key,
                    value = raw,
                    "annotation does not parse as integer seconds, using default"
                );
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotated_pool() -> InferencePool {
        let mut pool = InferencePool::new("default", "llama");
        pool.annotations.insert(
            TARGET_API_VERSION_KEY.to_string(),
            "apps/v1".to_string(),
        );
        pool.annotations
            .insert(TARGET_KIND_KEY.to_string(), "Deployment".to_string());
        pool.annotations
            .insert(TARGET_NAME_KEY.to_string(), "llama-server".to_string());
        pool
    }

    #[test]
    fn full_annotations_resolve() {
        let mut pool = annotated_pool();
        pool.annotations
            .insert(SCALE_FROM_ZERO_GRACE_PERIOD_KEY.to_string(), "90".to_string());
        pool.annotations
            .insert(SCALE_DOWN_DELAY_KEY.to_string(), "20".to_string());

        let config = ActivationConfig::from_pool(&pool, &ActivatorDefaults::default()).unwrap();
        assert_eq!(
            config.target,
            TargetRef {
                api_version: "apps/v1".to_string(),
                kind: "Deployment".to_string(),
                name: "llama-server".to_string(),
            }
        );
        assert_eq!(config.scale_from_zero_grace_period, Duration::from_secs(90));
        assert_eq!(config.scale_down_delay, Duration::from_secs(20));
        // Untouched optional key keeps its default.
        assert_eq!(config.scale_to_zero_grace_period, Duration::from_secs(60));
    }

    #[test]
    fn each_required_key_fails_closed() {
        for key in [TARGET_API_VERSION_KEY, TARGET_KIND_KEY, TARGET_NAME_KEY] {
            let mut pool = annotated_pool();
            pool.annotations.remove(key);

            let err = ActivationConfig::from_pool(&pool, &ActivatorDefaults::default())
                .unwrap_err();
            assert_eq!(err.key, key);
            assert_eq!(err.pool, "default/llama");
        }
    }

    #[test]
    fn unparseable_optional_falls_back() {
        let mut pool = annotated_pool();
        pool.annotations
            .insert(SCALE_FROM_ZERO_GRACE_PERIOD_KEY.to_string(), "ninety".to_string());

        let config = ActivationConfig::from_pool(&pool, &ActivatorDefaults::default()).unwrap();
        assert_eq!(config.scale_from_zero_grace_period, Duration::from_secs(60));
    }

    #[test]
    fn absent_optionals_use_defaults() {
        let defaults = ActivatorDefaults {
            scale_down_delay: Duration::from_secs(120),
            ..ActivatorDefaults::default()
        };
        let config = ActivationConfig::from_pool(&annotated_pool(), &defaults).unwrap();
        assert_eq!(config.scale_down_delay, Duration::from_secs(120));
    }
}
