use crate::engine::EngineError;

/// Default per-axis displacement that makes a current path stale.
pub const DEFAULT_RECOMPUTE_THRESHOLD: f64 = 5.0;

/// Default bound on closed nodes per search.
pub const DEFAULT_MAX_EXPANSIONS: usize = 1_000_000;

/// Tunables for an [`Engine`](crate::Engine).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// A current path is recomputed once the agent has moved strictly more
    /// than this on the X or the Z axis since it was computed.
    pub recompute_threshold: f64,
    /// Give up a search after closing this many nodes. `None` is unbounded.
    pub max_expansions: Option<usize>,
    /// Mark the current path stale when `set_regions` changes the roads.
    pub invalidate_on_region_update: bool,
    /// Keep the rasterized road graph between searches, rebuilding it only
    /// when the road snapshot changes.
    pub cache_graph: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recompute_threshold: DEFAULT_RECOMPUTE_THRESHOLD,
            max_expansions: Some(DEFAULT_MAX_EXPANSIONS),
            invalidate_on_region_update: false,
            cache_graph: false,
        }
    }
}

impl EngineConfig {
    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.recompute_threshold.is_finite() || self.recompute_threshold < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "recompute_threshold must be a non-negative number, got {}",
                self.recompute_threshold
            )));
        }
        if self.max_expansions == Some(0) {
            return Err(EngineError::InvalidConfig(
                "max_expansions must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"recompute_threshold": 8.0, "cache_graph": true}"#).unwrap();
        assert_eq!(cfg.recompute_threshold, 8.0);
        assert!(cfg.cache_graph);
        assert_eq!(cfg.max_expansions, Some(DEFAULT_MAX_EXPANSIONS));
    }
}
