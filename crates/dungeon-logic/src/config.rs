//! Crawl engine limits.
//!
//! Traversal generation recurses once per detour and splices every detour
//! into the route it is resolving. Both are bounded so that a malformed or
//! adversarial dungeon fails fast instead of exhausting the stack.
//!
//! ```
//! use dungeon_logic::config::{validate_config, CrawlConfig};
//!
//! let config = CrawlConfig::default();
//! assert_eq!(config.max_depth, 30);
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};

/// Default maximum detour nesting.
pub const DEFAULT_MAX_DEPTH: usize = 30;

/// Default maximum number of steps in a single generated route.
pub const DEFAULT_MAX_STEPS: usize = 200;

/// Tunable bounds for traversal generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum number of nested sub-traversals alive at once.
    pub max_depth: usize,
    /// Maximum length of any route under construction.
    pub max_steps: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No nesting at all leaves room for nothing but the top-level route.
    #[error("max_depth must be at least 1")]
    ZeroDepth,
    /// A route needs at least two steps to move anywhere.
    #[error("max_steps must be at least 2, got {0}")]
    StepsTooFew(usize),
    /// Every nesting level adds at least one step.
    #[error("max_depth {depth} exceeds max_steps {steps}")]
    DepthExceedsSteps { depth: usize, steps: usize },
}

/// Validate a crawl configuration, returning all errors found.
pub fn validate_config(config: &CrawlConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.max_depth == 0 {
        errors.push(ConfigError::ZeroDepth);
    }
    if config.max_steps < 2 {
        errors.push(ConfigError::StepsTooFew(config.max_steps));
    }
    if config.max_depth > config.max_steps {
        errors.push(ConfigError::DepthExceedsSteps {
            depth: config.max_depth,
            steps: config.max_steps,
        });
    }

    errors
}
