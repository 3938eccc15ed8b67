//! Configuration errors.
//!
//! Only construction can fail. Once a vine exists, every tick runs on
//! validated numbers and never returns an error.

/// Result alias for configuration and construction.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("loop resolution must be at least 3, got {got}")]
    LoopResolution { got: usize },

    #[error("radius must be positive, got {got}")]
    NonPositiveRadius { got: f32 },

    #[error("growth length must be positive, got {got}")]
    NonPositiveGrowthLength { got: f32 },

    #[error("`{field}` must be finite")]
    NonFinite { field: &'static str },

    #[error("`{field}` range is inverted: min {min} > max {max}")]
    InvalidRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
}
