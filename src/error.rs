use thiserror::Error;

/// Input-contract violations rejected by the position/exit simulator.
///
/// These indicate a caller bug or a malformed configuration, so they carry
/// the offending values instead of being coerced into defaults.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulatorError {
    #[error("bars ({bars}) and entries ({entries}) differ in length")]
    LengthMismatch { bars: usize, entries: usize },

    #[error("no bars provided")]
    NoBars,

    #[error("{side} distance must be positive, got {value}")]
    NonPositiveDistance { side: &'static str, value: f64 },

    #[error("bar timestamps must be strictly increasing (violated at index {index})")]
    NonMonotonicTimestamps { index: usize },
}

/// Input-contract violations rejected by the parameter budget sampler.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SamplerError {
    #[error("combination budget must be at least 1")]
    ZeroBudget,

    #[error("entry combination count must be at least 1")]
    ZeroEntryCount,

    #[error("no parameter dimensions declared")]
    NoDimensions,

    #[error("dimension `{0}` has no candidate values")]
    EmptyDimension(String),

    #[error("dimension `{name}` has inverted bounds: min {min} > max {max}")]
    InvertedBounds { name: String, min: f64, max: f64 },
}

/// Pip-denominated cost configurations that cannot be turned into valid
/// absolute distances.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CostError {
    #[error("pip size must be positive, got {0}")]
    NonPositivePipSize(f64),

    #[error("{side} distance nets to {net} after spread/slippage, must be positive")]
    NonPositiveEffectiveDistance { side: &'static str, net: f64 },
}
