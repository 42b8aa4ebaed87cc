use thiserror::Error;

/// Why a raw input was rejected. Variants are listed in the order the
/// validator checks them; the first failing rule wins.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing or non-numeric input: {field}")]
    MissingField { field: &'static str },

    #[error("ST and LOOP continuation rates cannot both be set; choose one")]
    BothContinuationModesSet,

    #[error("Set either an ST or a LOOP continuation rate")]
    NoContinuationModeSet,

    #[error("Input out of range: {field} = {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

impl ValidationError {
    /// Stable snake_case classification, used on the IPC wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField { .. }       => "missing_field",
            Self::BothContinuationModesSet  => "both_continuation_modes_set",
            Self::NoContinuationModeSet     => "no_continuation_mode_set",
            Self::OutOfRange { .. }         => "out_of_range",
        }
    }
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
