pub mod error;
pub mod types;

#[cfg(feature = "notes")]
pub mod notes;

#[cfg(feature = "payments")]
pub mod payments;

#[cfg(feature = "portfolio")]
pub mod portfolio;

pub use error::CapitalError;
pub use types::*;

/// Standard result type for all note-engine operations
pub type CapitalResult<T> = Result<T, CapitalError>;
