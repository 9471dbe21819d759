pub mod notes;
pub mod payments;
pub mod portfolio;
