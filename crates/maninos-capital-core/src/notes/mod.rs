pub mod coverage;
pub mod detail;
pub mod payoff;
pub mod schedule;
pub mod status;
pub mod terms;

pub use terms::{NoteTerms, PromissoryNote, SettlementStatus};
