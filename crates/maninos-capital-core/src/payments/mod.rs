pub mod ledger;

pub use ledger::{PaymentLedger, PaymentMethod, PaymentRecord};
