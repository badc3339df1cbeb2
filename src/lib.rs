// ANCC Workbench - Core Library
// Corrected net asset value (ANCC) from a structured balance sheet plus
// user-entered revaluation adjustments. Exposes all modules for the CLI
// and tests.

pub mod accounts;
pub mod bilan;
pub mod engine;
pub mod ledger;
pub mod model;
pub mod session;

// Re-export commonly used types
pub use accounts::{
    bilan_from_extract, category_for_account, load_extract, read_extract, ExtractRow,
    REQUIRED_HEADERS,
};
pub use bilan::BalanceSheet;
pub use engine::{completeness, evaluate, evaluate_with_rate, TAX_RATE};
pub use ledger::AdjustmentLedger;
pub use model::{Adjustment, AnccResult, BilanCategory, LineItem};
pub use session::{ImportError, Session, SessionState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
