pub mod order;
pub mod receipt;
pub mod result;

pub use order::{CellValue, OrderRow, TimeKey};
pub use receipt::{CustomerInfo, LineItem, ReceiptRecord};
pub use result::{
    CascadeStage, MatchCandidate, MatchDiagnostics, MatchOutcome, MatchReport, ReceiptSummary,
    RowTrace,
};
