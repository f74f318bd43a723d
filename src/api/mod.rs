pub mod handlers;

pub use handlers::{batch_match, export_table, health_check, load_table, AppState};
