pub mod filter;
pub mod matcher;
pub mod similarity;
pub mod writer;

pub use filter::{filter_delivery_rows, find_option_column, FilterMode};
pub use matcher::MatcherService;
pub use similarity::{is_match, is_match_with, similarity, SIMILARITY_THRESHOLD};
pub use writer::CustomerInfoWriter;
