#![warn(clippy::uninlined_format_args)]

pub mod diary_document;
pub mod optimizer;
pub mod repository;

pub use diary_document::parse_diary_document;
pub use optimizer::GreedySettlementOptimizer;
pub use repository::JsonDiaryRepository;
