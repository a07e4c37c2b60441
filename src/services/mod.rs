//! 业务能力层
//!
//! 每个服务只做一件事：读题、存题、翻页、读总数。流程顺序由 [`crate::workflow`] 决定。

pub mod advance_controller;
pub mod page_extractor;
pub mod question_counter;
pub mod result_store;

pub use advance_controller::AdvanceController;
pub use page_extractor::{Extraction, PageExtractor};
pub use question_counter::read_total_questions;
pub use result_store::ResultStore;
