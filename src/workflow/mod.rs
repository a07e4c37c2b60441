//! 流程层
//!
//! 抓取会话的状态机：读总数 → 循环（读题 → 存题 → 翻页）→ 停止并清理。

pub mod scrape_loop;
pub mod session_ctx;

pub use scrape_loop::{ScrapeLoop, ScrapeReport, ScrapeState, StopReason};
pub use session_ctx::{SessionCtx, StopSignal};
