//! # Daypo Scraper
//!
//! 驱动浏览器逐题读取 Daypo 测验的题干、选项和正确答案，并实时写入 JSON 文件。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - `QuizDriver` / `DriverLauncher` 抽象与 `JsExecutor`
//! - `browser/` - chromiumoxide 实现，持有唯一的浏览器会话
//!
//! ### ② 业务能力层（Services）
//! - `PageExtractor` - 读取测验引擎状态，换算正确答案
//! - `ResultStore` - 去重、保序、整体落盘
//! - `AdvanceController` - 提交临时答案并点击“下一题”
//!
//! ### ③ 流程层（Workflow）
//! - `ScrapeLoop` - 状态机：读总数 → 读题 → 存题 → 翻页 → 停止
//!
//! ### ④ 展示层（UI）
//! - `UiHandle` / `UiEvent` - 后台任务到展示层的消息队列
//! - `ConsolePresenter` - 控制台显示

pub mod app;
pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod ui;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::{Config, Delays};
pub use infrastructure::{DriverLauncher, QuizDriver};
pub use models::QuestionRecord;
pub use workflow::{ScrapeLoop, ScrapeReport, SessionCtx, StopReason, StopSignal};
