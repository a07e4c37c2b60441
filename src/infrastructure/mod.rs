//! 基础设施层
//!
//! 持有浏览器会话，只暴露“读页面 / 执行脚本 / 点击”的能力，不认识题目。

pub mod driver;
pub mod js_executor;

pub use driver::{DriverLauncher, QuizDriver};
pub use js_executor::JsExecutor;
