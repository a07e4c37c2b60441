//! 展示层
//!
//! 抓取循环运行在后台任务上，不直接修改界面状态，而是把 [`UiEvent`] 放进队列，
//! 由展示层在自己的任务上取出并应用。

pub mod console;
pub mod events;

pub use console::ConsolePresenter;
pub use events::{UiEvent, UiHandle};
