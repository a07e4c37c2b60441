//! 抓取会话上下文
//!
//! 一次会话需要的全部输入：地址、结果文件、等待时间与停止信号。

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{Config, Delays};
use crate::error::InputError;
use crate::utils::normalize_quiz_url;

/// 操作员发出的停止请求
///
/// 只在循环的检查点读取，最多要等一个完整的读题/翻页步骤才会生效。
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 会话上下文
#[derive(Debug, Clone)]
pub struct SessionCtx {
    /// 规范化后的测验地址
    pub url: String,
    /// 结果文件
    pub output_path: PathBuf,
    pub delays: Delays,
    pub max_consecutive_duplicates: usize,
}

impl SessionCtx {
    /// 校验操作员输入并规范化地址
    pub fn from_inputs(url: &str, output: &str, config: &Config) -> Result<Self, InputError> {
        if url.trim().is_empty() {
            return Err(InputError::MissingUrl);
        }
        if output.trim().is_empty() {
            return Err(InputError::MissingOutput);
        }
        Ok(Self {
            url: normalize_quiz_url(url),
            output_path: PathBuf::from(output.trim()),
            delays: config.delays(),
            max_consecutive_duplicates: config.max_consecutive_duplicates,
        })
    }
}
