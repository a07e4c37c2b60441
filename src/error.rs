//! 错误类型
//!
//! 每一层各自拥有错误枚举，编排层把它们统一折算为 [`StopReason`](crate::workflow::StopReason)。

use thiserror::Error;

/// 浏览器驱动错误
#[derive(Debug, Error)]
pub enum DriverError {
    /// CDP 协议层错误
    #[error("浏览器协议错误: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
    /// 浏览器启动或配置失败
    #[error("浏览器启动失败: {0}")]
    Launch(String),
    /// 脚本执行失败
    #[error("执行脚本失败: {0}")]
    Script(String),
    /// 会话已被释放
    #[error("浏览器会话已关闭")]
    SessionClosed,
}

/// 题目提取错误
#[derive(Debug, Error)]
pub enum ExtractError {
    /// 测验引擎的关键变量不存在
    #[error("测验引擎状态不可用")]
    StateUnavailable,
    /// 提取过程中出现异常
    #[error("提取失败: {0}")]
    ExtractionFailed(String),
    /// 标记串中找不到任何正确答案
    #[error("题目 #{internal_id} 没有可识别的正确答案 (标记串: {markers:?})")]
    NoCorrectAnswer { internal_id: i64, markers: String },
    /// 脚本返回的 JSON 结构无法识别
    #[error("脚本返回值无法解析: {0}")]
    MalformedReply(#[from] serde_json::Error),
}

impl From<DriverError> for ExtractError {
    fn from(err: DriverError) -> Self {
        ExtractError::ExtractionFailed(err.to_string())
    }
}

/// 翻页错误
///
/// 平台不区分“已到最后一题”和“翻页故障”，两者都视为终止信号。
#[derive(Debug, Error)]
pub enum AdvanceError {
    /// 找不到“下一题”按钮
    #[error("找不到“下一题”按钮")]
    ControlNotFound,
    /// 提交临时答案或点击按钮失败
    #[error("翻页操作失败: {0}")]
    ActionFailed(String),
}

impl From<DriverError> for AdvanceError {
    fn from(err: DriverError) -> Self {
        AdvanceError::ActionFailed(err.to_string())
    }
}

/// 读取题目总数失败
#[derive(Debug, Error)]
pub enum CountError {
    #[error("页面中不存在题目计数元素 (ID '{0}')")]
    ElementMissing(&'static str),
    #[error("题目计数不是数字: {0:?}")]
    NotNumeric(String),
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// 结果文件写入失败
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("写入文件失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("序列化结果失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败 ({path}): {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML解析失败 ({path}): {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },
}

/// 操作员输入不完整
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("测验 URL 不能为空")]
    MissingUrl,
    #[error("结果文件名不能为空")]
    MissingOutput,
}
