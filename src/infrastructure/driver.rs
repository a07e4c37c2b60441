//! 浏览器驱动接口
//!
//! 编排层只依赖这两个 trait，真实实现见 [`crate::browser`]，测试中用脚本化的模拟实现替换。

use std::future::Future;

use serde_json::Value as JsonValue;

use crate::error::DriverError;

/// 浏览器会话提供的最小能力集合
pub trait QuizDriver: Send + Sync + 'static {
    /// 页面元素句柄
    type Element: Send + Sync;

    /// 导航到指定 URL
    fn navigate(&self, url: &str) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// 按 ID 查找元素，找不到时返回 `Ok(None)`
    fn find_element_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Self::Element>, DriverError>> + Send;

    /// 元素的可见文本
    fn element_text(
        &self,
        element: &Self::Element,
    ) -> impl Future<Output = Result<String, DriverError>> + Send;

    /// 在页面中执行脚本并返回 JSON 结果，脚本无返回值时为 `Null`
    fn execute_script(
        &self,
        source: &str,
    ) -> impl Future<Output = Result<JsonValue, DriverError>> + Send;

    /// 点击元素
    fn click(&self, element: &Self::Element) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// 释放浏览器会话
    fn quit(self) -> impl Future<Output = Result<(), DriverError>> + Send
    where
        Self: Sized;
}

/// 创建浏览器会话
pub trait DriverLauncher: Send + Sync + 'static {
    type Driver: QuizDriver;

    fn launch(&self) -> impl Future<Output = Result<Self::Driver, DriverError>> + Send;
}
