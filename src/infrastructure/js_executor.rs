//! JS 执行器
//!
//! 在驱动之上提供“执行脚本并反序列化”的能力

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::{DriverError, ExtractError};
use crate::infrastructure::QuizDriver;

/// JS 执行器
///
/// 职责：
/// - 借用驱动，不持有会话
/// - 暴露 eval() 能力
/// - 不认识 QuestionRecord
pub struct JsExecutor<'a, D: QuizDriver> {
    driver: &'a D,
}

impl<'a, D: QuizDriver> JsExecutor<'a, D> {
    pub fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: &str) -> Result<JsonValue, DriverError> {
        self.driver.execute_script(js_code).await
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: &str) -> Result<T, ExtractError> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }
}
