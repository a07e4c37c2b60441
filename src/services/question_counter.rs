//! 题目总数读取
//!
//! 页面上 ID 为 `cuestion` 的元素显示形如 `5 / 40` 的进度，斜杠后是总题数。

use crate::error::CountError;
use crate::infrastructure::QuizDriver;

/// 题目计数元素的 ID
pub const COUNTER_ID: &str = "cuestion";

/// 从页面读取题目总数
pub async fn read_total_questions<D: QuizDriver>(driver: &D) -> Result<usize, CountError> {
    let element = driver
        .find_element_by_id(COUNTER_ID)
        .await?
        .ok_or(CountError::ElementMissing(COUNTER_ID))?;
    let text = driver.element_text(&element).await?;
    parse_total_questions(&text)
}

/// 解析计数文本中最后一个 `/` 之后的数字
pub fn parse_total_questions(text: &str) -> Result<usize, CountError> {
    let tail = text.rsplit('/').next().unwrap_or(text);
    tail.trim()
        .parse()
        .map_err(|_| CountError::NotNumeric(text.to_string()))
}
