//! 翻页服务 - 业务能力层
//!
//! 平台要求先选一个答案才能进入下一题：这里固定选第 0 个选项，
//! 然后点击“下一题”按钮。每一步之后都用固定延时等待页面脚本稳定。

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::config::Delays;
use crate::error::AdvanceError;
use crate::infrastructure::QuizDriver;

/// 提交临时答案的脚本
pub const PROVISIONAL_ANSWER_SCRIPT: &str = "contestar(0)";

/// “下一题”按钮的元素 ID
pub const NEXT_BUTTON_ID: &str = "boton";

/// 翻页服务
#[derive(Debug, Clone, Copy)]
pub struct AdvanceController {
    answer_settle: Duration,
    click_settle: Duration,
}

impl AdvanceController {
    pub fn new(delays: Delays) -> Self {
        Self {
            answer_settle: delays.answer_settle,
            click_settle: delays.click_settle,
        }
    }

    /// 进入下一题
    ///
    /// 失败既可能是已到最后一题，也可能是页面故障，调用方一律按终止处理。
    pub async fn advance<D: QuizDriver>(&self, driver: &D) -> Result<(), AdvanceError> {
        driver.execute_script(PROVISIONAL_ANSWER_SCRIPT).await?;
        sleep(self.answer_settle).await;

        let button = driver
            .find_element_by_id(NEXT_BUTTON_ID)
            .await?
            .ok_or(AdvanceError::ControlNotFound)?;
        driver.click(&button).await?;
        sleep(self.click_settle).await;

        debug!("已点击“下一题”");
        Ok(())
    }
}

impl Default for AdvanceController {
    fn default() -> Self {
        Self::new(Delays::default())
    }
}
