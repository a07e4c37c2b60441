//! 抓取循环 - 流程层
//!
//! 状态流转：
//!
//! ```text
//! Initializing → Counting → Extracting ⇄ Advancing
//!       ↓            ↓           ↓           ↓
//!       └────────────┴──── Stopped ←─────────┘
//! ```
//!
//! 每次状态切换前检查停止信号。`Stopped` 只会被处理一次：
//! 输出结束原因、释放浏览器、进度置满、按钮复位。

use std::fmt;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{DriverError, StoreError};
use crate::infrastructure::{DriverLauncher, QuizDriver};
use crate::models::QuestionRecord;
use crate::services::{
    read_total_questions, AdvanceController, Extraction, PageExtractor, ResultStore,
};
use crate::ui::UiHandle;
use crate::utils::logging::truncate_text;
use crate::workflow::{SessionCtx, StopSignal};

/// 运行中的进度上限，1.0 只在 `Stopped` 时发出
const RUNNING_PROGRESS_CAP: f64 = 0.99;

/// 会话结束原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// 已抓取的题数达到总题数
    Completed,
    /// 页面题干变为占位符
    EndOfQuiz,
    /// 操作员请求停止
    Cancelled,
    /// 浏览器启动或打开页面失败
    SetupFailed(String),
    /// 无法读取总题数
    CountUnavailable(String),
    /// 提取失败，按测验结束处理
    ExtractionFailed(String),
    /// 翻页失败，按测验结束处理
    AdvanceFailed(String),
    /// 连续多次读到同一道题
    Stalled(usize),
    /// 结果文件写入失败（已重试）
    PersistFailed(String),
}

impl StopReason {
    /// 会话未能正常产出结果
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StopReason::SetupFailed(_)
                | StopReason::CountUnavailable(_)
                | StopReason::PersistFailed(_)
        )
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Completed => write!(f, "抓取完成"),
            StopReason::EndOfQuiz => write!(f, "测验已结束"),
            StopReason::Cancelled => write!(f, "已按请求停止"),
            StopReason::SetupFailed(detail) => {
                write!(f, "浏览器启动失败，请检查浏览器与 URL: {}", detail)
            }
            StopReason::CountUnavailable(detail) => {
                write!(f, "无法获取题目总数，已中止: {}", detail)
            }
            StopReason::ExtractionFailed(detail) => write!(f, "结束或出错: {}", detail),
            StopReason::AdvanceFailed(detail) => {
                write!(f, "无法进入下一题，结束抓取: {}", detail)
            }
            StopReason::Stalled(count) => {
                write!(f, "连续 {} 次读到已抓取的题目，翻页可能失效", count)
            }
            StopReason::PersistFailed(detail) => write!(f, "写入结果文件失败: {}", detail),
        }
    }
}

/// 状态机的状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeState {
    Initializing,
    Counting,
    Extracting,
    Advancing,
    Stopped(StopReason),
}

/// 一次会话的结果
#[derive(Debug)]
pub struct ScrapeReport {
    pub reason: StopReason,
    pub total_questions: usize,
    /// 按抓取顺序排列的全部题目，写文件失败时也完整保留
    pub records: Vec<QuestionRecord>,
}

/// 抓取循环
///
/// 独占浏览器会话与结果集合，运行在单独的后台任务上，
/// 所有界面变化都通过 [`UiHandle`] 排队发出。
pub struct ScrapeLoop<L: DriverLauncher> {
    launcher: L,
    ctx: SessionCtx,
    ui: UiHandle,
    stop: StopSignal,
    driver: Option<L::Driver>,
    store: ResultStore,
    extractor: PageExtractor,
    advancer: AdvanceController,
    total_questions: usize,
    consecutive_duplicates: usize,
    progress: f64,
}

impl<L: DriverLauncher> ScrapeLoop<L> {
    pub fn new(launcher: L, ctx: SessionCtx, ui: UiHandle, stop: StopSignal) -> Self {
        let advancer = AdvanceController::new(ctx.delays);
        Self {
            launcher,
            ctx,
            ui,
            stop,
            driver: None,
            store: ResultStore::new(),
            extractor: PageExtractor::new(),
            advancer,
            total_questions: 0,
            consecutive_duplicates: 0,
            progress: 0.0,
        }
    }

    /// 运行到 `Stopped` 为止
    pub async fn run(mut self) -> ScrapeReport {
        self.ui.controls(true);
        self.ui.progress(0.0);

        let mut state = ScrapeState::Initializing;
        loop {
            if self.stop.is_requested() && !matches!(state, ScrapeState::Stopped(_)) {
                debug!("收到停止请求，放弃当前步骤 {:?}", state);
                state = ScrapeState::Stopped(StopReason::Cancelled);
            }

            state = match state {
                ScrapeState::Initializing => self.initialize().await,
                ScrapeState::Counting => self.count().await,
                ScrapeState::Extracting => self.extract().await,
                ScrapeState::Advancing => self.advance().await,
                ScrapeState::Stopped(reason) => return self.finish(reason).await,
            };
        }
    }

    async fn initialize(&mut self) -> ScrapeState {
        self.ui.log(format!("🌐 正在打开: {}", self.ctx.url));

        let driver = match self.launcher.launch().await {
            Ok(driver) => self.driver.insert(driver),
            Err(e) => return ScrapeState::Stopped(StopReason::SetupFailed(e.to_string())),
        };
        if let Err(e) = driver.navigate(&self.ctx.url).await {
            return ScrapeState::Stopped(StopReason::SetupFailed(e.to_string()));
        }

        sleep(self.ctx.delays.page_load).await;
        ScrapeState::Counting
    }

    async fn count(&mut self) -> ScrapeState {
        let Some(driver) = self.driver.as_ref() else {
            return session_lost();
        };

        match read_total_questions(driver).await {
            Ok(total) => {
                self.total_questions = total;
                self.ui.log(format!("📋 测验共 {} 道题", total));
                ScrapeState::Extracting
            }
            Err(e) => ScrapeState::Stopped(StopReason::CountUnavailable(e.to_string())),
        }
    }

    async fn extract(&mut self) -> ScrapeState {
        if self.total_questions > 0 && self.store.len() >= self.total_questions {
            return ScrapeState::Stopped(StopReason::Completed);
        }
        let Some(driver) = self.driver.as_ref() else {
            return session_lost();
        };

        match self.extractor.extract(driver).await {
            Ok(Extraction::Question(record)) => self.accept(record),
            Ok(Extraction::Placeholder) => ScrapeState::Stopped(StopReason::EndOfQuiz),
            Err(e) => ScrapeState::Stopped(StopReason::ExtractionFailed(e.to_string())),
        }
    }

    /// 处理一条提取结果：重复则直接去翻页，否则追加、落盘、更新进度
    fn accept(&mut self, record: QuestionRecord) -> ScrapeState {
        if self.store.contains(record.internal_id) {
            self.consecutive_duplicates += 1;
            warn!(
                "⚠️ 题目 #{} 已抓取过，重新翻页 (连续 {} 次)",
                record.internal_id, self.consecutive_duplicates
            );
            let limit = self.ctx.max_consecutive_duplicates;
            if limit > 0 && self.consecutive_duplicates >= limit {
                return ScrapeState::Stopped(StopReason::Stalled(self.consecutive_duplicates));
            }
            return ScrapeState::Advancing;
        }
        self.consecutive_duplicates = 0;

        let prompt = truncate_text(&record.question_text, 120);
        let first_answer = record.correct_answers.first().cloned().unwrap_or_default();
        self.store.append(record);

        if let Err(e) = self.persist() {
            return ScrapeState::Stopped(StopReason::PersistFailed(e.to_string()));
        }

        self.report_progress();
        self.ui.log(format!(
            "✓ 第 {}/{} 题: {}\n  答案: {}",
            self.store.len(),
            self.total_questions,
            prompt,
            first_answer
        ));
        ScrapeState::Advancing
    }

    /// 写入结果文件，失败时重试一次
    fn persist(&self) -> Result<(), StoreError> {
        let path = &self.ctx.output_path;
        self.store.flush(path).or_else(|first| {
            self.ui
                .log_error(format!("⚠️ 写入 {} 失败，重试一次: {}", path.display(), first));
            self.store.flush(path)
        })
    }

    fn report_progress(&mut self) {
        if self.total_questions == 0 {
            return;
        }
        let fraction =
            (self.store.len() as f64 / self.total_questions as f64).min(RUNNING_PROGRESS_CAP);
        self.progress = self.progress.max(fraction);
        self.ui.progress(self.progress);
    }

    async fn advance(&mut self) -> ScrapeState {
        let Some(driver) = self.driver.as_ref() else {
            return session_lost();
        };

        match self.advancer.advance(driver).await {
            Ok(()) => ScrapeState::Extracting,
            Err(e) => ScrapeState::Stopped(StopReason::AdvanceFailed(e.to_string())),
        }
    }

    /// 终止处理，只执行一次
    async fn finish(mut self, reason: StopReason) -> ScrapeReport {
        let summary = format!(
            "{} (已保存 {}/{} 道题)",
            reason,
            self.store.len(),
            self.total_questions
        );
        if reason.is_fatal() {
            self.ui.log_error(format!("❌ {}", summary));
        } else {
            self.ui.log(format!("🏁 {}", summary));
        }

        if let Some(driver) = self.driver.take() {
            match driver.quit().await {
                Ok(()) => debug!("浏览器会话已释放"),
                Err(e) => warn!("释放浏览器会话失败: {}", e),
            }
        }

        self.ui.progress(1.0);
        self.ui.controls(false);
        self.ui.finished(reason.clone());

        ScrapeReport {
            reason,
            total_questions: self.total_questions,
            records: self.store.into_records(),
        }
    }
}

fn session_lost() -> ScrapeState {
    ScrapeState::Stopped(StopReason::SetupFailed(
        DriverError::SessionClosed.to_string(),
    ))
}
