//! 应用入口
//!
//! 在主任务上充当展示层：启动后台抓取任务，取出消息队列并显示，Ctrl-C 时发出停止请求。

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use crate::browser::ChromeLauncher;
use crate::config::Config;
use crate::infrastructure::DriverLauncher;
use crate::ui::{ConsolePresenter, UiEvent, UiHandle};
use crate::utils::logging;
use crate::workflow::{ScrapeLoop, ScrapeReport, SessionCtx, StopSignal};

/// 应用主结构
pub struct App {
    config: Config,
    ctx: SessionCtx,
}

impl App {
    /// 校验输入并初始化运行日志
    pub fn initialize(config: Config, url: &str, output: &str) -> Result<Self> {
        let ctx = SessionCtx::from_inputs(url, output, &config)
            .context("URL 和结果文件名都是必填项")?;

        logging::init_log_file(&config.output_log_file)
            .with_context(|| format!("无法初始化日志文件: {}", config.output_log_file))?;
        logging::log_startup(&ctx.url, &ctx.output_path.display().to_string());

        Ok(Self { config, ctx })
    }

    /// 使用配置中的浏览器运行一次抓取会话
    pub async fn run(self) -> Result<ScrapeReport> {
        let launcher = ChromeLauncher::from_config(&self.config);
        self.run_with(launcher).await
    }

    /// 使用指定的浏览器启动器运行一次抓取会话
    pub async fn run_with<L: DriverLauncher>(self, launcher: L) -> Result<ScrapeReport> {
        let (ui, mut events) = UiHandle::channel();
        let stop = StopSignal::new();
        let mut presenter =
            ConsolePresenter::new(Some(PathBuf::from(&self.config.output_log_file)));

        ui.log(format!("URL 已规范化: {}", self.ctx.url));
        ui.log("开始抓取...");

        // ui 随循环一起移入后台任务，任务结束时队列随之关闭
        let worker = tokio::spawn(ScrapeLoop::new(launcher, self.ctx, ui, stop.clone()).run());

        let mut stop_requested = false;
        let mut finished = None;
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        if let Some(reason) = presenter.apply(event) {
                            finished = Some(reason);
                        }
                    }
                    None => break,
                },
                _ = tokio::signal::ctrl_c(), if !stop_requested => {
                    stop_requested = true;
                    stop.request();
                    info!("正在停止...");
                    presenter.apply(UiEvent::Log {
                        at: Local::now(),
                        message: "正在停止...".to_string(),
                    });
                }
            }
        }

        let report = worker.await.context("抓取任务异常退出")?;
        if let Some(reason) = finished {
            info!("会话结束: {}", reason);
        }
        info!(
            "📊 共保存 {} 道题，日志已保存至: {}",
            report.records.len(),
            self.config.output_log_file
        );
        Ok(report)
    }
}
