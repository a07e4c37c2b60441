//! 控制台展示
//!
//! 代替图形界面：绘制进度条，记录按钮状态，并把日志行追加到运行日志文件。
//! 日志行本身由 tracing 输出到终端，这里不再重复打印。

use std::fs::OpenOptions;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;

use tracing::warn;

use crate::ui::UiEvent;
use crate::workflow::StopReason;

const BAR_WIDTH: usize = 30;

/// 控制台展示层
#[derive(Debug)]
pub struct ConsolePresenter<W: Write = Stdout> {
    out: W,
    progress: f64,
    start_enabled: bool,
    stop_enabled: bool,
    log_file: Option<PathBuf>,
    lines: Vec<String>,
}

impl ConsolePresenter<Stdout> {
    pub fn new(log_file: Option<PathBuf>) -> Self {
        Self::with_output(log_file, io::stdout())
    }
}

impl<W: Write> ConsolePresenter<W> {
    /// 进度条写到 `out`
    pub fn with_output(log_file: Option<PathBuf>, out: W) -> Self {
        Self {
            out,
            progress: 0.0,
            start_enabled: true,
            stop_enabled: false,
            log_file,
            lines: Vec::new(),
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn start_enabled(&self) -> bool {
        self.start_enabled
    }

    pub fn stop_enabled(&self) -> bool {
        self.stop_enabled
    }

    /// 已显示的日志行
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// 应用一条消息，会话结束时返回结束原因
    pub fn apply(&mut self, event: UiEvent) -> Option<StopReason> {
        match event {
            UiEvent::Log { at, message } => {
                let line = format!("[{}] {}", at.format("%H:%M:%S"), message);
                self.append_to_file(&line);
                self.lines.push(line);
                None
            }
            UiEvent::Progress(value) => {
                self.progress = value;
                if let Err(e) = writeln!(self.out, "{}", render_bar(value)) {
                    warn!("输出进度失败: {}", e);
                }
                None
            }
            UiEvent::Controls {
                start_enabled,
                stop_enabled,
            } => {
                self.start_enabled = start_enabled;
                self.stop_enabled = stop_enabled;
                None
            }
            UiEvent::Finished(reason) => Some(reason),
        }
    }

    fn append_to_file(&self, line: &str) {
        let Some(path) = &self.log_file else {
            return;
        };
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{}", line));
        if let Err(e) = result {
            warn!("写入运行日志失败 ({}): {}", path.display(), e);
        }
    }
}

/// 文本进度条
pub fn render_bar(value: f64) -> String {
    let value = value.clamp(0.0, 1.0);
    let filled = (value * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        (value * 100.0).round() as u32
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(0.0), format!("[{}]   0%", "-".repeat(30)));
        assert_eq!(render_bar(1.0), format!("[{}] 100%", "#".repeat(30)));
        assert_eq!(render_bar(0.5), format!("[{}{}]  50%", "#".repeat(15), "-".repeat(15)));
    }

    #[test]
    fn test_apply_tracks_state() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("run.log");
        let mut presenter = ConsolePresenter::new(Some(log_path.clone()));

        assert!(presenter
            .apply(UiEvent::Controls {
                start_enabled: false,
                stop_enabled: true
            })
            .is_none());
        assert!(!presenter.start_enabled());
        assert!(presenter.stop_enabled());

        presenter.apply(UiEvent::Progress(0.25));
        assert_eq!(presenter.progress(), 0.25);

        presenter.apply(UiEvent::Log {
            at: Local::now(),
            message: "hola".to_string(),
        });
        assert_eq!(presenter.lines().len(), 1);
        assert!(std::fs::read_to_string(&log_path).unwrap().contains("hola"));

        let reason = presenter.apply(UiEvent::Finished(StopReason::Cancelled));
        assert_eq!(reason, Some(StopReason::Cancelled));
    }

    #[test]
    fn test_log_lines_not_echoed_to_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("run.log");
        let mut presenter = ConsolePresenter::with_output(Some(log_path.clone()), Vec::new());

        presenter.apply(UiEvent::Log {
            at: Local::now(),
            message: "✓ 第 1/3 题".to_string(),
        });
        assert!(presenter.output().is_empty());
        assert_eq!(presenter.lines().len(), 1);
        let logged = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(logged.matches("第 1/3 题").count(), 1);

        presenter.apply(UiEvent::Progress(0.5));
        let printed = String::from_utf8(presenter.output().clone()).unwrap();
        assert_eq!(printed, format!("{}\n", render_bar(0.5)));
    }
}
