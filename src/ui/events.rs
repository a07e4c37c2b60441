use chrono::{DateTime, Local};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

use crate::workflow::StopReason;

/// 后台任务发给展示层的消息
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// 日志面板中的一行
    Log {
        at: DateTime<Local>,
        message: String,
    },
    /// 进度，取值 `[0, 1]`
    Progress(f64),
    /// 开始/停止按钮是否可用
    Controls {
        start_enabled: bool,
        stop_enabled: bool,
    },
    /// 会话已结束
    Finished(StopReason),
}

/// 发送端
///
/// 展示层已经退出时消息直接丢弃。
#[derive(Debug, Clone)]
pub struct UiHandle {
    tx: UnboundedSender<UiEvent>,
}

impl UiHandle {
    pub fn new(tx: UnboundedSender<UiEvent>) -> Self {
        Self { tx }
    }

    /// 创建一对发送端和接收端
    pub fn channel() -> (Self, UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.send(UiEvent::Log {
            at: Local::now(),
            message,
        });
    }

    pub fn log_error(&self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        self.send(UiEvent::Log {
            at: Local::now(),
            message,
        });
    }

    pub fn progress(&self, value: f64) {
        self.send(UiEvent::Progress(value.clamp(0.0, 1.0)));
    }

    /// `running` 为真时禁用开始、启用停止，反之复位为空闲状态
    pub fn controls(&self, running: bool) {
        self.send(UiEvent::Controls {
            start_enabled: !running,
            stop_enabled: running,
        });
    }

    pub fn finished(&self, reason: StopReason) {
        self.send(UiEvent::Finished(reason));
    }

    fn send(&self, event: UiEvent) {
        let _ = self.tx.send(event);
    }
}
