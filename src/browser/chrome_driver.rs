//! 基于 chromiumoxide 的 [`QuizDriver`] 实现

use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, Page};
use serde_json::Value as JsonValue;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::browser::{connect_to_browser, launch_browser};
use crate::config::{BrowserMode, Config};
use crate::error::DriverError;
use crate::infrastructure::{DriverLauncher, QuizDriver};
use crate::utils::logging::truncate_text;

/// 持有浏览器会话的驱动
///
/// 整个会话期间由抓取循环独占，只有 [`QuizDriver::quit`] 会释放它。
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    mode: BrowserMode,
}

impl QuizDriver for ChromeDriver {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        debug!("导航到: {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn find_element_by_id(&self, id: &str) -> Result<Option<Element>, DriverError> {
        let mut elements = self.page.find_elements(format!("#{}", id)).await?;
        if elements.is_empty() {
            return Ok(None);
        }
        Ok(Some(elements.swap_remove(0)))
    }

    async fn element_text(&self, element: &Element) -> Result<String, DriverError> {
        Ok(element.inner_text().await?.unwrap_or_default())
    }

    async fn execute_script(&self, source: &str) -> Result<JsonValue, DriverError> {
        let result = self
            .page
            .evaluate(source)
            .await
            .map_err(|e| script_failure(source, e))?;
        Ok(result.value().cloned().unwrap_or(JsonValue::Null))
    }

    async fn click(&self, element: &Element) -> Result<(), DriverError> {
        element.click().await?;
        Ok(())
    }

    async fn quit(self) -> Result<(), DriverError> {
        let ChromeDriver {
            mut browser,
            page,
            handler_task,
            mode,
        } = self;

        let result = match mode {
            // 自己启动的浏览器整体关闭
            BrowserMode::Launch => browser
                .close()
                .await
                .map(|_| ())
                .map_err(DriverError::from),
            // 借用的浏览器只关闭自己打开的页面
            BrowserMode::Connect => page.close().await.map_err(DriverError::from),
        };
        if matches!(mode, BrowserMode::Launch) {
            if let Err(e) = browser.wait().await {
                warn!("等待浏览器进程退出失败: {}", e);
            }
        }
        handler_task.abort();
        result
    }
}

/// 页面脚本执行失败（含 JS 异常），错误信息带上脚本开头便于定位
fn script_failure(source: &str, err: CdpError) -> DriverError {
    DriverError::Script(format!("{}: {}", truncate_text(source.trim(), 40), err))
}

/// 按配置创建 [`ChromeDriver`]
#[derive(Clone, Debug)]
pub struct ChromeLauncher {
    mode: BrowserMode,
    debug_port: u16,
    headless: bool,
    chrome_executable: Option<String>,
}

impl ChromeLauncher {
    pub fn from_config(config: &Config) -> Self {
        Self {
            mode: config.browser_mode,
            debug_port: config.browser_debug_port,
            headless: config.headless,
            chrome_executable: config.chrome_executable.clone(),
        }
    }
}

impl DriverLauncher for ChromeLauncher {
    type Driver = ChromeDriver;

    async fn launch(&self) -> Result<ChromeDriver, DriverError> {
        let (browser, page, handler_task) = match self.mode {
            BrowserMode::Launch => {
                launch_browser(self.headless, self.chrome_executable.as_deref()).await?
            }
            BrowserMode::Connect => connect_to_browser(self.debug_port).await?,
        };

        Ok(ChromeDriver {
            browser,
            page,
            handler_task,
            mode: self.mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_failure_names_script() {
        let err = script_failure("  contestar(0)\n", CdpError::NotFound);
        assert!(matches!(err, DriverError::Script(_)));
        assert!(err.to_string().starts_with("执行脚本失败: contestar(0): "));
    }
}
