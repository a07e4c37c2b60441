use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "scraper.toml";

/// 浏览器会话模式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserMode {
    /// 启动本地浏览器
    Launch,
    /// 连接到已开启远程调试端口的浏览器
    Connect,
}

impl FromStr for BrowserMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "launch" => Ok(BrowserMode::Launch),
            "connect" => Ok(BrowserMode::Connect),
            _ => Err(()),
        }
    }
}

/// 程序配置
///
/// 读取顺序：默认值 → TOML 文件 → 环境变量。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 浏览器会话模式
    pub browser_mode: BrowserMode,
    /// 浏览器调试端口（connect 模式）
    pub browser_debug_port: u16,
    /// 是否以无头模式启动（launch 模式）
    pub headless: bool,
    /// 浏览器可执行文件路径，为空时由 chromiumoxide 自动查找
    pub chrome_executable: Option<String>,
    /// 打开页面后的等待时间
    pub page_load_delay_ms: u64,
    /// 提交临时答案后的等待时间
    pub answer_settle_delay_ms: u64,
    /// 点击“下一题”后的等待时间
    pub click_settle_delay_ms: u64,
    /// 连续读到重复题目的上限，超过即认为翻页卡住
    pub max_consecutive_duplicates: usize,
    /// 运行日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_mode: BrowserMode::Launch,
            browser_debug_port: 9222,
            headless: false,
            chrome_executable: None,
            page_load_delay_ms: 3000,
            answer_settle_delay_ms: 250,
            click_settle_delay_ms: 250,
            max_consecutive_duplicates: 10,
            output_log_file: "scraper.log".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置
    ///
    /// `explicit` 为命令行指定的配置文件，必须存在；
    /// 否则尝试 `SCRAPER_CONFIG` 或当前目录下的 `scraper.toml`，不存在则使用默认值。
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match explicit {
            Some(path) => Self::from_toml_file(path)?,
            None => {
                let path = std::env::var("SCRAPER_CONFIG")
                    .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
                let path = Path::new(&path);
                if path.exists() {
                    Self::from_toml_file(path)?
                } else {
                    Self::default()
                }
            }
        };
        base.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// 从 TOML 文件读取配置，未出现的字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖配置项
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("BROWSER_MODE") {
            self.browser_mode = parse_var("BROWSER_MODE", &v, "launch|connect")?;
        }
        if let Some(v) = lookup("BROWSER_DEBUG_PORT") {
            self.browser_debug_port = parse_var("BROWSER_DEBUG_PORT", &v, "u16")?;
        }
        if let Some(v) = lookup("HEADLESS") {
            self.headless = parse_var("HEADLESS", &v, "bool")?;
        }
        if let Some(v) = lookup("CHROME_PATH") {
            self.chrome_executable = Some(v);
        }
        if let Some(v) = lookup("PAGE_LOAD_DELAY_MS") {
            self.page_load_delay_ms = parse_var("PAGE_LOAD_DELAY_MS", &v, "u64")?;
        }
        if let Some(v) = lookup("ANSWER_SETTLE_DELAY_MS") {
            self.answer_settle_delay_ms = parse_var("ANSWER_SETTLE_DELAY_MS", &v, "u64")?;
        }
        if let Some(v) = lookup("CLICK_SETTLE_DELAY_MS") {
            self.click_settle_delay_ms = parse_var("CLICK_SETTLE_DELAY_MS", &v, "u64")?;
        }
        if let Some(v) = lookup("MAX_CONSECUTIVE_DUPLICATES") {
            self.max_consecutive_duplicates =
                parse_var("MAX_CONSECUTIVE_DUPLICATES", &v, "usize")?;
        }
        if let Some(v) = lookup("OUTPUT_LOG_FILE") {
            self.output_log_file = v;
        }
        if let Some(v) = lookup("VERBOSE_LOGGING") {
            self.verbose_logging = parse_var("VERBOSE_LOGGING", &v, "bool")?;
        }
        Ok(self)
    }

    /// 各步骤之后的固定等待时间
    pub fn delays(&self) -> Delays {
        Delays {
            page_load: Duration::from_millis(self.page_load_delay_ms),
            answer_settle: Duration::from_millis(self.answer_settle_delay_ms),
            click_settle: Duration::from_millis(self.click_settle_delay_ms),
        }
    }
}

/// 固定等待时间
///
/// 目标页面没有任何“脚本状态已稳定”的事件可供等待，只能靠固定延时同步。
/// 页面改版或网络变慢时这里是最先出问题的地方。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delays {
    pub page_load: Duration,
    pub answer_settle: Duration,
    pub click_settle: Duration,
}

impl Delays {
    /// 全部为零，用于针对模拟页面的测试
    pub const fn none() -> Self {
        Self {
            page_load: Duration::ZERO,
            answer_settle: Duration::ZERO,
            click_settle: Duration::ZERO,
        }
    }
}

impl Default for Delays {
    fn default() -> Self {
        Config::default().delays()
    }
}

fn parse_var<T: FromStr>(
    var_name: &str,
    value: &str,
    expected_type: &'static str,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type,
        })
}
