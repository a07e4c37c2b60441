use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use daypo_scraper::utils::logging;
use daypo_scraper::{App, Config};

#[derive(Parser, Debug)]
#[command(version, about = "逐题抓取 Daypo 测验的题目与正确答案", long_about = None)]
struct Args {
    /// 测验地址
    #[arg(short, long)]
    url: String,

    /// 结果 JSON 文件
    #[arg(short, long)]
    output: String,

    /// 配置文件（默认读取 scraper.toml）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 以无头模式启动浏览器
    #[arg(long)]
    headless: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 加载配置
    let mut config = Config::load(args.config.as_deref())?;
    if args.headless {
        config.headless = true;
    }

    // 初始化日志
    logging::init(config.verbose_logging);

    let report = App::initialize(config, &args.url, &args.output)?.run().await?;

    if report.reason.is_fatal() {
        std::process::exit(1);
    }
    Ok(())
}
