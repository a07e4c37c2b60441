use std::sync::OnceLock;

use regex::Regex;

/// 把测验链接改写为答题视图
///
/// 以 `.html` 结尾（可带任意 `#` 片段，不区分大小写）的链接统一改为 `.html#test`，
/// 其他链接原样返回。
pub fn normalize_quiz_url(url: &str) -> String {
    static HTML_SUFFIX: OnceLock<Regex> = OnceLock::new();
    let re = HTML_SUFFIX.get_or_init(|| Regex::new(r"(?i)\.html(#.*)?$").expect("静态正则"));
    re.replace(url.trim(), ".html#test").into_owned()
}
