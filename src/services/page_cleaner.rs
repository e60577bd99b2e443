use lazy_static::lazy_static;
use regex::{Captures, Regex};
use url::Url;

use super::stream_rewriter::STREAM_PROXY_PREFIX;
use crate::external::upstream::origin_of;

/// 已知广告/统计脚本的 src 子串
const TRACKER_MARKERS: &[&str] = &["bvtpk.com", "tzegilo.com/stattag.js", "hdstream4u.com/ad"];

/// 脚本剥离策略，按调用点配置
///
/// 同一个清洗函数带模式参数，而不是三份实现。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptStripMode {
    /// 剥掉所有脚本（通用抓取端点）
    All,
    /// 只剥已知的广告/统计脚本（内嵌播放器）
    KnownTrackers,
    /// 不动脚本
    None,
}

lazy_static! {
    static ref SCRIPT_TAG_RE: Regex = Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap();
    static ref IFRAME_TAG_RE: Regex =
        Regex::new(r"(?is)<iframe\b[^>]*>.*?</iframe>|<iframe\b[^>]*/>").unwrap();
    static ref SRC_ATTR_RE: Regex = Regex::new(r#"(?i)src\s*=\s*["']([^"']+)["']"#).unwrap();
    static ref HEAD_OPEN_RE: Regex = Regex::new(r"(?i)<head[^>]*>").unwrap();
    static ref BASE_TAG_RE: Regex = Regex::new(r"(?i)<base\b").unwrap();
    static ref URL_IN_SCRIPT_RE: Regex = Regex::new(r#"https?://[^\s'"]+"#).unwrap();
}

/// 注入的样式：隐藏站点自带的壳和广告容器启发式
/// （id/class 含 ads、全屏 fixed 浮层）
const HIDE_CHROME_STYLE: &str = concat!(
    "<style>",
    ".header, .download, .nav, .tab, .tab-content, .rating, .footer { display: none !important; } ",
    "[id*=\"ads\"], [class*=\"ads\"] { display: none !important; } ",
    "div[style*=\"position: fixed\"] { display: none !important; } ",
    ".section { padding: 2px; }",
    "</style>"
);

/// 清洗一个上游 HTML 页面，使其可以安全内嵌
///
/// - 注入 `<base>` 指向页面自身 origin（相对资源才解析得对）
/// - 按模式剥脚本；保留下来的脚本里的流 URL 重写进代理
/// - 第三方 iframe 一律剥掉
/// - 注入隐藏广告容器/站点壳的样式
pub fn clean_page(html: &str, page_url: &Url, mode: ScriptStripMode) -> String {
    let cleaned = strip_scripts(html, mode);
    let cleaned = strip_foreign_iframes(&cleaned, page_url);
    inject_head(&cleaned, page_url)
}

fn strip_scripts(html: &str, mode: ScriptStripMode) -> String {
    SCRIPT_TAG_RE
        .replace_all(html, |caps: &Captures| {
            let tag = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            match mode {
                ScriptStripMode::All => String::new(),
                ScriptStripMode::KnownTrackers if is_tracker_script(tag) => String::new(),
                // 留下的脚本里，指向流清单的绝对 URL 改走代理
                _ => rewrite_stream_urls(tag),
            }
        })
        .into_owned()
}

fn is_tracker_script(tag: &str) -> bool {
    TRACKER_MARKERS.iter().any(|marker| tag.contains(marker))
}

/// 脚本文本里 `.m3u8` 的绝对 URL 包进流代理
fn rewrite_stream_urls(tag: &str) -> String {
    URL_IN_SCRIPT_RE
        .replace_all(tag, |caps: &Captures| {
            let found = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            if found.contains(".m3u8") {
                format!("{}{}", STREAM_PROXY_PREFIX, urlencoding::encode(found))
            } else {
                found.to_string()
            }
        })
        .into_owned()
}

fn strip_foreign_iframes(html: &str, page_url: &Url) -> String {
    let page_host = page_url.host_str().unwrap_or_default();

    IFRAME_TAG_RE
        .replace_all(html, |caps: &Captures| {
            let tag = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let src = SRC_ATTR_RE
                .captures(tag)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
                .unwrap_or_default();

            // 相对/解析不了的留下，确定是异主机的剥掉
            match Url::parse(src) {
                Ok(parsed) => match parsed.host_str() {
                    Some(host) if host != page_host => String::new(),
                    _ => tag.to_string(),
                },
                Err(_) => tag.to_string(),
            }
        })
        .into_owned()
}

/// `<head>` 里注入 base（已有就不重复）和隐藏样式
fn inject_head(html: &str, page_url: &Url) -> String {
    let mut injection = String::new();
    if !BASE_TAG_RE.is_match(html) {
        injection.push_str(&format!(r#"<base href="{}">"#, origin_of(page_url)));
    }
    injection.push_str(HIDE_CHROME_STYLE);

    if let Some(head) = HEAD_OPEN_RE.find(html) {
        let mut result = String::with_capacity(html.len() + injection.len());
        result.push_str(&html[..head.end()]);
        result.push_str(&injection);
        result.push_str(&html[head.end()..]);
        result
    } else {
        format!("{injection}{html}")
    }
}
