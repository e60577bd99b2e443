use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use thiserror::Error;
use tokio::sync::RwLock;
use url::Url;

/// 上游抓取的统一错误类型
///
/// 调用方把失败当作"没有数据"处理，不允许穿透到进程层面。
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream returned status {status}")]
    Status { status: u16 },
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status {
                status: status.as_u16(),
            },
            None => FetchError::Transport(err.to_string()),
        }
    }
}

/// 默认上游地址，可被 UPSTREAM_BASE_URL 覆盖
const DEFAULT_BASE_URL: &str = "https://hdhub4u.cologne";
/// 默认主机别名（逗号分隔，可被 UPSTREAM_HOST_ALIASES 覆盖）
const DEFAULT_HOST_ALIASES: &str = "hdhub4u";

/// 上游会拒绝或降级不认识的客户端，固定一个真实浏览器身份
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// 从 URL 提取 origin 作为 Referer
pub fn origin_of(url: &Url) -> String {
    format!(
        "{}://{}/",
        url.scheme(),
        url.host_str().unwrap_or_default()
    )
}

/// 上游主机匹配规则
///
/// 上游域名会跨部署漂移，同主机判定是配置而不是硬编码：
/// 精确主机名（含子域）加子串别名。
#[derive(Debug, Clone)]
pub struct UpstreamHost {
    hostname: String,
    aliases: Vec<String>,
}

impl UpstreamHost {
    pub fn new(hostname: impl Into<String>, aliases: Vec<String>) -> Self {
        Self {
            hostname: hostname.into(),
            aliases,
        }
    }

    /// 从环境变量构造（UPSTREAM_HOST_ALIASES，逗号分隔）
    pub fn from_env(base: &Url) -> Self {
        let aliases = std::env::var("UPSTREAM_HOST_ALIASES")
            .unwrap_or_else(|_| DEFAULT_HOST_ALIASES.to_string())
            .split(',')
            .map(|alias| alias.trim().to_string())
            .filter(|alias| !alias.is_empty())
            .collect();

        Self::new(base.host_str().unwrap_or_default(), aliases)
    }

    pub fn matches(&self, host: &str) -> bool {
        host.ends_with(&self.hostname) || self.aliases.iter().any(|alias| host.contains(alias))
    }

    /// 把 anchor href 规范化为站内相对路径
    ///
    /// - 同主机的绝对 URL 降为相对路径（保留候选）
    /// - 异主机的绝对 URL 返回 None（该候选被静默丢弃）
    /// - 无法解析的 URL 同样返回 None
    /// - 本来就是相对路径的原样保留
    pub fn normalize_href(&self, href: &str) -> Option<String> {
        if href.starts_with("http://") || href.starts_with("https://") {
            let parsed = Url::parse(href).ok()?;
            let host = parsed.host_str()?;
            if self.matches(host) {
                Some(parsed.path().to_string())
            } else {
                None
            }
        } else {
            Some(href.to_string())
        }
    }
}

#[derive(Debug, Clone)]
struct ResolvedOrigin {
    origin: Url,
    resolved_at: Instant,
}

/// 上游 origin 解析器
///
/// 上游域名靠重定向发现，结果带过期时间缓存在这里，
/// 显式注入到客户端里，不放进程级全局变量。
/// 发现失败时退回配置值。
#[derive(Debug)]
pub struct OriginResolver {
    configured: Url,
    ttl: Duration,
    cached: RwLock<Option<ResolvedOrigin>>,
}

impl OriginResolver {
    pub fn new(configured: Url, ttl: Duration) -> Self {
        Self {
            configured,
            ttl,
            cached: RwLock::new(None),
        }
    }

    pub fn configured(&self) -> &Url {
        &self.configured
    }

    /// 当前生效的上游 origin（缓存新鲜则直接返回）
    pub async fn origin(&self, client: &Client) -> Url {
        {
            let cached = self.cached.read().await;
            if let Some(resolved) = cached.as_ref() {
                if resolved.resolved_at.elapsed() < self.ttl {
                    return resolved.origin.clone();
                }
            }
        }

        match self.discover(client).await {
            Ok(origin) => {
                let mut cached = self.cached.write().await;
                *cached = Some(ResolvedOrigin {
                    origin: origin.clone(),
                    resolved_at: Instant::now(),
                });
                tracing::debug!("Resolved upstream origin: {}", origin);
                origin
            }
            Err(e) => {
                tracing::warn!("Origin discovery failed, using configured base: {}", e);
                self.configured.clone()
            }
        }
    }

    /// 跟随重定向链，取最终落点的 origin
    async fn discover(&self, client: &Client) -> anyhow::Result<Url> {
        let response = client
            .get(self.configured.clone())
            .header("User-Agent", BROWSER_USER_AGENT)
            .send()
            .await?;

        let mut origin = response.url().clone();
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);
        Ok(origin)
    }
}

/// 上游 HTTP 客户端
///
/// 每次调用就是一次阻塞式网络往返，不做重试；
/// 失败以 FetchError 返回给调用方。
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    resolver: Arc<OriginResolver>,
    host: UpstreamHost,
}

impl UpstreamClient {
    pub fn new() -> Self {
        let configured = std::env::var("UPSTREAM_BASE_URL")
            .ok()
            .and_then(|raw| match Url::parse(&raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!("Invalid UPSTREAM_BASE_URL ({}), using default", e);
                    None
                }
            })
            .unwrap_or_else(|| Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client build");

        let host = UpstreamHost::from_env(&configured);
        // origin 发现结果缓存 6 小时
        let resolver = Arc::new(OriginResolver::new(configured, Duration::from_secs(6 * 60 * 60)));

        Self {
            client,
            resolver,
            host,
        }
    }

    pub fn host(&self) -> &UpstreamHost {
        &self.host
    }

    /// 当前上游 origin（经 OriginResolver）
    pub async fn base_url(&self) -> Url {
        self.resolver.origin(&self.client).await
    }

    pub fn configured_base(&self) -> &Url {
        self.resolver.configured()
    }

    fn request(&self, url: &Url) -> reqwest::RequestBuilder {
        self.client
            .get(url.clone())
            .header("User-Agent", BROWSER_USER_AGENT)
            .header("Accept", BROWSER_ACCEPT)
            .header("Accept-Language", BROWSER_ACCEPT_LANGUAGE)
            .header("Referer", origin_of(url))
    }

    /// 抓取 HTML 文档
    pub async fn fetch_html(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.request(url).send().await.map_err(FetchError::from)?;

        if !response.status().is_success() {
            tracing::error!(
                "Upstream fetch failed with status {} for {}",
                response.status(),
                url
            );
            return Err(FetchError::Status {
                status: response.status().as_u16(),
            });
        }

        response.text().await.map_err(FetchError::from)
    }

    /// 抓取任意上游资源（代理用），返回原始响应
    ///
    /// 206 也算成功（视频分段请求）。
    pub async fn fetch_raw(&self, url: &Url) -> Result<reqwest::Response, FetchError> {
        let response = self.request(url).send().await.map_err(FetchError::from)?;

        let status = response.status();
        if !status.is_success() && status.as_u16() != 206 {
            tracing::error!("Proxy fetch failed with status {} for {}", status, url);
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> UpstreamHost {
        UpstreamHost::new("hdhub4u.cologne", vec!["hdhub4u".to_string()])
    }

    #[test]
    fn test_same_host_absolute_href_becomes_relative() {
        assert_eq!(
            host().normalize_href("https://hdhub4u.cologne/some-movie/"),
            Some("/some-movie/".to_string())
        );
        // 子域同样算同主机
        assert_eq!(
            host().normalize_href("https://www.hdhub4u.cologne/some-movie/"),
            Some("/some-movie/".to_string())
        );
    }

    #[test]
    fn test_alias_matches_drifted_domain() {
        assert_eq!(
            host().normalize_href("https://hdhub4u.example/other-movie/"),
            Some("/other-movie/".to_string())
        );
    }

    #[test]
    fn test_foreign_host_href_is_dropped() {
        assert_eq!(host().normalize_href("https://evil.example/spam/"), None);
    }

    #[test]
    fn test_unparseable_href_is_dropped() {
        assert_eq!(host().normalize_href("http://"), None);
    }

    #[test]
    fn test_relative_href_passes_through() {
        assert_eq!(
            host().normalize_href("/some-movie/"),
            Some("/some-movie/".to_string())
        );
    }

    #[test]
    fn test_origin_of_strips_path() {
        let url = Url::parse("https://cdn.example/path/video.m3u8?token=1").unwrap();
        assert_eq!(origin_of(&url), "https://cdn.example/");
    }
}
