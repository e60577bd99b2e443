pub mod cache;
pub mod upstream;

pub use cache::{CacheCleanupTask, CacheStats, CatalogCache, MemoryCache};
pub use upstream::{FetchError, OriginResolver, UpstreamClient, UpstreamHost};

use url::Url;

use crate::models::{MovieDetails, MovieSummary};
use crate::services::{detail_extractor, listing_extractor};

/// 上游目录客户端（带缓存）
///
/// 对表现层暴露 §列表/详情 的四个操作；抓取失败以 FetchError
/// 返回，解析落空返回空表/None，绝不往上抛异常。
#[derive(Clone)]
pub struct CatalogClient {
    upstream: UpstreamClient,
    pub cache: CatalogCache,
}

impl CatalogClient {
    pub fn new() -> Self {
        Self {
            upstream: UpstreamClient::new(),
            cache: CatalogCache::new(),
        }
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    /// 首页电影列表（带缓存）
    pub async fn get_homepage_movies(
        &self,
        page: Option<u32>,
    ) -> Result<Vec<MovieSummary>, FetchError> {
        let mut url = self.upstream.base_url().await;
        match page {
            Some(p) if p > 1 => url.set_path(&format!("/page/{}", p)),
            _ => url.set_path("/"),
        }
        self.listing_at(url).await
    }

    /// 分类电影列表（带缓存）
    pub async fn get_category_movies(
        &self,
        path: &str,
        page: Option<u32>,
    ) -> Result<Vec<MovieSummary>, FetchError> {
        // 容忍带不带 /category/ 前缀和斜杠的各种写法
        let clean = path
            .trim_start_matches('/')
            .trim_start_matches("category/")
            .trim_matches('/');

        let mut url = self.upstream.base_url().await;
        match page {
            Some(p) if p > 1 => url.set_path(&format!("/category/{}/page/{}", clean, p)),
            _ => url.set_path(&format!("/category/{}/", clean)),
        }
        self.listing_at(url).await
    }

    /// 搜索结果（不缓存，每次都打上游）
    pub async fn get_search_results(&self, query: &str) -> Result<Vec<MovieSummary>, FetchError> {
        let mut url = self.upstream.base_url().await;
        url.set_path("/");
        url.query_pairs_mut().clear().append_pair("s", query);

        let html = self.upstream.fetch_html(&url).await?;
        Ok(listing_extractor::parse_listing(&html, self.upstream.host()))
    }

    /// 详情页（带缓存）
    ///
    /// Ok(None) 表示页面抓到了但定位不到标题（"未找到"）。
    pub async fn get_movie_details(
        &self,
        path: &str,
    ) -> Result<Option<MovieDetails>, FetchError> {
        let final_path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        let mut url = self.upstream.base_url().await;
        url.set_path(&final_path);
        let key = url.to_string();

        if let Some(cached) = self.cache.get_details(&key) {
            tracing::debug!("Cache hit for details: {}", key);
            return Ok(Some(cached));
        }

        let html = self.upstream.fetch_html(&url).await?;
        match detail_extractor::parse_detail(&html, &final_path, self.upstream.host()) {
            Some(details) => {
                self.cache.set_details(&key, details.clone());
                tracing::debug!("Cached details: {}", key);
                Ok(Some(details))
            }
            None => {
                tracing::debug!("No title located for {}", key);
                Ok(None)
            }
        }
    }

    /// 获取缓存统计信息
    pub fn get_cache_stats(&self) -> CacheStats {
        self.cache.get_stats()
    }

    /// 清理过期缓存
    pub fn cleanup_cache(&self) {
        self.cache.cleanup_expired();
    }

    /// 清空所有缓存
    pub fn clear_cache(&self) {
        self.cache.clear_all();
    }

    async fn listing_at(&self, url: Url) -> Result<Vec<MovieSummary>, FetchError> {
        let key = url.to_string();

        if let Some(cached) = self.cache.get_listing(&key) {
            tracing::debug!("Cache hit for listing: {}", key);
            return Ok(cached);
        }

        let html = self.upstream.fetch_html(&url).await?;
        let movies = listing_extractor::parse_listing(&html, self.upstream.host());

        self.cache.set_listing(&key, movies.clone());
        tracing::debug!("Cached listing: {} ({} entries)", key, movies.len());

        Ok(movies)
    }
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new()
    }
}
