use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::models::{MovieDetails, MovieSummary};

/// 缓存条目
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    created_at: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            created_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// 内存缓存实现
///
/// 条目写入后不可变，并发读是安全的；写写竞争最多导致
/// 重复抓一次上游，可以接受。
#[derive(Debug, Clone)]
pub struct MemoryCache<T> {
    cache: Arc<RwLock<HashMap<String, CacheEntry<T>>>>,
    default_ttl: Duration,
}

impl<T: Clone> MemoryCache<T> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let cache = self.cache.read().ok()?;
        let entry = cache.get(key)?;

        if entry.is_expired() {
            drop(cache);
            self.remove(key);
            None
        } else {
            Some(entry.data.clone())
        }
    }

    pub fn set(&self, key: String, value: T) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    pub fn set_with_ttl(&self, key: String, value: T, ttl: Duration) {
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, CacheEntry::new(value, ttl));
        }
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(key);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    pub fn cleanup_expired(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.retain(|_, entry| !entry.is_expired());
        }
    }

    pub fn size(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }
}

/// 抓取结果缓存
///
/// 键是规范化后的请求 URL，寿命一小时（对齐上游页面的
/// revalidate 周期）。只是尽力而为，不承担正确性。
#[derive(Debug, Clone)]
pub struct CatalogCache {
    listing_cache: MemoryCache<Vec<MovieSummary>>,
    details_cache: MemoryCache<MovieDetails>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self {
            // 列表页缓存1小时
            listing_cache: MemoryCache::new(Duration::from_secs(60 * 60)),
            // 详情页缓存1小时
            details_cache: MemoryCache::new(Duration::from_secs(60 * 60)),
        }
    }

    /// 获取列表缓存
    pub fn get_listing(&self, url: &str) -> Option<Vec<MovieSummary>> {
        self.listing_cache.get(url)
    }

    /// 设置列表缓存
    pub fn set_listing(&self, url: &str, movies: Vec<MovieSummary>) {
        self.listing_cache.set(url.to_string(), movies);
    }

    /// 获取详情缓存
    pub fn get_details(&self, url: &str) -> Option<MovieDetails> {
        self.details_cache.get(url)
    }

    /// 设置详情缓存
    pub fn set_details(&self, url: &str, details: MovieDetails) {
        self.details_cache.set(url.to_string(), details);
    }

    /// 清理过期缓存
    pub fn cleanup_expired(&self) {
        self.listing_cache.cleanup_expired();
        self.details_cache.cleanup_expired();
    }

    /// 清空所有缓存
    pub fn clear_all(&self) {
        self.listing_cache.clear();
        self.details_cache.clear();
    }

    /// 获取缓存统计信息
    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            listing_cache_size: self.listing_cache.size(),
            details_cache_size: self.details_cache.size(),
        }
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

/// 缓存统计信息
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStats {
    pub listing_cache_size: usize,
    pub details_cache_size: usize,
}

/// 缓存清理任务
pub struct CacheCleanupTask {
    cache: CatalogCache,
    interval: Duration,
}

impl CacheCleanupTask {
    pub fn new(cache: CatalogCache, interval: Duration) -> Self {
        Self { cache, interval }
    }

    /// 启动定期清理任务
    pub async fn start(self) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            interval.tick().await;
            self.cache.cleanup_expired();
            tracing::debug!("Cache cleanup completed. Stats: {:?}", self.cache.get_stats());
        }
    }
}
