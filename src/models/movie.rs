use serde::{Deserialize, Serialize};

/// 列表页条目（首页/分类/搜索的轻量摘要）
///
/// 身份键是 `path`（站内相对路径）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    pub title: String,
    pub image_url: String,
    pub path: String,
}

/// 详情页记录
///
/// `title` 是整个实体的存在谓词：定位不到标题时视为"未找到"，
/// 而不是返回一个部分填充的记录。其余字段都允许缺失。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails {
    pub title: String,
    pub image_url: String,
    pub path: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// 0-10 分制的数字字符串（只存数字，不带 "/10"）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailer: Option<Trailer>,
    /// 文档顺序，不含海报图
    pub screenshots: Vec<String>,
    /// 扁平下载链接，与任何一集的链接互斥
    pub download_links: Vec<DownloadLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_list: Option<Vec<Episode>>,
}

/// 预告片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trailer {
    pub url: String,
}

/// 下载/观看链接
///
/// 同一次解析内以 `url` 去重。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    pub title: String,
    pub quality: String,
    pub url: String,
}

/// 剧集链接组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// 1 起始，按合格标题在文档中的出现顺序分配
    pub number: u32,
    pub title: String,
    pub download_links: Vec<DownloadLink>,
}

impl DownloadLink {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            title: text.clone(),
            quality: text,
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = MovieSummary {
            title: "Some Movie".to_string(),
            image_url: "https://img.example/poster.jpg".to_string(),
            path: "/some-movie/".to_string(),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["imageUrl"], "https://img.example/poster.jpg");
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn test_details_omits_absent_fields() {
        let details = MovieDetails {
            title: "Some Movie".to_string(),
            image_url: String::new(),
            path: "/some-movie/".to_string(),
            description: "No description available.".to_string(),
            category: None,
            rating: None,
            language: None,
            director: None,
            stars: None,
            release_date: None,
            imdb_id: None,
            imdb_url: None,
            trailer: None,
            screenshots: vec![],
            download_links: vec![],
            episode_list: None,
        };

        let json = serde_json::to_value(&details).unwrap();
        assert!(json.get("episodeList").is_none());
        assert!(json.get("trailer").is_none());
        assert!(json.get("downloadLinks").is_some());
    }
}
