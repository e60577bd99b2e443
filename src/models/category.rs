use serde::{Deserialize, Serialize};

/// 分类（静态参考数据，不来自抓取）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub path: String,
}

/// 上游站点的分类表
///
/// 固定表，和上游导航保持一致即可，调整不需要动解析逻辑。
pub fn all_categories() -> Vec<Category> {
    const ENTRIES: &[(&str, &str)] = &[
        ("300MB Movies", "/category/300mb-movies/"),
        ("Action", "/category/action-movies/"),
        ("Adventure", "/category/adventure/"),
        ("Animation", "/category/animated-movies/"),
        ("Bollywood", "/category/bollywood-movies/"),
        ("Comedy", "/category/comedy-movies/"),
        ("Crime", "/category/crime/"),
        ("Documentary", "/category/documentary/"),
        ("Drama", "/category/drama/"),
        ("Dual Audio", "/category/dual-audio/"),
        ("Family", "/category/family/"),
        ("Fantasy", "/category/fantasy/"),
        ("HD Movies", "/category/hd-movies/"),
        ("Hindi Dubbed", "/category/hindi-dubbed/"),
        ("Hollywood", "/category/hollywood-movies/"),
        ("Horror", "/category/horror-movies/"),
        ("Movie Series", "/category/movie-series-collection/"),
        ("Mystery", "/category/mystery/"),
        ("Romance", "/category/romantic-movies/"),
        ("Sci-Fi", "/category/sci-fi/"),
        ("Thriller", "/category/thriller/"),
        ("TV Shows", "/category/tv-shows/"),
        ("War", "/category/war/"),
        ("Web Series", "/category/web-series/"),
    ];

    ENTRIES
        .iter()
        .map(|(name, path)| Category {
            name: name.to_string(),
            path: path.to_string(),
        })
        .collect()
}
