use std::collections::HashSet;

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

use crate::external::upstream::UpstreamHost;
use crate::models::MovieSummary;

lazy_static! {
    // 布局 (a)：首页/分类页的网格
    static ref RECENT_GRID_SEL: Selector = Selector::parse("ul.recent-movies li.thumb").unwrap();
    // 布局 (b)：文章卡片
    static ref ARTICLE_CARD_SEL: Selector = Selector::parse("article.TPost.B").unwrap();
    // 布局 (c)：搜索结果
    static ref RESULT_ITEM_SEL: Selector = Selector::parse(".result-item").unwrap();
    static ref RESULT_TITLE_LINK_SEL: Selector = Selector::parse(".details .title a").unwrap();
    static ref ANCHOR_SEL: Selector = Selector::parse("a").unwrap();
    static ref IMG_SEL: Selector = Selector::parse("img").unwrap();
    static ref PARA_SEL: Selector = Selector::parse("p").unwrap();
    static ref CARD_TITLE_LINK_SEL: Selector = Selector::parse("h2.Title a").unwrap();
}

/// 一种已知列表布局的抽取策略
///
/// 每个策略是一个纯函数，独立可测。上游改版时在表里换策略，
/// "第一个出结果的策略胜出"的语义不能动。
struct ListingStrategy {
    name: &'static str,
    run: fn(&Html, &UpstreamHost) -> Vec<MovieSummary>,
}

/// 按经验可靠度排序的策略表
static STRATEGIES: &[ListingStrategy] = &[
    ListingStrategy {
        name: "recent-grid",
        run: extract_recent_grid,
    },
    ListingStrategy {
        name: "article-cards",
        run: extract_article_cards,
    },
    ListingStrategy {
        name: "search-results",
        run: extract_search_results,
    },
];

/// 解析列表页为摘要序列
///
/// 依次尝试策略，第一个产出至少一条合格记录的策略胜出，
/// 之后的策略不再执行（短路，不合并）。全部落空返回空表。
pub fn parse_listing(html: &str, host: &UpstreamHost) -> Vec<MovieSummary> {
    let document = Html::parse_document(html);

    for strategy in STRATEGIES {
        let movies = (strategy.run)(&document, host);
        if !movies.is_empty() {
            tracing::debug!("Listing strategy '{}' matched {} entries", strategy.name, movies.len());
            return movies;
        }
    }

    tracing::debug!("No listing strategy matched");
    Vec::new()
}

/// 布局 (a)：`ul.recent-movies li.thumb`
fn extract_recent_grid(document: &Html, host: &UpstreamHost) -> Vec<MovieSummary> {
    let mut seen_paths = HashSet::new();
    document
        .select(&RECENT_GRID_SEL)
        .filter_map(|container| extract_card(container, host, &mut seen_paths))
        .collect()
}

/// 布局 (b)：`article.TPost.B`
fn extract_article_cards(document: &Html, host: &UpstreamHost) -> Vec<MovieSummary> {
    let mut seen_paths = HashSet::new();
    document
        .select(&ARTICLE_CARD_SEL)
        .filter_map(|container| extract_card(container, host, &mut seen_paths))
        .collect()
}

/// 布局 (c)：`.result-item`，标题在链接文本里，图在条目里
fn extract_search_results(document: &Html, host: &UpstreamHost) -> Vec<MovieSummary> {
    let mut seen_paths = HashSet::new();
    let mut movies = Vec::new();

    for item in document.select(&RESULT_ITEM_SEL) {
        let Some(anchor) = item.select(&RESULT_TITLE_LINK_SEL).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(path) = host.normalize_href(href) else {
            continue;
        };

        let title = collect_text(anchor);
        let image_url = item
            .select(&IMG_SEL)
            .next()
            .and_then(|img| img.value().attr("src"))
            .unwrap_or_default()
            .to_string();

        if let Some(movie) = build_summary(&mut seen_paths, title, image_url, path) {
            movies.push(movie);
        }
    }

    movies
}

/// 网格/卡片的公共抽取：第一个锚点给路径，图片给海报和标题
fn extract_card(
    container: ElementRef,
    host: &UpstreamHost,
    seen_paths: &mut HashSet<String>,
) -> Option<MovieSummary> {
    let anchor = container.select(&ANCHOR_SEL).next()?;
    let href = anchor.value().attr("href")?;
    let path = host.normalize_href(href)?;

    let img = container.select(&IMG_SEL).next();
    let image_url = img
        .and_then(|img| img.value().attr("src"))
        .unwrap_or_default()
        .to_string();

    // 标题优先取 alt，落空再取文本节点
    let mut title = img
        .and_then(|img| img.value().attr("alt"))
        .unwrap_or_default()
        .trim()
        .to_string();
    if title.is_empty() {
        title = container
            .select(&PARA_SEL)
            .next()
            .map(collect_text)
            .unwrap_or_default();
    }
    if title.is_empty() {
        title = container
            .select(&CARD_TITLE_LINK_SEL)
            .next()
            .map(collect_text)
            .unwrap_or_default();
    }

    build_summary(seen_paths, title, image_url, path)
}

/// 三个字段齐全、path 不是根、未重复才收录；先出现者胜
fn build_summary(
    seen_paths: &mut HashSet<String>,
    title: String,
    image_url: String,
    path: String,
) -> Option<MovieSummary> {
    if title.is_empty() || image_url.is_empty() || path.is_empty() || path == "/" {
        return None;
    }
    if !seen_paths.insert(path.clone()) {
        return None;
    }

    Some(MovieSummary {
        title,
        image_url,
        path,
    })
}

fn collect_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}
