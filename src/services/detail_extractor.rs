use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::external::upstream::UpstreamHost;
use crate::models::{DownloadLink, Episode, MovieDetails, Trailer};

lazy_static! {
    // 标题定位器，按模板出现频率排序；全部落空即视为"未找到"
    static ref TITLE_SELECTORS: Vec<Selector> = [
        "h1.page-title .material-text",
        "h1.Title",
        ".kno-ecr-pt",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect();

    // 海报定位器
    static ref IMAGE_SELECTORS: Vec<Selector> = [
        "div.Image figure img",
        "div.post-thumbnail figure img",
        "p > img.aligncenter",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect();

    // 元数据信息块：不同模板把同一字段放在不同容器里，逐个扫
    static ref INFO_CONTAINER_SEL: Selector = Selector::parse(
        ".kp-hc .mod, .tec-info, .page-body > div, .page-body > p, .page-body span, .yQ8hqd.ksSzJd.w6Utff, div.entry.clearfix"
    )
    .unwrap();

    // 正文区的候选下载锚点
    static ref CONTENT_LINK_SEL: Selector = Selector::parse(concat!(
        ".page-body p a, .entry-content p a, .entry-content em a, ",
        ".page-body h2 a, .page-body h3 a, .page-body h4 a, .page-body h5 a, ",
        ".entry-content h2 a, .entry-content h3 a, .entry-content h4 a, .entry-content h5 a, ",
        "div[style*=\"text-align: center;\"] a"
    ))
    .unwrap();

    // 剧集标题候选
    static ref EPISODE_HEADER_SEL: Selector =
        Selector::parse(".entry-content h2, .entry-content h3, .page-body h2, .page-body h3").unwrap();

    // 截图候选
    static ref SCREENSHOT_SEL: Selector = Selector::parse(concat!(
        "img.alignnone, .entry-content img.alignnone, .page-body img.alignnone, ",
        ".page-body p img, .entry-content p img, ",
        ".page-body .aligncenter, .entry-content .aligncenter"
    ))
    .unwrap();

    static ref IMDB_LINK_SEL: Selector = Selector::parse("a[href*=\"imdb.com/title/\"]").unwrap();
    static ref PAGE_META_DATE_SEL: Selector = Selector::parse(".page-meta em.material-text").unwrap();
    static ref PAGE_META_CATEGORY_SEL: Selector =
        Selector::parse(".page-meta a[href*=\"/category/\"], .page-meta a[href*=\"/genre/\"]").unwrap();
    static ref HEADING_SEL: Selector = Selector::parse("h2").unwrap();
    static ref PAGE_BODY_PARA_SEL: Selector = Selector::parse("div.page-body > p").unwrap();
    static ref IFRAME_SEL: Selector = Selector::parse("iframe").unwrap();
    static ref ANCHOR_SEL: Selector = Selector::parse("a").unwrap();
    static ref IMG_SEL: Selector = Selector::parse("img").unwrap();

    static ref RATING_RE: Regex = Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*/\s*10").unwrap();
    static ref IMDB_ID_RE: Regex = Regex::new(r"title/(tt[0-9]+)").unwrap();
    static ref GENRE_RE: Regex = Regex::new(r"(?i)genres?:\s*([^|\n]+)").unwrap();
    static ref DIRECTOR_RE: Regex = Regex::new(r"(?i)directors?:\s*([^|\n]+)").unwrap();
    static ref STARS_RE: Regex = Regex::new(r"(?i)stars?:\s*([^|\n]+)").unwrap();
    static ref LANGUAGE_RE: Regex = Regex::new(r"(?i)language:\s*([^|\n]+)").unwrap();
    static ref RELEASE_DATE_RE: Regex = Regex::new(r"(?i)release date:\s*([^|\n]+)").unwrap();
    static ref TRAILING_DOWNLOAD_LINKS_RE: Regex = Regex::new(r"(?i)download links").unwrap();

    // 描述定位器，第一个取到非空文本的胜出
    static ref DESCRIPTION_LOCATORS: Vec<DescriptionLocator> = vec![
        DescriptionLocator::Css(Selector::parse("div.kno-rdesc > div > span").unwrap()),
        DescriptionLocator::Css(Selector::parse("div.Description p").unwrap()),
        DescriptionLocator::AfterHeading("storyline"),
        DescriptionLocator::Css(Selector::parse(".PZPZlf.hb8SAc .kno-rdesc").unwrap()),
        DescriptionLocator::Css(Selector::parse("div.page-body > p > span > em").unwrap()),
        DescriptionLocator::AfterParagraph("description:"),
        DescriptionLocator::Css(Selector::parse("div.kno-rdesc").unwrap()),
        DescriptionLocator::Css(Selector::parse("div.page-body > p").unwrap()),
    ];

    // 元数据字段规则表：标签子串决定容器是否命中，正则取值
    static ref META_RULES: Vec<MetaRule> = vec![
        MetaRule {
            label: "genre",
            key: MetaKey::Category,
            extract: extract_category,
        },
        MetaRule {
            label: "director",
            key: MetaKey::Director,
            extract: extract_director,
        },
        MetaRule {
            label: "star",
            key: MetaKey::Stars,
            extract: extract_stars,
        },
        MetaRule {
            label: "language",
            key: MetaKey::Language,
            extract: extract_language,
        },
        MetaRule {
            label: "release date",
            key: MetaKey::ReleaseDate,
            extract: extract_release_date,
        },
    ];
}

/// 已知视频嵌入站，预告片 iframe 只认这些
const EMBED_HOSTS: &[&str] = &[
    "youtube.com",
    "youtube-nocookie.com",
    "youtu.be",
    "player.vimeo.com",
    "dailymotion.com",
];

enum DescriptionLocator {
    /// 普通 CSS 定位，取第一个匹配的文本
    Css(Selector),
    /// 文本含标记的 h2 后面的兄弟元素
    AfterHeading(&'static str),
    /// 文本含标记的正文段落后面的段落
    AfterParagraph(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MetaKey {
    Category,
    Director,
    Stars,
    Language,
    ReleaseDate,
}

struct MetaRule {
    label: &'static str,
    key: MetaKey,
    extract: fn(&str) -> Option<String>,
}

/// 元数据字段集合，每个字段独立定胜负：先命中的容器赢
#[derive(Debug, Default)]
struct MetaFields {
    category: Option<String>,
    rating: Option<String>,
    director: Option<String>,
    stars: Option<String>,
    language: Option<String>,
    release_date: Option<String>,
    imdb_url: Option<String>,
}

impl MetaFields {
    fn is_set(&self, key: MetaKey) -> bool {
        match key {
            MetaKey::Category => self.category.is_some(),
            MetaKey::Director => self.director.is_some(),
            MetaKey::Stars => self.stars.is_some(),
            MetaKey::Language => self.language.is_some(),
            MetaKey::ReleaseDate => self.release_date.is_some(),
        }
    }

    fn set(&mut self, key: MetaKey, value: String) {
        let slot = match key {
            MetaKey::Category => &mut self.category,
            MetaKey::Director => &mut self.director,
            MetaKey::Stars => &mut self.stars,
            MetaKey::Language => &mut self.language,
            MetaKey::ReleaseDate => &mut self.release_date,
        };
        *slot = Some(value);
    }
}

/// 解析详情页
///
/// 只有所有标题定位器都落空才返回 None（"未找到"）；
/// 有标题但其他字段稀疏仍算"找到"。每个字段走自己的级联，
/// 单个候选 URL 解析失败只丢那一个候选，解析继续。
pub fn parse_detail(html: &str, path: &str, host: &UpstreamHost) -> Option<MovieDetails> {
    let document = Html::parse_document(html);

    let title = locate_title(&document)?;
    let image_url = locate_image(&document);
    let description = locate_description(&document);
    let meta = scan_info_blocks(&document);

    let mut download_links = harvest_download_links(&document, host);
    let (episode_list, episode_urls) = harvest_episodes(&document);

    // 集合减法：被剧集占有的链接从扁平表剔除，剧集所有权优先
    download_links.retain(|link| !episode_urls.contains(&link.url));

    let screenshots = harvest_screenshots(&document, &image_url);
    let trailer = locate_trailer(&document);

    let imdb_id = meta
        .imdb_url
        .as_deref()
        .and_then(|url| IMDB_ID_RE.captures(url))
        .map(|caps| caps[1].to_string());

    Some(MovieDetails {
        title,
        image_url,
        path: path.to_string(),
        description,
        category: meta.category,
        rating: meta.rating,
        language: meta.language,
        director: meta.director,
        stars: meta.stars,
        release_date: meta.release_date,
        imdb_id,
        imdb_url: meta.imdb_url,
        trailer,
        screenshots,
        download_links,
        episode_list: if episode_list.is_empty() {
            None
        } else {
            Some(episode_list)
        },
    })
}

/// 标题级联：第一个取到非空文本的选择器胜出
fn locate_title(document: &Html) -> Option<String> {
    for selector in TITLE_SELECTORS.iter() {
        if let Some(el) = document.select(selector).find(|el| !in_code_block(*el)) {
            let text = collect_text(el);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn locate_image(document: &Html) -> String {
    for selector in IMAGE_SELECTORS.iter() {
        if let Some(src) = document
            .select(selector)
            .find(|el| !in_code_block(*el))
            .and_then(|el| el.value().attr("src"))
        {
            if !src.is_empty() {
                return src.to_string();
            }
        }
    }
    String::new()
}

fn locate_description(document: &Html) -> String {
    for locator in DESCRIPTION_LOCATORS.iter() {
        let found = match locator {
            DescriptionLocator::Css(selector) => document
                .select(selector)
                .find(|el| !in_code_block(*el))
                .map(collect_text),
            DescriptionLocator::AfterHeading(marker) => document
                .select(&HEADING_SEL)
                .find(|h| collect_text(*h).to_lowercase().contains(marker))
                .and_then(next_element_sibling)
                .map(collect_text),
            DescriptionLocator::AfterParagraph(marker) => document
                .select(&PAGE_BODY_PARA_SEL)
                .find(|p| collect_text(*p).to_lowercase().contains(marker))
                .and_then(next_element_sibling)
                .map(collect_text),
        };

        if let Some(text) = found {
            if !text.is_empty() {
                return text;
            }
        }
    }

    "No description available.".to_string()
}

/// 扫信息块填元数据
///
/// 标签匹配是大小写不敏感的子串匹配，不是精确解析——
/// 上游模板里标签的大小写和标点并不稳定。
fn scan_info_blocks(document: &Html) -> MetaFields {
    let mut meta = MetaFields::default();

    for container in document.select(&INFO_CONTAINER_SEL) {
        if in_code_block(container) {
            continue;
        }

        let text = collect_text(container);
        let lower = text.to_lowercase();

        // 评分和 IMDb 链接互为补充来源
        if meta.rating.is_none() && lower.contains("imdb rating") {
            if let Some(rating) = extract_rating(&text) {
                meta.rating = Some(rating);
            }
        }
        if meta.imdb_url.is_none() {
            if let Some(link) = container.select(&IMDB_LINK_SEL).next() {
                if let Some(href) = link.value().attr("href") {
                    meta.imdb_url = Some(href.to_string());
                    if meta.rating.is_none() {
                        meta.rating = extract_rating(&collect_text(link));
                    }
                }
            }
        }

        for rule in META_RULES.iter() {
            if meta.is_set(rule.key) || !lower.contains(rule.label) {
                continue;
            }
            if let Some(value) = (rule.extract)(&text) {
                meta.set(rule.key, value);
            }
        }
    }

    // .page-meta 兜底：日期图标旁的文本、分类锚点
    if meta.release_date.is_none() {
        if let Some(em) = document.select(&PAGE_META_DATE_SEL).next() {
            let text = collect_text(em);
            if !text.is_empty() {
                meta.release_date = Some(text);
            }
        }
    }
    if meta.category.is_none() {
        let categories: Vec<String> = document
            .select(&PAGE_META_CATEGORY_SEL)
            .map(collect_text)
            .filter(|t| !t.is_empty())
            .collect();
        if !categories.is_empty() {
            meta.category = Some(categories.join(", "));
        }
    }

    meta
}

/// 只取数字部分，上限 10
fn extract_rating(text: &str) -> Option<String> {
    let caps = RATING_RE.captures(text)?;
    let numeral = caps[1].to_string();
    let value: f64 = numeral.parse().ok()?;
    if value <= 10.0 {
        Some(numeral)
    } else {
        None
    }
}

fn extract_category(text: &str) -> Option<String> {
    let caps = GENRE_RE.captures(text)?;
    let parts: Vec<String> = caps[1]
        .split(&['|', ','][..])
        .map(|part| part.trim().to_string())
        .filter(|part| {
            let lower = part.to_lowercase();
            !part.is_empty() && !lower.contains("director") && !lower.contains("stars")
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

fn extract_director(text: &str) -> Option<String> {
    let caps = DIRECTOR_RE.captures(text)?;
    non_empty(cut_at(&caps[1], &["stars:", "language:"]))
}

fn extract_stars(text: &str) -> Option<String> {
    let caps = STARS_RE.captures(text)?;
    non_empty(cut_at(&caps[1], &["director:", "language:"]))
}

fn extract_language(text: &str) -> Option<String> {
    let caps = LANGUAGE_RE.captures(text)?;
    non_empty(cut_at(&caps[1], &["quality:"]))
}

fn extract_release_date(text: &str) -> Option<String> {
    let caps = RELEASE_DATE_RE.captures(text)?;
    non_empty(cut_at(&caps[1], &[]))
}

/// 在任一标记（大小写不敏感）处截断取值
fn cut_at(value: &str, markers: &[&str]) -> String {
    let lower = value.to_lowercase();
    let mut end = value.len();
    for marker in markers {
        if let Some(pos) = lower.find(marker) {
            end = end.min(pos);
        }
    }
    value[..end].trim().to_string()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// 正文区直链收集
///
/// 只收：绝对 URL、异主机、本轮未见过、不是下载教程、
/// 文本有意义（长度 > 2 且不是 here/sample）。
fn harvest_download_links(document: &Html, host: &UpstreamHost) -> Vec<DownloadLink> {
    let mut seen_urls = HashSet::new();
    let mut links = Vec::new();

    for anchor in document.select(&CONTENT_LINK_SEL) {
        if in_code_block(anchor) {
            continue;
        }
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href.starts_with("http") || href.contains("/how-to-download") {
            continue;
        }
        // 解析失败只丢这一个候选
        let Ok(parsed) = Url::parse(href) else {
            continue;
        };
        let Some(link_host) = parsed.host_str() else {
            continue;
        };
        if host.matches(link_host) {
            continue;
        }
        if seen_urls.contains(href) {
            continue;
        }

        let text = collect_text(anchor);
        let lower = text.to_lowercase();
        if text.chars().count() > 2 && lower != "here" && lower != "sample" {
            seen_urls.insert(href.to_string());
            links.push(DownloadLink::new(text, href));
        }
    }

    links
}

/// 剧集分组
///
/// 返回剧集表和被剧集占有的 URL 集合（供扁平表做减法）。
/// 合格标题：文本提到 episode/season（不含下载教程），且标题内
/// 或到下一个标题之间的兄弟里有锚点。链接三级回退：标题内 →
/// 到下一个 h2/h3/hr 的兄弟段 → 所有后续兄弟，取第一个非空层。
fn harvest_episodes(document: &Html) -> (Vec<Episode>, HashSet<String>) {
    let mut episodes = Vec::new();
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut sequence: u32 = 0;

    for header in document.select(&EPISODE_HEADER_SEL) {
        if in_code_block(header) {
            continue;
        }

        let text_lower = collect_text(header).to_lowercase();
        if text_lower.contains("how to download") {
            continue;
        }
        if !text_lower.contains("episode") && !text_lower.contains("season") {
            continue;
        }

        let header_anchors: Vec<ElementRef> = header.select(&ANCHOR_SEL).collect();
        let run_anchors = sibling_anchors(header, SiblingScan::UntilNextHeader);
        if header_anchors.is_empty() && run_anchors.is_empty() {
            continue;
        }

        // 合格标题消耗一个序号，即使它的链接之后全被去重掉
        sequence += 1;

        let anchors = if !header_anchors.is_empty() {
            header_anchors
        } else {
            let harvested = sibling_anchors(header, SiblingScan::UntilHeaderOrRule);
            if harvested.is_empty() {
                sibling_anchors(header, SiblingScan::AllLaterSiblings)
            } else {
                harvested
            }
        };

        let mut links = Vec::new();
        for anchor in anchors {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let text = collect_text(anchor);
            if !href.starts_with("http") || text.is_empty() {
                continue;
            }
            if !seen_urls.insert(href.to_string()) {
                continue;
            }
            links.push(DownloadLink::new(text, href));
        }

        if !links.is_empty() {
            episodes.push(Episode {
                number: sequence,
                title: episode_title(header).unwrap_or_else(|| format!("Part {}", sequence)),
                download_links: links,
            });
        }
    }

    (episodes, seen_urls)
}

#[derive(Clone, Copy)]
enum SiblingScan {
    /// 到下一个 h2/h3 为止（合格性判定用）
    UntilNextHeader,
    /// 到下一个 h2/h3/hr 为止（第二层收集用）
    UntilHeaderOrRule,
    /// 所有后续兄弟（第三层兜底）
    AllLaterSiblings,
}

fn sibling_anchors<'a>(header: ElementRef<'a>, scan: SiblingScan) -> Vec<ElementRef<'a>> {
    let mut anchors = Vec::new();

    for node in header.next_siblings() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        let name = el.value().name();
        let stop = match scan {
            SiblingScan::UntilNextHeader => name == "h2" || name == "h3",
            SiblingScan::UntilHeaderOrRule => name == "h2" || name == "h3" || name == "hr",
            SiblingScan::AllLaterSiblings => false,
        };
        if stop {
            break;
        }

        if name == "a" {
            anchors.push(el);
        }
        anchors.extend(el.select(&ANCHOR_SEL));
    }

    anchors
}

/// 剧集标题：标题自身的文本节点在第一个分隔符处截断，
/// 去掉 "Download Links" 尾巴；剩不下东西由调用方回退 "Part N"
fn episode_title(header: ElementRef) -> Option<String> {
    let direct: String = header
        .children()
        .filter_map(|node| node.value().as_text().map(|t| t.to_string()))
        .collect();

    let before_separator = direct
        .split(&['|', ':', '–'][..])
        .next()
        .unwrap_or("")
        .to_string();
    let cleaned = TRAILING_DOWNLOAD_LINKS_RE
        .replace(&before_separator, "")
        .trim()
        .to_string();

    non_empty(cleaned)
}

/// 截图收集：固定选择器并集 + "Screen-Shots" 标题后的图片段，
/// 每个 URL 只留第一次出现，海报除外
fn harvest_screenshots(document: &Html, poster_url: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut screenshots = Vec::new();

    let mut push = |src: &str| {
        if !src.is_empty() && src != poster_url && seen.insert(src.to_string()) {
            screenshots.push(src.to_string());
        }
    };

    for img in document.select(&SCREENSHOT_SEL) {
        if in_code_block(img) {
            continue;
        }
        if let Some(src) = img.value().attr("src") {
            push(src);
        }
    }

    // "Screen-Shots" 标题之后的兄弟段里的图片
    if let Some(heading) = document
        .select(&HEADING_SEL)
        .find(|h| collect_text(*h).to_lowercase().contains("screen-shots"))
    {
        for node in heading.next_siblings() {
            let Some(el) = ElementRef::wrap(node) else {
                continue;
            };
            if el.value().name() == "h2" {
                break;
            }
            for img in el.select(&IMG_SEL) {
                if let Some(src) = img.value().attr("src") {
                    push(src);
                }
            }
        }
    }

    screenshots
}

/// 第一个来自已知嵌入站的 iframe 算预告片
fn locate_trailer(document: &Html) -> Option<Trailer> {
    for iframe in document.select(&IFRAME_SEL) {
        let Some(src) = iframe.value().attr("src") else {
            continue;
        };
        let Ok(parsed) = Url::parse(src) else {
            continue;
        };
        let Some(host) = parsed.host_str() else {
            continue;
        };
        if EMBED_HOSTS
            .iter()
            .any(|embed| host == *embed || host.ends_with(&format!(".{}", embed)))
        {
            return Some(Trailer {
                url: src.to_string(),
            });
        }
    }
    None
}

fn collect_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn next_element_sibling(el: ElementRef) -> Option<ElementRef> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// 广告代码块里的内容一律不参与抽取
fn in_code_block(el: ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().classes().any(|c| c == "code-block"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> UpstreamHost {
        UpstreamHost::new("hdhub4u.cologne", vec!["hdhub4u".to_string()])
    }

    fn parse(html: &str) -> Option<MovieDetails> {
        parse_detail(html, "/some-movie/", &host())
    }

    fn page(body: &str) -> String {
        format!(
            r#"<html><body><h1 class="page-title"><span class="material-text">Some Movie (2024)</span></h1>{body}</body></html>"#
        )
    }

    #[test]
    fn test_missing_title_means_not_found() {
        // 标题是存在谓词：所有定位器落空 → None，哪怕正文很丰富
        let html = r#"<html><body><div class="page-body"><p>Plenty of text</p>
            <p><a href="https://files.example/f/1">1080p</a></p></div></body></html>"#;
        assert!(parse(html).is_none());
    }

    #[test]
    fn test_title_alone_is_still_found() {
        let details = parse(&page("")).unwrap();
        assert_eq!(details.title, "Some Movie (2024)");
        assert_eq!(details.description, "No description available.");
        assert!(details.download_links.is_empty());
        assert!(details.episode_list.is_none());
    }

    #[test]
    fn test_title_cascade_falls_back() {
        let html = r#"<html><body><h1 class="Title">Fallback Title</h1></body></html>"#;
        assert_eq!(parse(html).unwrap().title, "Fallback Title");
    }

    #[test]
    fn test_metadata_label_scanning() {
        let details = parse(&page(
            r#"<div class="page-body">
                <p><strong>iMDB Rating:</strong> 7.9/10 <a href="https://www.imdb.com/title/tt1234567/">link</a></p>
                <p>GENRE: Action, Drama | Director: Jane Doe | Stars: A, B | Language: Hindi | Quality: 1080p</p>
                <p>Release Date: 12 July 2024</p>
            </div>"#,
        ))
        .unwrap();

        assert_eq!(details.rating.as_deref(), Some("7.9"));
        assert_eq!(details.imdb_id.as_deref(), Some("tt1234567"));
        assert_eq!(details.category.as_deref(), Some("Action, Drama"));
        assert_eq!(details.director.as_deref(), Some("Jane Doe"));
        assert_eq!(details.language.as_deref(), Some("Hindi"));
        assert_eq!(details.release_date.as_deref(), Some("12 July 2024"));
    }

    #[test]
    fn test_rating_recovered_from_imdb_link_text() {
        let details = parse(&page(
            r#"<div class="page-body"><p><a href="https://www.imdb.com/title/tt7654321/">8.2/10</a></p></div>"#,
        ))
        .unwrap();

        assert_eq!(details.rating.as_deref(), Some("8.2"));
        assert_eq!(details.imdb_url.as_deref(), Some("https://www.imdb.com/title/tt7654321/"));
    }

    #[test]
    fn test_rating_above_bound_is_rejected() {
        let details = parse(&page(
            r#"<div class="page-body"><p>iMDB Rating: 99/10</p></div>"#,
        ))
        .unwrap();
        assert!(details.rating.is_none());
    }

    #[test]
    fn test_first_container_wins_per_field() {
        let details = parse(&page(
            r#"<div class="page-body">
                <p>Genre: Horror</p>
                <p>Genre: Comedy | Director: Someone Else</p>
            </div>"#,
        ))
        .unwrap();

        // genre 取第一个容器，director 独立地取它命中的第一个容器
        assert_eq!(details.category.as_deref(), Some("Horror"));
        assert_eq!(details.director.as_deref(), Some("Someone Else"));
    }

    #[test]
    fn test_download_link_filtering() {
        let details = parse(&page(
            r#"<div class="page-body">
                <p><a href="https://files.example/f/abc">Download 1080p</a></p>
                <p><a href="https://files.example/f/here">here</a></p>
                <p><a href="https://files.example/f/s">Sample</a></p>
                <p><a href="https://files.example/how-to-download/x">Guide 1080p</a></p>
                <p><a href="https://hdhub4u.cologne/internal/">Internal 720p</a></p>
                <p><a href="/relative/path">Relative 720p</a></p>
                <p><a href="https://files.example/f/abc">Download 1080p duplicate</a></p>
            </div>"#,
        ))
        .unwrap();

        assert_eq!(details.download_links.len(), 1);
        assert_eq!(details.download_links[0].url, "https://files.example/f/abc");
        assert_eq!(details.download_links[0].quality, "Download 1080p");
    }

    #[test]
    fn test_episode_grouping_with_download_links_suffix() {
        // 标题 "Episode 1-5 | Download Links"，链接在下一个段落里
        let details = parse(&page(
            r#"<div class="page-body">
                <h3>Episode 1-5 | Download Links</h3>
                <p>
                    <a href="https://files.example/e/1">480p</a>
                    <a href="https://files.example/e/2">720p</a>
                    <a href="https://files.example/e/3">1080p</a>
                </p>
            </div>"#,
        ))
        .unwrap();

        let episodes = details.episode_list.unwrap();
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].number, 1);
        assert_eq!(episodes[0].title, "Episode 1-5");
        assert_eq!(episodes[0].download_links.len(), 3);
    }

    #[test]
    fn test_episode_links_excluded_from_flat_list() {
        // 剧集链接同时命中泛用选择器，也必须从扁平表里消失
        let details = parse(&page(
            r#"<div class="page-body">
                <p><a href="https://files.example/movie/full">Full Movie 1080p</a></p>
                <h3>Season 1 Episode 1</h3>
                <p><a href="https://files.example/e/1">Episode 1 720p</a></p>
            </div>"#,
        ))
        .unwrap();

        let episodes = details.episode_list.as_ref().unwrap();
        let episode_urls: Vec<&str> = episodes[0]
            .download_links
            .iter()
            .map(|l| l.url.as_str())
            .collect();
        assert_eq!(episode_urls, vec!["https://files.example/e/1"]);

        // 互斥不变量
        for link in &details.download_links {
            assert!(!episode_urls.contains(&link.url.as_str()));
        }
        assert_eq!(details.download_links.len(), 1);
        assert_eq!(details.download_links[0].url, "https://files.example/movie/full");
    }

    #[test]
    fn test_episode_number_follows_document_order() {
        let details = parse(&page(
            r#"<div class="page-body">
                <h3>Episode 1 | Links</h3>
                <p><a href="https://files.example/e/1">720p</a></p>
                <h3>Nothing interesting</h3>
                <h3>Episode 2 | Links</h3>
                <p><a href="https://files.example/e/2">720p</a></p>
            </div>"#,
        ))
        .unwrap();

        let episodes = details.episode_list.unwrap();
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].number, 1);
        assert_eq!(episodes[0].title, "Episode 1");
        assert_eq!(episodes[1].number, 2);
        assert_eq!(episodes[1].title, "Episode 2");
    }

    #[test]
    fn test_header_without_nearby_anchor_does_not_qualify() {
        let details = parse(&page(
            r#"<div class="page-body">
                <h3>Episode guide</h3>
                <p>Text only, no links here.</p>
            </div>"#,
        ))
        .unwrap();
        assert!(details.episode_list.is_none());
    }

    #[test]
    fn test_how_to_download_header_is_ignored() {
        let details = parse(&page(
            r#"<div class="page-body">
                <h3>How To Download Episode Files</h3>
                <p><a href="https://files.example/guide">Guide 1080p</a></p>
            </div>"#,
        ))
        .unwrap();
        assert!(details.episode_list.is_none());
    }

    #[test]
    fn test_empty_episode_title_falls_back_to_part_n() {
        let details = parse(&page(
            r#"<div class="page-body">
                <h3>Season 2: </h3>
                <p><a href="https://files.example/s2/1">720p</a></p>
            </div>"#,
        ))
        .unwrap();

        let episodes = details.episode_list.unwrap();
        assert_eq!(episodes[0].title, "Season 2");

        // 分隔符前什么都不剩时回退 "Part N"
        let details = parse(&page(
            r#"<div class="page-body">
                <h3><span>Season marker</span>| Episode Download Links</h3>
                <p><a href="https://files.example/sx/1">720p</a></p>
            </div>"#,
        ))
        .unwrap();
        // 直接文本以 | 开头，截断后为空
        let episodes = details.episode_list.unwrap();
        assert_eq!(episodes[0].title, "Part 1");
    }

    #[test]
    fn test_screenshots_exclude_poster_and_dedupe() {
        let details = parse(&page(
            r#"<div class="Image"><figure><img src="https://img.example/poster.jpg"></figure></div>
            <div class="page-body">
                <p><img src="https://img.example/shot1.jpg" class="alignnone"></p>
                <p><img src="https://img.example/shot2.jpg"></p>
                <p><img src="https://img.example/shot1.jpg"></p>
                <p><img src="https://img.example/poster.jpg"></p>
            </div>"#,
        ))
        .unwrap();

        assert_eq!(details.image_url, "https://img.example/poster.jpg");
        assert_eq!(
            details.screenshots,
            vec![
                "https://img.example/shot1.jpg".to_string(),
                "https://img.example/shot2.jpg".to_string()
            ]
        );
    }

    #[test]
    fn test_trailer_requires_known_embed_host() {
        let details = parse(&page(
            r#"<iframe src="https://ads.example/frame"></iframe>
               <iframe src="https://www.youtube.com/embed/abc123"></iframe>"#,
        ))
        .unwrap();
        assert_eq!(
            details.trailer.unwrap().url,
            "https://www.youtube.com/embed/abc123"
        );

        let details = parse(&page(r#"<iframe src="https://ads.example/frame"></iframe>"#)).unwrap();
        assert!(details.trailer.is_none());
    }

    #[test]
    fn test_description_cascade() {
        let details = parse(&page(
            r#"<div class="Description"><p>From the description block.</p></div>"#,
        ))
        .unwrap();
        assert_eq!(details.description, "From the description block.");

        // Storyline 标题后的元素
        let details = parse(&page(
            r#"<h2>Storyline:</h2><div>After the heading.</div>"#,
        ))
        .unwrap();
        assert_eq!(details.description, "After the heading.");
    }

    #[test]
    fn test_code_block_content_is_ignored() {
        let details = parse(&page(
            r#"<div class="code-block"><div class="page-body"><p><a href="https://ads.example/f/x">Ad 1080p</a></p></div></div>
               <div class="page-body"><p><a href="https://files.example/f/real">Real 1080p</a></p></div>"#,
        ))
        .unwrap();

        assert_eq!(details.download_links.len(), 1);
        assert_eq!(details.download_links[0].url, "https://files.example/f/real");
    }
}
