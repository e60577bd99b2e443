// 抽取管线集成测试
//
// 用完整的页面夹具走一遍 列表 → 详情 → 分类 → 清单重写，
// 验证跨模块的不变量。

use movie_mirror_backend::external::UpstreamHost;
use movie_mirror_backend::services::{
    classify, decode_stream_target, parse_detail, parse_listing, rewrite_manifest,
    STREAM_PROXY_PREFIX,
};
use url::Url;

fn host() -> UpstreamHost {
    UpstreamHost::new("hdhub4u.cologne", vec!["hdhub4u".to_string()])
}

/// 首页夹具：7 个网格条目 + 干扰用的搜索结果布局
fn homepage_fixture() -> String {
    let thumbs: String = (1..=7)
        .map(|i| {
            format!(
                r#"<li class="thumb"><figure><img src="https://img.example/p{i}.jpg" alt="Movie {i}"></figure><a href="/movie-{i}/"><p>Movie {i}</p></a></li>"#
            )
        })
        .collect();

    format!(
        r#"<html><body>
        <ul class="recent-movies">{thumbs}</ul>
        <div class="result-item">
            <img src="https://img.example/decoy.jpg">
            <div class="details"><div class="title"><a href="/decoy/">Decoy</a></div></div>
        </div>
        </body></html>"#
    )
}

fn detail_fixture() -> &'static str {
    r#"<html><body>
    <h1 class="page-title"><span class="material-text">Example Series (Season 1) Hindi</span></h1>
    <div class="post-thumbnail"><figure><img src="https://img.example/poster.jpg"></figure></div>
    <div class="page-body">
        <p><strong>iMDB Rating:</strong> 8.1/10 <a href="https://www.imdb.com/title/tt0903747/">iMDB</a></p>
        <p>Genre: Crime, Thriller | Director: Some Director | Stars: Actor A, Actor B | Language: Hindi</p>
        <p><span><em>A slow descent into the business.</em></span></p>
        <p><a href="https://files.example/pack/complete">Complete Pack 1080p</a>
           <a href="https://hubstream.example/watch/1">Watch Online</a></p>
        <h3>Episode 1-5 | Download Links</h3>
        <p><a href="https://files.example/e/1">480p</a>
           <a href="https://files.example/e/2">720p</a>
           <a href="https://files.example/e/3">1080p</a></p>
        <p><img src="https://img.example/shot1.jpg" class="alignnone">
           <img src="https://img.example/shot2.jpg" class="alignnone">
           <img src="https://img.example/poster.jpg" class="alignnone"></p>
    </div>
    <iframe src="https://www.youtube.com/embed/trailer1"></iframe>
    </body></html>"#
}

#[test]
fn test_homepage_grid_short_circuits_other_strategies() {
    let movies = parse_listing(&homepage_fixture(), &host());

    // 网格策略命中就短路：7 条，decoy 不出现
    assert_eq!(movies.len(), 7);
    assert!(movies.iter().all(|m| m.path != "/decoy/"));
    for (i, movie) in movies.iter().enumerate() {
        assert_eq!(movie.path, format!("/movie-{}/", i + 1));
    }
}

#[test]
fn test_detail_page_end_to_end() {
    let details = parse_detail(detail_fixture(), "/example-series/", &host()).unwrap();

    assert_eq!(details.title, "Example Series (Season 1) Hindi");
    assert_eq!(details.path, "/example-series/");
    assert_eq!(details.image_url, "https://img.example/poster.jpg");
    assert_eq!(details.rating.as_deref(), Some("8.1"));
    assert_eq!(details.imdb_id.as_deref(), Some("tt0903747"));
    assert_eq!(details.category.as_deref(), Some("Crime, Thriller"));
    assert_eq!(details.language.as_deref(), Some("Hindi"));
    assert_eq!(details.trailer.as_ref().unwrap().url, "https://www.youtube.com/embed/trailer1");

    // 截图不含海报
    assert_eq!(details.screenshots.len(), 2);
    assert!(!details.screenshots.contains(&details.image_url));

    // 剧集吃掉的链接必须从扁平表消失（双向互斥）
    let episodes = details.episode_list.as_ref().unwrap();
    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0].title, "Episode 1-5");
    assert_eq!(episodes[0].download_links.len(), 3);

    let episode_urls: Vec<&str> = episodes[0]
        .download_links
        .iter()
        .map(|l| l.url.as_str())
        .collect();
    for link in &details.download_links {
        assert!(!episode_urls.contains(&link.url.as_str()));
    }
    for url in &episode_urls {
        assert!(!details.download_links.iter().any(|l| l.url == *url));
    }

    // 扁平表剩下直链和观看链接
    let flat_urls: Vec<&str> = details.download_links.iter().map(|l| l.url.as_str()).collect();
    assert!(flat_urls.contains(&"https://files.example/pack/complete"));
    assert!(flat_urls.contains(&"https://hubstream.example/watch/1"));
}

#[test]
fn test_classification_of_extracted_links_is_idempotent() {
    let details = parse_detail(detail_fixture(), "/example-series/", &host()).unwrap();

    let first = classify(&details.download_links);
    assert!(first.watch.iter().any(|l| l.url.contains("hubstream")));
    assert!(first.download.iter().any(|l| l.url.contains("files.example")));

    let mut replay = first.watch.clone();
    replay.extend(first.download.clone());
    let second = classify(&replay);

    assert_eq!(first.watch, second.watch);
    assert_eq!(first.download, second.download);
}

#[test]
fn test_manifest_round_trip_through_proxy() {
    let manifest_url = Url::parse("https://cdn.example/path/index.m3u8").unwrap();
    let content = "#EXTM3U\n#EXT-X-VERSION:3\nsegment001.ts\nhttps://other.cdn/seg2.ts\n";

    let rewritten = rewrite_manifest(content, &manifest_url);
    let lines: Vec<&str> = rewritten.lines().collect();

    assert_eq!(lines[0], "#EXTM3U");
    assert_eq!(lines[1], "#EXT-X-VERSION:3");

    // 相对段解析回原始绝对 URL
    let encoded = lines[2].strip_prefix(STREAM_PROXY_PREFIX).unwrap();
    let resolved = decode_stream_target(encoded).unwrap();
    assert_eq!(resolved.as_str(), "https://cdn.example/path/segment001.ts");

    // 绝对段也被包进代理
    let encoded = lines[3].strip_prefix(STREAM_PROXY_PREFIX).unwrap();
    let resolved = decode_stream_target(encoded).unwrap();
    assert_eq!(resolved.as_str(), "https://other.cdn/seg2.ts");
}
