use serde::Serialize;

use crate::models::DownloadLink;

/// 已知流媒体主机的 URL 子串
///
/// 命中任意一个就归入"观看"类；列表跟着上游生态走。
const STREAM_URL_MARKERS: &[&str] = &[
    "hdstream4u",
    "hubstream",
    "hubcloud",
    "streamtape",
    "filemoon",
    "vidoza",
    ".m3u8",
];

/// 观看/下载分类结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedLinks {
    pub watch: Vec<DownloadLink>,
    pub download: Vec<DownloadLink>,
}

/// 把链接分成观看和下载两类
///
/// 纯的、保序的划分：标签含 "watch"（大小写不敏感）或 URL
/// 命中已知流媒体主机子串的是观看链接，其余是下载链接。
/// 不丢弃也不合并任何条目（去重在抽取阶段已完成）。
pub fn classify(links: &[DownloadLink]) -> ClassifiedLinks {
    let mut watch = Vec::new();
    let mut download = Vec::new();

    for link in links {
        if is_watch_link(link) {
            watch.push(link.clone());
        } else {
            download.push(link.clone());
        }
    }

    ClassifiedLinks { watch, download }
}

fn is_watch_link(link: &DownloadLink) -> bool {
    if link.title.to_lowercase().contains("watch") {
        return true;
    }
    let url = link.url.to_lowercase();
    STREAM_URL_MARKERS.iter().any(|marker| url.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn link(title: &str, url: &str) -> DownloadLink {
        DownloadLink::new(title, url)
    }

    #[test]
    fn test_partition_by_label_and_host() {
        let links = vec![
            link("Watch Online", "https://files.example/f/1"),
            link("1080p x264", "https://files.example/f/2"),
            link("Stream", "https://hdstream4u.com/v/3"),
            link("720p HEVC", "https://files.example/f/4"),
        ];

        let classified = classify(&links);
        assert_eq!(classified.watch.len(), 2);
        assert_eq!(classified.download.len(), 2);
        // 保序
        assert_eq!(classified.watch[0].url, "https://files.example/f/1");
        assert_eq!(classified.watch[1].url, "https://hdstream4u.com/v/3");
        assert_eq!(classified.download[0].url, "https://files.example/f/2");
        assert_eq!(classified.download[1].url, "https://files.example/f/4");
    }

    #[test]
    fn test_nothing_dropped_or_merged() {
        let links = vec![
            link("WATCH HERE", "https://files.example/a"),
            link("WATCH HERE", "https://files.example/a"),
        ];
        let classified = classify(&links);
        assert_eq!(classified.watch.len() + classified.download.len(), 2);
    }

    #[test]
    fn test_reclassification_is_idempotent() {
        let links = vec![
            link("Watch Online", "https://files.example/f/1"),
            link("1080p", "https://files.example/f/2"),
            link("Episode 1", "https://vidoza.net/e/9"),
        ];

        let first = classify(&links);

        // 把第一次的结果重新串起来再分一次，划分必须一致
        let mut replay: Vec<DownloadLink> = first.watch.clone();
        replay.extend(first.download.clone());
        let second = classify(&replay);

        assert_eq!(first.watch, second.watch);
        assert_eq!(first.download, second.download);
    }

    proptest! {
        #[test]
        fn prop_classification_preserves_every_link(
            titles in proptest::collection::vec("[a-zA-Z0-9 ]{0,12}", 0..8),
        ) {
            let links: Vec<DownloadLink> = titles
                .iter()
                .enumerate()
                .map(|(i, t)| link(t, &format!("https://files.example/f/{i}")))
                .collect();

            let classified = classify(&links);
            prop_assert_eq!(classified.watch.len() + classified.download.len(), links.len());
        }

        #[test]
        fn prop_classifying_a_class_is_stable(
            titles in proptest::collection::vec("[a-zA-Z ]{0,16}", 0..8),
        ) {
            let links: Vec<DownloadLink> = titles
                .iter()
                .enumerate()
                .map(|(i, t)| link(t, &format!("https://hdstream4u.com/v/{i}")))
                .collect();

            let classified = classify(&links);
            // 已分类的子集再分一次不会改变归属
            let rewatch = classify(&classified.watch);
            prop_assert!(rewatch.download.is_empty());
            prop_assert_eq!(rewatch.watch, classified.watch);
        }
    }
}
