use base64::Engine;
use url::Url;

/// 代理自己的流端点前缀，重写后的行都从这里再进来
pub const STREAM_PROXY_PREFIX: &str = "/api/proxy/stream/";

/// 判定目标是否按清单（分段播放列表）模式处理
///
/// 看 URL 路径后缀或上游声明的内容类型，不嗅探响应体。
pub fn is_manifest_request(url: &Url, content_type: Option<&str>) -> bool {
    if url.path().to_lowercase().ends_with(".m3u8") {
        return true;
    }
    matches!(content_type, Some(ct) if ct.to_lowercase().contains("mpegurl"))
}

/// 重写清单，让每一段后续抓取都经过代理
///
/// 注释行（# 开头）和空行原样通过。其余行解析成绝对 URL
/// （相对行按清单自身的基路径解析）再包进代理前缀——绝对行
/// 也包，规则是"还没在代理下"，不是"已是绝对 URL"。
/// 解析不动的行原样放行。
pub fn rewrite_manifest(content: &str, manifest_url: &Url) -> String {
    let mut result = String::new();

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(STREAM_PROXY_PREFIX)
        {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        match manifest_url.join(trimmed) {
            Ok(absolute) => {
                result.push_str(STREAM_PROXY_PREFIX);
                result.push_str(&urlencoding::encode(absolute.as_str()));
            }
            Err(e) => {
                tracing::warn!("Manifest line not resolvable ({}): {}", e, trimmed);
                result.push_str(line);
            }
        }
        result.push('\n');
    }

    result
}

/// 解码流代理的路径参数
///
/// 调用方用百分号编码（或播放器变体的 base64）包一个绝对 URL；
/// 解不出来返回 None，由 HTTP 层答 400。
pub fn decode_stream_target(raw: &str) -> Option<Url> {
    let candidate = raw.trim();

    // 路由层通常已经解开百分号编码
    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        return Url::parse(candidate).ok();
    }

    // 双重编码的情况
    if let Ok(decoded) = urlencoding::decode(candidate) {
        if decoded.starts_with("http://") || decoded.starts_with("https://") {
            return Url::parse(&decoded).ok();
        }
    }

    // base64 变体（补位符去掉后按无补位解码，两种字母表都试）
    for engine in [
        &base64::engine::general_purpose::URL_SAFE_NO_PAD,
        &base64::engine::general_purpose::STANDARD_NO_PAD,
    ] {
        if let Ok(bytes) = engine.decode(candidate.trim_end_matches('=')) {
            if let Ok(decoded) = String::from_utf8(bytes) {
                if decoded.starts_with("http://") || decoded.starts_with("https://") {
                    return Url::parse(&decoded).ok();
                }
            }
        }
    }

    None
}
