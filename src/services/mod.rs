pub mod detail_extractor;
pub mod link_classifier;
pub mod listing_extractor;
pub mod page_cleaner;
pub mod stream_rewriter;

pub use detail_extractor::parse_detail;
pub use link_classifier::{classify, ClassifiedLinks};
pub use listing_extractor::parse_listing;
pub use page_cleaner::{clean_page, ScriptStripMode};
pub use stream_rewriter::{
    decode_stream_target, is_manifest_request, rewrite_manifest, STREAM_PROXY_PREFIX,
};
