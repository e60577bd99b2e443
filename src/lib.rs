// 电影镜像后端库
//
// 本库提供镜像上游影视目录站的核心功能，包括：
// - API 路由
// - 上游抓取与缓存
// - HTML 抽取引擎（列表/详情/链接分类）
// - 流媒体清单重写与页面清洗代理

pub mod api;
pub mod external;
pub mod models;
pub mod services;
