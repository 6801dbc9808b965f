//! 原生 Web API 封装模块
//!
//! 对浏览器 API 的轻量封装，并把它们接到核心库的传输与存储接口上。

pub mod console;
pub mod google;
mod http;
pub mod router;
mod storage;
mod timer;

pub use http::BrowserHttpClient;
pub use storage::BrowserStorage;
pub use timer::Interval;
