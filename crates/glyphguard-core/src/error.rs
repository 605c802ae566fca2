//! 库级错误类型
//!
//! 只有根路径、配置与输出层面的问题会成为错误；单个文件的读取/解码失败
//! 在扫描流程内部吸收，不会出现在这里。
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GlyphError {
    #[error("scan root {} does not exist or is not accessible", .path.display())]
    RootNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("scan root {} cannot be read", .path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("scan root {} is not a directory", .path.display())]
    RootNotDirectory { path: PathBuf },

    #[error("failed to read config file {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config ({origin})")]
    ConfigParse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid codepoint `{input}`: {reason}")]
    InvalidCodepoint { input: String, reason: String },

    #[error("failed to build worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to write report")]
    Report(#[from] io::Error),
}
