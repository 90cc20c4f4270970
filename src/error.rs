// error.rs：加载选项文件 / 精灵图时的错误
//
// 核心状态机本身从不报错（越界一律夹取），只有 I/O 边界会失败。

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ReelError {
    #[error("failed to read options file {path:?}: {source}")]
    ReadOptions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid reel options: {0}")]
    ParseOptions(#[from] serde_json::Error),

    #[error("failed to open image {path:?}: {source}")]
    OpenImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    DecodeImage(#[from] image::ImageError),
}
