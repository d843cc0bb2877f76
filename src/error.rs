//! 应用程序错误类型
//!
//! 组卷核心（抽样、过滤、合并、统计）是全函数，不会返回错误；
//! 这里的错误只来自外围：题库文件读取、试卷存储、导出与渲染、配置。

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 题库加载错误
    #[error("题库错误: {0}")]
    Bank(#[from] BankError),
    /// 试卷存储错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
    /// 导出/渲染错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 题库加载错误
#[derive(Debug, Error)]
pub enum BankError {
    /// 题库目录不存在
    #[error("题库目录不存在: {path}")]
    DirectoryNotFound { path: String },
    /// 科目文件不存在
    #[error("科目文件不存在: {class_id}/{subject_id}")]
    SubjectNotFound { class_id: String, subject_id: String },
    /// 读取文件失败
    #[error("读取题库文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 解析失败
    #[error("题库 JSON 解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// TOML 解析失败
    #[error("题库 TOML 解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 试卷存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 读取存储文件失败
    #[error("读取试卷存储失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入存储文件失败
    #[error("写入试卷存储失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 存储内容损坏
    #[error("试卷存储内容无法解析 ({path}): {source}")]
    Corrupted {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 导出/渲染错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 序列化导出数据失败
    #[error("导出数据序列化失败: {0}")]
    SerializeFailed(#[from] serde_json::Error),
    /// 写出导出文件失败
    #[error("写入导出文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 渲染服务请求失败
    #[error("渲染服务请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 渲染服务返回错误状态
    #[error("渲染服务返回错误响应 ({endpoint}): HTTP {status}: {body}")]
    BadResponse {
        endpoint: String,
        status: u16,
        body: String,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 试卷请求文件无效
    #[error("试卷请求文件无效 ({path}): {reason}")]
    InvalidRequest { path: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建题库文件读取错误
    pub fn bank_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Bank(BankError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建存储写入错误
    pub fn storage_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Storage(StorageError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建渲染请求错误
    pub fn render_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Export(ExportError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
