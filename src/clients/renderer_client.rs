/// 渲染服务客户端
///
/// 把导出数据交给外部 PDF/DOCX 渲染服务
use crate::config::Config;
use crate::error::{AppError, AppResult, ExportError};
use crate::models::paper::ExportPayload;
use std::time::Duration;
use tracing::{debug, info};

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    Pdf,
    Docx,
}

impl RenderFormat {
    /// 解析格式名称，无法识别时使用 PDF
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "docx" | "word" => RenderFormat::Docx,
            _ => RenderFormat::Pdf,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            RenderFormat::Pdf => "pdf",
            RenderFormat::Docx => "docx",
        }
    }

    fn endpoint_path(self) -> &'static str {
        match self {
            RenderFormat::Pdf => "/api/generate-pdf",
            RenderFormat::Docx => "/api/generate-docx",
        }
    }
}

/// 渲染服务客户端
pub struct RendererClient {
    base_url: String,
    format: RenderFormat,
    http: reqwest::Client,
}

impl RendererClient {
    /// 根据配置创建客户端，未配置渲染服务地址时返回 `None`
    pub fn from_config(config: &Config) -> AppResult<Option<Self>> {
        match config.renderer_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(Some(Self::new(
                url,
                RenderFormat::parse(&config.render_format),
            )?)),
            _ => Ok(None),
        }
    }

    pub fn new(base_url: &str, format: RenderFormat) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| AppError::render_request_failed(base_url, e))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            format,
            http,
        })
    }

    pub fn format(&self) -> RenderFormat {
        self.format
    }

    /// 完整的请求地址
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.format.endpoint_path())
    }

    /// 发送导出数据，返回渲染好的文件内容
    ///
    /// # 参数
    /// - `payload`: 导出数据
    ///
    /// # 返回
    /// 成功时返回文件字节；非 2xx 响应返回 `ExportError::BadResponse`
    pub async fn render(&self, payload: &ExportPayload) -> AppResult<Vec<u8>> {
        let endpoint = self.endpoint();
        info!("🖨️ 正在请求渲染服务: {}", endpoint);
        debug!(
            "导出数据: {} 道选择题, {} 道简答题, {} 道论述题",
            payload.mcqs.len(),
            payload.shorts.len(),
            payload.longs.len()
        );

        let response = self
            .http
            .post(&endpoint)
            .header("Accept", "application/octet-stream")
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::render_request_failed(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExportError::BadResponse {
                endpoint,
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::render_request_failed(&endpoint, e))?;
        info!("✓ 渲染完成，文件大小: {} 字节", bytes.len());
        Ok(bytes.to_vec())
    }
}
