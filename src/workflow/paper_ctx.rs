//! 试卷处理上下文
//!
//! 封装"我正在处理第几份请求、哪个年级哪个科目"这一信息

use std::fmt::Display;
use std::path::Path;

use crate::models::request::PaperRequest;

/// 试卷处理上下文
#[derive(Debug, Clone)]
pub struct PaperCtx {
    /// 试卷索引（仅用于日志显示，从 1 开始）
    pub paper_index: usize,

    /// 试卷名称（请求文件名，没有文件时使用标题）
    pub paper_name: String,

    pub class_id: String,

    pub subject_id: String,
}

impl PaperCtx {
    pub fn new(paper_index: usize, paper_name: String, class_id: String, subject_id: String) -> Self {
        Self {
            paper_index,
            paper_name,
            class_id,
            subject_id,
        }
    }

    /// 从组卷请求构建上下文
    pub fn from_request(paper_index: usize, request: &PaperRequest) -> Self {
        let paper_name = request
            .file_path
            .as_deref()
            .and_then(|p| Path::new(p).file_stem())
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| request.settings.title.clone());
        Self::new(
            paper_index,
            paper_name,
            request.class_id.clone(),
            request.subject_id.clone(),
        )
    }
}

impl Display for PaperCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[试卷 #{} {} {}/{}]",
            self.paper_index, self.paper_name, self.class_id, self.subject_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_file_or_title() {
        let mut request = PaperRequest {
            class_id: "9th".into(),
            subject_id: "physics".into(),
            ..Default::default()
        };
        let ctx = PaperCtx::from_request(1, &request);
        assert_eq!(ctx.paper_name, "Test Paper");

        request = request.with_file_path("paper_requests/monthly_test.toml".into());
        let ctx = PaperCtx::from_request(2, &request);
        assert_eq!(ctx.paper_name, "monthly_test");
        assert_eq!(ctx.to_string(), "[试卷 #2 monthly_test 9th/physics]");
    }
}
