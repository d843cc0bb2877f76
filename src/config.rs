/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 题库根目录（`<根目录>/<年级>/<科目>.json|toml`）
    pub bank_folder: String,
    /// 待处理的组卷请求（TOML）存放目录
    pub request_folder: String,
    /// 导出文件与试卷存储的输出目录
    pub output_folder: String,
    /// 同时处理的试卷数量
    pub max_concurrent_papers: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 随机种子，未设置时使用系统熵
    pub random_seed: Option<u64>,
    /// 保存的试卷记录上限
    pub max_saved_papers: usize,
    // --- 渲染服务配置 ---
    pub renderer_url: Option<String>,
    pub render_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bank_folder: "question_bank".to_string(),
            request_folder: "paper_requests".to_string(),
            output_folder: "output_papers".to_string(),
            max_concurrent_papers: 4,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            random_seed: None,
            max_saved_papers: 50,
            renderer_url: None,
            render_format: "pdf".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            bank_folder: std::env::var("BANK_FOLDER").unwrap_or(default.bank_folder),
            request_folder: std::env::var("REQUEST_FOLDER").unwrap_or(default.request_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            max_concurrent_papers: std::env::var("MAX_CONCURRENT_PAPERS").ok().and_then(|v| v.parse().ok()).filter(|n: &usize| *n > 0).unwrap_or(default.max_concurrent_papers),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            random_seed: std::env::var("RANDOM_SEED").ok().and_then(|v| v.parse().ok()).or(default.random_seed),
            max_saved_papers: std::env::var("MAX_SAVED_PAPERS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_saved_papers),
            renderer_url: std::env::var("RENDERER_URL").ok().filter(|v| !v.trim().is_empty()).or(default.renderer_url),
            render_format: std::env::var("RENDER_FORMAT").unwrap_or(default.render_format),
        }
    }
}
