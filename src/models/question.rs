use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Mcq,
    Short,
    Long,
}

impl QuestionType {
    /// 组卷时的固定处理顺序
    pub const ALL: [QuestionType; 3] = [QuestionType::Mcq, QuestionType::Short, QuestionType::Long];

    pub fn name(self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::Short => "short",
            QuestionType::Long => "long",
        }
    }

    /// 解析题型（接受单复数和大小写）
    pub fn parse(s: &str) -> Option<Self> {
        QUESTION_TYPE_ALIASES.get(s.trim().to_lowercase().as_str()).copied()
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

static QUESTION_TYPE_ALIASES: phf::Map<&'static str, QuestionType> = phf::phf_map! {
    "mcq" => QuestionType::Mcq,
    "mcqs" => QuestionType::Mcq,
    "short" => QuestionType::Short,
    "shorts" => QuestionType::Short,
    "long" => QuestionType::Long,
    "longs" => QuestionType::Long,
};

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

// 题库数据中的难度可能是大写或拼写不规范，无法识别时按 medium 处理
impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match DifficultyFilter::parse(&raw) {
            DifficultyFilter::Easy => Difficulty::Easy,
            DifficultyFilter::Hard => Difficulty::Hard,
            DifficultyFilter::Medium | DifficultyFilter::All => Difficulty::Medium,
        })
    }
}

/// 难度筛选条件
///
/// `All` 表示不过滤（前端的 "mixed" / "all"）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyFilter {
    #[default]
    All,
    Easy,
    Medium,
    Hard,
}

static DIFFICULTY_ALIASES: phf::Map<&'static str, DifficultyFilter> = phf::phf_map! {
    "all" => DifficultyFilter::All,
    "mixed" => DifficultyFilter::All,
    "any" => DifficultyFilter::All,
    "easy" => DifficultyFilter::Easy,
    "medium" => DifficultyFilter::Medium,
    "hard" => DifficultyFilter::Hard,
};

impl DifficultyFilter {
    /// 解析难度字符串
    ///
    /// 无法识别的值按 `All` 处理，避免旧的持久化偏好导致组卷失败。
    pub fn parse(s: &str) -> Self {
        DIFFICULTY_ALIASES
            .get(s.trim().to_lowercase().as_str())
            .copied()
            .unwrap_or(DifficultyFilter::All)
    }

    pub fn matches(self, difficulty: Difficulty) -> bool {
        match self {
            DifficultyFilter::All => true,
            DifficultyFilter::Easy => difficulty == Difficulty::Easy,
            DifficultyFilter::Medium => difficulty == Difficulty::Medium,
            DifficultyFilter::Hard => difficulty == Difficulty::Hard,
        }
    }
}

impl<'de> Deserialize<'de> for DifficultyFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::parse).unwrap_or_default())
    }
}

impl fmt::Display for DifficultyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DifficultyFilter::All => "mixed",
            DifficultyFilter::Easy => "easy",
            DifficultyFilter::Medium => "medium",
            DifficultyFilter::Hard => "hard",
        };
        write!(f, "{}", name)
    }
}

/// 选择题特有字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqChoice {
    pub options: Vec<String>,
    pub correct_option: usize,
}

impl McqChoice {
    /// 自定义选择题缺少选项时使用的占位选项
    pub fn placeholder() -> Self {
        Self {
            options: ["Option A", "Option B", "Option C", "Option D"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            correct_option: 0,
        }
    }
}

/// 题目
///
/// 三种题型共用同一结构，选择题额外带 `choice`。
/// `chapter_*` 字段由题库访问层在查询时填充，不在题库原始记录中存储。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub question_text: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marks: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(flatten)]
    pub choice: Option<McqChoice>,
}

/// 自定义题目 ID 的保留前缀
pub const CUSTOM_ID_PREFIX: &str = "custom";

/// 判断 ID 是否为用户自定义题目
pub fn is_custom_id(id: &str) -> bool {
    id.starts_with(CUSTOM_ID_PREFIX)
}

/// 生成自定义题目 ID
pub fn generate_custom_id() -> String {
    let now = chrono::Utc::now();
    format!(
        "{}_q_{}_{:09}",
        CUSTOM_ID_PREFIX,
        now.timestamp_millis(),
        rand::random::<u32>() % 1_000_000_000
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_filter_parse() {
        assert_eq!(DifficultyFilter::parse("easy"), DifficultyFilter::Easy);
        assert_eq!(DifficultyFilter::parse(" HARD "), DifficultyFilter::Hard);
        assert_eq!(DifficultyFilter::parse("mixed"), DifficultyFilter::All);
        // 无法识别的值按 All 处理
        assert_eq!(DifficultyFilter::parse("extreme"), DifficultyFilter::All);
        assert_eq!(DifficultyFilter::parse(""), DifficultyFilter::All);
    }

    #[test]
    fn test_difficulty_filter_deserialize_fail_open() {
        let f: DifficultyFilter = serde_json::from_str("\"legendary\"").unwrap();
        assert_eq!(f, DifficultyFilter::All);
        let f: DifficultyFilter = serde_json::from_str("null").unwrap();
        assert_eq!(f, DifficultyFilter::All);
        let f: DifficultyFilter = serde_json::from_str("\"Medium\"").unwrap();
        assert_eq!(f, DifficultyFilter::Medium);
    }

    #[test]
    fn test_question_type_parse() {
        assert_eq!(QuestionType::parse("MCQs"), Some(QuestionType::Mcq));
        assert_eq!(QuestionType::parse("long"), Some(QuestionType::Long));
        assert_eq!(QuestionType::parse("essay"), None);
    }

    #[test]
    fn test_mcq_serializes_flat() {
        let q = Question {
            id: "9_phy_ch1_mcq_1".to_string(),
            kind: QuestionType::Mcq,
            question_text: "SI unit of force?".to_string(),
            difficulty: Difficulty::Easy,
            marks: None,
            chapter_id: None,
            chapter_number: Some(1),
            chapter_name: None,
            topic: None,
            choice: Some(McqChoice {
                options: vec!["N".into(), "J".into(), "W".into(), "Pa".into()],
                correct_option: 0,
            }),
        };
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["type"], "mcq");
        assert_eq!(value["questionText"], "SI unit of force?");
        assert_eq!(value["correctOption"], 0);
        assert_eq!(value["options"][3], "Pa");
        assert!(value.get("marks").is_none());
    }

    #[test]
    fn test_custom_id() {
        assert!(is_custom_id("custom_abc123"));
        assert!(!is_custom_id("9_phy_ch1_mcq_1"));
        let id = generate_custom_id();
        assert!(is_custom_id(&id));
    }
}
