use crate::models::question::{Difficulty, Question, QuestionType};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 每种题型的数量（目标数量或已选数量）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCounts {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub mcq: usize,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub short: usize,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub long: usize,
}

impl QuestionCounts {
    pub fn new(mcq: usize, short: usize, long: usize) -> Self {
        Self { mcq, short, long }
    }

    pub fn get(&self, kind: QuestionType) -> usize {
        match kind {
            QuestionType::Mcq => self.mcq,
            QuestionType::Short => self.short,
            QuestionType::Long => self.long,
        }
    }

    pub fn set(&mut self, kind: QuestionType, value: usize) {
        match kind {
            QuestionType::Mcq => self.mcq = value,
            QuestionType::Short => self.short = value,
            QuestionType::Long => self.long = value,
        }
    }

    pub fn total(&self) -> usize {
        self.mcq + self.short + self.long
    }
}

/// 每种题型的单题分值
///
/// 缺失或非数字的分值按 0 处理。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomMarks {
    #[serde(default, deserialize_with = "deserialize_marks")]
    pub mcq: f64,
    #[serde(default, deserialize_with = "deserialize_marks")]
    pub short: f64,
    #[serde(default, deserialize_with = "deserialize_marks")]
    pub long: f64,
}

impl CustomMarks {
    pub fn new(mcq: f64, short: f64, long: f64) -> Self {
        Self { mcq, short, long }
    }

    /// 教育局标准分值：选择题 1 分，简答题 2 分，论述题 5 分
    pub fn board_default() -> Self {
        Self::new(1.0, 2.0, 5.0)
    }

    /// 获取某题型的分值，非有限数按 0 处理
    pub fn get(&self, kind: QuestionType) -> f64 {
        let value = match kind {
            QuestionType::Mcq => self.mcq,
            QuestionType::Short => self.short,
            QuestionType::Long => self.long,
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}

/// 当前选中的题目 ID 列表
///
/// 列表顺序即打印顺序，任何时候都不重新排序。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    #[serde(default)]
    pub mcq_ids: Vec<String>,
    #[serde(default)]
    pub short_ids: Vec<String>,
    #[serde(default)]
    pub long_ids: Vec<String>,
}

impl Selection {
    pub fn ids(&self, kind: QuestionType) -> &[String] {
        match kind {
            QuestionType::Mcq => &self.mcq_ids,
            QuestionType::Short => &self.short_ids,
            QuestionType::Long => &self.long_ids,
        }
    }

    /// 整体替换某题型的 ID 列表
    pub fn replace(&mut self, kind: QuestionType, ids: Vec<String>) {
        match kind {
            QuestionType::Mcq => self.mcq_ids = ids,
            QuestionType::Short => self.short_ids = ids,
            QuestionType::Long => self.long_ids = ids,
        }
    }

    pub fn counts(&self) -> QuestionCounts {
        QuestionCounts::new(self.mcq_ids.len(), self.short_ids.len(), self.long_ids.len())
    }

    pub fn is_empty(&self) -> bool {
        self.counts().total() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        QuestionType::ALL
            .iter()
            .any(|kind| self.ids(*kind).iter().any(|existing| existing == id))
    }
}

/// 用户对题目的局部修改
///
/// 对题库题目是外观修改；对自定义题目则是完整定义。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl QuestionOverride {
    /// 合并另一份修改，后者按字段覆盖
    pub fn merge(&mut self, other: QuestionOverride) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            question_text,
            options,
            correct_option,
            difficulty,
            marks,
            chapter_number,
            chapter_name,
            topic
        );
    }
}

/// 题目 ID -> 修改内容
pub type EditedQuestions = BTreeMap<String, QuestionOverride>;

/// 用户调整后的题目顺序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOrder {
    #[serde(default)]
    pub mcqs: Vec<String>,
    #[serde(default)]
    pub shorts: Vec<String>,
    #[serde(default)]
    pub longs: Vec<String>,
}

impl QuestionOrder {
    pub fn get(&self, kind: QuestionType) -> &[String] {
        match kind {
            QuestionType::Mcq => &self.mcqs,
            QuestionType::Short => &self.shorts,
            QuestionType::Long => &self.longs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mcqs.is_empty() && self.shorts.is_empty() && self.longs.is_empty()
    }

    /// 以当前选题顺序作为打印顺序
    pub fn from_selection(selection: &Selection) -> Self {
        Self {
            mcqs: selection.mcq_ids.clone(),
            shorts: selection.short_ids.clone(),
            longs: selection.long_ids.clone(),
        }
    }
}

/// 试卷设置（页眉信息、开关、分值）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaperSettings {
    pub title: String,
    pub exam_type: String,
    pub date: String,
    pub time_allowed: String,
    pub institute_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institute_logo: Option<String>,
    pub class_id: String,
    pub subject: String,
    pub custom_header: String,
    pub custom_sub_header: String,
    pub include_instructions: bool,
    pub show_logo: bool,
    pub show_watermark: bool,
    pub include_bubble_sheet: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_marks: Option<f64>,
    pub custom_marks: CustomMarks,
}

impl Default for PaperSettings {
    fn default() -> Self {
        Self {
            title: "Test Paper".to_string(),
            exam_type: "Practice Paper".to_string(),
            date: String::new(),
            time_allowed: "2 Hours".to_string(),
            institute_name: String::new(),
            institute_logo: None,
            class_id: String::new(),
            subject: String::new(),
            custom_header: String::new(),
            custom_sub_header: String::new(),
            include_instructions: true,
            show_logo: false,
            show_watermark: false,
            include_bubble_sheet: false,
            total_marks: None,
            custom_marks: CustomMarks::board_default(),
        }
    }
}

/// 某题型分区的作答说明（打印在分区标题下）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionInstruction {
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub text: String,
}

/// 交给渲染服务的导出数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub settings: PaperSettings,
    pub mcqs: Vec<Question>,
    pub shorts: Vec<Question>,
    pub longs: Vec<Question>,
    pub edited_questions: EditedQuestions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_order: Option<QuestionOrder>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub section_instructions: Vec<SectionInstruction>,
}

impl ExportPayload {
    pub fn questions(&self, kind: QuestionType) -> &[Question] {
        match kind {
            QuestionType::Mcq => &self.mcqs,
            QuestionType::Short => &self.shorts,
            QuestionType::Long => &self.longs,
        }
    }
}

/// 持久化的试卷记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRecord {
    pub id: String,
    pub class_id: String,
    pub subject: String,
    pub title: String,
    pub exam_type: String,
    pub date: String,
    pub time_allowed: String,
    pub institute_name: String,
    pub total_marks: f64,
    pub question_count: usize,
    pub mcq_count: usize,
    pub short_count: usize,
    pub long_count: usize,
    pub mcq_ids: Vec<String>,
    pub short_ids: Vec<String>,
    pub long_ids: Vec<String>,
    pub custom_marks: CustomMarks,
    #[serde(default)]
    pub edited_questions: EditedQuestions,
    #[serde(default)]
    pub question_order: QuestionOrder,
    pub settings: PaperSettings,
    pub created_at: String,
}

impl PaperRecord {
    /// 还原为选题
    pub fn selection(&self) -> Selection {
        Selection {
            mcq_ids: self.mcq_ids.clone(),
            short_ids: self.short_ids.clone(),
            long_ids: self.long_ids.clone(),
        }
    }
}

// ========== 宽松的数值反序列化 ==========

/// 数量：接受整数、小数、数字字符串；负数或无法识别的值按 0 处理
pub(crate) fn deserialize_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserializer.deserialize_any(LenientNumberVisitor)?;
    Ok(if value.is_finite() && value > 0.0 {
        value.floor() as usize
    } else {
        0
    })
}

/// 分值：接受整数、小数、数字字符串；无法识别的值按 0 处理
pub(crate) fn deserialize_marks<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserializer.deserialize_any(LenientNumberVisitor)?;
    Ok(if value.is_finite() { value } else { 0.0 })
}

struct LenientNumberVisitor;

impl<'de> serde::de::Visitor<'de> for LenientNumberVisitor {
    type Value = f64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number or a numeric string")
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(value as f64)
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(value as f64)
    }

    fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(value)
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(value.trim().parse::<f64>().unwrap_or(0.0))
    }

    fn visit_bool<E>(self, _value: bool) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(0.0)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(0.0)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(0.0)
    }
}
