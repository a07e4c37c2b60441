use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// 抓取到的一道题
///
/// 构造后不可变；`internal_id` 与 `raw_markers` 只用于去重和诊断，不写入结果文件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    /// 题干（已去除首尾空白）
    pub question_text: String,
    /// 选项，按页面显示顺序
    pub options: Vec<String>,
    /// 正确答案文本，按测验引擎给出的顺序
    pub correct_answers: Vec<String>,
    /// 测验引擎内部的题目序号（从 0 开始），去重的唯一依据
    pub internal_id: i64,
    /// 引擎原始标记串
    pub raw_markers: String,
}

impl QuestionRecord {
    /// 写入结果文件的公开字段
    pub fn public_view(&self) -> PublicQuestion<'_> {
        PublicQuestion {
            pregunta: &self.question_text,
            opciones: &self.options,
            respuesta: &self.correct_answers,
        }
    }
}

/// 结果文件中的一条记录，字段名是对外兼容格式的一部分
#[derive(Debug, Serialize)]
pub struct PublicQuestion<'a> {
    pub pregunta: &'a str,
    pub opciones: &'a [String],
    pub respuesta: &'a [String],
}

/// 页面脚本的返回值
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScriptReply {
    /// `{ error, detalle? }`
    Failure {
        error: String,
        #[serde(default, alias = "detail")]
        detalle: Option<String>,
    },
    State(RawQuestionState),
}

/// 测验引擎的原始状态
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestionState {
    pub pregunta: String,
    #[serde(default)]
    pub opciones: Vec<String>,
    pub id_pregunta: i64,
    pub cadena_marcadores: String,
    /// 引擎顺序 → 显示顺序的置换表，页面未提供或含非整数项时为 `None`
    #[serde(default, deserialize_with = "integer_table")]
    pub mez: Option<Vec<i64>>,
}

/// 只接受全部为整数的置换表
fn integer_table<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<JsonValue>>::deserialize(deserializer)?;
    Ok(raw.and_then(|items| items.iter().map(JsonValue::as_i64).collect()))
}
