//! 题目提取服务 - 业务能力层
//!
//! 读取测验引擎的内存状态，换算出当前题目的正确答案。
//!
//! 平台用一个“标记串”给每个选项打分：串中第 i 个字符对应引擎顺序下的第 i 个选项。
//! 含 `'2'` 时 `'2'` 表示正确，否则退回 `'1'`。页面显示的选项顺序可能被打乱，
//! 打乱方式由置换表 `mez` 给出。这两条规则都来自对平台的观察，不是公开接口。

use tracing::debug;

use crate::error::ExtractError;
use crate::infrastructure::{JsExecutor, QuizDriver};
use crate::models::{QuestionRecord, RawQuestionState, ScriptReply};

/// 题干占位符，表示测验已结束或页面暂时不可读
pub const PLACEHOLDER_PROMPT: &str = "N/D";

/// 引擎变量缺失时脚本返回的错误标识
pub const STATE_UNAVAILABLE_TAG: &str = "state_unavailable";

/// 读取当前题目状态的页面脚本
pub const EXTRACTION_SCRIPT: &str = r#"
(() => {
    if (typeof m === 'undefined' || typeof sec === 'undefined' || typeof vcue === 'undefined') {
        return { error: 'state_unavailable', detalle: 'Variables JS esenciales no cargadas' };
    }
    try {
        const pointer = Math.abs(sec[sa][ca]) - 1;
        const markers = String(vcue("c", pointer));
        const promptElement = document.getElementById('pri' + m);
        const optionElements = document.querySelectorAll('#cuestiones' + m + ' tr td:nth-child(3)');
        return {
            pregunta: promptElement ? promptElement.innerText.trim() : 'N/D',
            opciones: Array.from(optionElements).map(el => el.innerText.trim()),
            id_pregunta: pointer,
            cadena_marcadores: markers,
            mez: (typeof mez !== 'undefined' && Array.isArray(mez) && mez.every(Number.isInteger)) ? mez.slice() : null
        };
    } catch (error) {
        return { error: error.toString(), detalle: 'Error al acceder a las variables del test.' };
    }
})()
"#;

/// 一次提取的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Question(QuestionRecord),
    /// 题干为空或为占位符，调用方视为停止条件
    Placeholder,
}

/// 题目提取服务
///
/// 除读取页面状态外没有副作用
#[derive(Debug, Default, Clone, Copy)]
pub struct PageExtractor;

impl PageExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 读取当前题目
    pub async fn extract<D: QuizDriver>(&self, driver: &D) -> Result<Extraction, ExtractError> {
        let reply: ScriptReply = JsExecutor::new(driver).eval_as(EXTRACTION_SCRIPT).await?;
        interpret_reply(reply)
    }
}

/// 把脚本返回值换算为 [`Extraction`]
pub fn interpret_reply(reply: ScriptReply) -> Result<Extraction, ExtractError> {
    match reply {
        ScriptReply::Failure { error, .. } if error == STATE_UNAVAILABLE_TAG => {
            Err(ExtractError::StateUnavailable)
        }
        ScriptReply::Failure { error, detalle } => Err(ExtractError::ExtractionFailed(
            match detalle {
                Some(detail) => format!("{} ({})", error, detail),
                None => error,
            },
        )),
        ScriptReply::State(state) => build_record(state),
    }
}

fn build_record(state: RawQuestionState) -> Result<Extraction, ExtractError> {
    let question_text = state.pregunta.trim();
    if question_text.is_empty() || question_text == PLACEHOLDER_PROMPT {
        return Ok(Extraction::Placeholder);
    }

    let marker = correct_marker(&state.cadena_marcadores);
    let indices = correct_indices(&state.cadena_marcadores, marker);
    let correct_answers =
        resolve_correct_answers(&state.opciones, &indices, state.mez.as_deref());
    debug!(
        "题目 #{} 标记串 {:?} → 标记 '{}' 引擎序号 {:?}",
        state.id_pregunta, state.cadena_marcadores, marker, indices
    );

    if correct_answers.is_empty() {
        return Err(ExtractError::NoCorrectAnswer {
            internal_id: state.id_pregunta,
            markers: state.cadena_marcadores,
        });
    }

    Ok(Extraction::Question(QuestionRecord {
        question_text: question_text.to_string(),
        options: state.opciones,
        correct_answers,
        internal_id: state.id_pregunta,
        raw_markers: state.cadena_marcadores,
    }))
}

/// 表示“正确”的标记字符：含 `'2'` 取 `'2'`，否则含 `'1'` 取 `'1'`
pub fn correct_marker(markers: &str) -> char {
    if !markers.contains('2') && markers.contains('1') {
        '1'
    } else {
        '2'
    }
}

/// 标记串中等于 `marker` 的位置（引擎顺序）
pub fn correct_indices(markers: &str, marker: char) -> Vec<usize> {
    markers
        .chars()
        .enumerate()
        .filter(|&(_, c)| c == marker)
        .map(|(i, _)| i)
        .collect()
}

/// 把引擎顺序的正确序号换算成显示顺序的选项文本
///
/// 置换表长度与选项数一致时，序号 `i` 对应表中值等于 `i` 的位置；
/// 否则认为显示顺序就是引擎顺序。越界或找不到的位置直接跳过。
pub fn resolve_correct_answers(
    options: &[String],
    engine_indices: &[usize],
    permutation: Option<&[i64]>,
) -> Vec<String> {
    match permutation {
        Some(table) if table.len() == options.len() => engine_indices
            .iter()
            .filter_map(|&index| table.iter().position(|&value| value == index as i64))
            .filter_map(|position| options.get(position).cloned())
            .collect(),
        _ => engine_indices
            .iter()
            .filter_map(|&index| options.get(index).cloned())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn state(markers: &str, opts: &[&str], mez: Option<Vec<i64>>) -> RawQuestionState {
        RawQuestionState {
            pregunta: "  ¿Pregunta?  ".to_string(),
            opciones: options(opts),
            id_pregunta: 4,
            cadena_marcadores: markers.to_string(),
            mez,
        }
    }

    #[test]
    fn test_marker_prefers_two() {
        assert_eq!(correct_marker("0020"), '2');
        assert_eq!(correct_marker("1200"), '2');
        assert_eq!(correct_marker("0010"), '1');
        assert_eq!(correct_marker("1100"), '1');
        // 两者都没有时保持 '2'，不会选出任何选项
        assert_eq!(correct_marker("0000"), '2');
    }

    #[test]
    fn test_direct_index_without_permutation() {
        let indices = correct_indices("0020", correct_marker("0020"));
        assert_eq!(indices, vec![2]);
        let answers = resolve_correct_answers(&options(&["A", "B", "C", "D"]), &indices, None);
        assert_eq!(answers, vec!["C"]);
    }

    #[test]
    fn test_permutation_maps_to_display_order() {
        let indices = correct_indices("0010", correct_marker("0010"));
        assert_eq!(indices, vec![2]);
        let answers = resolve_correct_answers(
            &options(&["X", "Y", "Z", "W"]),
            &indices,
            Some(&[2, 0, 3, 1][..]),
        );
        assert_eq!(answers, vec!["X"]);
    }

    #[test]
    fn test_permutation_length_mismatch_falls_back() {
        let answers = resolve_correct_answers(
            &options(&["X", "Y", "Z", "W"]),
            &[1, 3],
            Some(&[2, 0, 1][..]),
        );
        assert_eq!(answers, vec!["Y", "W"]);
    }

    #[test]
    fn test_multiple_answers_keep_engine_order() {
        let answers = resolve_correct_answers(
            &options(&["P", "Q", "R"]),
            &[0, 2],
            Some(&[2, 1, 0][..]),
        );
        // 引擎序号 0 → 显示位置 2，序号 2 → 显示位置 0
        assert_eq!(answers, vec!["R", "P"]);
    }

    #[test]
    fn test_out_of_range_index_is_skipped() {
        let answers = resolve_correct_answers(&options(&["A", "B"]), &[1, 5], None);
        assert_eq!(answers, vec!["B"]);
    }

    #[test]
    fn test_build_record_trims_prompt() {
        let extraction = build_record(state("0200", &["a", "b", "c", "d"], None)).unwrap();
        let Extraction::Question(record) = extraction else {
            panic!("应为 Question");
        };
        assert_eq!(record.question_text, "¿Pregunta?");
        assert_eq!(record.correct_answers, vec!["b"]);
        assert_eq!(record.internal_id, 4);
        assert_eq!(record.raw_markers, "0200");
    }

    #[test]
    fn test_placeholder_prompt() {
        let mut raw = state("0200", &["a", "b"], None);
        raw.pregunta = "N/D".to_string();
        assert_eq!(build_record(raw).unwrap(), Extraction::Placeholder);

        let mut raw = state("0200", &["a", "b"], None);
        raw.pregunta = "   ".to_string();
        assert_eq!(build_record(raw).unwrap(), Extraction::Placeholder);
    }

    #[test]
    fn test_no_correct_answer_is_error() {
        let err = build_record(state("0000", &["a", "b", "c", "d"], None)).unwrap_err();
        assert!(matches!(err, ExtractError::NoCorrectAnswer { internal_id: 4, .. }));
    }

    #[test]
    fn test_invalid_permutation_falls_back_to_engine_order() {
        let reply: ScriptReply = serde_json::from_value(serde_json::json!({
            "pregunta": "¿Cuál?",
            "opciones": ["X", "Y", "Z", "W"],
            "id_pregunta": 7,
            "cadena_marcadores": "0200",
            "mez": [2, 0, null, 1]
        }))
        .unwrap();
        let Extraction::Question(record) = interpret_reply(reply).unwrap() else {
            panic!("应为 Question");
        };
        assert_eq!(record.correct_answers, vec!["Y"]);
    }

    #[test]
    fn test_failure_replies() {
        let err = interpret_reply(ScriptReply::Failure {
            error: STATE_UNAVAILABLE_TAG.to_string(),
            detalle: None,
        })
        .unwrap_err();
        assert!(matches!(err, ExtractError::StateUnavailable));

        let err = interpret_reply(ScriptReply::Failure {
            error: "TypeError: sec[sa] is undefined".to_string(),
            detalle: Some("Error al acceder a las variables del test.".to_string()),
        })
        .unwrap_err();
        match err {
            ExtractError::ExtractionFailed(detail) => {
                assert!(detail.contains("TypeError"));
                assert!(detail.contains("Error al acceder"));
            }
            other => panic!("应为 ExtractionFailed: {:?}", other),
        }
    }
}
