//! 脚本化的模拟浏览器
//!
//! 按顺序返回预先准备的提取结果，记录每次调用，并在点击“下一题”时检查结果文件。

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use daypo_scraper::error::DriverError;
use daypo_scraper::services::advance_controller::{NEXT_BUTTON_ID, PROVISIONAL_ANSWER_SCRIPT};
use daypo_scraper::services::page_extractor::EXTRACTION_SCRIPT;
use daypo_scraper::services::question_counter::COUNTER_ID;
use daypo_scraper::ui::UiEvent;
use daypo_scraper::{Delays, DriverLauncher, QuizDriver, SessionCtx, StopSignal};
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;

pub const QUIZ_URL: &str = "https://www.daypo.com/examen-prueba.html#test";

/// 模拟页面的状态
#[derive(Debug, Default)]
pub struct MockPage {
    /// `cuestion` 元素的文本，`None` 表示元素不存在
    pub counter_text: Option<String>,
    /// 依次返回的提取结果，用完后返回占位题干
    pub replies: VecDeque<Value>,
    pub button_present: bool,
    pub fail_launch: bool,
    /// 提交临时答案时抛出脚本异常
    pub fail_answer: bool,
    pub calls: Vec<String>,
    pub launches: usize,
    pub quits: usize,
    pub clicks: usize,
    /// 每次点击“下一题”时结果文件中的记录数
    pub output_snapshots: Vec<usize>,
    pub output_path: Option<PathBuf>,
    /// 第 n 次点击后请求停止
    pub stop_after_clicks: Option<(usize, StopSignal)>,
}

impl MockPage {
    pub fn new(counter: &str, replies: Vec<Value>) -> Self {
        Self {
            counter_text: Some(counter.to_string()),
            replies: replies.into(),
            button_present: true,
            ..Default::default()
        }
    }

    pub fn extraction_calls(&self) -> usize {
        self.calls.iter().filter(|c| c.as_str() == "extract").count()
    }
}

#[derive(Debug, Clone)]
pub enum MockElement {
    Counter,
    NextButton,
}

pub struct MockDriver {
    page: Arc<Mutex<MockPage>>,
}

impl MockDriver {
    fn page(&self) -> MutexGuard<'_, MockPage> {
        self.page.lock().unwrap()
    }
}

impl QuizDriver for MockDriver {
    type Element = MockElement;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.page().calls.push(format!("navigate:{}", url));
        Ok(())
    }

    async fn find_element_by_id(&self, id: &str) -> Result<Option<MockElement>, DriverError> {
        let page = self.page();
        let element = if id == COUNTER_ID {
            page.counter_text.as_ref().map(|_| MockElement::Counter)
        } else if id == NEXT_BUTTON_ID {
            page.button_present.then_some(MockElement::NextButton)
        } else {
            None
        };
        Ok(element)
    }

    async fn element_text(&self, element: &MockElement) -> Result<String, DriverError> {
        match element {
            MockElement::Counter => Ok(self.page().counter_text.clone().unwrap_or_default()),
            MockElement::NextButton => Ok("Siguiente".to_string()),
        }
    }

    async fn execute_script(&self, source: &str) -> Result<Value, DriverError> {
        let mut page = self.page();
        if source == PROVISIONAL_ANSWER_SCRIPT {
            page.calls.push("answer".to_string());
            if page.fail_answer {
                return Err(DriverError::Script(format!(
                    "{}: ReferenceError: contestar is not defined",
                    source
                )));
            }
            Ok(Value::Null)
        } else if source == EXTRACTION_SCRIPT {
            page.calls.push("extract".to_string());
            Ok(page.replies.pop_front().unwrap_or_else(placeholder))
        } else {
            panic!("未知脚本: {}", source)
        }
    }

    async fn click(&self, element: &MockElement) -> Result<(), DriverError> {
        let mut page = self.page();
        assert!(matches!(element, MockElement::NextButton), "点击了错误的元素");
        page.calls.push("click".to_string());
        page.clicks += 1;
        let snapshot = page.output_path.as_deref().map(count_records).unwrap_or(0);
        page.output_snapshots.push(snapshot);
        if let Some((after, signal)) = &page.stop_after_clicks {
            if page.clicks >= *after {
                signal.request();
            }
        }
        Ok(())
    }

    async fn quit(self) -> Result<(), DriverError> {
        self.page().quits += 1;
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockLauncher {
    pub page: Arc<Mutex<MockPage>>,
}

impl MockLauncher {
    pub fn new(page: MockPage) -> Self {
        Self {
            page: Arc::new(Mutex::new(page)),
        }
    }

    pub fn page(&self) -> MutexGuard<'_, MockPage> {
        self.page.lock().unwrap()
    }
}

impl DriverLauncher for MockLauncher {
    type Driver = MockDriver;

    async fn launch(&self) -> Result<MockDriver, DriverError> {
        let mut page = self.page();
        page.launches += 1;
        if page.fail_launch {
            return Err(DriverError::Launch("chrome not found".to_string()));
        }
        Ok(MockDriver {
            page: Arc::clone(&self.page),
        })
    }
}

/// 一道题的脚本返回值
pub fn question(id: i64, prompt: &str, markers: &str, options: &[&str]) -> Value {
    json!({
        "pregunta": prompt,
        "opciones": options,
        "id_pregunta": id,
        "cadena_marcadores": markers,
        "mez": null
    })
}

pub fn shuffled_question(
    id: i64,
    prompt: &str,
    markers: &str,
    options: &[&str],
    mez: &[i64],
) -> Value {
    json!({
        "pregunta": prompt,
        "opciones": options,
        "id_pregunta": id,
        "cadena_marcadores": markers,
        "mez": mez
    })
}

pub fn placeholder() -> Value {
    json!({
        "pregunta": "N/D",
        "opciones": [],
        "id_pregunta": -1,
        "cadena_marcadores": ""
    })
}

pub fn session(output_path: &Path) -> SessionCtx {
    SessionCtx {
        url: QUIZ_URL.to_string(),
        output_path: output_path.to_path_buf(),
        delays: Delays::none(),
        max_consecutive_duplicates: 10,
    }
}

/// 结果文件中的记录数，文件不存在时为 0
pub fn count_records(path: &Path) -> usize {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|text| serde_json::from_str::<Value>(&text).ok())
        .and_then(|value| value.as_array().map(|items| items.len()))
        .unwrap_or(0)
}

pub fn read_output(path: &Path) -> Vec<Value> {
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::from_str::<Value>(&text)
        .unwrap()
        .as_array()
        .unwrap()
        .clone()
}

pub fn drain(rx: &mut UnboundedReceiver<UiEvent>) -> Vec<UiEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn progress_values(events: &[UiEvent]) -> Vec<f64> {
    events
        .iter()
        .filter_map(|e| match e {
            UiEvent::Progress(v) => Some(*v),
            _ => None,
        })
        .collect()
}
