//! 结果存储 - 业务能力层
//!
//! 按首次抓取顺序保存题目，以引擎序号去重，每次追加后整体重写结果文件。

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::debug;

use crate::error::StoreError;
use crate::models::{PublicQuestion, QuestionRecord};

/// 一次抓取会话的结果集合
#[derive(Debug, Default)]
pub struct ResultStore {
    records: Vec<QuestionRecord>,
    seen: HashSet<i64>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, internal_id: i64) -> bool {
        self.seen.contains(&internal_id)
    }

    /// 追加一道新题，已存在的序号被忽略
    ///
    /// 返回是否真正追加。
    pub fn append(&mut self, record: QuestionRecord) -> bool {
        if !self.seen.insert(record.internal_id) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[QuestionRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<QuestionRecord> {
        self.records
    }

    /// 序列化全部记录的公开字段
    ///
    /// 4 空格缩进，非 ASCII 字符原样输出。
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let public: Vec<PublicQuestion<'_>> =
            self.records.iter().map(QuestionRecord::public_view).collect();

        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        public.serialize(&mut serializer)?;
        Ok(buf)
    }

    /// 把全部记录写入 `path`，覆盖原有内容
    ///
    /// 先写同目录下的临时文件再重命名，中途崩溃不会留下半个 JSON。
    pub fn flush(&self, path: &Path) -> Result<(), StoreError> {
        let bytes = self.to_json_bytes()?;
        let tmp_path = temp_path_for(path);
        let io_err = |source| StoreError::Io {
            path: path.display().to_string(),
            source,
        };

        let mut file = fs::File::create(&tmp_path).map_err(io_err)?;
        file.write_all(&bytes).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);
        fs::rename(&tmp_path, path).map_err(io_err)?;

        debug!("已写入 {} 条记录到 {}", self.records.len(), path.display());
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
