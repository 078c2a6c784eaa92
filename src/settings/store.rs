//! キー・バリューストア
//!
//! - MemoryStore: プロセス内のみ（テスト・組み込み用）
//! - FileStore: JSONファイルに永続化（CLI用）

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::warn;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// ファイルの中身
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    /// バージョン（互換性チェック用）
    version: u32,
    entries: BTreeMap<String, String>,
}

impl StoreFile {
    const CURRENT_VERSION: u32 = 1;
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    data: StoreFile,
}

impl FileStore {
    /// ファイルを読み込む。存在しない・壊れている場合は空として扱う
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = Self::read(&path).unwrap_or_default();
        Self { path, data }
    }

    fn read(path: &Path) -> Option<StoreFile> {
        if !path.exists() {
            return None;
        }

        let file = File::open(path).ok()?;
        match serde_json::from_reader::<_, StoreFile>(BufReader::new(file)) {
            Ok(data) if data.version == StoreFile::CURRENT_VERSION => Some(data),
            Ok(data) => {
                warn!(version = data.version, path = %path.display(), "設定ファイルのバージョン不一致、空として扱います");
                None
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "設定ファイルが読めません、空として扱います");
                None
            }
        }
    }

    fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_vec_pretty(&self.data)?;
        write_atomic(&self.path, &content)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.data.entries.insert(key.to_string(), value.to_string());
        self.write()
    }
}

/// 一時ファイルに書いてから置き換える（途中で失敗しても元のファイルは残る）
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
