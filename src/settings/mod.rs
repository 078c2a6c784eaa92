//! APIキー設定の保存と読み込み
//!
//! キーは常にマスク表示される。マスク表示のまま保存し直しても
//! キーは上書きされない。

mod store;

pub use store::{write_atomic, FileStore, KeyValueStore, MemoryStore};

use crate::error::Result;
use sheet_classifier_common::{mask, Credential};
use tracing::debug;

/// APIキーの保存キー
pub const API_KEY: &str = "apiKey";

pub struct SettingsStore<S> {
    store: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 保存済みのAPIキー（未設定ならNone）
    pub fn load(&self) -> Option<Credential> {
        self.store.get(API_KEY).and_then(Credential::new)
    }

    /// マスク表示
    pub fn display(credential: &Credential) -> String {
        mask(credential.expose())
    }

    /// 設定画面に表示する値（未設定なら空文字列）
    pub fn masked(&self) -> String {
        self.load().map(|c| Self::display(&c)).unwrap_or_default()
    }

    /// 入力値が空でなく、表示中のマスクと異なる場合のみ上書きする
    ///
    /// 変更がなくても成功として扱う
    pub fn save(&mut self, raw_input: &str, current_masked: &str) -> Result<()> {
        if raw_input.is_empty() || raw_input == current_masked {
            debug!("APIキーは変更なし");
            return Ok(());
        }

        self.store.set(API_KEY, raw_input)?;
        debug!(key = %mask(raw_input), "APIキーを更新");
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with(key: Option<&str>) -> SettingsStore<MemoryStore> {
        let mut store = MemoryStore::default();
        if let Some(key) = key {
            store.set(API_KEY, key).unwrap();
        }
        SettingsStore::new(store)
    }

    #[test]
    fn test_load_absent() {
        let settings = settings_with(None);
        assert!(settings.load().is_none());
        assert_eq!(settings.masked(), "");
    }

    #[test]
    fn test_load_empty_value_is_absent() {
        let settings = settings_with(Some(""));
        assert!(settings.load().is_none());
    }

    #[test]
    fn test_display_masks() {
        let settings = settings_with(Some("sk-abcdef1234"));
        assert_eq!(settings.masked(), "********1234");
        let short = Credential::new("abc").unwrap();
        assert_eq!(SettingsStore::<MemoryStore>::display(&short), "****");
    }

    #[test]
    fn test_save_new_key() {
        let mut settings = settings_with(None);
        settings.save("sk-new-key-9999", "").unwrap();
        assert_eq!(settings.load().unwrap().expose(), "sk-new-key-9999");
    }

    #[test]
    fn test_save_masked_round_trip_is_noop() {
        let mut settings = settings_with(Some("sk-original-5678"));

        for _ in 0..2 {
            let shown = settings.masked();
            settings.save(&shown, &shown).unwrap();
        }

        assert_eq!(settings.load().unwrap().expose(), "sk-original-5678");
    }

    #[test]
    fn test_save_empty_input_keeps_key() {
        let mut settings = settings_with(Some("sk-original-5678"));
        settings.save("", "********5678").unwrap();
        assert_eq!(settings.load().unwrap().expose(), "sk-original-5678");
    }

    #[test]
    fn test_save_replaces_key() {
        let mut settings = settings_with(Some("sk-original-5678"));
        settings.save("sk-replacement-0000", "********5678").unwrap();
        assert_eq!(settings.load().unwrap().expose(), "sk-replacement-0000");
    }
}
