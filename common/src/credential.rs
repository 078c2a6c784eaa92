//! APIキー（資格情報）とマスク表示

use serde::{Deserialize, Serialize};
use std::fmt;

/// 4文字以下のキーに使う固定マスク
pub const SHORT_MASK: &str = "****";

/// 末尾4文字の前に付けるマスク
const LONG_MASK: &str = "********";

/// 表示用にAPIキーをマスクする
///
/// - 4文字以下: `****`
/// - それ以外: `********` + 末尾4文字
///
/// # Examples
/// ```
/// use sheet_classifier_common::mask;
///
/// assert_eq!(mask("abc"), "****");
/// assert_eq!(mask("sk-1234"), "********1234");
/// ```
pub fn mask(secret: &str) -> String {
    let len = secret.chars().count();
    if len <= 4 {
        return SHORT_MASK.to_string();
    }
    let tail: String = secret.chars().skip(len - 4).collect();
    format!("{}{}", LONG_MASK, tail)
}

/// APIキー
///
/// `Debug` ではマスク表示になる。シリアライズ時のみ生の値を出す
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// 空文字列は資格情報として扱わない
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            None
        } else {
            Some(Self(secret))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> String {
        mask(&self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.masked()).finish()
    }
}
