//! 分類ワークフローの型定義
//!
//! CLIとホスト実装で共有される型:
//! - CellValue / Matrix: セル値と行優先の値行列
//! - SelectionRegion: 取り込んだ範囲（アドレス + 値）
//! - ClassificationRequest: 分類サービスへのリクエストボディ
//! - ClassificationResult / ServiceResponse: 分類サービスのレスポンス

use crate::credential::Credential;
use serde::{Deserialize, Serialize};
use std::fmt;

/// セルのスカラー値
///
/// JSONでは素の値（null / bool / 数値 / 文字列）として表現される
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// 空セル（ホストは空セルを空文字列として返す）
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// 行優先の値行列
pub type Matrix = Vec<Vec<CellValue>>;

/// 取り込んだ範囲
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionRegion {
    pub address: String,
    pub values: Matrix,
}

impl SelectionRegion {
    pub fn new(address: impl Into<String>, values: Matrix) -> Self {
        Self {
            address: address.into(),
            values,
        }
    }

    /// アドレスが取り込み済みかどうか
    pub fn is_captured(&self) -> bool {
        !self.address.is_empty()
    }

    /// 行優先で1次元に平坦化（順序は保持）
    pub fn flatten(&self) -> Vec<CellValue> {
        self.values.iter().flatten().cloned().collect()
    }
}

/// 分類サービスへのリクエストボディ
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRequest {
    pub api_key: Credential,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    #[serde(rename = "inputRange")]
    pub input_range_address: String,
    #[serde(rename = "inputData")]
    pub input_values: Matrix,
    pub categories: Vec<CellValue>,
    pub instructions: String,
}

impl ClassificationRequest {
    /// ログ出力用（APIキーをマスクしたJSON）
    pub fn redacted(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "apiKey".to_string(),
                serde_json::Value::String(self.api_key.masked()),
            );
        }
        value
    }
}

/// 入力項目ごとの分類結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub item: CellValue,
    pub category: CellValue,
    pub probability: f64,
}

impl ClassificationResult {
    /// 小数点以下2桁に丸めた確率
    pub fn rounded_probability(&self) -> f64 {
        (self.probability * 100.0).round() / 100.0
    }

    /// シートに書き込む1行 `[item, category, probability]`
    pub fn to_row(&self) -> Vec<CellValue> {
        vec![
            self.item.clone(),
            self.category.clone(),
            CellValue::Number(self.rounded_probability()),
        ]
    }
}

/// 分類サービスのレスポンスボディ
///
/// 成功時は `results`、失敗時は `error` を持つ
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceResponse {
    #[serde(default)]
    pub results: Option<Vec<ClassificationResult>>,
    #[serde(default)]
    pub error: Option<String>,
}
