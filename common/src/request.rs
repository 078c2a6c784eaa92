//! 分類リクエストの組み立て
//!
//! 入出力は行わない純粋な関数のみ

use crate::credential::Credential;
use crate::error::ValidationError;
use crate::types::{ClassificationRequest, SelectionRegion};

/// 使用するモデル（ユーザーは変更できない）
pub const MODEL: &str = "gpt-4o-mini";

/// 最大出力トークン数
pub const MAX_TOKENS: u32 = 50;

/// 温度
pub const TEMPERATURE: f64 = 0.5;

/// 取り込んだ2つの範囲と指示文からリクエストを組み立てる
///
/// 検証順序:
/// 1. APIキーがあること
/// 2. 両方の範囲アドレスが空でないこと
///
/// セル値の中身は検証しない（空の行列もそのまま送る）。
/// カテゴリ範囲は行優先で1次元に平坦化される。
///
/// # Examples
/// ```
/// use sheet_classifier_common::{build_request, CellValue, Credential, SelectionRegion};
///
/// let input = SelectionRegion::new("A1:A2", vec![vec!["apple".into()], vec!["banana".into()]]);
/// let categories = SelectionRegion::new("B1:B2", vec![vec!["fruit".into()], vec!["vegetable".into()]]);
/// let credential = Credential::new("sk-1234");
///
/// let request = build_request(&input, &categories, "classify food", credential.as_ref()).unwrap();
/// assert_eq!(request.categories, vec![CellValue::from("fruit"), CellValue::from("vegetable")]);
/// ```
pub fn build_request(
    input: &SelectionRegion,
    categories: &SelectionRegion,
    instructions: &str,
    credential: Option<&Credential>,
) -> Result<ClassificationRequest, ValidationError> {
    let credential = credential.ok_or(ValidationError::MissingCredential)?;

    if !input.is_captured() || !categories.is_captured() {
        return Err(ValidationError::MissingSelection);
    }

    Ok(ClassificationRequest {
        api_key: credential.clone(),
        model: MODEL.to_string(),
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
        input_range_address: input.address.clone(),
        input_values: input.values.clone(),
        categories: categories.flatten(),
        instructions: instructions.to_string(),
    })
}
