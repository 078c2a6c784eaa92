//! 選択範囲の取り込み
//!
//! ホストの現在の選択範囲を読み取り、役割ごとのフォーム欄に
//! アドレスとシリアライズ済みの値行列を保存する。

use crate::error::{ClassifierError, Result};
use crate::host::Workbook;
use sheet_classifier_common::{Matrix, SelectionRegion};
use tracing::debug;

/// 取り込み対象の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// 分類する項目
    Input,
    /// 候補カテゴリ
    Categories,
}

impl Role {
    pub fn success_message(&self) -> &'static str {
        match self {
            Role::Input => "Range selected successfully!",
            Role::Categories => "Categories selected successfully!",
        }
    }

    pub fn error_prefix(&self) -> &'static str {
        match self {
            Role::Input => "Error selecting range: ",
            Role::Categories => "Error selecting categories: ",
        }
    }
}

/// フォーム欄1つ分の状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormField {
    pub address: String,
    /// JSON文字列としての値行列（未取り込みならNone）
    pub values: Option<String>,
}

impl FormField {
    /// 保存済みの内容から範囲を復元する（値がなければ空の行列）
    pub fn region(&self) -> Result<SelectionRegion> {
        let values: Matrix = match &self.values {
            Some(json) => serde_json::from_str(json)?,
            None => Vec::new(),
        };
        Ok(SelectionRegion::new(self.address.clone(), values))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    input: FormField,
    categories: FormField,
}

impl FormState {
    pub fn field(&self, role: Role) -> &FormField {
        match role {
            Role::Input => &self.input,
            Role::Categories => &self.categories,
        }
    }

    pub fn field_mut(&mut self, role: Role) -> &mut FormField {
        match role {
            Role::Input => &mut self.input,
            Role::Categories => &mut self.categories,
        }
    }

    pub fn region(&self, role: Role) -> Result<SelectionRegion> {
        self.field(role).region()
    }
}

/// 選択範囲を取り込んでフォーム欄に保存する
///
/// ホストがエラーを返した場合はフォーム欄を変更しない
pub async fn capture<W: Workbook + ?Sized>(
    host: &mut W,
    role: Role,
    form: &mut FormState,
) -> Result<SelectionRegion> {
    let snapshot = host
        .selected_range()
        .await
        .map_err(|e| ClassifierError::HostAccess(e.0))?;

    let serialized = serde_json::to_string(&snapshot.values)?;
    debug!(?role, address = %snapshot.address, values = %serialized, "範囲を取り込み");

    let field = form.field_mut(role);
    field.address = snapshot.address.clone();
    field.values = Some(serialized);

    Ok(SelectionRegion::new(snapshot.address, snapshot.values))
}
