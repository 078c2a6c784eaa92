//! ホスト（表計算アプリケーション）のワークブック操作
//!
//! 問い合わせは1回ごとに同期点を持つ。書き込み系の操作は `SheetOp` として
//! まとめ、`sync` で1回にコミットする。

mod memory;
mod xlsx;

pub use memory::{MemoryWorkbook, Sheet};
pub use xlsx::XlsxWorkbook;

use async_trait::async_trait;
use sheet_classifier_common::Matrix;
use thiserror::Error;

/// ホストが報告するエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// 選択範囲の読み取り結果
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSnapshot {
    pub address: String,
    pub values: Matrix,
}

/// 一括コミットされる書き込み操作
#[derive(Debug, Clone, PartialEq)]
pub enum SheetOp {
    AddWorksheet { name: String },
    ClearUsedRange { sheet: String },
    SetValues { sheet: String, address: String, values: Matrix },
    Activate { sheet: String },
}

#[async_trait]
pub trait Workbook: Send {
    /// 現在の選択範囲（アドレスと値）
    async fn selected_range(&mut self) -> Result<RangeSnapshot, HostError>;

    /// シートの有無（存在しなくてもエラーにはならない）
    async fn worksheet_exists(&mut self, name: &str) -> Result<bool, HostError>;

    /// 操作をまとめてコミットする。1つでも失敗したら何も反映しない
    async fn sync(&mut self, ops: Vec<SheetOp>) -> Result<(), HostError>;
}
