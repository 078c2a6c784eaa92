//! 分類結果をワークシートに書き込む
//!
//! "Analysis Results" シートがあれば使用範囲をクリア、なければ作成し、
//! ヘッダー1行 + 結果の行を書き込む。何度実行してもシートは1枚で、
//! 前回の行は残らない。

use crate::error::{ClassifierError, Result};
use crate::host::{SheetOp, Workbook};
use sheet_classifier_common::{CellValue, ClassificationResult, Matrix};
use tracing::debug;

pub const RESULTS_SHEET: &str = "Analysis Results";

pub const HEADER: [&str; 3] = ["Item", "Category", "Probability"];

/// 書き込む行（確率は小数点以下2桁）
pub fn result_rows(results: &[ClassificationResult]) -> Matrix {
    results.iter().map(ClassificationResult::to_row).collect()
}

/// 書き込み操作を組み立てる
///
/// 存在確認とコミットの間は排他されない（同時に編集する他者は想定しない）
pub fn plan_ops(sheet_exists: bool, results: &[ClassificationResult]) -> Vec<SheetOp> {
    let sheet = RESULTS_SHEET.to_string();
    let mut ops = Vec::with_capacity(4);

    if sheet_exists {
        ops.push(SheetOp::ClearUsedRange { sheet: sheet.clone() });
    } else {
        ops.push(SheetOp::AddWorksheet { name: sheet.clone() });
    }

    ops.push(SheetOp::SetValues {
        sheet: sheet.clone(),
        address: "A1:C1".to_string(),
        values: vec![HEADER.iter().map(|h| CellValue::from(*h)).collect()],
    });

    if !results.is_empty() {
        ops.push(SheetOp::SetValues {
            sheet: sheet.clone(),
            address: format!("A2:C{}", results.len() + 1),
            values: result_rows(results),
        });
    }

    ops.push(SheetOp::Activate { sheet });
    ops
}

/// 結果シートを作成または初期化して書き込む
pub async fn write_results<W: Workbook + ?Sized>(
    host: &mut W,
    results: &[ClassificationResult],
) -> Result<()> {
    let exists = host
        .worksheet_exists(RESULTS_SHEET)
        .await
        .map_err(|e| ClassifierError::Workbook(e.0))?;

    let ops = plan_ops(exists, results);
    debug!(exists, rows = results.len(), "結果シートに書き込み");

    host.sync(ops)
        .await
        .map_err(|e| ClassifierError::Workbook(e.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryWorkbook, Sheet};

    fn result(item: &str, category: &str, probability: f64) -> ClassificationResult {
        ClassificationResult {
            item: item.into(),
            category: category.into(),
            probability,
        }
    }

    fn header_row() -> Vec<CellValue> {
        HEADER.iter().map(|h| CellValue::from(*h)).collect()
    }

    #[tokio::test]
    async fn test_creates_sheet_with_header_and_rows() {
        let mut book = MemoryWorkbook::new().with_sheet(Sheet::new("Sheet1"));
        let results = vec![
            result("apple", "fruit", 0.91),
            result("banana", "fruit", 0.774),
        ];

        write_results(&mut book, &results).await.unwrap();

        let sheet = book.sheet(RESULTS_SHEET).unwrap();
        assert_eq!(
            sheet.values(),
            vec![
                header_row(),
                vec!["apple".into(), "fruit".into(), CellValue::Number(0.91)],
                vec!["banana".into(), "fruit".into(), CellValue::Number(0.77)],
            ]
        );
        assert_eq!(book.active_sheet(), Some(RESULTS_SHEET));
    }

    #[tokio::test]
    async fn test_rewrite_is_idempotent() {
        let mut book = MemoryWorkbook::new().with_sheet(Sheet::new("Sheet1"));
        let first = vec![
            result("a", "x", 0.1),
            result("b", "y", 0.2),
            result("c", "z", 0.3),
        ];
        let second = vec![result("d", "w", 0.4)];

        write_results(&mut book, &first).await.unwrap();
        write_results(&mut book, &second).await.unwrap();
        write_results(&mut book, &second).await.unwrap();

        assert_eq!(book.sheet_count(RESULTS_SHEET), 1);
        let values = book.sheet(RESULTS_SHEET).unwrap().values();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0], header_row());
        assert_eq!(values[1], vec!["d".into(), "w".into(), CellValue::Number(0.4)]);
    }

    #[tokio::test]
    async fn test_existing_sheet_is_cleared_not_recreated() {
        let mut stale = Sheet::new(RESULTS_SHEET);
        stale.set(10, 5, "stale".into());
        let mut book = MemoryWorkbook::new()
            .with_sheet(Sheet::new("Sheet1"))
            .with_sheet(stale);

        write_results(&mut book, &[result("a", "x", 0.5)]).await.unwrap();

        assert_eq!(book.sheets()[1].name(), RESULTS_SHEET);
        let sheet = book.sheet(RESULTS_SHEET).unwrap();
        assert!(sheet.get(10, 5).is_none());
        assert_eq!(sheet.values().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_results_write_header_only() {
        let mut book = MemoryWorkbook::new();
        write_results(&mut book, &[]).await.unwrap();

        let sheet = book.sheet(RESULTS_SHEET).unwrap();
        assert_eq!(sheet.values(), vec![header_row()]);
    }

    #[test]
    fn test_plan_ops_order() {
        let ops = plan_ops(true, &[result("a", "x", 0.5)]);
        assert!(matches!(ops[0], SheetOp::ClearUsedRange { .. }));
        assert!(matches!(&ops[1], SheetOp::SetValues { address, .. } if address == "A1:C1"));
        assert!(matches!(&ops[2], SheetOp::SetValues { address, .. } if address == "A2:C2"));
        assert!(matches!(ops[3], SheetOp::Activate { .. }));
    }
}
