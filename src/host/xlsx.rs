//! .xlsxファイルをホストとして扱うワークブック
//!
//! 読み込みはcalamine、コミット時の書き出しはrust_xlsxwriter。
//! 書き出すのはセル値と数式（計算結果付き）のみで、書式・結合セルは保持しない。
//! 元のファイルを残したい場合は `with_output` で別の保存先を指定する。

use super::memory::{MemoryWorkbook, Sheet};
use super::{HostError, RangeSnapshot, SheetOp, Workbook};
use crate::error::{ClassifierError, Result};
use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Formula;
use sheet_classifier_common::{CellRef, CellValue};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct XlsxWorkbook {
    path: PathBuf,
    output: PathBuf,
    book: MemoryWorkbook,
}

impl XlsxWorkbook {
    /// ファイルを読み込む
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(ClassifierError::Workbook(format!(
                "ファイルが見つかりません: {}",
                path.display()
            )));
        }

        let mut source = open_workbook_auto(&path)
            .map_err(|e| ClassifierError::Workbook(format!("{}: {}", path.display(), e)))?;

        let mut book = MemoryWorkbook::new();
        for name in source.sheet_names() {
            let range = source
                .worksheet_range(&name)
                .map_err(|e| ClassifierError::Workbook(format!("{}: {}", name, e)))?;

            let mut sheet = Sheet::new(name.clone());
            let (row0, col0) = range.start().unwrap_or((0, 0));
            for (r, row) in range.rows().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    if let Some(value) = cell_value(cell) {
                        sheet.set(row0 + r as u32, col0 + c as u32, value);
                    }
                }
            }

            match source.worksheet_formula(&name) {
                Ok(formulas) => {
                    let (row0, col0) = formulas.start().unwrap_or((0, 0));
                    for (r, row) in formulas.rows().enumerate() {
                        for (c, formula) in row.iter().enumerate() {
                            sheet.set_formula(row0 + r as u32, col0 + c as u32, formula);
                        }
                    }
                }
                Err(e) => warn!(sheet = %name, error = %e, "数式を読み込めません"),
            }
            book.push_sheet(sheet);
        }

        debug!(path = %path.display(), sheets = book.sheets().len(), "ワークブックを読み込み");
        Ok(Self {
            output: path.clone(),
            path,
            book,
        })
    }

    /// 保存先を変更する（既定は読み込んだファイル）
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn book(&self) -> &MemoryWorkbook {
        &self.book
    }

    /// 範囲を選択する（例: `Sheet1!A1:A10`）
    pub fn select(&mut self, address: &str) -> std::result::Result<(), HostError> {
        self.book.select(address)
    }
}

fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty => None,
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        other => Some(CellValue::Text(other.to_string())),
    }
}

fn write_xlsx(path: &Path, book: &MemoryWorkbook) -> std::result::Result<(), HostError> {
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| HostError::new(format!("Excel保存エラー: {}", e));

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let active = book.active_sheet().map(str::to_string);

    for sheet in book.sheets() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name()).map_err(xlsx_err)?;

        for (cell, formula) in sheet.formulas() {
            let mut formula = Formula::new(formula);
            if let Some(cached) = sheet.get(cell.row, cell.col) {
                formula = formula.set_result(cached.to_string());
            }
            worksheet
                .write_formula(cell.row, column(cell)?, formula)
                .map_err(xlsx_err)?;
        }

        for (cell, value) in sheet.cells() {
            if sheet.formula(cell.row, cell.col).is_some() {
                continue;
            }
            let col = column(cell)?;
            match value {
                CellValue::Number(n) => {
                    worksheet.write_number(cell.row, col, *n).map_err(xlsx_err)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(cell.row, col, *b).map_err(xlsx_err)?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string(cell.row, col, s).map_err(xlsx_err)?;
                }
                CellValue::Null => {}
            }
        }

        if active.as_deref() == Some(sheet.name()) {
            worksheet.set_active(true);
        }
    }

    // 一時ファイルに書いてから置き換える
    let tmp_path = path.with_extension("xlsx.tmp");
    workbook.save(&tmp_path).map_err(xlsx_err)?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        HostError::new(format!(
            "Excel保存エラー: {} → {}: {}",
            tmp_path.display(),
            path.display(),
            e
        ))
    })?;
    Ok(())
}

fn column(cell: CellRef) -> std::result::Result<u16, HostError> {
    u16::try_from(cell.col).map_err(|_| HostError::new(format!("列番号が範囲外です: {}", cell)))
}

#[async_trait]
impl Workbook for XlsxWorkbook {
    async fn selected_range(&mut self) -> std::result::Result<RangeSnapshot, HostError> {
        self.book.selected_range().await
    }

    async fn worksheet_exists(&mut self, name: &str) -> std::result::Result<bool, HostError> {
        self.book.worksheet_exists(name).await
    }

    async fn sync(&mut self, ops: Vec<SheetOp>) -> std::result::Result<(), HostError> {
        let mut staged = self.book.clone();
        staged.apply_all(&ops)?;
        write_xlsx(&self.output, &staged)?;
        debug!(path = %self.output.display(), ops = ops.len(), "ワークブックを保存");
        self.book = staged;
        Ok(())
    }
}
