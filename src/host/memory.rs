//! メモリ上のワークブック
//!
//! テストと、ファイル版ワークブックの内部表現に使う

use super::{HostError, RangeSnapshot, SheetOp, Workbook};
use async_trait::async_trait;
use sheet_classifier_common::{CellRef, CellValue, Matrix, RangeAddress};
use std::collections::BTreeMap;

const DIMENSION_MISMATCH: &str =
    "The number of rows or columns in the input array doesn't match the size or dimensions of the range.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<CellRef, CellValue>,
    /// 数式（先頭の `=` なし）。値は最後に計算された結果
    formulas: BTreeMap<CellRef, String>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            formulas: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 空の値を書くとセルが空になる。数式は値で上書きされる
    pub fn set(&mut self, row: u32, col: u32, value: CellValue) {
        let cell = CellRef::new(row, col);
        self.formulas.remove(&cell);
        if value.is_empty() {
            self.cells.remove(&cell);
        } else {
            self.cells.insert(cell, value);
        }
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&CellRef::new(row, col))
    }

    /// 数式を設定する（計算結果の値はそのまま）
    pub fn set_formula(&mut self, row: u32, col: u32, formula: &str) {
        let formula = formula.trim().trim_start_matches('=');
        let cell = CellRef::new(row, col);
        if formula.is_empty() {
            self.formulas.remove(&cell);
        } else {
            self.formulas.insert(cell, formula.to_string());
        }
    }

    pub fn formula(&self, row: u32, col: u32) -> Option<&str> {
        self.formulas.get(&CellRef::new(row, col)).map(String::as_str)
    }

    /// 数式のあるセル（行優先順）
    pub fn formulas(&self) -> impl Iterator<Item = (CellRef, &str)> {
        self.formulas.iter().map(|(cell, f)| (*cell, f.as_str()))
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.formulas.clear();
    }

    /// 値のあるセル（行優先順）
    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &CellValue)> {
        self.cells.iter().map(|(cell, value)| (*cell, value))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.formulas.is_empty()
    }

    /// A1から使用範囲の右下までの値（空セルは空文字列）
    pub fn values(&self) -> Matrix {
        let Some(last_row) = self.cells.keys().map(|c| c.row).max() else {
            return Vec::new();
        };
        let last_col = self.cells.keys().map(|c| c.col).max().unwrap_or(0);

        (0..=last_row)
            .map(|row| {
                (0..=last_col)
                    .map(|col| self.get(row, col).cloned().unwrap_or_else(CellValue::empty))
                    .collect()
            })
            .collect()
    }

    fn read(&self, range: &RangeAddress) -> Matrix {
        (range.start.row..=range.end.row)
            .map(|row| {
                (range.start.col..=range.end.col)
                    .map(|col| self.get(row, col).cloned().unwrap_or_else(CellValue::empty))
                    .collect()
            })
            .collect()
    }

    fn write(&mut self, range: &RangeAddress, values: &Matrix) -> Result<(), HostError> {
        let rows_match = values.len() == range.rows() as usize;
        let cols_match = values.iter().all(|row| row.len() == range.cols() as usize);
        if !rows_match || !cols_match {
            return Err(HostError::new(DIMENSION_MISMATCH));
        }

        for (r, row) in values.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                self.set(range.start.row + r as u32, range.start.col + c as u32, value.clone());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<Sheet>,
    active: Option<usize>,
    selection: Option<RangeAddress>,
    sync_count: usize,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// シートを追加する（最初のシートがアクティブになる）
    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.push_sheet(sheet);
        self
    }

    pub fn push_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
        if self.active.is_none() {
            self.active = Some(0);
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sheets
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.position(name).map(|idx| &self.sheets[idx])
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.position(name).map(move |idx| &mut self.sheets[idx])
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_count(&self, name: &str) -> usize {
        self.sheets
            .iter()
            .filter(|s| s.name.eq_ignore_ascii_case(name))
            .count()
    }

    pub fn active_sheet(&self) -> Option<&str> {
        self.active.map(|idx| self.sheets[idx].name.as_str())
    }

    /// コミットに成功した `sync` の回数
    pub fn sync_count(&self) -> usize {
        self.sync_count
    }

    /// 範囲を選択する。シート名がなければアクティブシートを使う
    pub fn select(&mut self, address: &str) -> Result<(), HostError> {
        let mut range =
            RangeAddress::parse(address).map_err(|e| HostError::new(e.to_string()))?;

        let sheet = match range.sheet.take() {
            Some(name) => self
                .sheet(&name)
                .map(|s| s.name.clone())
                .ok_or_else(|| HostError::new(format!("The worksheet '{}' does not exist.", name)))?,
            None => self
                .active_sheet()
                .map(str::to_string)
                .ok_or_else(|| HostError::new("The workbook has no worksheets."))?,
        };

        range.sheet = Some(sheet);
        self.selection = Some(range);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn apply(&mut self, op: &SheetOp) -> Result<(), HostError> {
        match op {
            SheetOp::AddWorksheet { name } => {
                if self.position(name).is_some() {
                    return Err(HostError::new(format!(
                        "A worksheet named '{}' already exists.",
                        name
                    )));
                }
                self.push_sheet(Sheet::new(name.clone()));
            }
            SheetOp::ClearUsedRange { sheet } => {
                self.existing_mut(sheet)?.clear();
            }
            SheetOp::SetValues { sheet, address, values } => {
                let range =
                    RangeAddress::parse(address).map_err(|e| HostError::new(e.to_string()))?;
                self.existing_mut(sheet)?.write(&range, values)?;
            }
            SheetOp::Activate { sheet } => {
                let idx = self
                    .position(sheet)
                    .ok_or_else(|| Self::missing(sheet))?;
                self.active = Some(idx);
            }
        }
        Ok(())
    }

    fn existing_mut(&mut self, name: &str) -> Result<&mut Sheet, HostError> {
        self.sheet_mut(name).ok_or_else(|| Self::missing(name))
    }

    fn missing(name: &str) -> HostError {
        HostError::new(format!("The worksheet '{}' does not exist.", name))
    }

    /// 操作をまとめて適用する（失敗時は変更なし）
    pub fn apply_all(&mut self, ops: &[SheetOp]) -> Result<(), HostError> {
        let mut staged = self.clone();
        for op in ops {
            staged.apply(op)?;
        }
        staged.sync_count += 1;
        *self = staged;
        Ok(())
    }
}

#[async_trait]
impl Workbook for MemoryWorkbook {
    async fn selected_range(&mut self) -> Result<RangeSnapshot, HostError> {
        let range = self
            .selection
            .clone()
            .ok_or_else(|| HostError::new("No range is currently selected."))?;
        let sheet_name = range.sheet.clone().unwrap_or_default();
        let sheet = self
            .sheet(&sheet_name)
            .ok_or_else(|| Self::missing(&sheet_name))?;

        Ok(RangeSnapshot {
            address: range.qualified(sheet.name()),
            values: sheet.read(&range),
        })
    }

    async fn worksheet_exists(&mut self, name: &str) -> Result<bool, HostError> {
        Ok(self.position(name).is_some())
    }

    async fn sync(&mut self, ops: Vec<SheetOp>) -> Result<(), HostError> {
        self.apply_all(&ops)
    }
}
