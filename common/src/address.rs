//! A1形式の範囲アドレス
//!
//! `A1`, `$B$2`, `A1:C3`, `Sheet1!A1:B2`, `'My Sheet'!C5` を扱う

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;

/// シートの行数の上限（1,048,576行）
pub const MAX_ROWS: u32 = 1_048_576;

/// シートの列数の上限（XFD = 16,384列）
pub const MAX_COLS: u32 = 16_384;

lazy_static::lazy_static! {
    static ref CELL_RE: Regex = Regex::new(r"^\$?([A-Za-z]{1,3})\$?([0-9]{1,7})$").unwrap();
}

/// セル位置（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// `C5` 形式のセルを解析
    pub fn parse(cell: &str) -> Result<Self> {
        let caps = CELL_RE
            .captures(cell.trim())
            .ok_or_else(|| Error::Address(cell.to_string()))?;

        let col = caps[1]
            .to_ascii_uppercase()
            .bytes()
            .fold(0u32, |acc, b| acc * 26 + u32::from(b - b'A' + 1));
        let row: u32 = caps[2]
            .parse()
            .map_err(|_| Error::Address(cell.to_string()))?;
        if row == 0 || row > MAX_ROWS || col > MAX_COLS {
            return Err(Error::Address(cell.to_string()));
        }

        Ok(Self {
            row: row - 1,
            col: col - 1,
        })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row + 1)
    }
}

/// 列番号（0始まり）を列名に変換: 0 → A, 25 → Z, 26 → AA
pub fn column_name(col: u32) -> String {
    let mut name = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

/// 矩形範囲（シート名は任意）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeAddress {
    pub sheet: Option<String>,
    pub start: CellRef,
    pub end: CellRef,
}

impl RangeAddress {
    /// アドレス文字列を解析する。始点と終点は左上/右下に正規化される
    pub fn parse(address: &str) -> Result<Self> {
        let address = address.trim();
        let (sheet, cells) = match address.rfind('!') {
            Some(idx) => {
                let name = address[..idx].trim_matches('\'').replace("''", "'");
                if name.is_empty() {
                    return Err(Error::Address(address.to_string()));
                }
                (Some(name), &address[idx + 1..])
            }
            None => (None, address),
        };

        let (first, second) = match cells.split_once(':') {
            Some((a, b)) => (CellRef::parse(a)?, CellRef::parse(b)?),
            None => {
                let cell = CellRef::parse(cells)?;
                (cell, cell)
            }
        };

        Ok(Self {
            sheet,
            start: CellRef::new(first.row.min(second.row), first.col.min(second.col)),
            end: CellRef::new(first.row.max(second.row), first.col.max(second.col)),
        })
    }

    pub fn rows(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    pub fn cols(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// シート名を付けたアドレス（ホストが返す形式）
    pub fn qualified(&self, sheet: &str) -> String {
        let needs_quote = sheet.chars().any(|c| !c.is_ascii_alphanumeric() && c != '_');
        if needs_quote {
            format!("'{}'!{}", sheet.replace('\'', "''"), self.local())
        } else {
            format!("{}!{}", sheet, self.local())
        }
    }

    /// シート名なしのアドレス
    pub fn local(&self) -> String {
        if self.start == self.end {
            self.start.to_string()
        } else {
            format!("{}:{}", self.start, self.end)
        }
    }
}

impl fmt::Display for RangeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sheet {
            Some(sheet) => f.write_str(&self.qualified(sheet)),
            None => f.write_str(&self.local()),
        }
    }
}
