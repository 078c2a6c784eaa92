//! Sheet Classifier Common Library
//!
//! CLIとホスト実装で共有される型と純粋関数

pub mod address;
pub mod credential;
pub mod error;
pub mod request;
pub mod types;

pub use address::{column_name, CellRef, RangeAddress, MAX_COLS, MAX_ROWS};
pub use credential::{mask, Credential, SHORT_MASK};
pub use error::{Error, Result, ValidationError};
pub use request::{build_request, MAX_TOKENS, MODEL, TEMPERATURE};
pub use types::{
    CellValue, ClassificationRequest, ClassificationResult, Matrix, SelectionRegion,
    ServiceResponse,
};
