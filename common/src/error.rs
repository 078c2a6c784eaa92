//! エラー型定義

use thiserror::Error;

/// リクエスト組み立て時の検証エラー
///
/// 表示文字列はそのままユーザー向け通知に使われる
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please set your API key in the settings.")]
    MissingCredential,

    #[error("Please fill in all required fields!")]
    MissingSelection,
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid address: {0}")]
    Address(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = Error::Json(json_error);
        assert!(format!("{}", error).contains("JSON error"));
    }

    #[test]
    fn test_error_display_address() {
        let error = Error::Address("ZZZZ0".to_string());
        assert_eq!(format!("{}", error), "Invalid address: ZZZZ0");
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let error: Error = ValidationError::MissingSelection.into();
        assert_eq!(format!("{}", error), "Please fill in all required fields!");
        assert!(matches!(error, Error::Validation(ValidationError::MissingSelection)));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }
}
