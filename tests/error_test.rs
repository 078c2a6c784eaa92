//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use sheet_classifier::error::ClassifierError;
use sheet_classifier::host::XlsxWorkbook;
use sheet_classifier::settings::{FileStore, KeyValueStore};
use sheet_classifier::HttpClassifier;
use sheet_classifier_common::ValidationError;
use tempfile::tempdir;

/// 存在しないワークブックを開いた場合
#[test]
fn test_open_nonexistent_workbook() {
    let result = XlsxWorkbook::open("/nonexistent/path/12345/book.xlsx");
    assert!(result.is_err());
}

/// 壊れた設定ファイルは空として扱う
#[test]
fn test_corrupt_settings_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = FileStore::open(&path);
    assert_eq!(store.get("apiKey"), None);
}

/// エンドポイントはそのまま保持される
#[test]
fn test_http_classifier_keeps_endpoint() {
    let classifier = HttpClassifier::new("http://localhost:5000/api/analyze", None).unwrap();
    assert_eq!(classifier.endpoint(), "http://localhost:5000/api/analyze");
}

/// ClassifierErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        ClassifierError::Config("テスト設定エラー".to_string()),
        ClassifierError::MissingCredential,
        ClassifierError::MissingSelection,
        ClassifierError::HostAccess("No range is currently selected.".to_string()),
        ClassifierError::Workbook("locked".to_string()),
        ClassifierError::Transport("connection refused".to_string()),
        ClassifierError::Service {
            status: 500,
            message: "rate limited".to_string(),
        },
        ClassifierError::MalformedResponse("missing results".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 通知に出るメッセージ
#[test]
fn test_user_facing_messages() {
    assert_eq!(
        ClassifierError::MissingCredential.to_string(),
        "Please set your API key in the settings."
    );
    assert_eq!(
        ClassifierError::MissingSelection.to_string(),
        "Please fill in all required fields!"
    );
    assert_eq!(
        ClassifierError::Transport("timed out".to_string()).to_string(),
        "An error occurred while connecting to the server."
    );

    let err = ClassifierError::Service {
        status: 429,
        message: "rate limited".to_string(),
    };
    assert_eq!(err.to_string(), "Error: rate limited");
}

/// エラーのDebug実装確認
#[test]
fn test_error_debug() {
    let err = ClassifierError::Transport("connection refused".to_string());
    let debug = format!("{:?}", err);

    assert!(debug.contains("Transport"));
    assert!(debug.contains("connection refused"));
}

/// 検証エラーからの変換
#[test]
fn test_validation_error_conversion() {
    let err: ClassifierError = ValidationError::MissingCredential.into();
    assert!(matches!(err, ClassifierError::MissingCredential));

    let err: ClassifierError = ValidationError::MissingSelection.into();
    assert!(matches!(err, ClassifierError::MissingSelection));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: ClassifierError = io_err.into();

    assert!(matches!(err, ClassifierError::Io(_)));
    let display = format!("{}", err);
    assert!(display.contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: ClassifierError = json_err.into();

    assert!(matches!(err, ClassifierError::JsonParse(_)));
}

/// common::Errorからの変換
#[test]
fn test_common_error_conversion() {
    let err: ClassifierError = sheet_classifier_common::Error::Address("ZZ".to_string()).into();
    assert!(matches!(err, ClassifierError::Common(_)));
    // 透過的エラーなのでメッセージがそのまま表示される
    assert_eq!(err.to_string(), "Invalid address: ZZ");

    let err: ClassifierError =
        sheet_classifier_common::Error::Validation(ValidationError::MissingSelection).into();
    assert!(matches!(err, ClassifierError::MissingSelection));
}
