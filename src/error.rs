use sheet_classifier_common::ValidationError;
use thiserror::Error;

/// ワークフローのエラー
///
/// 表示文字列はそのままエラー通知のメッセージになる
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("Please set your API key in the settings.")]
    MissingCredential,

    #[error("Please fill in all required fields!")]
    MissingSelection,

    /// 選択範囲の読み取り失敗（ホストのメッセージをそのまま保持）
    #[error("{0}")]
    HostAccess(String),

    /// 結果シートへの書き込み失敗
    #[error("Error writing results: {0}")]
    Workbook(String),

    /// 接続不可・タイムアウトなど
    #[error("An error occurred while connecting to the server.")]
    Transport(String),

    #[error("Error: {message}")]
    Service { status: u16, message: String },

    #[error("Unexpected response from the server: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Common(sheet_classifier_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationError> for ClassifierError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingCredential => ClassifierError::MissingCredential,
            ValidationError::MissingSelection => ClassifierError::MissingSelection,
        }
    }
}

impl From<sheet_classifier_common::Error> for ClassifierError {
    fn from(err: sheet_classifier_common::Error) -> Self {
        match err {
            sheet_classifier_common::Error::Validation(v) => v.into(),
            sheet_classifier_common::Error::Json(e) => ClassifierError::JsonParse(e),
            other => ClassifierError::Common(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
