//! 分類ワークフロー
//!
//! Idle → Capturing(役割) → Submitting → (Succeeded | Failed) → Idle
//!
//! 送信中は `&mut self` を借用するため、同時に2つの送信は起こらない。

use crate::classifier::Classifier;
use crate::error::{ClassifierError, Result};
use crate::host::Workbook;
use crate::notification::{NotificationController, Severity};
use crate::selection::{self, FormState, Role};
use crate::settings::{KeyValueStore, SettingsStore};
use crate::writer::{self, RESULTS_SHEET};
use sheet_classifier_common::{build_request, ClassificationRequest, SelectionRegion};
use tracing::{debug, info, warn};

pub const PROCESSING_MESSAGE: &str = "Processing your request...";

pub const SETTINGS_SAVED_MESSAGE: &str = "Settings saved successfully!";

pub fn success_message() -> String {
    format!("Results updated in the \"{}\" sheet!", RESULTS_SHEET)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Capturing(Role),
    Submitting,
}

/// 直近の送信結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded { rows: usize },
    Failed,
}

pub struct WorkflowOrchestrator<W, C, S> {
    workbook: W,
    classifier: C,
    settings: SettingsStore<S>,
    notifications: NotificationController,
    form: FormState,
    state: WorkflowState,
    last_run: Option<RunOutcome>,
}

impl<W, C, S> WorkflowOrchestrator<W, C, S>
where
    W: Workbook,
    C: Classifier,
    S: KeyValueStore,
{
    pub fn new(
        workbook: W,
        classifier: C,
        settings: SettingsStore<S>,
        notifications: NotificationController,
    ) -> Self {
        Self {
            workbook,
            classifier,
            settings,
            notifications,
            form: FormState::default(),
            state: WorkflowState::Idle,
            last_run: None,
        }
    }

    /// 起動時: APIキーが未設定なら true（設定画面を開くべき）
    pub fn initialize(&self) -> bool {
        self.settings.load().is_none()
    }

    /// 設定画面に表示するマスク済みのAPIキー
    pub fn open_settings(&self) -> String {
        self.settings.masked()
    }

    /// 設定を保存する。マスク表示のままなら何もしない
    pub fn save_settings(&mut self, raw_input: &str) -> Result<()> {
        let shown = self.settings.masked();
        match self.settings.save(raw_input.trim(), &shown) {
            Ok(()) => {
                self.notifications.show(SETTINGS_SAVED_MESSAGE, Severity::Info, true);
                Ok(())
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// 現在の選択範囲を役割ごとのフォーム欄に取り込む
    pub async fn capture(&mut self, role: Role) -> Result<SelectionRegion> {
        self.state = WorkflowState::Capturing(role);
        let outcome = selection::capture(&mut self.workbook, role, &mut self.form).await;
        self.state = WorkflowState::Idle;

        match outcome {
            Ok(region) => {
                self.notifications.show(role.success_message(), Severity::Info, true);
                Ok(region)
            }
            Err(e) => {
                warn!(?role, error = %e, "範囲の取り込みに失敗");
                self.notifications.show(
                    format!("{}{}", role.error_prefix(), e),
                    Severity::Error,
                    true,
                );
                Err(e)
            }
        }
    }

    /// 分類を実行して結果シートを更新する。書き込んだ行数を返す
    ///
    /// 失敗はすべてエラー通知として表示したうえで返す
    pub async fn submit(&mut self, instructions: &str) -> Result<usize> {
        self.state = WorkflowState::Submitting;
        let outcome = self.run_submission(instructions).await;
        self.state = WorkflowState::Idle;

        self.last_run = Some(match &outcome {
            Ok(rows) => {
                info!(rows, "分類完了");
                RunOutcome::Succeeded { rows: *rows }
            }
            Err(e) => {
                warn!(error = %e, detail = ?e, "分類に失敗");
                RunOutcome::Failed
            }
        });
        outcome
    }

    async fn run_submission(&mut self, instructions: &str) -> Result<usize> {
        let credential = match self.settings.load() {
            Some(credential) => credential,
            None => return Err(self.report(ClassifierError::MissingCredential)),
        };

        let request = match self.prepare(instructions, &credential) {
            Ok(request) => request,
            Err(e) => return Err(self.report(e)),
        };
        debug!(payload = %request.redacted(), "リクエスト送信");

        let processing = self
            .notifications
            .show(PROCESSING_MESSAGE, Severity::Info, false);

        let outcome = self.classify_and_write(&request).await;
        match &outcome {
            Ok(_) => {
                self.notifications.show(success_message(), Severity::Info, true);
            }
            Err(e) => {
                self.notifications.show(e.to_string(), Severity::Error, true);
            }
        }

        self.notifications.dismiss(processing);
        outcome
    }

    fn prepare(
        &self,
        instructions: &str,
        credential: &sheet_classifier_common::Credential,
    ) -> Result<ClassificationRequest> {
        let input = self.form.region(Role::Input)?;
        let categories = self.form.region(Role::Categories)?;
        Ok(build_request(&input, &categories, instructions, Some(credential))?)
    }

    async fn classify_and_write(&mut self, request: &ClassificationRequest) -> Result<usize> {
        let results = self.classifier.classify(request).await?;
        debug!(count = results.len(), "分類結果を受信");
        writer::write_results(&mut self.workbook, &results).await?;
        Ok(results.len())
    }

    fn report(&self, err: ClassifierError) -> ClassifierError {
        self.notifications.show(err.to_string(), Severity::Error, true);
        err
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn last_run(&self) -> Option<RunOutcome> {
        self.last_run
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn notifications(&self) -> &NotificationController {
        &self.notifications
    }

    pub fn settings(&self) -> &SettingsStore<S> {
        &self.settings
    }

    pub fn workbook(&self) -> &W {
        &self.workbook
    }

    pub fn workbook_mut(&mut self) -> &mut W {
        &mut self.workbook
    }
}
