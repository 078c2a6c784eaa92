use anyhow::Context;
use clap::Parser;
use dialoguer::Password;
use sheet_classifier::{cli, config, console, host, settings};
use sheet_classifier::{HttpClassifier, NotificationController, Role, WorkflowOrchestrator};
use cli::{Cli, Commands};
use config::Config;
use settings::{FileStore, SettingsStore};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut config = Config::load().context("設定ファイルの読み込みに失敗しました")?;

    match cli.command {
        Commands::Settings { set_api_key, endpoint, show } => {
            let show = show || (set_api_key.is_none() && endpoint.is_none());
            let mut settings = SettingsStore::new(FileStore::open(config.settings_path()?));

            if let Some(key) = set_api_key {
                let shown = settings.masked();
                settings.save(key.trim(), &shown)?;
                println!("✔ Settings saved successfully!");
            }

            if let Some(endpoint) = endpoint {
                config.endpoint = endpoint;
                config.save().context("設定ファイルの保存に失敗しました")?;
                println!("✔ エンドポイントを保存しました: {}", config.endpoint);
            }

            if show {
                let masked = settings.masked();
                println!("設定:");
                println!("  エンドポイント: {}", config.endpoint);
                println!(
                    "  APIキー: {}",
                    if masked.is_empty() { "未設定" } else { masked.as_str() }
                );
                println!("  保存先: {}", settings.store().path().display());
            }
        }

        Commands::Classify { workbook, input, categories, instructions, endpoint, output } => {
            println!("📊 sheet-classifier - 分類\n");

            let store = FileStore::open(config.settings_path()?);
            let notifications = NotificationController::with_view(
                config.notification_delay(),
                Arc::new(console::ConsoleView::new()),
            );
            let endpoint = endpoint.unwrap_or_else(|| config.endpoint.clone());
            let classifier = HttpClassifier::new(endpoint, config.timeout())?;
            let mut book = host::XlsxWorkbook::open(&workbook)?;
            if let Some(output) = output {
                book = book.with_output(output);
            }
            let saved_to = book.output().to_path_buf();

            let mut orchestrator = WorkflowOrchestrator::new(
                book,
                classifier,
                SettingsStore::new(store),
                notifications,
            );

            // APIキー未設定なら入力を求める
            if orchestrator.initialize() {
                let key = Password::new()
                    .with_prompt("APIキー")
                    .allow_empty_password(true)
                    .interact()
                    .context("APIキーの入力に失敗しました")?;
                orchestrator.save_settings(&key)?;
            }

            for (role, address) in [(Role::Input, &input), (Role::Categories, &categories)] {
                if let Err(e) = orchestrator.workbook_mut().select(address) {
                    eprintln!("✖ {}{}", role.error_prefix(), e);
                    return Ok(ExitCode::FAILURE);
                }
                if orchestrator.capture(role).await.is_err() {
                    return Ok(ExitCode::FAILURE);
                }
            }

            match orchestrator.submit(&instructions).await {
                Ok(rows) => println!("\n✅ {}件を書き込みました: {}", rows, saved_to.display()),
                Err(_) => return Ok(ExitCode::FAILURE),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
