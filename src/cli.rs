use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheet-classifier")]
#[command(about = "ワークブックの範囲をAIで分類し、結果をシートに書き戻す", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 範囲を分類して "Analysis Results" シートに書き込む
    Classify {
        /// 対象のワークブック（.xlsx）
        #[arg(required = true)]
        workbook: PathBuf,

        /// 分類する項目の範囲（例: Sheet1!A1:A10）
        #[arg(short, long)]
        input: String,

        /// 候補カテゴリの範囲（例: Sheet1!B1:B3）
        #[arg(short, long)]
        categories: String,

        /// 分類の指示文
        #[arg(short = 'n', long, default_value = "")]
        instructions: String,

        /// 分類サービスのURL（省略時は設定ファイルの値）
        #[arg(long)]
        endpoint: Option<String>,

        /// 保存先（省略時は入力ファイルを上書き。書式・結合セルは保持されない）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集（オプションなしなら表示）
    Settings {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 分類サービスのURLを設定
        #[arg(long)]
        endpoint: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
