mod commands;

use clap::{Parser, Subcommand};
use iamflow_core::ConfigFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "iamflow")]
#[command(about = "宣言するだけ。IAMは設定ファイルから。", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 設定ファイルのグループ・ユーザー・ロールをIAMに適用
    Apply {
        /// 設定ファイルのパス (YAML / JSON)
        #[arg(env = "IAMFLOW_CONFIG")]
        config: PathBuf,
        /// 設定ファイルのフォーマット (yaml, json)。省略時は拡張子から推定
        #[arg(short, long, env = "IAMFLOW_FORMAT")]
        format: Option<ConfigFormat>,
        /// 実際には何もせず、実行予定の操作だけを表示
        #[arg(short = 'n', long)]
        dry_run: bool,
        /// デバッグログを出力
        #[arg(short, long)]
        debug: bool,
        /// AWSリージョン。省略時は AWS の設定 (AWS_REGION, ~/.aws/config) から解決
        #[arg(long, env = "IAMFLOW_REGION")]
        region: Option<String>,
    },
    /// 設定ファイルとポリシーを検証（IAMへのアクセスなし）
    Validate {
        /// 設定ファイルのパス (YAML / JSON)
        #[arg(env = "IAMFLOW_CONFIG")]
        config: PathBuf,
        /// 設定ファイルのフォーマット (yaml, json)。省略時は拡張子から推定
        #[arg(short, long, env = "IAMFLOW_FORMAT")]
        format: Option<ConfigFormat>,
    },
    /// サンプル設定とポリシーファイルを生成
    Init {
        /// 出力先ディレクトリ
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// 既存ファイルを上書き
        #[arg(long)]
        force: bool,
    },
    /// バージョン情報を表示
    Version,
}

/// ログは stdout に出力（RUST_LOG を優先）
fn init_tracing(debug: bool) {
    let default = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default.into())
                .from_env_lossy(),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let debug = matches!(cli.command, Commands::Apply { debug: true, .. });
    init_tracing(debug);

    match cli.command {
        Commands::Apply {
            config,
            format,
            dry_run,
            debug: _,
            region,
        } => {
            commands::apply::handle(&config, format, dry_run, region.as_deref()).await?;
        }
        Commands::Validate { config, format } => {
            commands::validate::handle(&config, format)?;
        }
        Commands::Init { dir, force } => {
            commands::init::handle(&dir, force)?;
        }
        Commands::Version => {
            println!("iamflow {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
