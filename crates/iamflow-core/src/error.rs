use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ファイルが見つかりません: {path}\n理由: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("設定ファイルのパースに失敗しました ({format}): {message}")]
    ParseError { format: String, message: String },

    #[error("設定のスキーマが不正です: {0}")]
    SchemaError(String),

    #[error("未対応の設定フォーマットです: {0} (yaml または json を指定してください)")]
    InvalidFormat(String),

    #[error("設定の検証に失敗しました:\n{}", format_problems(.0))]
    Validation(Vec<String>),
}

impl ConfigError {
    /// 検証エラーの問題一覧（検証エラー以外は空）
    pub fn problems(&self) -> &[String] {
        match self {
            ConfigError::Validation(problems) => problems,
            _ => &[],
        }
    }
}

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("ポリシーファイルが見つかりません: {path}\n理由: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ポリシーのJSONが不正です ({origin}): {source}")]
    ParseError {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

fn format_problems(problems: &[String]) -> String {
    problems
        .iter()
        .map(|p| format!("  - {}", p))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, ConfigError>;
