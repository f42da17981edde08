//! ポリシー参照

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// ポリシードキュメントへの参照
///
/// 設定ファイル上はただの文字列で、`{` で始まればインラインのJSON、
/// それ以外はJSONファイルへのパスとして扱います。
/// 読み込んだ文字列をそのまま保持するため、ダンプしても元の表記に戻ります。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PolicyRef {
    /// インラインのJSONポリシー
    Inline(String),
    /// JSONファイルへのパス
    File(PathBuf),
}

impl PolicyRef {
    pub fn inline(json: impl Into<String>) -> Self {
        PolicyRef::Inline(json.into())
    }

    pub fn file(path: impl AsRef<Path>) -> Self {
        PolicyRef::File(path.as_ref().to_path_buf())
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, PolicyRef::Inline(_))
    }
}

impl From<String> for PolicyRef {
    fn from(value: String) -> Self {
        if value.trim_start().starts_with('{') {
            PolicyRef::Inline(value)
        } else {
            PolicyRef::File(PathBuf::from(value))
        }
    }
}

impl From<&str> for PolicyRef {
    fn from(value: &str) -> Self {
        PolicyRef::from(value.to_string())
    }
}

impl From<PolicyRef> for String {
    fn from(value: PolicyRef) -> Self {
        match value {
            PolicyRef::Inline(json) => json,
            PolicyRef::File(path) => path.to_string_lossy().into_owned(),
        }
    }
}

impl fmt::Display for PolicyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyRef::Inline(_) => write!(f, "<inline>"),
            PolicyRef::File(path) => write!(f, "{}", path.display()),
        }
    }
}
