//! ポリシー解決
//!
//! [`PolicyRef`] をリモートに送信できる正規化済みのJSON文字列に変換します。

use crate::error::PolicyError;
use crate::model::PolicyRef;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// ポリシー参照の解決器
///
/// 1回の実行の間、解決結果を参照ごとにキャッシュします。
/// 失敗はキャッシュしません。
#[derive(Debug, Default)]
pub struct PolicyResolver {
    /// 相対パスの基準ディレクトリ（通常は設定ファイルのあるディレクトリ）
    base_dir: Option<PathBuf>,
    cache: HashMap<PolicyRef, String>,
}

impl PolicyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: Some(base_dir.as_ref().to_path_buf()),
            cache: HashMap::new(),
        }
    }

    /// 設定ファイルのパスから基準ディレクトリを決める
    pub fn for_config_file(config_path: &Path) -> Self {
        match config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => Self::with_base_dir(dir),
            _ => Self::new(),
        }
    }

    /// ポリシー参照を正規化済みJSON文字列に解決
    pub fn resolve(&mut self, policy: &PolicyRef) -> Result<String, PolicyError> {
        if let Some(cached) = self.cache.get(policy) {
            return Ok(cached.clone());
        }

        let resolved = match policy {
            PolicyRef::Inline(json) => canonical_json(json, "inline")?,
            PolicyRef::File(path) => {
                let path = self.locate(path);
                debug!(path = %path.display(), "Reading policy document");
                let content =
                    std::fs::read_to_string(&path).map_err(|source| PolicyError::NotFound {
                        path: path.clone(),
                        source,
                    })?;
                canonical_json(&content, &path.display().to_string())?
            }
        };

        self.cache.insert(policy.clone(), resolved.clone());
        Ok(resolved)
    }

    /// キャッシュ済みの参照数
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// キャッシュを破棄（次の実行ではファイルを読み直す）
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    fn locate(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// JSONテキストを正規化（キーをソートした compact 形式）
pub fn canonical_json(text: &str, origin: &str) -> Result<String, PolicyError> {
    let value: Value = serde_json::from_str(text).map_err(|source| PolicyError::ParseError {
        origin: origin.to_string(),
        source,
    })?;
    Ok(sort_keys(value).to_string())
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, value) in entries {
                sorted.insert(key, sort_keys(value));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
