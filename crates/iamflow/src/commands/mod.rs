pub mod apply;
pub mod init;
pub mod validate;

use iamflow_core::ConfigFormat;
use std::path::Path;

/// `--format` が無ければ拡張子から推定し、どちらも無ければ YAML
pub fn resolve_format(path: &Path, format: Option<ConfigFormat>) -> ConfigFormat {
    format
        .or_else(|| ConfigFormat::from_path(path))
        .unwrap_or_default()
}
