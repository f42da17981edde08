//! 設定ローダー
//!
//! YAML / JSON の設定ファイルを読み込み、型付きの [`Configuration`] を生成

use crate::error::{ConfigError, Result};
use crate::model::Configuration;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, instrument};

/// 設定ファイルのフォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    #[default]
    Yaml,
    Json,
}

impl ConfigFormat {
    /// 拡張子からフォーマットを推定（.yaml / .yml / .json）
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl FromStr for ConfigFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            other => Err(ConfigError::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFormat::Yaml => write!(f, "yaml"),
            ConfigFormat::Json => write!(f, "json"),
        }
    }
}

/// パース直後の設定（service の有無を自前で検査するため Option で受ける）
#[derive(Debug, Deserialize)]
struct RawConfiguration {
    service: Option<String>,
    #[serde(default)]
    groups: Vec<crate::model::Group>,
    #[serde(default)]
    users: Vec<crate::model::User>,
    #[serde(default)]
    roles: Vec<crate::model::Role>,
}

impl RawConfiguration {
    fn into_configuration(self) -> Result<Configuration> {
        let service = match self.service {
            Some(service) if !service.trim().is_empty() => service,
            Some(_) => return Err(ConfigError::SchemaError("service が空です".to_string())),
            None => {
                return Err(ConfigError::SchemaError(
                    "必須キー service がありません".to_string(),
                ));
            }
        };

        Ok(Configuration {
            service,
            groups: self.groups,
            users: self.users,
            roles: self.roles,
        })
    }
}

/// 設定ファイルを読み込む
///
/// ファイルの読み込み以外の副作用はありません。
/// 参照整合性の検証は [`Configuration::validate`] で行います。
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load(path: &Path, format: ConfigFormat) -> Result<Configuration> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(bytes = content.len(), "Read configuration file");

    let config = load_str(&content, format)?;
    info!(
        service = %config.service,
        groups = config.groups.len(),
        users = config.users.len(),
        roles = config.roles.len(),
        "Configuration loaded"
    );
    Ok(config)
}

/// 文字列から設定を読み込む
pub fn load_str(content: &str, format: ConfigFormat) -> Result<Configuration> {
    let raw: RawConfiguration = match format {
        ConfigFormat::Yaml => {
            let value: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
                    format: format.to_string(),
                    message: e.to_string(),
                })?;
            if value.is_null() {
                return Err(ConfigError::SchemaError(
                    "必須キー service がありません".to_string(),
                ));
            }
            serde_yaml::from_value(value).map_err(|e| ConfigError::SchemaError(e.to_string()))?
        }
        ConfigFormat::Json => {
            let value: serde_json::Value =
                serde_json::from_str(content).map_err(|e| ConfigError::ParseError {
                    format: format.to_string(),
                    message: e.to_string(),
                })?;
            serde_json::from_value(value).map_err(|e| ConfigError::SchemaError(e.to_string()))?
        }
    };

    raw.into_configuration()
}

/// 設定をシリアライズする（load_str で元に戻せる形式）
pub fn dump(config: &Configuration, format: ConfigFormat) -> Result<String> {
    match format {
        ConfigFormat::Yaml => {
            serde_yaml::to_string(config).map_err(|e| ConfigError::SchemaError(e.to_string()))
        }
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map_err(|e| ConfigError::SchemaError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Group, PolicyRef, Role, User};
    use std::fs;

    const SAMPLE_YAML: &str = r#"
service: IAM

groups:
  - group_name: "group1"
    policy_name: "allow-rw-to-s3"
    policy_document: "example-allow-rw-to-s3.json"
  - group_name: "group2"
    policy_name: "allow-rw-to-s3"
    policy_document: '{"Statement": []}'

users:
  - user_name: "user1"
    groups: [group2, group1]

roles:
  - role_name: "role1-service"
    policy_name: "allow-rw-to-s3"
    assume_role_policy_document: "allow-assume-role-by-ec2-service.json"
    policy_document: "example-allow-rw-to-s3.json"
"#;

    fn sample() -> Configuration {
        Configuration {
            service: "IAM".to_string(),
            groups: vec![
                Group {
                    group_name: "group1".to_string(),
                    policy_name: "allow-rw-to-s3".to_string(),
                    policy_document: PolicyRef::file("policies/s3.json"),
                },
                Group {
                    group_name: "group2".to_string(),
                    policy_name: "inline".to_string(),
                    policy_document: PolicyRef::inline(r#"{"Version":"2012-10-17"}"#),
                },
            ],
            users: vec![User {
                user_name: "user1".to_string(),
                groups: vec!["group2".to_string(), "group1".to_string()],
            }],
            roles: vec![Role {
                role_name: "role1".to_string(),
                policy_name: "allow-rw-to-s3".to_string(),
                assume_role_policy_document: PolicyRef::file("assume.json"),
                policy_document: PolicyRef::file("policies/s3.json"),
            }],
        }
    }

    #[test]
    fn test_load_yaml() {
        let config = load_str(SAMPLE_YAML, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.service_name(), "iam");
        assert_eq!(config.groups.len(), 2);
        assert!(config.groups[1].policy_document.is_inline());
        assert_eq!(config.users[0].groups, vec!["group2", "group1"]);
        assert_eq!(
            config.roles[0].assume_role_policy_document,
            PolicyRef::file("allow-assume-role-by-ec2-service.json")
        );
    }

    #[test]
    fn test_round_trip_yaml_and_json() {
        let config = sample();
        for format in [ConfigFormat::Yaml, ConfigFormat::Json] {
            let text = dump(&config, format).unwrap();
            let loaded = load_str(&text, format).unwrap();
            assert_eq!(loaded, config, "round trip failed for {}", format);
        }
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("iamflow.json");
        fs::write(&path, r#"{"service": "iam"}"#).unwrap();

        let config = load(&path, ConfigFormat::Json).unwrap();
        assert_eq!(config.service, "iam");
        assert!(config.groups.is_empty());
        assert!(config.users.is_empty());
        assert!(config.roles.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = load(&temp_dir.path().join("nope.yaml"), ConfigFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_parse_error() {
        let result = load_str("service: [unclosed", ConfigFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));

        let result = load_str("{\"service\": ", ConfigFormat::Json);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_missing_service_is_schema_error() {
        let result = load_str("groups: []\n", ConfigFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::SchemaError(_))));

        let result = load_str("", ConfigFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::SchemaError(_))));

        let result = load_str(r#"{"service": ""}"#, ConfigFormat::Json);
        assert!(matches!(result, Err(ConfigError::SchemaError(_))));
    }

    #[test]
    fn test_wrong_shape_is_schema_error() {
        let result = load_str("service: iam\ngroups:\n  - policy_name: x\n", ConfigFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::SchemaError(_))));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("YAML".parse::<ConfigFormat>().unwrap(), ConfigFormat::Yaml);
        assert_eq!("yml".parse::<ConfigFormat>().unwrap(), ConfigFormat::Yaml);
        assert_eq!("json".parse::<ConfigFormat>().unwrap(), ConfigFormat::Json);
        assert!(matches!(
            "toml".parse::<ConfigFormat>(),
            Err(ConfigError::InvalidFormat(_))
        ));
        assert_eq!(
            ConfigFormat::from_path(Path::new("a/iamflow.yml")),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(ConfigFormat::from_path(Path::new("iamflow")), None);
    }
}
