//! Configuration定義

use super::entity::{Group, Role, User};
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// プロビジョニング設定
///
/// 1回の実行につき1度だけ読み込まれ、以降は変更されません。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// 対象サービス名（例: "IAM"）。使用時に正規化される
    pub service: String,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl Configuration {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            groups: Vec::new(),
            users: Vec::new(),
            roles: Vec::new(),
        }
    }

    /// 正規化済みのサービス名（前後の空白を除去し小文字化）
    pub fn service_name(&self) -> String {
        self.service.trim().to_lowercase()
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.group_name == name)
    }

    /// 発行される操作の総数（グループ2件、ユーザー1+所属数、ロール2件）
    pub fn operation_count(&self) -> usize {
        let groups = self.groups.len() * 2;
        let users: usize = self.users.iter().map(|u| 1 + u.groups.len()).sum();
        let roles = self.roles.len() * 2;
        groups + users + roles
    }

    /// 設定全体を検証し、見つかった問題をすべて返す
    ///
    /// リモート呼び出しの前に必ず実行されます。
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.service_name().is_empty() {
            problems.push("service が空です".to_string());
        }

        let mut group_names = HashSet::new();
        for group in &self.groups {
            if group.group_name.trim().is_empty() {
                problems.push("group_name が空のグループがあります".to_string());
            } else if !group_names.insert(group.group_name.as_str()) {
                problems.push(format!("グループ '{}' が重複しています", group.group_name));
            }
        }

        let mut user_names = HashSet::new();
        for user in &self.users {
            if user.user_name.trim().is_empty() {
                problems.push("user_name が空のユーザーがあります".to_string());
            } else if !user_names.insert(user.user_name.as_str()) {
                problems.push(format!("ユーザー '{}' が重複しています", user.user_name));
            }

            for group in &user.groups {
                if !group_names.contains(group.as_str()) {
                    problems.push(format!(
                        "ユーザー '{}' が未定義のグループ '{}' を参照しています",
                        user.user_name, group
                    ));
                }
            }
        }

        let mut role_names = HashSet::new();
        for role in &self.roles {
            if role.role_name.trim().is_empty() {
                problems.push("role_name が空のロールがあります".to_string());
            } else if !role_names.insert(role.role_name.as_str()) {
                problems.push(format!("ロール '{}' が重複しています", role.role_name));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems))
        }
    }
}
