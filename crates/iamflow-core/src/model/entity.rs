//! IDエンティティ定義

use super::policy::PolicyRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// グループ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// グループ名（設定内で一意）
    pub group_name: String,
    /// インラインポリシー名
    pub policy_name: String,
    /// グループに付与するポリシー
    pub policy_document: PolicyRef,
}

/// ユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// ユーザー名（設定内で一意）
    pub user_name: String,
    /// 所属グループ（記載順に追加される）
    #[serde(default)]
    pub groups: Vec<String>,
}

/// ロール
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// ロール名（設定内で一意）
    pub role_name: String,
    /// インラインポリシー名
    pub policy_name: String,
    /// ロールを引き受けられるプリンシパルを定義する信頼ポリシー
    pub assume_role_policy_document: PolicyRef,
    /// ロールに付与するポリシー
    pub policy_document: PolicyRef,
}

/// エンティティの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Group,
    User,
    Role,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Group, EntityKind::User, EntityKind::Role];
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Group => write!(f, "group"),
            EntityKind::User => write!(f, "user"),
            EntityKind::Role => write!(f, "role"),
        }
    }
}
