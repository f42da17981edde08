//! iamflow Core
//!
//! グループ・ユーザー・ロールを宣言する設定ファイルの読み込みと検証、
//! ポリシードキュメントの解決を提供します。

pub mod error;
pub mod loader;
pub mod model;
pub mod policy;
pub mod sample;

pub use error::{ConfigError, PolicyError, Result};
pub use loader::{ConfigFormat, dump, load, load_str};
pub use model::*;
pub use policy::{PolicyResolver, canonical_json};
