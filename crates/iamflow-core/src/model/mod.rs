//! モデル定義
//!
//! iamflowで使用される設定モデルを定義します。

mod config;
mod entity;
mod policy;

// Re-exports
pub use config::*;
pub use entity::*;
pub use policy::*;
