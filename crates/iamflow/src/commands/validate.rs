use super::resolve_format;
use colored::Colorize;
use iamflow_core::{ConfigFormat, PolicyRef, PolicyResolver};
use std::path::Path;

pub fn handle(config_path: &Path, format: Option<ConfigFormat>) -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());

    let format = resolve_format(config_path, format);
    let config = match iamflow_core::load(config_path, format).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %config_path.display(), "{}", e);
            eprintln!();
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    // 参照される全ポリシーを解決
    let mut resolver = PolicyResolver::for_config_file(config_path);
    let mut policy_errors = Vec::new();
    let policies: Vec<(String, &PolicyRef)> = config
        .groups
        .iter()
        .map(|g| (format!("group {}", g.group_name), &g.policy_document))
        .chain(config.roles.iter().flat_map(|r| {
            [
                (format!("role {}", r.role_name), &r.assume_role_policy_document),
                (format!("role {}", r.role_name), &r.policy_document),
            ]
        }))
        .collect();
    for (owner, policy) in policies {
        if let Err(e) = resolver.resolve(policy) {
            policy_errors.push(format!("{}: {}", owner, e));
        }
    }

    if !policy_errors.is_empty() {
        for error in &policy_errors {
            tracing::error!("{}", error);
        }
        eprintln!();
        eprintln!("{}", "✗ ポリシーエラー".red().bold());
        for error in &policy_errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(1);
    }

    println!("{}", "✓ 設定ファイルは正常です！".green().bold());
    println!();
    println!("サマリー:");
    println!("  サービス: {}", config.service_name().cyan());
    println!("  グループ: {}個", config.groups.len());
    for group in &config.groups {
        println!("    - {} ({})", group.group_name.cyan(), group.policy_name);
    }
    println!("  ユーザー: {}個", config.users.len());
    for user in &config.users {
        println!("    - {} [{}]", user.user_name.cyan(), user.groups.join(", "));
    }
    println!("  ロール: {}個", config.roles.len());
    for role in &config.roles {
        println!("    - {} ({})", role.role_name.cyan(), role.policy_name);
    }
    println!("  ポリシー: {}件", resolver.cached());
    println!("  操作数: {}", config.operation_count());

    Ok(())
}
