use colored::Colorize;
use iamflow_core::sample;
use std::fs;
use std::path::Path;

pub fn handle(dir: &Path, force: bool) -> anyhow::Result<()> {
    fs::create_dir_all(dir)?;

    let files = sample::files();
    if !force {
        let existing: Vec<&str> = files
            .iter()
            .filter(|(name, _)| dir.join(name).exists())
            .map(|(name, _)| *name)
            .collect();
        if !existing.is_empty() {
            anyhow::bail!(
                "既にファイルが存在します: {} (上書きするには --force)",
                existing.join(", ")
            );
        }
    }

    for (name, content) in files {
        fs::write(dir.join(name), content)?;
        println!("  {} {}", "作成:".green(), dir.join(name).display());
    }

    println!();
    println!("{}", "✓ サンプル設定を生成しました".green().bold());
    println!(
        "  次のステップ: iamflow apply --dry-run {}",
        dir.join(sample::CONFIG_FILE).display()
    );

    Ok(())
}
