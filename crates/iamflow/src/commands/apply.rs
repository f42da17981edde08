use super::resolve_format;
use colored::Colorize;
use iamflow_cloud::{
    EntityState, LogSink, OperationClient, Provisioner, Reporter, RunReport, TracingSink,
};
use iamflow_cloud_aws::IamService;
use iamflow_core::{ConfigFormat, PolicyResolver};
use std::path::Path;
use std::sync::Arc;
use tracing::Level;

pub async fn handle(
    config_path: &Path,
    format: Option<ConfigFormat>,
    dry_run: bool,
    region: Option<&str>,
) -> anyhow::Result<()> {
    let format = resolve_format(config_path, format);

    let config = match iamflow_core::load(config_path, format) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %config_path.display(), "{}", e);
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    let sink: Arc<dyn LogSink> = Arc::new(TracingSink::for_service(&config.service_name()));
    let (client, target) = if dry_run {
        (OperationClient::dry_run(sink.clone()), "dry run".to_string())
    } else {
        let iam = match IamService::connect(region).await {
            Ok(iam) => iam,
            Err(e) => {
                sink.log(Level::ERROR, &e.to_string());
                eprintln!("{}", "✗ AWSに接続できません".red().bold());
                eprintln!("  {}", e);
                std::process::exit(1);
            }
        };
        let target = iam.region().to_string();
        (OperationClient::new(Arc::new(iam), sink.clone()), target)
    };

    println!(
        "{} {} ({})",
        "適用中:".blue(),
        config_path.display().to_string().cyan(),
        target
    );

    let reporter = Reporter::new(sink);
    let resolver = PolicyResolver::for_config_file(config_path);
    let mut provisioner = Provisioner::new(client, resolver, reporter);

    let report = match provisioner.run(&config).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 設定が不正なため何も実行していません".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    print_result(&report);

    if !report.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_result(report: &RunReport) {
    println!();
    if report.is_success() {
        let message = if report.dry_run {
            "✓ dry run 完了（変更なし）"
        } else {
            "✓ 適用が完了しました"
        };
        println!("{}", message.green().bold());
        return;
    }

    if let Some(reason) = &report.aborted {
        eprintln!("{}", "✗ 適用を中断しました".red().bold());
        eprintln!("  {}", reason);
    } else {
        eprintln!("{}", "✗ 一部の適用に失敗しました".red().bold());
    }

    for entity in &report.entities {
        match entity.state {
            EntityState::Failed => eprintln!(
                "  {} {} {}",
                "✗".red(),
                entity.kind,
                entity.name.cyan()
            ),
            EntityState::Pending => eprintln!(
                "  {} {} {} (未実行)",
                "-".dimmed(),
                entity.kind,
                entity.name
            ),
            _ => {}
        }
    }
}
