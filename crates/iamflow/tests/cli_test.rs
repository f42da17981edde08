#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

mod common;

use assert_cmd::Command;
use common::TestProject;
use predicates::prelude::*;

fn iamflow() -> Command {
    let mut cmd = Command::cargo_bin("iamflow").unwrap();
    cmd.env_remove("IAMFLOW_CONFIG")
        .env_remove("IAMFLOW_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    iamflow()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("init"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    iamflow()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("iamflow"));
}

/// applyコマンドのヘルプにフラグが表示されることを確認
#[test]
fn test_apply_help() {
    iamflow()
        .args(["apply", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--region"))
        .stdout(predicate::str::contains("<CONFIG>"))
        .stdout(predicate::str::contains("us-east-1").not());
}

/// 不正なコマンドでエラーになることを確認
#[test]
fn test_invalid_command() {
    iamflow().arg("invalid-command").assert().failure();
}

/// initでサンプル一式が生成されることを確認
#[test]
fn test_init_writes_sample_files() {
    let project = TestProject::new();

    iamflow()
        .arg("init")
        .arg(project.path())
        .assert()
        .success();

    assert!(project.path().join("iamflow.yaml").exists());
    assert!(project.path().join("example-allow-rw-to-s3.json").exists());
    assert!(
        project
            .path()
            .join("allow-assume-role-by-ec2-service.json")
            .exists()
    );

    // 2回目は --force が無いと失敗
    iamflow()
        .arg("init")
        .arg(project.path())
        .assert()
        .failure();

    iamflow()
        .args(["init", "--force"])
        .arg(project.path())
        .assert()
        .success();
}

/// initの出力がそのまま検証を通ることを確認
#[test]
fn test_validate_sample() {
    let project = TestProject::new();
    iamflow().arg("init").arg(project.path()).assert().success();

    iamflow()
        .arg("validate")
        .arg(project.path().join("iamflow.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("設定ファイルは正常です"))
        .stdout(predicate::str::contains("操作数: 22"));
}

/// 存在しない設定ファイルでvalidateが失敗することを確認
#[test]
fn test_validate_missing_file() {
    let project = TestProject::new();
    iamflow()
        .arg("validate")
        .arg(project.path().join("nope.yaml"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("ERROR"))
        .stdout(predicate::str::contains("設定ファイルが見つかりません"));
}

/// 存在しない設定ファイルでapplyがエラーをログに出して失敗することを確認
#[test]
fn test_apply_missing_file_logs_error() {
    let project = TestProject::new();
    iamflow()
        .args(["apply", "--dry-run"])
        .arg(project.path().join("nope.yaml"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("ERROR"))
        .stdout(predicate::str::contains("nope.yaml"));
}

/// 未定義グループへの参照でvalidateが失敗することを確認
#[test]
fn test_validate_unknown_group() {
    let project = TestProject::new();
    project.write_policy("s3.json");
    let config = project.write(
        "iam.yaml",
        r#"
service: iam
groups:
  - group_name: group1
    policy_name: s3
    policy_document: s3.json
users:
  - user_name: user1
    groups: [group1, group9]
"#,
    );

    iamflow()
        .arg("validate")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("group9"));
}

/// 存在しないポリシーファイルでvalidateが失敗することを確認
#[test]
fn test_validate_missing_policy() {
    let project = TestProject::new();
    let config = project.write(
        "iam.yaml",
        r#"
service: iam
roles:
  - role_name: role1
    policy_name: s3
    assume_role_policy_document: '{"Statement": []}'
    policy_document: missing.json
"#,
    );

    iamflow()
        .arg("validate")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.json"));
}

/// JSON形式の設定も拡張子から判定されることを確認
#[test]
fn test_validate_json_config() {
    let project = TestProject::new();
    let config = project.write(
        "iam.json",
        r#"{"service": "iam", "users": [{"user_name": "user1"}]}"#,
    );

    iamflow().arg("validate").arg(&config).assert().success();
}

/// 不正なフォーマット指定でエラーになることを確認
#[test]
fn test_invalid_format() {
    let project = TestProject::new();
    let config = project.write("iam.yaml", "service: iam\n");

    iamflow()
        .args(["validate", "--format", "toml"])
        .arg(&config)
        .assert()
        .failure();
}

/// dry runではIAMに接続せずに実行予定の操作がログに出ることを確認
#[test]
fn test_apply_dry_run_sample() {
    let project = TestProject::new();
    iamflow().arg("init").arg(project.path()).assert().success();

    iamflow()
        .args(["apply", "--dry-run"])
        .arg(project.path().join("iamflow.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No action will be taken"))
        .stdout(predicate::str::contains("outcome=would-perform"))
        .stdout(predicate::str::contains("action=AddUserToGroup"))
        .stdout(predicate::str::contains("iamflow-iam"))
        .stdout(predicate::str::contains("iamflow_cloud::client").not());
}

/// 設定ファイルは環境変数からも指定できることを確認
#[test]
fn test_apply_config_from_env() {
    let project = TestProject::new();
    iamflow().arg("init").arg(project.path()).assert().success();

    iamflow()
        .env("IAMFLOW_CONFIG", project.path().join("iamflow.yaml"))
        .args(["apply", "-n"])
        .assert()
        .success();
}

/// 未定義グループへの参照があるとapplyは何も実行せず失敗することを確認
#[test]
fn test_apply_rejects_unknown_group() {
    let project = TestProject::new();
    project.write_policy("s3.json");
    let config = project.write(
        "iam.yaml",
        r#"
service: iam
groups:
  - group_name: group1
    policy_name: s3
    policy_document: s3.json
users:
  - user_name: user1
    groups: [group9]
"#,
    );

    iamflow()
        .args(["apply", "--dry-run"])
        .arg(&config)
        .assert()
        .failure()
        .stdout(predicate::str::contains("would-perform").not());
}

/// 未対応サービスではdry runでも中断されることを確認
#[test]
fn test_apply_unknown_service_aborts() {
    let project = TestProject::new();
    let config = project.write("iam.yaml", "service: s3\n");

    iamflow()
        .args(["apply", "--dry-run"])
        .arg(&config)
        .assert()
        .failure()
        .stdout(predicate::str::contains("run aborted"));
}

/// ロールのポリシーファイルが無い場合、そのロールだけ失敗することを確認
#[test]
fn test_apply_dry_run_missing_role_policy() {
    let project = TestProject::new();
    project.write_policy("s3.json");
    let config = project.write(
        "iam.yaml",
        r#"
service: iam
roles:
  - role_name: role1
    policy_name: s3
    assume_role_policy_document: '{"Statement": []}'
    policy_document: s3.json
  - role_name: role2
    policy_name: s3
    assume_role_policy_document: '{"Statement": []}'
    policy_document: missing.json
  - role_name: role3
    policy_name: s3
    assume_role_policy_document: '{"Statement": []}'
    policy_document: s3.json
"#,
    );

    iamflow()
        .args(["apply", "--dry-run"])
        .arg(&config)
        .assert()
        .failure()
        .stdout(predicate::str::contains("name=role3 action=PutRolePolicy"))
        .stderr(predicate::str::contains("role2"));
}
