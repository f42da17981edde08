//! `iamflow init` が書き出すサンプル設定

/// サンプル設定ファイル名
pub const CONFIG_FILE: &str = "iamflow.yaml";

/// S3 読み書きポリシーのファイル名
pub const S3_POLICY_FILE: &str = "example-allow-rw-to-s3.json";

/// EC2 からの AssumeRole を許可する信頼ポリシーのファイル名
pub const ASSUME_ROLE_POLICY_FILE: &str = "allow-assume-role-by-ec2-service.json";

pub const CONFIG: &str = r#"service: IAM

groups:
  - group_name: "group1"
    policy_name: "allow-rw-to-s3"
    policy_document: "example-allow-rw-to-s3.json"
  - group_name: "group2"
    policy_name: "allow-rw-to-s3"
    policy_document: "example-allow-rw-to-s3.json"
  - group_name: "group3"
    policy_name: "allow-rw-to-s3"
    policy_document: "example-allow-rw-to-s3.json"

users:
  - user_name: "user1"
    groups: [group2, group1]
  - user_name: "user2"
    groups: [group1]
  - user_name: "user3"
    groups: [group3, group2, group1]
  - user_name: "user4"
    groups: [group2, group3]

roles:
  - role_name: "role1-service"
    policy_name: "allow-rw-to-s3"
    assume_role_policy_document: "allow-assume-role-by-ec2-service.json"
    policy_document: "example-allow-rw-to-s3.json"
  - role_name: "role2-service"
    policy_name: "allow-rw-to-s3"
    assume_role_policy_document: "allow-assume-role-by-ec2-service.json"
    policy_document: "example-allow-rw-to-s3.json"
"#;

pub const ASSUME_ROLE_POLICY: &str = r#"{
    "Statement": [
        {
            "Effect": "Allow",
            "Action": ["sts:AssumeRole"],
            "Principal": {
                "Service": ["ec2.amazonaws.com"]
            }
        }
    ]
}
"#;

pub const S3_POLICY: &str = r#"{
    "Version": "2012-10-17",
    "Statement": [
        {
            "Effect": "Allow",
            "Action": [
                "s3:AbortMultipartUpload",
                "s3:DeleteObject",
                "s3:GetObject",
                "s3:GetObjectAcl",
                "s3:ListMultipartUploadParts",
                "s3:PutObject",
                "s3:PutObjectAcl"
            ],
            "Resource": ["arn:aws:s3:::example-bucket/*"]
        }
    ]
}
"#;

/// (ファイル名, 内容) の一覧
pub fn files() -> [(&'static str, &'static str); 3] {
    [
        (CONFIG_FILE, CONFIG),
        (S3_POLICY_FILE, S3_POLICY),
        (ASSUME_ROLE_POLICY_FILE, ASSUME_ROLE_POLICY),
    ]
}
