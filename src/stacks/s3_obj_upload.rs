//! Object upload bucket and web service ECR repositories

use super::warn_open_policy;
use crate::config::Config;
use anyhow::Result;
use stackkit::{App, Attrs};

pub const NAME: &str = "s3-obj-upload";
const SECTION: &str = "s3_obj_upload";

const BUCKET_NAME: &str = "s3-obj-upload-bucket";

pub fn s3_obj_upload(app: &mut App, cfg: &Config) -> Result<()> {
    let web_service_repo = cfg.get(SECTION, "ecr_repo_web_service")?.to_string();
    let web_framework_repo = cfg.get(SECTION, "ecr_repo_web_framework")?.to_string();

    let stack = app.stack(NAME, cfg.env_target(SECTION)?)?;

    let bucket = stack.declare(
        "s3-obj-upload-bucket",
        "AWS::S3::Bucket",
        Attrs::new().set("BucketName", BUCKET_NAME),
    )?;

    warn_open_policy(BUCKET_NAME);
    stack.declare(
        "s3-obj-upload-bucket-policy",
        "AWS::S3::BucketPolicy",
        Attrs::new().set("Bucket", bucket.reference()).set(
            "PolicyDocument",
            Attrs::new().set("Version", "2012-10-17").set(
                "Statement",
                vec![
                    Attrs::new()
                        .set("Effect", "Allow")
                        // Renders to Principal: * (the original's StarPrincipal)
                        .set("Principal", "*")
                        .set(
                            "Action",
                            vec![
                                "s3:PutObject",
                                "s3:PutObjectAcl",
                                "s3:GetObject",
                                "s3:GetObjectAcl",
                                "s3:DeleteObject",
                            ],
                        )
                        .set(
                            "Resource",
                            vec![
                                format!("arn:aws:s3:::{BUCKET_NAME}"),
                                format!("arn:aws:s3:::{BUCKET_NAME}/*"),
                            ],
                        ),
                ],
            ),
        ),
    )?;

    stack.declare(
        "web-service-repo",
        "AWS::ECR::Repository",
        Attrs::new().set("RepositoryName", web_service_repo),
    )?;

    stack.declare(
        "web-framework-repo",
        "AWS::ECR::Repository",
        Attrs::new().set("RepositoryName", web_framework_repo),
    )?;

    Ok(())
}
