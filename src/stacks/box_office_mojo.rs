//! Box-office scrape data bucket
//!
//! Producer for the catalog stack: publishes the bucket name the crawler
//! points at.

use super::warn_open_policy;
use crate::config::Config;
use anyhow::Result;
use stackkit::{App, Attrs, PropertyBag};

pub const NAME: &str = "box-office-mojo";
const SECTION: &str = "box_office_mojo";

const BUCKET_NAME: &str = "box-office-mojo-bucket";

pub fn box_office_mojo(app: &mut App, cfg: &Config) -> Result<PropertyBag> {
    let stack = app.stack(NAME, cfg.env_target(SECTION)?)?;

    let bucket = stack.declare(
        "box-office-mojo",
        "AWS::S3::Bucket",
        Attrs::new().set("BucketName", BUCKET_NAME),
    )?;

    warn_open_policy(BUCKET_NAME);
    stack.declare(
        "box-office-mojo-policy",
        "AWS::S3::BucketPolicy",
        Attrs::new().set("Bucket", bucket.reference()).set(
            "PolicyDocument",
            Attrs::new().set("Version", "2012-10-17").set(
                "Statement",
                vec![
                    Attrs::new()
                        .set("Effect", "Allow")
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

    Ok(PropertyBag::new()
        .with("box_office_bucket", BUCKET_NAME)
        .with("box_office_bucket_id", bucket.id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::tests::sample_config;

    #[test]
    fn test_publishes_bucket_name() {
        let cfg = Config::parse(sample_config()).unwrap();
        let mut app = App::new();

        let props = box_office_mojo(&mut app, &cfg).unwrap();
        assert_eq!(
            props.get_str("box_office_bucket").unwrap(),
            "box-office-mojo-bucket"
        );
        assert_eq!(app.get(NAME).unwrap().resource_count(), 2);
    }
}
