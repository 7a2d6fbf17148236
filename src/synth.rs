//! Entry-point wiring
//!
//! Instantiates every stack exactly once, in source order, threading
//! property bags from producers into consumers and recording the explicit
//! dependency edges, then triggers synthesis. A fixed, non-looping
//! sequence: the dependency graph is manually ordered here, not computed.

use crate::config::Config;
use crate::stacks;
use crate::ui;
use anyhow::{Context, Result};
use stackkit::{App, PropertyBag};
use std::path::Path;

/// Config sections every run requires, verified before any declaration
const REQUIRED_SECTIONS: &[&str] = &[
    "secret_creation",
    "ecs_task",
    "jw_app",
    "pub_ec2_test",
    "s3_obj_upload",
    "box_office_mojo",
    "box_office_catalog",
    "eb_network_stack",
    "eb_stack",
];

pub fn run(config_path: &Path, out_dir: &Path, quiet: bool) -> Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("loading configuration {}", config_path.display()))?;

    let app = build_app(&config)?;
    let assembly = app.synth(out_dir).context("writing assembly")?;

    if !quiet {
        ui::header("Synthesis");
        ui::kv("stacks", &app.stack_count().to_string());
        ui::kv("resources", &assembly.resources.to_string());
        ui::kv("assembly", &assembly.out_dir.display().to_string());
        println!();
        ui::success("Synthesis complete");
    }

    Ok(())
}

/// Construct the full application: all nine stacks plus their edges
pub fn build_app(config: &Config) -> Result<App> {
    // Fail fast: a broken configuration aborts with nothing declared.
    config.require_sections(REQUIRED_SECTIONS)?;

    let mut app = App::new();

    stacks::secret_creation(&mut app, config)?;
    stacks::ecs_task(&mut app, config)?;
    stacks::jw_app(&mut app, config)?;
    stacks::pub_ec2_test(&mut app, config)?;
    stacks::s3_obj_upload(&mut app, config)?;

    let box_office_props = stacks::box_office_mojo(&mut app, config)?;
    stacks::box_office_catalog(&mut app, config, box_office_props)?;
    app.add_dependency(
        stacks::box_office_catalog::NAME,
        stacks::box_office_mojo::NAME,
    )?;

    let network_props = stacks::eb_network(&mut app, config, eb_seed_props(config)?)?;
    stacks::eb_app(&mut app, config, network_props)?;
    app.add_dependency(stacks::eb_app::NAME, stacks::eb_network::NAME)?;

    Ok(app)
}

/// Seed bag for the EB pair, sourced from config
///
/// The network stack extends this with the identifiers it creates before
/// handing the bag to the application stack.
fn eb_seed_props(config: &Config) -> Result<PropertyBag> {
    Ok(PropertyBag::new()
        .with("vpc_name", config.get("eb_network_stack", "vpc_name")?)
        .with("wan_ip", config.get("eb_network_stack", "wan_ip")?)
        .with(
            "db_subnet_group_name",
            config.get("eb_network_stack", "db_subnet_group_name")?,
        )
        .with("beanstalk_stack", config.get("eb_stack", "beanstalk_stack")?)
        .with(
            "db_master_username",
            config.get("eb_stack", "db_master_username")?,
        )
        .with(
            "db_instance_engine",
            config.get("eb_stack", "db_instance_engine")?,
        )
        .with(
            "db_instance_identifier",
            config.get("eb_stack", "db_instance_identifier")?,
        )
        .with("db_name", config.get("eb_stack", "db_name")?))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    const SAMPLE: &str = r#"
[secret_creation]
aws_account = "111111111111"
aws_region = "us-east-1"

[ecs_task]
aws_account = "111111111111"
aws_region = "ap-northeast-2"
vpc_subnet = "subnet-0123456789abcdef0"
sg_id = "sg-0123456789abcdef0"
ecr_repo = "deployment-example-repo"
ecs_container = "deployment-example-container"

[jw_app]
aws_account = "111111111111"
aws_region = "ap-northeast-2"
vpc_cidr = "10.1.0.0/16"
pub_subnet_cidr_1 = "10.1.0.0/20"
pub_subnet_cidr_2 = "10.1.16.0/20"
pri_subnet_cidr_1 = "10.1.32.0/20"
pri_subnet_cidr_2 = "10.1.48.0/20"
nat_ami = "ami-0123456789abcdef0"

[pub_ec2_test]
aws_account = "111111111111"
aws_region = "ap-northeast-2"
jw_app_vpc = "vpc-0aa11bb22cc33dd44"
jw_app_pub_subnet1 = "subnet-0123456789abcdef1"
jw_app_pub_subnet2 = "subnet-0123456789abcdef2"
jw_app_sg = "sg-0123456789abcdef0"
word_press_pub_ec2_key = "wordpress-key"
ami_id = "ami-0fedcba9876543210"
word_press_pub_ec2_user_data_script = "/tmp/wordpress-user-data.sh"

[s3_obj_upload]
aws_account = "111111111111"
aws_region = "ap-northeast-2"
ecr_repo_web_service = "web-service"
ecr_repo_web_framework = "web-framework"

[box_office_mojo]
aws_account = "111111111111"
aws_region = "ap-northeast-2"

[box_office_catalog]
aws_account = "111111111111"
aws_region = "ap-northeast-2"
crawler_role = "arn:aws:iam::111111111111:role/box-office-crawler-role"

[eb_network_stack]
aws_account = "111111111111"
aws_region = "us-east-1"
vpc_name = "tutorial-vpc"
wan_ip = "203.0.113.9"
db_subnet_group_name = "eb-db-subnet-group"

[eb_stack]
aws_account = "111111111111"
aws_region = "us-east-1"
app_bundle_bucket = "my-eb-bundles"
app_bundle_key = "aws_onboarding.zip"
beanstalk_stack = "64bit Amazon Linux 2 v3.4.0 running Python 3.8"
db_master_username = "admin"
db_instance_engine = "mysql"
db_instance_identifier = "eb-db"
db_name = "ebdb"
"#;

    /// Sample configuration for stack tests that never touch the disk
    pub(crate) fn sample_config() -> &'static str {
        SAMPLE
    }

    /// Sample configuration with a real user-data script on disk
    ///
    /// The returned guard removes the script when dropped.
    pub(crate) fn sample_config_with_script() -> (String, tempfile::NamedTempFile) {
        let mut script = tempfile::NamedTempFile::new().unwrap();
        script
            .write_all(b"#!/bin/bash\nyum install -y httpd mariadb-server\n")
            .unwrap();

        let text = SAMPLE.replace(
            "/tmp/wordpress-user-data.sh",
            script.path().to_str().unwrap(),
        );
        (text, script)
    }

    #[test]
    fn test_builds_all_nine_stacks() {
        let (text, _script) = sample_config_with_script();
        let cfg = Config::parse(&text).unwrap();

        let app = build_app(&cfg).unwrap();
        assert_eq!(app.stack_count(), 9);
    }

    #[test]
    fn test_every_consumer_has_an_edge() {
        let (text, _script) = sample_config_with_script();
        let cfg = Config::parse(&text).unwrap();

        let app = build_app(&cfg).unwrap();
        let edges: Vec<(&str, &str)> = app
            .edges()
            .iter()
            .map(|e| (e.consumer.as_str(), e.producer.as_str()))
            .collect();

        assert!(edges.contains(&("eb-app", "eb-network")));
        assert!(edges.contains(&("box-office-catalog", "box-office-mojo")));
    }

    #[test]
    fn test_provisioning_order_puts_producers_first() {
        let (text, _script) = sample_config_with_script();
        let cfg = Config::parse(&text).unwrap();

        let app = build_app(&cfg).unwrap();
        let order = app.provisioning_order().unwrap();

        let pos = |name| order.iter().position(|n| *n == name).unwrap();
        assert!(pos("eb-network") < pos("eb-app"));
        assert!(pos("box-office-mojo") < pos("box-office-catalog"));
    }

    #[test]
    fn test_missing_section_aborts_before_declaring() {
        let (text, _script) = sample_config_with_script();
        let text = text.replace("[jw_app]", "[jw_app_renamed]");
        let cfg = Config::parse(&text).unwrap();

        let err = build_app(&cfg).unwrap_err();
        assert!(err.to_string().contains("missing config section"));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let (text, _script) = sample_config_with_script();
        let cfg = Config::parse(&text).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let first = dir.path().join("first");
        let second = dir.path().join("second");
        build_app(&cfg).unwrap().synth(&first).unwrap();
        build_app(&cfg).unwrap().synth(&second).unwrap();

        let mut names: Vec<String> = fs::read_dir(&first)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names.len(), 10); // nine templates plus the manifest

        for name in names {
            assert_eq!(
                fs::read_to_string(first.join(&name)).unwrap(),
                fs::read_to_string(second.join(&name)).unwrap(),
                "nondeterministic output in {name}"
            );
        }
    }

    #[test]
    fn test_run_writes_assembly() {
        let (text, _script) = sample_config_with_script();

        let mut config_file = tempfile::NamedTempFile::new().unwrap();
        config_file.write_all(text.as_bytes()).unwrap();
        let out = tempfile::tempdir().unwrap();

        run(config_file.path(), out.path(), true).unwrap();
        assert!(out.path().join("manifest.json").exists());
        assert!(out.path().join("eb-network.template.json").exists());
    }
}
