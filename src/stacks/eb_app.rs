//! Elastic Beanstalk application stack
//!
//! The consumer side of the EB pair: application + version, instance
//! profile, the Beanstalk environment wired into the network stack's VPC,
//! subnets and security group, and the MySQL instance behind it. Every
//! network identifier comes from the `eb-network` property bag; the entry
//! point records the matching dependency edge.

use crate::config::Config;
use anyhow::Result;
use serde_json::json;
use stackkit::{App, AttrValue, Attrs, PropertyBag};

pub const NAME: &str = "eb-app";
const SECTION: &str = "eb_stack";

const APP_NAME: &str = "myEbApp";

/// Secret name and the JSON key the generated password lands under
const DB_PASSWORD_SECRET: &str = "db-master-user-password";

fn option_setting(namespace: &str, option_name: &str, value: impl Into<AttrValue>) -> Attrs {
    Attrs::new()
        .set("Namespace", namespace)
        .set("OptionName", option_name)
        .set("Value", value)
}

pub fn eb_app(app: &mut App, cfg: &Config, props: PropertyBag) -> Result<()> {
    let stack = app.stack(NAME, cfg.env_target(SECTION)?)?;

    let eb_app = stack.declare(
        "my-application",
        "AWS::ElasticBeanstalk::Application",
        Attrs::new().set("ApplicationName", APP_NAME),
    )?;

    // Source bundle uploaded out of band; the bucket/key point at it.
    let app_version = stack.declare(
        "my-app-version",
        "AWS::ElasticBeanstalk::ApplicationVersion",
        Attrs::new()
            .set("ApplicationName", eb_app.reference())
            .set(
                "SourceBundle",
                Attrs::new()
                    .set("S3Bucket", cfg.get(SECTION, "app_bundle_bucket")?)
                    .set("S3Key", cfg.get(SECTION, "app_bundle_key")?),
            ),
    )?;

    let role = stack.declare(
        "eb-ec2-role",
        "AWS::IAM::Role",
        Attrs::new()
            .set(
                "AssumeRolePolicyDocument",
                Attrs::new().set("Version", "2012-10-17").set(
                    "Statement",
                    vec![
                        Attrs::new()
                            .set("Effect", "Allow")
                            .set("Action", "sts:AssumeRole")
                            .set("Principal", Attrs::new().set("Service", "ec2.amazonaws.com")),
                    ],
                ),
            )
            .set(
                "ManagedPolicyArns",
                vec!["arn:aws:iam::aws:policy/AWSElasticBeanstalkWebTier"],
            ),
    )?;

    let profile_name = format!("{APP_NAME}-InstanceProfile");
    stack.declare(
        "eb-instance-profile",
        "AWS::IAM::InstanceProfile",
        Attrs::new()
            .set("InstanceProfileName", profile_name.as_str())
            .set("Roles", vec![role.reference()]),
    )?;

    // Most of these reference resources created in the network stack.
    let public_subnets = format!(
        "{}, {}",
        props.get_str("public_subnet_id_1")?,
        props.get_str("public_subnet_id_2")?
    );
    let option_settings = vec![
        option_setting("aws:ec2:vpc", "VPCId", props.get_str("vpc-id")?),
        option_setting("aws:ec2:vpc", "Subnets", public_subnets.as_str()),
        option_setting("aws:ec2:vpc", "ELBSubnets", public_subnets.as_str()),
        option_setting("aws:ec2:instances", "InstanceTypes", "t2.micro"),
        option_setting(
            "aws:autoscaling:launchconfiguration",
            "SecurityGroups",
            props.get_str("webserver_sg_id")?,
        ),
        option_setting(
            "aws:elasticbeanstalk:environment",
            "LoadBalancerType",
            "application",
        ),
        option_setting(
            "aws:autoscaling:launchconfiguration",
            "IamInstanceProfile",
            profile_name.as_str(),
        ),
        option_setting("aws:autoscaling:asg", "MinSize", "1"),
        option_setting("aws:autoscaling:asg", "MaxSize", "1"),
    ];

    stack.declare(
        "environment",
        "AWS::ElasticBeanstalk::Environment",
        Attrs::new()
            .set("ApplicationName", eb_app.reference())
            .set("SolutionStackName", props.get_str("beanstalk_stack")?)
            .set("OptionSettings", option_settings)
            .set("VersionLabel", app_version.reference()),
    )?;

    // Generated master password; the username rides in the secret template.
    let secret_template = json!({ "db-master-username": props.get_str("db_master_username")? });
    stack.declare(
        "db-user-password-secret",
        "AWS::SecretsManager::Secret",
        Attrs::new()
            .set("Name", DB_PASSWORD_SECRET)
            .set("Description", "db master user password")
            .set(
                "GenerateSecretString",
                Attrs::new()
                    .set("ExcludePunctuation", true)
                    .set("ExcludeCharacters", "\\/@\"")
                    .set("SecretStringTemplate", secret_template.to_string())
                    .set("GenerateStringKey", DB_PASSWORD_SECRET),
            ),
    )?;

    // Password resolved from the secret at apply time, never materialized here.
    let password_ref = format!(
        "{{{{resolve:secretsmanager:{DB_PASSWORD_SECRET}:SecretString:{DB_PASSWORD_SECRET}}}}}"
    );
    stack.declare(
        "rds-instance",
        "AWS::RDS::DBInstance",
        Attrs::new()
            .set("Engine", props.get_str("db_instance_engine")?)
            .set("DBSubnetGroupName", props.get_str("db_subnet_group_name")?)
            .set(
                "DBInstanceIdentifier",
                props.get_str("db_instance_identifier")?,
            )
            .set("DBInstanceClass", "db.t2.micro")
            .set("DeletionProtection", false)
            .set("MultiAZ", false)
            .set("VPCSecurityGroups", vec![props.get_str("private_db_sg_id")?])
            .set("AllocatedStorage", "20")
            .set("MasterUsername", props.get_str("db_master_username")?)
            .set("MasterUserPassword", password_ref)
            .set("DBName", props.get_str("db_name")?),
    )?;

    Ok(())
}
