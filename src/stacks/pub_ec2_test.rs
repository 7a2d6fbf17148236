//! Public EC2 + ALB test stack
//!
//! A WordPress instance on the jw-app network (ids come from config since
//! that VPC may predate this run) behind an internet-facing application
//! load balancer. User data is read from a script file at synth time.

use crate::config::Config;
use anyhow::{Context, Result};
use stackkit::{App, AttrValue, Attrs};
use std::fs;

pub const NAME: &str = "pub-ec2-test";
const SECTION: &str = "pub_ec2_test";

pub fn pub_ec2_test(app: &mut App, cfg: &Config) -> Result<()> {
    let env = cfg.env_target(SECTION)?;
    let vpc_id = cfg.get(SECTION, "jw_app_vpc")?.to_string();
    let subnet_1 = cfg.get(SECTION, "jw_app_pub_subnet1")?.to_string();
    let subnet_2 = cfg.get(SECTION, "jw_app_pub_subnet2")?.to_string();
    let sg_id = cfg.get(SECTION, "jw_app_sg")?.to_string();
    let key_name = cfg.get(SECTION, "word_press_pub_ec2_key")?.to_string();
    let ami_id = cfg.get(SECTION, "ami_id")?.to_string();

    let script_path = cfg.get(SECTION, "word_press_pub_ec2_user_data_script")?;
    let user_data = fs::read_to_string(script_path)
        .with_context(|| format!("reading user data script {script_path}"))?;

    let stack = app.stack(NAME, env)?;

    let instance = stack.declare(
        "wordpress-pub-ec2",
        "AWS::EC2::Instance",
        Attrs::new()
            .set("ImageId", ami_id)
            .set("InstanceType", "t2.micro")
            .set("SubnetId", subnet_1.as_str())
            .set("SecurityGroupIds", vec![sg_id.as_str()])
            .set("KeyName", key_name)
            .set("UserData", AttrValue::Base64(user_data))
            .set("Tags", super::name_tag("WordpressPubEc2")),
    )?;

    let alb = stack.declare(
        "wordpress-alb",
        "AWS::ElasticLoadBalancingV2::LoadBalancer",
        Attrs::new()
            .set("Name", "WordPressAlb")
            .set("Scheme", "internet-facing")
            .set("Subnets", vec![subnet_1.as_str(), subnet_2.as_str()])
            .set("SecurityGroups", vec![sg_id.as_str()]),
    )?;

    let target_group = stack.declare(
        "wordpress-target-group",
        "AWS::ElasticLoadBalancingV2::TargetGroup",
        Attrs::new()
            .set("Name", "WordPressTargetGroup")
            .set("TargetType", "instance")
            .set("Targets", vec![Attrs::new().set("Id", instance.reference())])
            .set("VpcId", vpc_id)
            .set("Port", 80_i64)
            .set("Protocol", "HTTP"),
    )?;

    stack.declare(
        "wordpress-listener",
        "AWS::ElasticLoadBalancingV2::Listener",
        Attrs::new()
            .set("LoadBalancerArn", alb.reference())
            .set("Port", 80_i64)
            .set("Protocol", "HTTP")
            .set(
                "DefaultActions",
                vec![
                    Attrs::new()
                        .set("Type", "forward")
                        .set("TargetGroupArn", target_group.reference()),
                ],
            ),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::tests::sample_config_with_script;

    #[test]
    fn test_declares_instance_behind_alb() {
        let (cfg_text, _script) = sample_config_with_script();
        let cfg = Config::parse(&cfg_text).unwrap();
        let mut app = App::new();

        pub_ec2_test(&mut app, &cfg).unwrap();
        assert_eq!(app.get(NAME).unwrap().resource_count(), 4);
    }

    #[test]
    fn test_missing_script_is_fatal() {
        let (cfg_text, script) = sample_config_with_script();
        drop(script); // removes the temp file
        let cfg = Config::parse(&cfg_text).unwrap();
        let mut app = App::new();

        assert!(pub_ec2_test(&mut app, &cfg).is_err());
    }
}
