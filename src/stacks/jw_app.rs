//! Application VPC stack
//!
//! Two-AZ network with a NAT instance instead of a managed NAT gateway
//! (the gateway's standing cost is why; destroying this stack removes the
//! instance with it). Subnet CIDRs come from config alongside the VPC
//! block.

use super::name_tag;
use crate::config::Config;
use anyhow::Result;
use stackkit::{App, Attrs};

pub const NAME: &str = "jw-app";
const SECTION: &str = "jw_app";

pub fn jw_app(app: &mut App, cfg: &Config) -> Result<()> {
    let env = cfg.env_target(SECTION)?;
    let vpc_cidr = cfg.get(SECTION, "vpc_cidr")?.to_string();
    let pub_cidr_1 = cfg.get(SECTION, "pub_subnet_cidr_1")?.to_string();
    let pub_cidr_2 = cfg.get(SECTION, "pub_subnet_cidr_2")?.to_string();
    let pri_cidr_1 = cfg.get(SECTION, "pri_subnet_cidr_1")?.to_string();
    let pri_cidr_2 = cfg.get(SECTION, "pri_subnet_cidr_2")?.to_string();
    let nat_ami = cfg.get(SECTION, "nat_ami")?.to_string();

    let stack = app.stack(NAME, env.clone())?;

    let vpc = stack.declare(
        "jw-app-vpc",
        "AWS::EC2::VPC",
        Attrs::new()
            .set("CidrBlock", vpc_cidr)
            .set("EnableDnsHostnames", true)
            .set("EnableDnsSupport", true)
            .set("Tags", name_tag("JwAppVpc")),
    )?;

    let igw = stack.declare("jw-igw", "AWS::EC2::InternetGateway", Attrs::new())?;

    stack.declare(
        "jw-igw-attachment",
        "AWS::EC2::VPCGatewayAttachment",
        Attrs::new()
            .set("VpcId", vpc.reference())
            .set("InternetGatewayId", igw.reference()),
    )?;

    let rtb_public = stack.declare(
        "jw-rtb-public",
        "AWS::EC2::RouteTable",
        Attrs::new().set("VpcId", vpc.reference()),
    )?;

    stack.declare(
        "jw-public-route",
        "AWS::EC2::Route",
        Attrs::new()
            .set("RouteTableId", rtb_public.reference())
            .set("GatewayId", igw.reference())
            .set("DestinationCidrBlock", "0.0.0.0/0"),
    )?;

    let pub_subnet_1 = stack.declare(
        "jw-pub-subnet1",
        "AWS::EC2::Subnet",
        Attrs::new()
            .set("CidrBlock", pub_cidr_1)
            .set("VpcId", vpc.reference())
            .set("MapPublicIpOnLaunch", true)
            .set("AvailabilityZone", env.az('a'))
            .set("Tags", name_tag("JwPub1")),
    )?;

    let pub_subnet_2 = stack.declare(
        "jw-pub-subnet2",
        "AWS::EC2::Subnet",
        Attrs::new()
            .set("CidrBlock", pub_cidr_2)
            .set("VpcId", vpc.reference())
            .set("MapPublicIpOnLaunch", true)
            .set("AvailabilityZone", env.az('b'))
            .set("Tags", name_tag("JwPub2")),
    )?;

    stack.declare(
        "jw-rtb-assoc-pub1",
        "AWS::EC2::SubnetRouteTableAssociation",
        Attrs::new()
            .set("RouteTableId", rtb_public.reference())
            .set("SubnetId", pub_subnet_1.reference()),
    )?;

    stack.declare(
        "jw-rtb-assoc-pub2",
        "AWS::EC2::SubnetRouteTableAssociation",
        Attrs::new()
            .set("RouteTableId", rtb_public.reference())
            .set("SubnetId", pub_subnet_2.reference()),
    )?;

    // Wide-open ingress, kept from the original deployment
    let sg = stack.declare(
        "jw-app-sg",
        "AWS::EC2::SecurityGroup",
        Attrs::new()
            .set("GroupName", "JwAppSg")
            .set("GroupDescription", "sg for JwApp")
            .set("VpcId", vpc.reference())
            .set(
                "SecurityGroupIngress",
                vec![
                    Attrs::new()
                        .set("IpProtocol", "tcp")
                        .set("CidrIp", "0.0.0.0/0")
                        .set("FromPort", 0_i64)
                        .set("ToPort", 65535_i64),
                    Attrs::new()
                        .set("IpProtocol", "tcp")
                        .set("CidrIp", "0.0.0.0/0")
                        .set("FromPort", 80_i64)
                        .set("ToPort", 80_i64),
                    Attrs::new()
                        .set("IpProtocol", "tcp")
                        .set("CidrIp", "0.0.0.0/0")
                        .set("FromPort", 443_i64)
                        .set("ToPort", 443_i64),
                ],
            ),
    )?;

    // NAT instance on the first public subnet; private traffic routes
    // through it, so source/dest checking must be off.
    let nat_instance = stack.declare(
        "jw-nat-instance",
        "AWS::EC2::Instance",
        Attrs::new()
            .set("ImageId", nat_ami)
            .set("InstanceType", "t2.nano")
            .set("SubnetId", pub_subnet_1.reference())
            .set("SecurityGroupIds", vec![sg.reference()])
            .set("SourceDestCheck", false)
            .set("Tags", name_tag("JwAppNat")),
    )?;

    let rtb_private = stack.declare(
        "jw-rtb-private",
        "AWS::EC2::RouteTable",
        Attrs::new().set("VpcId", vpc.reference()),
    )?;

    stack.declare(
        "jw-private-route",
        "AWS::EC2::Route",
        Attrs::new()
            .set("RouteTableId", rtb_private.reference())
            .set("InstanceId", nat_instance.reference())
            .set("DestinationCidrBlock", "0.0.0.0/0"),
    )?;

    let pri_subnet_1 = stack.declare(
        "jw-pri-subnet1",
        "AWS::EC2::Subnet",
        Attrs::new()
            .set("CidrBlock", pri_cidr_1)
            .set("VpcId", vpc.reference())
            .set("AvailabilityZone", env.az('a'))
            .set("Tags", name_tag("JwPri1")),
    )?;

    let pri_subnet_2 = stack.declare(
        "jw-pri-subnet2",
        "AWS::EC2::Subnet",
        Attrs::new()
            .set("CidrBlock", pri_cidr_2)
            .set("VpcId", vpc.reference())
            .set("AvailabilityZone", env.az('b'))
            .set("Tags", name_tag("JwPri2")),
    )?;

    stack.declare(
        "jw-rtb-assoc-pri1",
        "AWS::EC2::SubnetRouteTableAssociation",
        Attrs::new()
            .set("RouteTableId", rtb_private.reference())
            .set("SubnetId", pri_subnet_1.reference()),
    )?;

    stack.declare(
        "jw-rtb-assoc-pri2",
        "AWS::EC2::SubnetRouteTableAssociation",
        Attrs::new()
            .set("RouteTableId", rtb_private.reference())
            .set("SubnetId", pri_subnet_2.reference()),
    )?;

    Ok(())
}
