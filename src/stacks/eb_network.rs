//! Elastic Beanstalk network stack
//!
//! The producer side of the EB pair: VPC, routing, subnets, DB subnet
//! group, internet/NAT gateways, and the webserver + DB security groups.
//! Publishes the identifiers `eb_app` wires into its environment.

use super::name_tag;
use crate::config::Config;
use anyhow::Result;
use stackkit::{App, Attrs, PropertyBag};

pub const NAME: &str = "eb-network";
const SECTION: &str = "eb_network_stack";

pub fn eb_network(app: &mut App, cfg: &Config, props: PropertyBag) -> Result<PropertyBag> {
    let env = cfg.env_target(SECTION)?;
    let stack = app.stack(NAME, env.clone())?;

    let vpc = stack.declare(
        "tutorial-vpc",
        "AWS::EC2::VPC",
        Attrs::new()
            .set("CidrBlock", "10.0.0.0/16")
            .set("EnableDnsHostnames", true)
            .set("EnableDnsSupport", true)
            .set("Tags", name_tag(props.get_str("vpc_name")?)),
    )?;

    // Private side: routing table, two subnets, associations
    let route_table_private = stack.declare(
        "rtb-private",
        "AWS::EC2::RouteTable",
        Attrs::new()
            .set("VpcId", vpc.reference())
            .set("Tags", name_tag("EB Private Routing Table")),
    )?;

    let private_subnet_1 = stack.declare(
        "private-subnet1",
        "AWS::EC2::Subnet",
        Attrs::new()
            .set("CidrBlock", "10.0.1.0/24")
            .set("VpcId", vpc.reference())
            .set("AvailabilityZone", env.az('b'))
            .set("Tags", name_tag("subnet-eb-private-1")),
    )?;

    let private_subnet_2 = stack.declare(
        "private-subnet2",
        "AWS::EC2::Subnet",
        Attrs::new()
            .set("CidrBlock", "10.0.2.0/24")
            .set("VpcId", vpc.reference())
            .set("AvailabilityZone", env.az('c'))
            .set("Tags", name_tag("subnet-eb-private-2")),
    )?;

    stack.declare(
        "rtb-assoc-priv001",
        "AWS::EC2::SubnetRouteTableAssociation",
        Attrs::new()
            .set("RouteTableId", route_table_private.reference())
            .set("SubnetId", private_subnet_1.reference()),
    )?;

    stack.declare(
        "rtb-assoc-priv002",
        "AWS::EC2::SubnetRouteTableAssociation",
        Attrs::new()
            .set("RouteTableId", route_table_private.reference())
            .set("SubnetId", private_subnet_2.reference()),
    )?;

    stack.declare(
        "rds-db-subnet-group",
        "AWS::RDS::DBSubnetGroup",
        Attrs::new()
            .set("DBSubnetGroupDescription", "EB DB Subnet Group")
            .set("DBSubnetGroupName", props.get_str("db_subnet_group_name")?)
            .set(
                "SubnetIds",
                vec![private_subnet_1.reference(), private_subnet_2.reference()],
            ),
    )?;

    // Public side
    let route_table_public = stack.declare(
        "rtb-public",
        "AWS::EC2::RouteTable",
        Attrs::new()
            .set("VpcId", vpc.reference())
            .set("Tags", name_tag("EB Public Routing Table")),
    )?;

    let public_subnet_1 = stack.declare(
        "public-subnet1",
        "AWS::EC2::Subnet",
        Attrs::new()
            .set("CidrBlock", "10.0.0.0/24")
            .set("VpcId", vpc.reference())
            .set("MapPublicIpOnLaunch", true)
            .set("AvailabilityZone", env.az('a'))
            .set("Tags", name_tag("subnet-eb-public-1")),
    )?;

    let public_subnet_2 = stack.declare(
        "public-subnet2",
        "AWS::EC2::Subnet",
        Attrs::new()
            .set("CidrBlock", "10.0.3.0/24")
            .set("VpcId", vpc.reference())
            .set("MapPublicIpOnLaunch", true)
            .set("AvailabilityZone", env.az('b'))
            .set("Tags", name_tag("subnet-eb-public-2")),
    )?;

    stack.declare(
        "rtb-assoc-public001",
        "AWS::EC2::SubnetRouteTableAssociation",
        Attrs::new()
            .set("RouteTableId", route_table_public.reference())
            .set("SubnetId", public_subnet_1.reference()),
    )?;

    stack.declare(
        "rtb-assoc-public002",
        "AWS::EC2::SubnetRouteTableAssociation",
        Attrs::new()
            .set("RouteTableId", route_table_public.reference())
            .set("SubnetId", public_subnet_2.reference()),
    )?;

    // Internet gateway and the default public route
    let inet_gateway = stack.declare(
        "eb-igw",
        "AWS::EC2::InternetGateway",
        Attrs::new().set("Tags", name_tag("eb-igw")),
    )?;

    stack.declare(
        "igw-attachment",
        "AWS::EC2::VPCGatewayAttachment",
        Attrs::new()
            .set("VpcId", vpc.reference())
            .set("InternetGatewayId", inet_gateway.reference()),
    )?;

    stack.declare(
        "public-route",
        "AWS::EC2::Route",
        Attrs::new()
            .set("RouteTableId", route_table_public.reference())
            .set("GatewayId", inet_gateway.reference())
            .set("DestinationCidrBlock", "0.0.0.0/0"),
    )?;

    // NAT gateway on the first public subnet
    let eip = stack.declare("elastic-ip", "AWS::EC2::EIP", Attrs::new())?;

    stack.declare(
        "natgateway",
        "AWS::EC2::NatGateway",
        Attrs::new()
            .set("AllocationId", eip.attr("AllocationId"))
            .set("SubnetId", public_subnet_1.reference()),
    )?;

    // Security groups: public webserver and the DB instance behind it
    let webserver_sec_group = stack.declare(
        "webserver-sec-group",
        "AWS::EC2::SecurityGroup",
        Attrs::new()
            .set("GroupDescription", "webserver security group")
            .set("VpcId", vpc.reference())
            .set("Tags", name_tag("sg-eb-webserver")),
    )?;

    // SSH restricted to the operator's WAN address
    stack.declare(
        "sec-group-ssh-ingress",
        "AWS::EC2::SecurityGroupIngress",
        Attrs::new()
            .set("IpProtocol", "tcp")
            .set("CidrIp", format!("{}/32", props.get_str("wan_ip")?))
            .set("FromPort", 22_i64)
            .set("ToPort", 22_i64)
            .set("GroupId", webserver_sec_group.reference()),
    )?;

    stack.declare(
        "sec-group-http-ingress",
        "AWS::EC2::SecurityGroupIngress",
        Attrs::new()
            .set("IpProtocol", "tcp")
            .set("CidrIp", "0.0.0.0/0")
            .set("FromPort", 80_i64)
            .set("ToPort", 80_i64)
            .set("GroupId", webserver_sec_group.reference()),
    )?;

    let db_sec_group = stack.declare(
        "dbserver-sec-group",
        "AWS::EC2::SecurityGroup",
        Attrs::new()
            .set("GroupDescription", "DB Instance Security Group")
            .set("VpcId", vpc.reference())
            .set("Tags", name_tag("sg-eb-db")),
    )?;

    // MySQL reachable only from the webserver group
    stack.declare(
        "sec-group-db-ingress",
        "AWS::EC2::SecurityGroupIngress",
        Attrs::new()
            .set("IpProtocol", "tcp")
            .set("FromPort", 3306_i64)
            .set("ToPort", 3306_i64)
            .set("GroupId", db_sec_group.reference())
            .set("SourceSecurityGroupId", webserver_sec_group.reference()),
    )?;

    let output_props = props
        .with("webserver_sg_id", webserver_sec_group.id())
        .with("public_subnet_id_1", public_subnet_1.id())
        .with("public_subnet_id_2", public_subnet_2.id())
        .with("private_db_sg_id", db_sec_group.id())
        .with("vpc-id", vpc.id());

    stack.output("output-db-sg-id", output_props.get_str("private_db_sg_id")?);
    stack.output("output-vpc-id", output_props.get_str("vpc-id")?);

    Ok(output_props)
}
