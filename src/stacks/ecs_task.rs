//! Scheduled Fargate task stack
//!
//! Cluster, ECR repository, secrets-access role, task definition and an
//! EventBridge cron rule that runs the task on the configured subnet and
//! security group. The VPC itself already exists; its subnet and security
//! group ids come from config.

use crate::config::Config;
use anyhow::Result;
use serde_json::json;
use stackkit::{App, Attrs};

pub const NAME: &str = "ecs-task";
const SECTION: &str = "ecs_task";

pub fn ecs_task(app: &mut App, cfg: &Config) -> Result<()> {
    let env = cfg.env_target(SECTION)?;
    let ecr_repo = cfg.get(SECTION, "ecr_repo")?.to_string();
    let container_name = cfg.get(SECTION, "ecs_container")?.to_string();
    let vpc_subnet = cfg.get(SECTION, "vpc_subnet")?.to_string();
    let sg_id = cfg.get(SECTION, "sg_id")?.to_string();

    let stack = app.stack(NAME, env.clone())?;

    let cluster = stack.declare(
        "deployment-example-cluster",
        "AWS::ECS::Cluster",
        Attrs::new()
            .set("ClusterName", "DeploymentExampleCluster")
            .set("CapacityProviders", vec!["FARGATE", "FARGATE_SPOT"]),
    )?;

    // Repository names cannot contain uppercase characters
    stack.declare(
        "my-repo",
        "AWS::ECR::Repository",
        Attrs::new().set("RepositoryName", ecr_repo.as_str()),
    )?;

    let secrets_access_role = stack.declare(
        "secrets-access-role",
        "AWS::IAM::Role",
        Attrs::new()
            .set("RoleName", "SecretsAccessRole")
            .set(
                "AssumeRolePolicyDocument",
                Attrs::new().set("Version", "2012-10-17").set(
                    "Statement",
                    vec![
                        Attrs::new()
                            .set("Effect", "Allow")
                            .set("Action", "sts:AssumeRole")
                            .set(
                                "Principal",
                                Attrs::new().set("Service", "ecs-tasks.amazonaws.com"),
                            ),
                    ],
                ),
            )
            .set(
                "ManagedPolicyArns",
                vec![
                    "arn:aws:iam::aws:policy/AdministratorAccess",
                    "arn:aws:iam::aws:policy/service-role/AmazonECSTaskExecutionRolePolicy",
                ],
            ),
    )?;

    stack.declare(
        "secrets-access-policy",
        "AWS::IAM::Policy",
        Attrs::new()
            .set("PolicyName", "SecretsAccessPolicy")
            .set(
                "PolicyDocument",
                Attrs::new().set("Version", "2012-10-17").set(
                    "Statement",
                    vec![
                        Attrs::new()
                            .set("Effect", "Allow")
                            .set(
                                "Action",
                                vec![
                                    "secretsmanager:GetResourcePolicy",
                                    "secretsmanager:GetSecretValue",
                                    "secretsmanager:DescribeSecret",
                                    "secretsmanager:ListSecretVersionIds",
                                    "secretsmanager:ListSecrets",
                                ],
                            )
                            .set("Resource", vec!["*"]),
                    ],
                ),
            )
            .set("Roles", vec![secrets_access_role.reference()]),
    )?;

    let image = format!(
        "{}.dkr.ecr.{}.amazonaws.com/{}:latest",
        env.account, env.region, ecr_repo
    );
    let task_definition = stack.declare(
        "deployment-example-task",
        "AWS::ECS::TaskDefinition",
        Attrs::new()
            .set("Family", "DeploymentExampleTask")
            .set("Cpu", "256")
            .set("Memory", "512")
            .set("NetworkMode", "awsvpc")
            .set("RequiresCompatibilities", vec!["FARGATE"])
            .set(
                "RuntimePlatform",
                Attrs::new().set("OperatingSystemFamily", "LINUX"),
            )
            .set("TaskRoleArn", secrets_access_role.attr("Arn"))
            .set("ExecutionRoleArn", secrets_access_role.attr("Arn"))
            .set(
                "ContainerDefinitions",
                vec![
                    Attrs::new()
                        .set("Name", container_name.as_str())
                        .set("Image", image)
                        .set(
                            "LogConfiguration",
                            Attrs::new().set("LogDriver", "awslogs").set(
                                "Options",
                                Attrs::new()
                                    .set("awslogs-group", "/ecs/DeploymentExampleTask")
                                    .set("awslogs-region", env.region.as_str())
                                    .set("awslogs-stream-prefix", "ecs")
                                    .set("awslogs-create-group", "true"),
                            ),
                        ),
                ],
            ),
    )?;

    let template = json!({ "username": "jw", "phone": 123, "nickname": "dd" });
    stack.declare(
        "my-test-secret",
        "AWS::SecretsManager::Secret",
        Attrs::new().set("Name", "MyTestSecret").set(
            "GenerateSecretString",
            Attrs::new()
                .set("SecretStringTemplate", template.to_string())
                .set("GenerateStringKey", "password"),
        ),
    )?;

    // Kick the task every two minutes; the container runs the batch module.
    let input = json!({
        "containerOverrides": [{
            "name": container_name,
            "command": ["python", "-m", "src.run"],
        }],
    });
    stack.declare(
        "my-schedule",
        "AWS::Events::Rule",
        Attrs::new()
            .set("Name", "MySchedule")
            .set("ScheduleExpression", "cron(0/2 * ? * * *)")
            .set(
                "Targets",
                vec![
                    Attrs::new()
                        .set("Id", "deployment-example-task-target")
                        .set("Arn", cluster.attr("Arn"))
                        .set("RoleArn", secrets_access_role.attr("Arn"))
                        .set("Input", input.to_string())
                        .set(
                            "EcsParameters",
                            Attrs::new()
                                .set("TaskDefinitionArn", task_definition.reference())
                                .set("TaskCount", 1_i64)
                                .set("LaunchType", "FARGATE")
                                .set(
                                    "NetworkConfiguration",
                                    Attrs::new().set(
                                        "AwsVpcConfiguration",
                                        Attrs::new()
                                            .set("Subnets", vec![vpc_subnet.as_str()])
                                            .set("SecurityGroups", vec![sg_id.as_str()]),
                                    ),
                                ),
                        ),
                ],
            ),
    )?;

    Ok(())
}
