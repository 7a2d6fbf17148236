//! Template and manifest rendering
//!
//! Synthesis turns the in-memory declarations into one provisioning
//! template per stack plus an assembly manifest. Rendering uses ordered
//! maps only, so the output is byte-identical across runs for fixed inputs.

use crate::env::EnvironmentTarget;
use crate::stack::Stack;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A provisioning template for one stack
#[derive(Debug, Serialize)]
pub struct Template {
    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, TemplateResource>,
    #[serde(rename = "Outputs", skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, TemplateOutput>,
}

/// One declared resource in a template
#[derive(Debug, Serialize)]
pub struct TemplateResource {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Properties", skip_serializing_if = "Value::is_null")]
    pub properties: Value,
}

/// One stack output in a template
#[derive(Debug, Serialize)]
pub struct TemplateOutput {
    #[serde(rename = "Value")]
    pub value: String,
}

impl Template {
    /// Render a stack's declarations into a template
    pub fn from_stack(stack: &Stack) -> Self {
        let resources = stack
            .resources
            .iter()
            .map(|decl| {
                let properties = if decl.attrs.is_empty() {
                    Value::Null
                } else {
                    decl.attrs.to_json()
                };
                (
                    decl.logical_id.clone(),
                    TemplateResource {
                        kind: decl.kind.clone(),
                        properties,
                    },
                )
            })
            .collect();

        let outputs = stack
            .outputs
            .iter()
            .map(|(name, value)| {
                (
                    name.clone(),
                    TemplateOutput {
                        value: value.clone(),
                    },
                )
            })
            .collect();

        Self { resources, outputs }
    }
}

/// Assembly manifest: every stack, its target, and the declared edges
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub version: String,
    pub stacks: Vec<ManifestStack>,
    pub dependencies: Vec<ManifestEdge>,
    /// Topological order honoring every declared edge
    pub provisioning_order: Vec<String>,
}

/// Manifest entry for one stack
#[derive(Debug, Serialize)]
pub struct ManifestStack {
    pub name: String,
    #[serde(flatten)]
    pub env: EnvironmentTarget,
    pub template_file: String,
    pub resources: usize,
}

/// Manifest entry for one dependency edge
#[derive(Debug, Serialize)]
pub struct ManifestEdge {
    pub consumer: String,
    pub producer: String,
}

/// File name of a stack's template within the assembly directory
pub fn template_file_name(stack_name: &str) -> String {
    format!("{stack_name}.template.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Attrs;
    use serde_json::json;

    #[test]
    fn test_template_shape() {
        let mut stack = Stack::new("network", EnvironmentTarget::new("1", "us-east-1"));
        let vpc = stack
            .declare(
                "app-vpc",
                "AWS::EC2::VPC",
                Attrs::new().set("CidrBlock", "10.0.0.0/16"),
            )
            .unwrap();
        stack.declare("elastic-ip", "AWS::EC2::EIP", Attrs::new()).unwrap();
        stack.output("output-vpc-id", vpc.id());

        let template = Template::from_stack(&stack);
        let rendered = serde_json::to_value(&template).unwrap();

        assert_eq!(
            rendered,
            json!({
                "Resources": {
                    "app-vpc": {
                        "Type": "AWS::EC2::VPC",
                        "Properties": { "CidrBlock": "10.0.0.0/16" },
                    },
                    "elastic-ip": { "Type": "AWS::EC2::EIP" },
                },
                "Outputs": {
                    "output-vpc-id": { "Value": "${network.app-vpc.Ref}" },
                },
            })
        );
    }

    #[test]
    fn test_outputs_omitted_when_empty() {
        let stack = Stack::new("empty", EnvironmentTarget::new("1", "us-east-1"));
        let rendered = serde_json::to_value(Template::from_stack(&stack)).unwrap();
        assert!(rendered.get("Outputs").is_none());
    }
}
