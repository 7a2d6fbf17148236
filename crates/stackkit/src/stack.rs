//! Stack - a named unit of declared resources

use crate::env::EnvironmentTarget;
use crate::error::{Error, Result};
use crate::resource::{Attrs, ResourceRef};
use std::collections::BTreeMap;

/// One resource declaration: kind + attribute set under a logical id
#[derive(Debug, Clone)]
pub(crate) struct ResourceDecl {
    pub logical_id: String,
    pub kind: String,
    pub attrs: Attrs,
}

/// A named, independently provisionable unit of declared cloud resources
///
/// Construction is a straight-line pass: resources are declared in source
/// order and the declaration sequence is final once synthesis runs. Within a
/// stack, ordering constraints are carried by intra-stack references
/// ([`ResourceRef::reference`]); across stacks, by explicit dependency edges
/// on the [`crate::App`].
#[derive(Debug)]
pub struct Stack {
    name: String,
    env: EnvironmentTarget,
    pub(crate) resources: Vec<ResourceDecl>,
    pub(crate) outputs: BTreeMap<String, String>,
}

impl Stack {
    pub(crate) fn new(name: impl Into<String>, env: EnvironmentTarget) -> Self {
        Self {
            name: name.into(),
            env,
            resources: Vec::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Stack name, unique within the app
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Environment target the stack provisions into
    pub fn env(&self) -> &EnvironmentTarget {
        &self.env
    }

    /// Declare a resource of `kind` with `attrs` under `logical_id`
    ///
    /// Fails with [`Error::DuplicateLogicalId`] on a naming collision; a
    /// collision aborts the whole synthesis run rather than silently
    /// overwriting a declaration.
    pub fn declare(&mut self, logical_id: &str, kind: &str, attrs: Attrs) -> Result<ResourceRef> {
        if self.resources.iter().any(|r| r.logical_id == logical_id) {
            return Err(Error::DuplicateLogicalId {
                stack: self.name.clone(),
                id: logical_id.to_string(),
            });
        }

        log::debug!("{}: declare {} {}", self.name, kind, logical_id);

        self.resources.push(ResourceDecl {
            logical_id: logical_id.to_string(),
            kind: kind.to_string(),
            attrs,
        });

        Ok(ResourceRef {
            stack: self.name.clone(),
            logical_id: logical_id.to_string(),
        })
    }

    /// Record a named stack output carried into the template
    pub fn output(&mut self, name: &str, value: impl Into<String>) {
        self.outputs.insert(name.to_string(), value.into());
    }

    /// Number of declared resources
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }
}
