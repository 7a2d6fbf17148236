//! App - the synthesis scope owning every stack and dependency edge

use crate::env::EnvironmentTarget;
use crate::error::{Error, Result};
use crate::stack::Stack;
use crate::template::{Manifest, ManifestEdge, ManifestStack, Template, template_file_name};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// An explicit ordering relation between two stacks
///
/// Carries no data, only the two stack identities. The edge is the only
/// mechanism guaranteeing a consumer is provisioned after its producer,
/// since property bags hold plain strings the backend cannot trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub consumer: String,
    pub producer: String,
}

/// Result of writing the assembly to disk
#[derive(Debug)]
pub struct Assembly {
    /// Directory the templates and manifest were written into
    pub out_dir: PathBuf,
    /// Template files, one per stack, in declaration order
    pub templates: Vec<PathBuf>,
    /// Total number of declared resources across all stacks
    pub resources: usize,
}

/// The synthesis scope: registry of stacks plus their dependency edges
///
/// Stacks are held in declaration order. Synthesis is a single pass over
/// that order; the manifest additionally records a provisioning order that
/// honors every declared edge.
#[derive(Debug, Default)]
pub struct App {
    stacks: Vec<Stack>,
    edges: Vec<DependencyEdge>,
}

impl App {
    /// Create an empty app
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stack and hand back a handle for declaring its resources
    ///
    /// Fails with [`Error::DuplicateStack`] when the name is already taken.
    pub fn stack(&mut self, name: &str, env: EnvironmentTarget) -> Result<&mut Stack> {
        if self.stacks.iter().any(|s| s.name() == name) {
            return Err(Error::DuplicateStack(name.to_string()));
        }

        log::info!("stack {name} targeting {env}");
        self.stacks.push(Stack::new(name, env));
        let last = self.stacks.len() - 1;
        Ok(&mut self.stacks[last])
    }

    /// Look up a registered stack by name
    pub fn get(&self, name: &str) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.name() == name)
    }

    /// Record that `consumer` must be provisioned after `producer`
    ///
    /// Both stacks must already be registered; a stack cannot depend on
    /// itself. Recording the same edge twice is a no-op.
    pub fn add_dependency(&mut self, consumer: &str, producer: &str) -> Result<()> {
        if consumer == producer {
            return Err(Error::SelfDependency(consumer.to_string()));
        }
        for name in [consumer, producer] {
            if self.get(name).is_none() {
                return Err(Error::UnknownStack(name.to_string()));
            }
        }

        let edge = DependencyEdge {
            consumer: consumer.to_string(),
            producer: producer.to_string(),
        };
        if !self.edges.contains(&edge) {
            log::debug!("dependency edge: {consumer} -> {producer}");
            self.edges.push(edge);
        }
        Ok(())
    }

    /// Declared dependency edges, in recording order
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Number of registered stacks
    pub fn stack_count(&self) -> usize {
        self.stacks.len()
    }

    /// Total resources declared across all stacks
    pub fn total_resources(&self) -> usize {
        self.stacks.iter().map(Stack::resource_count).sum()
    }

    /// Topological provisioning order honoring every declared edge
    ///
    /// Stable: among stacks whose producers are all placed, declaration
    /// order wins. Fails with [`Error::DependencyCycle`] when the edges do
    /// not admit an order.
    pub fn provisioning_order(&self) -> Result<Vec<&str>> {
        let mut placed: HashSet<&str> = HashSet::new();
        let mut order = Vec::with_capacity(self.stacks.len());

        while order.len() < self.stacks.len() {
            let next = self.stacks.iter().map(Stack::name).find(|name| {
                !placed.contains(name)
                    && self
                        .edges
                        .iter()
                        .filter(|e| e.consumer == *name)
                        .all(|e| placed.contains(e.producer.as_str()))
            });

            match next {
                Some(name) => {
                    placed.insert(name);
                    order.push(name);
                }
                None => {
                    // Every unplaced stack waits on another unplaced one.
                    let stuck = self
                        .stacks
                        .iter()
                        .map(Stack::name)
                        .find(|n| !placed.contains(n))
                        .unwrap_or_default();
                    return Err(Error::DependencyCycle(stuck.to_string()));
                }
            }
        }

        Ok(order)
    }

    /// Render the assembly manifest
    pub fn manifest(&self) -> Result<Manifest> {
        let provisioning_order = self
            .provisioning_order()?
            .into_iter()
            .map(String::from)
            .collect();

        Ok(Manifest {
            version: env!("CARGO_PKG_VERSION").to_string(),
            stacks: self
                .stacks
                .iter()
                .map(|s| ManifestStack {
                    name: s.name().to_string(),
                    env: s.env().clone(),
                    template_file: template_file_name(s.name()),
                    resources: s.resource_count(),
                })
                .collect(),
            dependencies: self
                .edges
                .iter()
                .map(|e| ManifestEdge {
                    consumer: e.consumer.clone(),
                    producer: e.producer.clone(),
                })
                .collect(),
            provisioning_order,
        })
    }

    /// Write one template per stack plus the manifest into `out_dir`
    ///
    /// Validates the dependency graph first, so nothing is written when the
    /// edges are inconsistent. Output is deterministic for fixed inputs.
    pub fn synth(&self, out_dir: &Path) -> Result<Assembly> {
        let manifest = self.manifest()?;

        fs::create_dir_all(out_dir)?;

        let mut templates = Vec::with_capacity(self.stacks.len());
        for stack in &self.stacks {
            let path = out_dir.join(template_file_name(stack.name()));
            let template = Template::from_stack(stack);
            fs::write(&path, serde_json::to_string_pretty(&template)?)?;
            log::info!(
                "synthesized {} ({} resources)",
                path.display(),
                stack.resource_count()
            );
            templates.push(path);
        }

        let manifest_path = out_dir.join("manifest.json");
        fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;

        Ok(Assembly {
            out_dir: out_dir.to_path_buf(),
            templates,
            resources: self.total_resources(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Attrs;

    fn env() -> EnvironmentTarget {
        EnvironmentTarget::new("111111111111", "us-east-1")
    }

    #[test]
    fn test_duplicate_stack_fails() {
        let mut app = App::new();
        app.stack("network", env()).unwrap();
        let err = app.stack("network", env()).unwrap_err();
        assert!(matches!(err, Error::DuplicateStack(name) if name == "network"));
    }

    #[test]
    fn test_edge_requires_known_stacks() {
        let mut app = App::new();
        app.stack("network", env()).unwrap();

        let err = app.add_dependency("service", "network").unwrap_err();
        assert!(matches!(err, Error::UnknownStack(name) if name == "service"));
    }

    #[test]
    fn test_self_dependency_fails() {
        let mut app = App::new();
        app.stack("network", env()).unwrap();
        let err = app.add_dependency("network", "network").unwrap_err();
        assert!(matches!(err, Error::SelfDependency(_)));
    }

    #[test]
    fn test_duplicate_edge_recorded_once() {
        let mut app = App::new();
        app.stack("network", env()).unwrap();
        app.stack("service", env()).unwrap();
        app.add_dependency("service", "network").unwrap();
        app.add_dependency("service", "network").unwrap();
        assert_eq!(app.edges().len(), 1);
    }

    #[test]
    fn test_provisioning_order_honors_edges() {
        let mut app = App::new();
        // Declared consumer-first; the edge must still put the producer first.
        app.stack("service", env()).unwrap();
        app.stack("network", env()).unwrap();
        app.stack("storage", env()).unwrap();
        app.add_dependency("service", "network").unwrap();

        let order = app.provisioning_order().unwrap();
        assert_eq!(order, vec!["network", "service", "storage"]);
    }

    #[test]
    fn test_cycle_detected() {
        let mut app = App::new();
        app.stack("a", env()).unwrap();
        app.stack("b", env()).unwrap();
        app.add_dependency("a", "b").unwrap();
        app.add_dependency("b", "a").unwrap();

        let err = app.provisioning_order().unwrap_err();
        assert!(matches!(err, Error::DependencyCycle(_)));
    }

    #[test]
    fn test_synth_writes_assembly() {
        let dir = tempfile::tempdir().unwrap();

        let mut app = App::new();
        let network = app.stack("network", env()).unwrap();
        network
            .declare(
                "app-vpc",
                "AWS::EC2::VPC",
                Attrs::new().set("CidrBlock", "10.0.0.0/16"),
            )
            .unwrap();
        app.stack("service", env()).unwrap();
        app.add_dependency("service", "network").unwrap();

        let assembly = app.synth(dir.path()).unwrap();
        assert_eq!(assembly.templates.len(), 2);
        assert_eq!(assembly.resources, 1);
        assert!(dir.path().join("network.template.json").exists());
        assert!(dir.path().join("service.template.json").exists());

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("manifest.json")).unwrap())
                .unwrap();
        assert_eq!(
            manifest["dependencies"][0],
            serde_json::json!({ "consumer": "service", "producer": "network" })
        );
        assert_eq!(
            manifest["provisioning_order"],
            serde_json::json!(["network", "service"])
        );
    }

    #[test]
    fn test_synth_twice_is_identical() {
        let dir = tempfile::tempdir().unwrap();

        let build = |out: &Path| {
            let mut app = App::new();
            let network = app.stack("network", env()).unwrap();
            network
                .declare(
                    "app-vpc",
                    "AWS::EC2::VPC",
                    Attrs::new().set("CidrBlock", "10.0.0.0/16"),
                )
                .unwrap();
            app.synth(out).unwrap();
        };

        let first = dir.path().join("a");
        let second = dir.path().join("b");
        build(&first);
        build(&second);

        for file in ["network.template.json", "manifest.json"] {
            assert_eq!(
                fs::read_to_string(first.join(file)).unwrap(),
                fs::read_to_string(second.join(file)).unwrap(),
            );
        }
    }

    #[test]
    fn test_cycle_aborts_before_writing() {
        let dir = tempfile::tempdir().unwrap();

        let mut app = App::new();
        app.stack("a", env()).unwrap();
        app.stack("b", env()).unwrap();
        app.add_dependency("a", "b").unwrap();
        app.add_dependency("b", "a").unwrap();

        assert!(app.synth(dir.path()).is_err());
        assert!(!dir.path().join("manifest.json").exists());
    }
}
