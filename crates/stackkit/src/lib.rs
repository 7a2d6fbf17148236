//! # stackkit
//!
//! A small framework for declarative infrastructure stacks.
//!
//! This crate provides the core abstractions for declaring cloud resources,
//! propagating resource identifiers between stacks, and synthesizing the
//! whole declaration set into provisioning templates in a single pass.
//!
//! ## Core Concepts
//!
//! - **App**: the synthesis scope; owns every stack and the explicit
//!   dependency edges between them
//! - **Stack**: a named, independently provisionable unit of declared
//!   resources, pinned to an [`EnvironmentTarget`] (account + region)
//! - **PropertyBag**: string-keyed scalar values a producer stack publishes
//!   and a consumer stack reads; the only data channel between stacks
//! - **Synthesis**: rendering one template per stack plus a manifest that
//!   records environment targets, dependency edges, and provisioning order
//!
//! ## Example
//!
//! ```
//! use stackkit::{App, Attrs, EnvironmentTarget, PropertyBag};
//!
//! let mut app = App::new();
//! let env = EnvironmentTarget::new("111111111111", "us-east-1");
//!
//! // Producer stack declares a VPC and publishes its identifier.
//! let network = app.stack("network", env.clone())?;
//! let vpc = network.declare(
//!     "app-vpc",
//!     "AWS::EC2::VPC",
//!     Attrs::new().set("CidrBlock", "10.0.0.0/16"),
//! )?;
//! let props = PropertyBag::new().with("vpc-id", vpc.id());
//!
//! // Consumer stack reads the identifier; the edge makes the ordering
//! // explicit since the bag itself carries plain strings.
//! let service = app.stack("service", env)?;
//! service.declare(
//!     "service-sg",
//!     "AWS::EC2::SecurityGroup",
//!     Attrs::new()
//!         .set("GroupDescription", "service security group")
//!         .set("VpcId", props.get_str("vpc-id")?),
//! )?;
//! app.add_dependency("service", "network")?;
//!
//! assert_eq!(app.provisioning_order()?, vec!["network", "service"]);
//! # Ok::<(), stackkit::Error>(())
//! ```
//!
//! Construction is a single straight-line pass: stacks are declared in
//! source order, held in memory, and discarded after [`App::synth`] emits
//! the assembly. There is no apply step, no retry, and no runtime mutation;
//! turning templates into actual infrastructure is the provisioning
//! backend's concern.

pub mod app;
pub mod env;
pub mod error;
pub mod props;
pub mod resource;
pub mod stack;
pub mod template;

// Re-export main types at crate root
pub use app::{App, Assembly, DependencyEdge};
pub use env::EnvironmentTarget;
pub use error::{Error, Result};
pub use props::{PropValue, PropertyBag};
pub use resource::{AttrValue, Attrs, ResourceId, ResourceRef};
pub use stack::Stack;
pub use template::{Manifest, Template};
