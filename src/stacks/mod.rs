//! Stack definitions
//!
//! One module per stack, each a straight-line wiring function that reads
//! its config section, declares resources in order, and (for producers)
//! returns the property bag its dependents consume. Dependency edges are
//! recorded by the entry point in `synth.rs`.

pub mod box_office_catalog;
pub mod box_office_mojo;
pub mod eb_app;
pub mod eb_network;
pub mod ecs_task;
pub mod jw_app;
pub mod pub_ec2_test;
pub mod s3_obj_upload;
pub mod secret_creation;

pub use box_office_catalog::box_office_catalog;
pub use box_office_mojo::box_office_mojo;
pub use eb_app::eb_app;
pub use eb_network::eb_network;
pub use ecs_task::ecs_task;
pub use jw_app::jw_app;
pub use pub_ec2_test::pub_ec2_test;
pub use s3_obj_upload::s3_obj_upload;
pub use secret_creation::secret_creation;

use stackkit::{AttrValue, Attrs};

/// A single `Name` tag in template form
pub(crate) fn name_tag(value: &str) -> AttrValue {
    AttrValue::from(vec![Attrs::new().set("Key", "Name").set("Value", value)])
}

/// Wildcard-principal policies are preserved from the original deployment
/// but surfaced for review instead of silently treated as correct.
pub(crate) fn warn_open_policy(bucket: &str) {
    log::warn!(
        "bucket {bucket} grants object access to principal \"*\" - review this policy before applying"
    );
}
