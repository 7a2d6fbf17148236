//! Resource declarations and the references they produce

use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;

/// An attribute value in a resource declaration
///
/// Scalars and collections render to plain JSON. [`AttrValue::Ref`] and
/// [`AttrValue::GetAtt`] render to the backend's intrinsic forms so it can
/// infer ordering between resources of the same stack from the reference
/// graph.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// String scalar
    Str(String),
    /// Boolean scalar
    Bool(bool),
    /// Integer scalar
    Int(i64),
    /// Ordered list of values
    List(Vec<AttrValue>),
    /// Nested attribute map
    Map(BTreeMap<String, AttrValue>),
    /// Reference to another resource declared in the same stack
    Ref(String),
    /// Named attribute of another resource in the same stack
    GetAtt(String, String),
    /// Value the backend base64-encodes at apply time (e.g. user data)
    Base64(String),
}

impl AttrValue {
    /// Render to the template JSON form
    pub fn to_json(&self) -> Value {
        match self {
            Self::Str(s) => json!(s),
            Self::Bool(b) => json!(b),
            Self::Int(i) => json!(i),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Ref(id) => json!({ "Ref": id }),
            Self::GetAtt(id, attr) => json!({ "Fn::GetAtt": [id, attr] }),
            Self::Base64(s) => json!({ "Fn::Base64": s }),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&ResourceId> for AttrValue {
    fn from(value: &ResourceId) -> Self {
        Self::Str(value.to_string())
    }
}

impl<V: Into<AttrValue>> From<Vec<V>> for AttrValue {
    fn from(value: Vec<V>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

// Nested attribute maps reuse the builder: `.set("Outer", Attrs::new().set(..))`
impl From<Attrs> for AttrValue {
    fn from(value: Attrs) -> Self {
        Self::Map(value.entries)
    }
}

/// Attribute set for one resource declaration
///
/// Builder consumed by value, mirroring [`crate::PropertyBag`]:
///
/// ```
/// use stackkit::Attrs;
///
/// let attrs = Attrs::new()
///     .set("CidrBlock", "10.0.0.0/16")
///     .set("EnableDnsSupport", true);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs {
    entries: BTreeMap<String, AttrValue>,
}

impl Attrs {
    /// Create an empty attribute set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute, consuming and returning the set
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Render to the template JSON form
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Check if no attributes were set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Opaque identifier for a declared resource
///
/// A token the provisioning backend resolves at apply time. Treated as a
/// value: never parsed or mutated, only forwarded (typically through a
/// [`crate::PropertyBag`] into another stack).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId(pub(crate) String);

impl ResourceId {
    /// Borrow the token string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ResourceId> for String {
    fn from(value: ResourceId) -> Self {
        value.0
    }
}

impl From<&ResourceId> for crate::props::PropValue {
    fn from(value: &ResourceId) -> Self {
        Self::Str(value.0.clone())
    }
}

impl From<ResourceId> for crate::props::PropValue {
    fn from(value: ResourceId) -> Self {
        Self::Str(value.0)
    }
}

/// Handle returned by [`crate::Stack::declare`]
#[derive(Debug, Clone)]
pub struct ResourceRef {
    pub(crate) stack: String,
    pub(crate) logical_id: String,
}

impl ResourceRef {
    /// Logical id of the resource within its stack
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Intra-stack reference for use in a later declaration of the same stack
    pub fn reference(&self) -> AttrValue {
        AttrValue::Ref(self.logical_id.clone())
    }

    /// Intra-stack reference to a named attribute of this resource
    pub fn attr(&self, name: &str) -> AttrValue {
        AttrValue::GetAtt(self.logical_id.clone(), name.to_string())
    }

    /// Opaque identifier token for forwarding across stack boundaries
    pub fn id(&self) -> ResourceId {
        ResourceId(format!("${{{}.{}.Ref}}", self.stack, self.logical_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_renders_intrinsic() {
        let r = ResourceRef {
            stack: "network".into(),
            logical_id: "app-vpc".into(),
        };
        assert_eq!(r.reference().to_json(), json!({ "Ref": "app-vpc" }));
        assert_eq!(
            r.attr("AllocationId").to_json(),
            json!({ "Fn::GetAtt": ["app-vpc", "AllocationId"] })
        );
    }

    #[test]
    fn test_id_is_a_stack_scoped_token() {
        let r = ResourceRef {
            stack: "network".into(),
            logical_id: "app-vpc".into(),
        };
        assert_eq!(r.id().as_str(), "${network.app-vpc.Ref}");
    }

    #[test]
    fn test_attrs_render() {
        let attrs = Attrs::new()
            .set("CidrBlock", "10.0.0.0/16")
            .set("EnableDnsSupport", true)
            .set("Tags", vec![AttrValue::Map(BTreeMap::from([
                ("Key".to_string(), AttrValue::from("Name")),
                ("Value".to_string(), AttrValue::from("tutorial-vpc")),
            ]))]);

        assert_eq!(
            attrs.to_json(),
            json!({
                "CidrBlock": "10.0.0.0/16",
                "EnableDnsSupport": true,
                "Tags": [{ "Key": "Name", "Value": "tutorial-vpc" }],
            })
        );
    }
}
