use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved object id under which the trash control's own position is stored.
pub const TRASH_OBJECT_ID: &str = "__trash_icon__";

/// Opaque key identifying one floor plan. All positions are partitioned by it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FloorPlanId(String);

impl FloorPlanId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FloorPlanId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FloorPlanId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Debug for FloorPlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plan:{}", self.0)
    }
}

impl fmt::Display for FloorPlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one positioned object (an entity id such as `light.kitchen`,
/// or the trash sentinel). Unique within a plan.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id the trash control is persisted under.
    pub fn trash() -> Self {
        Self::new(TRASH_OBJECT_ID)
    }

    pub fn is_trash(&self) -> bool {
        self.0 == TRASH_OBJECT_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Entity domain, i.e. the part before the first `.` (`light` for
    /// `light.kitchen`). Empty when the id has no domain.
    pub fn domain(&self) -> &str {
        self.0.split_once('.').map(|(d, _)| d).unwrap_or("")
    }

    /// A DOM-safe element id derived from the object id.
    pub fn dom_id(&self) -> String {
        let slug: String = self
            .0
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
            .collect();
        format!("fp-object-{slug}")
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trash_sentinel() {
        assert!(ObjectId::trash().is_trash());
        assert!(!ObjectId::new("light.kitchen").is_trash());
    }

    #[test]
    fn domain_and_dom_id() {
        let id = ObjectId::new("light.kitchen_ceiling");
        assert_eq!(id.domain(), "light");
        assert_eq!(id.dom_id(), "fp-object-light-kitchen_ceiling");
        assert_eq!(ObjectId::new("orphan").domain(), "");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&FloorPlanId::new("ground")).unwrap();
        assert_eq!(json, "\"ground\"");
    }
}
