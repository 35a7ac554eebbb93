use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::Specification;
use crate::merge::DependencyField;

/// Name shown for references to specifications without a name.
pub const UNNAMED: &str = "<unnamed>";

/// A shared handle to a [Specification], compared by identity.
///
/// Two handles are equal only if they point at the same allocation.
/// Structurally equal specifications created separately are distinct
/// dependencies, so merging never collapses them.
#[derive(Clone)]
pub struct SpecRef(Arc<Specification>);

impl SpecRef {
    pub fn new(spec: Specification) -> Self {
        Self(Arc::new(spec))
    }

    /// Whether `self` and `other` are handles to the same specification.
    pub fn ptr_eq(&self, other: &SpecRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The referenced specification's name, or [UNNAMED].
    pub fn display_name(&self) -> &str {
        self.0.name.as_deref().unwrap_or(UNNAMED)
    }
}

/// Dependency chains can be arbitrarily deep, so the last handle to a
/// specification releases its dependencies without recursing.
impl Drop for SpecRef {
    fn drop(&mut self) {
        let mut orphans = take_dependencies(&mut self.0);
        while let Some(mut orphan) = orphans.pop() {
            orphans.extend(take_dependencies(&mut orphan.0));
        }
    }
}

/// Move the dependencies out of `spec` if no other handle shares it.
fn take_dependencies(spec: &mut Arc<Specification>) -> Vec<SpecRef> {
    let Some(spec) = Arc::get_mut(spec) else {
        return Vec::new();
    };
    DependencyField::ALL
        .into_iter()
        .flat_map(|field| std::mem::take(spec.dependencies_mut(field)))
        .collect()
}

impl From<Specification> for SpecRef {
    fn from(spec: Specification) -> Self {
        Self::new(spec)
    }
}

impl Deref for SpecRef {
    type Target = Specification;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq for SpecRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for SpecRef {}

impl Hash for SpecRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state)
    }
}

impl fmt::Debug for SpecRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SpecRef").field(&self.display_name()).finish()
    }
}

impl fmt::Display for SpecRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// References render as the name of the specification they point at.
impl Serialize for SpecRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display_name())
    }
}
