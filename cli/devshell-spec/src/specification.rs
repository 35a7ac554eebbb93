use std::collections::BTreeMap;

use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::merge::{DependencyField, Dependencies};
use crate::{SpecError, SpecRef};

/// Fields of a specification without a dedicated slot, keyed by attribute name.
pub type Attrs = BTreeMap<String, serde_json::Value>;

/// A build description: the argument set of a derivation.
///
/// Known fields are typed, every other attribute lives in [Specification::attrs].
/// Serializes with the attribute names a derivation uses
/// (`nativeBuildInputs`, `shellHook`, ...).
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    pub name: Option<String>,
    pub build_inputs: Vec<SpecRef>,
    pub native_build_inputs: Vec<SpecRef>,
    pub propagated_build_inputs: Vec<SpecRef>,
    pub propagated_native_build_inputs: Vec<SpecRef>,
    pub shell_hook: Option<String>,
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub phases: Vec<String>,
    pub build_phase: Option<String>,
    #[serde(flatten)]
    pub attrs: Attrs,
}

impl Specification {
    /// An otherwise empty specification with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub(crate) fn dependencies_mut(&mut self, field: DependencyField) -> &mut Vec<SpecRef> {
        match field {
            DependencyField::BuildInputs => &mut self.build_inputs,
            DependencyField::NativeBuildInputs => &mut self.native_build_inputs,
            DependencyField::PropagatedBuildInputs => &mut self.propagated_build_inputs,
            DependencyField::PropagatedNativeBuildInputs => {
                &mut self.propagated_native_build_inputs
            },
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, SpecError> {
        serde_json::to_string_pretty(self).map_err(SpecError::SerializeJson)
    }

    pub fn to_toml_string(&self) -> Result<String, SpecError> {
        toml::to_string(self).map_err(SpecError::SerializeToml)
    }
}

impl Dependencies for Specification {
    fn dependencies(&self, field: DependencyField) -> &[SpecRef] {
        match field {
            DependencyField::BuildInputs => &self.build_inputs,
            DependencyField::NativeBuildInputs => &self.native_build_inputs,
            DependencyField::PropagatedBuildInputs => &self.propagated_build_inputs,
            DependencyField::PropagatedNativeBuildInputs => &self.propagated_native_build_inputs,
        }
    }
}
