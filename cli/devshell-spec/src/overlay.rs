use crate::merge::{DependencyField, Dependencies};
use crate::{Attrs, SpecRef};

/// Overlay fields consumed by the builder itself.
///
/// Pass-through attributes using one of these names are ignored.
pub const RESERVED_OVERLAY_FIELDS: [&str; 8] = [
    "name",
    "packages",
    "inputsFrom",
    "buildInputs",
    "nativeBuildInputs",
    "propagatedBuildInputs",
    "propagatedNativeBuildInputs",
    "shellHook",
];

/// Fields the builder always sets on a shell, regardless of input.
pub const BUILDER_OWNED_FIELDS: [&str; 3] = ["src", "phases", "buildPhase"];

/// User supplied fields layered on top of a base specification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShellOverlay {
    /// Overrides the derived shell name.
    pub name: Option<String>,
    /// Tools to make available in the shell, placed before any other
    /// `nativeBuildInputs`.
    pub packages: Vec<SpecRef>,
    /// Specifications whose dependencies are merged into the shell.
    /// They never appear in the shell's dependencies themselves.
    pub inputs_from: Vec<SpecRef>,
    pub build_inputs: Vec<SpecRef>,
    pub native_build_inputs: Vec<SpecRef>,
    pub propagated_build_inputs: Vec<SpecRef>,
    pub propagated_native_build_inputs: Vec<SpecRef>,
    pub shell_hook: Option<String>,
    pub attrs: Attrs,
}

impl ShellOverlay {
    pub fn is_reserved(field: &str) -> bool {
        RESERVED_OVERLAY_FIELDS.contains(&field)
    }

    pub fn is_builder_owned(field: &str) -> bool {
        BUILDER_OWNED_FIELDS.contains(&field)
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
}

impl Dependencies for ShellOverlay {
    fn dependencies(&self, field: DependencyField) -> &[SpecRef] {
        match field {
            DependencyField::BuildInputs => &self.build_inputs,
            DependencyField::NativeBuildInputs => &self.native_build_inputs,
            DependencyField::PropagatedBuildInputs => &self.propagated_build_inputs,
            DependencyField::PropagatedNativeBuildInputs => &self.propagated_native_build_inputs,
        }
    }
}
