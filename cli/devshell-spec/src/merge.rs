use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use itertools::Itertools;

use crate::{ShellOverlay, SpecRef};

#[derive(Debug, thiserror::Error)]
#[error("unknown dependency field '{0}'")]
pub struct UnknownDependencyField(String);

/// The dependency lists of a specification that are merged into a shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DependencyField {
    BuildInputs,
    NativeBuildInputs,
    PropagatedBuildInputs,
    PropagatedNativeBuildInputs,
}

impl DependencyField {
    pub const ALL: [DependencyField; 4] = [
        DependencyField::BuildInputs,
        DependencyField::NativeBuildInputs,
        DependencyField::PropagatedBuildInputs,
        DependencyField::PropagatedNativeBuildInputs,
    ];

    /// The derivation attribute this field is stored under.
    pub fn attr_name(self) -> &'static str {
        match self {
            DependencyField::BuildInputs => "buildInputs",
            DependencyField::NativeBuildInputs => "nativeBuildInputs",
            DependencyField::PropagatedBuildInputs => "propagatedBuildInputs",
            DependencyField::PropagatedNativeBuildInputs => "propagatedNativeBuildInputs",
        }
    }
}

impl Display for DependencyField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.attr_name())
    }
}

impl FromStr for DependencyField {
    type Err = UnknownDependencyField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DependencyField::ALL
            .into_iter()
            .find(|field| field.attr_name() == s)
            .ok_or_else(|| UnknownDependencyField(s.to_string()))
    }
}

/// Access to the dependency lists of anything that carries them.
pub trait Dependencies {
    fn dependencies(&self, field: DependencyField) -> &[SpecRef];
}

/// Merge one dependency field of `base`, `overlay` and the overlay's `inputsFrom`.
///
/// The result is `base[field] ++ overlay[field] ++ contributed`, where
/// `contributed` concatenates `field` of every `inputsFrom` entry in order,
/// minus the `inputsFrom` entries themselves.
pub fn merge_inputs(
    field: DependencyField,
    base: &impl Dependencies,
    overlay: &ShellOverlay,
) -> Vec<SpecRef> {
    let contributed = overlay
        .inputs_from
        .iter()
        .flat_map(|source| source.dependencies(field))
        .cloned();

    base.dependencies(field)
        .iter()
        .chain(overlay.dependencies(field))
        .cloned()
        .chain(subtract_refs(&overlay.inputs_from, contributed))
        .collect()
}

/// Drop every reference that is identical to one in `excluded`, keeping order.
pub fn subtract_refs<'a, I>(
    excluded: &'a [SpecRef],
    refs: I,
) -> impl Iterator<Item = SpecRef> + 'a
where
    I: IntoIterator<Item = SpecRef>,
    I::IntoIter: 'a,
{
    refs.into_iter()
        .filter(move |candidate| !excluded.iter().any(|e| e.ptr_eq(candidate)))
}

/// Join hooks with newlines, skipping absent and empty ones.
///
/// Returns `None` if no hook is left.
pub fn concat_hooks<'a>(hooks: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    let mut present = hooks
        .into_iter()
        .flatten()
        .filter(|hook| !hook.is_empty())
        .peekable();

    present.peek()?;
    Some(present.join("\n"))
}
