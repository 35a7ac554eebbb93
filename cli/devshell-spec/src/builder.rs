use tracing::{debug, trace};

use crate::merge::{DependencyField, concat_hooks, merge_inputs};
use crate::script::{BUILD_PHASE, build_phase_script};
use crate::{Attrs, DEFAULT_SHELL_NAME, DEV_SHELL_SUFFIX, ShellOverlay, Specification};

/// Derives development shell specifications.
///
/// Building is total: every missing field defaults to an empty list or an
/// absent value, so there is nothing to fail on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellSpecBuilder;

impl ShellSpecBuilder {
    /// Derive a shell for working on `base`, extended by `overlay`.
    pub fn build(base: &Specification, overlay: &ShellOverlay) -> Specification {
        let name = Self::resolve_name(base, overlay);
        debug!(%name, inputs_from = overlay.inputs_from.len(), "building shell specification");

        let mut shell = Specification {
            name: Some(name),
            attrs: Self::passthrough_attrs(base, overlay),
            ..Default::default()
        };

        for field in DependencyField::ALL {
            let merged = merge_inputs(field, base, overlay);
            trace!(%field, count = merged.len(), "merged dependency field");
            *shell.dependencies_mut(field) = merged;
        }

        // packages come before everything else in nativeBuildInputs
        shell.native_build_inputs = overlay
            .packages
            .iter()
            .cloned()
            .chain(std::mem::take(&mut shell.native_build_inputs))
            .collect();

        // later sources run their hooks first, the overlay's hook runs last
        shell.shell_hook = concat_hooks(
            overlay
                .inputs_from
                .iter()
                .rev()
                .map(|source| source.shell_hook.as_deref())
                .chain([overlay.shell_hook.as_deref()]),
        );

        shell.src = None;
        shell.phases = vec![BUILD_PHASE.to_string()];
        shell.build_phase = Some(build_phase_script());

        shell
    }

    /// Derive a shell that isn't based on any package.
    pub fn build_standalone(overlay: &ShellOverlay) -> Specification {
        Self::build(&Specification::default(), overlay)
    }

    /// The overlay's name, else `<base name>-dev-shell`, else [DEFAULT_SHELL_NAME].
    ///
    /// A provided name is used as is, even if empty.
    pub fn resolve_name(base: &Specification, overlay: &ShellOverlay) -> String {
        overlay
            .name
            .clone()
            .or_else(|| base.name.as_ref().map(|name| format!("{name}{DEV_SHELL_SUFFIX}")))
            .unwrap_or_else(|| DEFAULT_SHELL_NAME.to_string())
    }

    /// Base attributes overridden by the overlay's non-reserved attributes.
    fn passthrough_attrs(base: &Specification, overlay: &ShellOverlay) -> Attrs {
        let mut attrs = Attrs::new();
        let base_attrs = base.attrs.iter();
        let overlay_attrs = overlay
            .attrs
            .iter()
            .filter(|(key, _)| !ShellOverlay::is_reserved(key));

        for (key, value) in base_attrs.chain(overlay_attrs) {
            if ShellOverlay::is_builder_owned(key) {
                debug!(attribute = %key, "ignoring attribute set by the shell builder");
                continue;
            }
            attrs.insert(key.clone(), value.clone());
        }
        attrs
    }
}
