//! Shell documents: the TOML form of a set of specifications and a shell.
//!
//! ```toml
//! [specs.cargo]
//! [specs.rustc]
//! [specs.myPackage]
//! nativeBuildInputs = ["cargo", "rustc"]
//!
//! [shell]
//! base = "myPackage"
//! inputsFrom = ["myPackage"]
//! ```
//!
//! Specifications refer to each other by name. Every name resolves to a
//! single shared [SpecRef], so within a document two references are the same
//! dependency exactly when they use the same name.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::merge::DependencyField;
use crate::{Attrs, ShellOverlay, ShellSpecBuilder, SpecError, SpecRef, Specification};

/// Name used as the referrer in errors about the `[shell]` table.
const SHELL_TABLE: &str = "shell";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSpecification {
    name: Option<String>,
    #[serde(default)]
    build_inputs: Vec<String>,
    #[serde(default)]
    native_build_inputs: Vec<String>,
    #[serde(default)]
    propagated_build_inputs: Vec<String>,
    #[serde(default)]
    propagated_native_build_inputs: Vec<String>,
    shell_hook: Option<String>,
    src: Option<String>,
    #[serde(default)]
    phases: Vec<String>,
    build_phase: Option<String>,
    #[serde(flatten)]
    attrs: Attrs,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawShell {
    /// Name of the specification the shell is derived from.
    base: Option<String>,
    name: Option<String>,
    #[serde(default)]
    packages: Vec<String>,
    #[serde(default)]
    inputs_from: Vec<String>,
    #[serde(default)]
    build_inputs: Vec<String>,
    #[serde(default)]
    native_build_inputs: Vec<String>,
    #[serde(default)]
    propagated_build_inputs: Vec<String>,
    #[serde(default)]
    propagated_native_build_inputs: Vec<String>,
    shell_hook: Option<String>,
    #[serde(flatten)]
    attrs: Attrs,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    specs: BTreeMap<String, RawSpecification>,
    #[serde(default)]
    shell: RawShell,
}

impl RawSpecification {
    fn dependency_names(&self, field: DependencyField) -> &[String] {
        match field {
            DependencyField::BuildInputs => &self.build_inputs,
            DependencyField::NativeBuildInputs => &self.native_build_inputs,
            DependencyField::PropagatedBuildInputs => &self.propagated_build_inputs,
            DependencyField::PropagatedNativeBuildInputs => &self.propagated_native_build_inputs,
        }
    }
}

impl RawShell {
    fn dependency_names(&self, field: DependencyField) -> &[String] {
        match field {
            DependencyField::BuildInputs => &self.build_inputs,
            DependencyField::NativeBuildInputs => &self.native_build_inputs,
            DependencyField::PropagatedBuildInputs => &self.propagated_build_inputs,
            DependencyField::PropagatedNativeBuildInputs => &self.propagated_native_build_inputs,
        }
    }
}

/// A parsed shell document with all references resolved.
#[derive(Debug, Clone)]
pub struct ShellDocument {
    specs: BTreeMap<String, SpecRef>,
    base: Option<SpecRef>,
    overlay: ShellOverlay,
}

impl ShellDocument {
    /// Read and resolve the shell document at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading shell document");
        let contents = std::fs::read_to_string(path).map_err(SpecError::IORead)?;
        contents.parse()
    }

    /// The resolved specification declared under `[specs.<name>]`.
    pub fn spec(&self, name: &str) -> Option<&SpecRef> {
        self.specs.get(name)
    }

    /// All declared specifications, by name.
    pub fn specs(&self) -> &BTreeMap<String, SpecRef> {
        &self.specs
    }

    /// The specification named by `shell.base`, if any.
    pub fn base(&self) -> Option<&SpecRef> {
        self.base.as_ref()
    }

    pub fn overlay(&self) -> &ShellOverlay {
        &self.overlay
    }

    /// Derive the shell this document describes.
    pub fn build(&self) -> Specification {
        match &self.base {
            Some(base) => ShellSpecBuilder::build(base, &self.overlay),
            None => ShellSpecBuilder::build_standalone(&self.overlay),
        }
    }

    fn from_raw(raw: RawDocument) -> Result<Self, SpecError> {
        let mut resolver = Resolver::new(&raw.specs);
        for (name, spec) in &raw.specs {
            resolver.resolve(name, spec)?;
        }
        let specs = resolver.resolved;

        let lookup = |field: &str, name: &String| {
            specs
                .get(name)
                .cloned()
                .ok_or_else(|| SpecError::UnknownReference {
                    from: SHELL_TABLE.to_string(),
                    field: field.to_string(),
                    name: name.clone(),
                })
        };
        let lookup_all = |field: &str, names: &[String]| {
            names
                .iter()
                .map(|name| lookup(field, name))
                .collect::<Result<Vec<_>, _>>()
        };

        let shell = raw.shell;
        let base = shell
            .base
            .as_ref()
            .map(|name| lookup("base", name))
            .transpose()?;

        let mut overlay = ShellOverlay {
            name: shell.name.clone(),
            packages: lookup_all("packages", &shell.packages)?,
            inputs_from: lookup_all("inputsFrom", &shell.inputs_from)?,
            shell_hook: shell.shell_hook.clone(),
            attrs: shell.attrs.clone(),
            ..Default::default()
        };
        for field in DependencyField::ALL {
            *overlay.dependencies_mut(field) =
                lookup_all(field.attr_name(), shell.dependency_names(field))?;
        }

        debug!(
            specs = specs.len(),
            base = shell.base.as_deref().unwrap_or("<none>"),
            "resolved shell document"
        );

        Ok(Self {
            specs,
            base,
            overlay,
        })
    }
}

impl FromStr for ShellDocument {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: RawDocument = toml::from_str(s).map_err(SpecError::ParseToml)?;
        Self::from_raw(raw)
    }
}

/// A specification whose dependencies are still being resolved.
struct Pending<'a> {
    name: &'a str,
    /// Dependency names in field order.
    deps: Vec<(DependencyField, &'a str)>,
    /// Index into `deps` of the next dependency to attach.
    next: usize,
    spec: Specification,
}

impl<'a> Pending<'a> {
    fn new(name: &'a str, raw: &'a RawSpecification) -> Self {
        let deps = DependencyField::ALL
            .into_iter()
            .flat_map(|field| {
                raw.dependency_names(field)
                    .iter()
                    .map(move |dep| (field, dep.as_str()))
            })
            .collect();

        let spec = Specification {
            name: Some(raw.name.clone().unwrap_or_else(|| name.to_string())),
            shell_hook: raw.shell_hook.clone(),
            src: raw.src.clone(),
            phases: raw.phases.clone(),
            build_phase: raw.build_phase.clone(),
            attrs: raw.attrs.clone(),
            ..Default::default()
        };

        Self {
            name,
            deps,
            next: 0,
            spec,
        }
    }
}

/// Turns named raw specifications into shared handles, depth first.
///
/// Uses an explicit stack, so chains of any length resolve without
/// growing the call stack.
struct Resolver<'a> {
    raw: &'a BTreeMap<String, RawSpecification>,
    resolved: BTreeMap<String, SpecRef>,
}

impl<'a> Resolver<'a> {
    fn new(raw: &'a BTreeMap<String, RawSpecification>) -> Self {
        Self {
            raw,
            resolved: BTreeMap::new(),
        }
    }

    /// Resolve `name` and everything it depends on.
    fn resolve(&mut self, name: &'a str, raw: &'a RawSpecification) -> Result<(), SpecError> {
        if self.resolved.contains_key(name) {
            return Ok(());
        }

        let raw_specs = self.raw;
        // outermost first, the names on this stack form the current path
        let mut in_progress = vec![Pending::new(name, raw)];

        while let Some(pending) = in_progress.last_mut() {
            let Some(&(field, dep)) = pending.deps.get(pending.next) else {
                let name = pending.name;
                let spec = SpecRef::new(std::mem::take(&mut pending.spec));
                in_progress.pop();
                self.resolved.insert(name.to_string(), spec);
                continue;
            };

            if let Some(resolved) = self.resolved.get(dep) {
                pending.spec.dependencies_mut(field).push(resolved.clone());
                pending.next += 1;
                continue;
            }

            let from = pending.name;
            let Some((dep_name, dep_raw)) = raw_specs.get_key_value(dep) else {
                return Err(SpecError::UnknownReference {
                    from: from.to_string(),
                    field: field.attr_name().to_string(),
                    name: dep.to_string(),
                });
            };

            if let Some(start) = in_progress.iter().position(|p| p.name == dep) {
                let mut cycle: Vec<String> = in_progress[start..]
                    .iter()
                    .map(|p| p.name.to_string())
                    .collect();
                cycle.push(dep.to_string());
                return Err(SpecError::ReferenceCycle(cycle));
            }

            // attached once resolved, `next` stays on this dependency
            in_progress.push(Pending::new(dep_name, dep_raw));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::Dependencies;

    fn names(refs: &[SpecRef]) -> Vec<&str> {
        refs.iter().map(SpecRef::display_name).collect()
    }

    #[test]
    fn shared_names_share_identity() {
        let document: ShellDocument = indoc! {r#"
            [specs.openssl]
            [specs.a]
            buildInputs = ["openssl"]
            [specs.b]
            buildInputs = ["openssl"]
        "#}
        .parse()
        .unwrap();

        let a = document.spec("a").unwrap();
        let b = document.spec("b").unwrap();
        let openssl = document.spec("openssl").unwrap();
        assert_eq!(a.build_inputs[0], b.build_inputs[0]);
        assert_eq!(&a.build_inputs[0], openssl);
    }

    #[test]
    fn table_key_names_unnamed_specs() {
        let document: ShellDocument = indoc! {r#"
            [specs.cargo]
            [specs.renamed]
            name = "rustc"
        "#}
        .parse()
        .unwrap();

        assert_eq!(document.spec("cargo").unwrap().display_name(), "cargo");
        assert_eq!(document.spec("renamed").unwrap().display_name(), "rustc");
    }

    #[test]
    fn extra_keys_pass_through() {
        let document: ShellDocument = indoc! {r#"
            [specs.pkg]
            doCheck = true
            RUST_BACKTRACE = "1"

            [shell]
            base = "pkg"
            LANG = "C.UTF-8"
        "#}
        .parse()
        .unwrap();

        let pkg = document.spec("pkg").unwrap();
        assert_eq!(
            pkg.attrs,
            Attrs::from([
                ("RUST_BACKTRACE".to_string(), json!("1")),
                ("doCheck".to_string(), json!(true)),
            ])
        );
        assert_eq!(
            document.overlay().attrs,
            Attrs::from([("LANG".to_string(), json!("C.UTF-8"))])
        );
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let err = indoc! {r#"
            [specs.pkg]
            nativeBuildInputs = ["cargo"]
        "#}
        .parse::<ShellDocument>()
        .unwrap_err();

        match err {
            SpecError::UnknownReference { from, field, name } => {
                assert_eq!(from, "pkg");
                assert_eq!(field, "nativeBuildInputs");
                assert_eq!(name, "cargo");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_shell_reference_is_rejected() {
        let err = indoc! {r#"
            [shell]
            inputsFrom = ["missing"]
        "#}
        .parse::<ShellDocument>()
        .unwrap_err();

        assert!(matches!(
            err,
            SpecError::UnknownReference { ref from, ref field, ref name }
                if from == "shell" && field == "inputsFrom" && name == "missing"
        ));

        let err = "[shell]\nbase = \"missing\"\n"
            .parse::<ShellDocument>()
            .unwrap_err();
        assert!(matches!(err, SpecError::UnknownReference { ref field, .. } if field == "base"));
    }

    #[test]
    fn cycles_are_rejected() {
        let err = indoc! {r#"
            [specs.a]
            buildInputs = ["b"]
            [specs.b]
            propagatedBuildInputs = ["c"]
            [specs.c]
            nativeBuildInputs = ["a"]
        "#}
        .parse::<ShellDocument>()
        .unwrap_err();

        match err {
            SpecError::ReferenceCycle(cycle) => assert_eq!(cycle, vec!["a", "b", "c", "a"]),
            other => panic!("unexpected error: {other}"),
        }

        let err = "[specs.a]\nbuildInputs = [\"a\"]\n"
            .parse::<ShellDocument>()
            .unwrap_err();
        assert!(matches!(err, SpecError::ReferenceCycle(_)));
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let err = "[specs.a\n".parse::<ShellDocument>().unwrap_err();
        assert!(matches!(err, SpecError::ParseToml(_)));

        let err = "[specs.a]\nbuildInputs = \"cargo\"\n"
            .parse::<ShellDocument>()
            .unwrap_err();
        assert!(matches!(err, SpecError::ParseToml(_)));
    }

    #[test]
    fn empty_document_builds_default_shell() {
        let document: ShellDocument = "".parse().unwrap();
        assert!(document.base().is_none());

        let shell = document.build();
        assert_eq!(shell.name.as_deref(), Some(crate::DEFAULT_SHELL_NAME));
        assert!(shell.native_build_inputs.is_empty());
    }

    #[test]
    fn builds_shell_from_document() {
        let document: ShellDocument = indoc! {r#"
            [specs.cargo]
            [specs.rustc]
            [specs.clippy]
            [specs.openssl]
            [specs.pkg-config]
            [specs.myPackage]
            nativeBuildInputs = ["cargo", "rustc"]
            [specs.ffi]
            nativeBuildInputs = ["pkg-config"]
            buildInputs = ["openssl"]
            shellHook = "export OPENSSL_NO_VENDOR=1"

            [shell]
            base = "myPackage"
            packages = ["clippy"]
            inputsFrom = ["ffi"]
            shellHook = "echo ready"
        "#}
        .parse()
        .unwrap();

        let shell = document.build();
        assert_eq!(shell.name.as_deref(), Some("myPackage-dev-shell"));
        assert_eq!(
            names(shell.dependencies(DependencyField::NativeBuildInputs)),
            vec!["clippy", "cargo", "rustc", "pkg-config"]
        );
        assert_eq!(names(&shell.build_inputs), vec!["openssl"]);
        assert_eq!(
            shell.shell_hook.as_deref(),
            Some("export OPENSSL_NO_VENDOR=1\necho ready")
        );
    }

    #[test]
    fn resolves_long_dependency_chains() {
        const DEPTH: usize = 5_000;
        let mut text = String::new();
        for i in 0..DEPTH {
            text.push_str(&format!("[specs.s{i}]\nbuildInputs = [\"s{}\"]\n", i + 1));
        }
        text.push_str(&format!("[specs.s{DEPTH}]\n\n[shell]\nbase = \"s0\"\n"));

        let document: ShellDocument = text.parse().unwrap();

        let mut current = document.spec("s0").unwrap().clone();
        let mut length = 0;
        while let Some(next) = current.build_inputs.first().cloned() {
            current = next;
            length += 1;
        }
        assert_eq!(length, DEPTH);
        assert_eq!(current.display_name(), format!("s{DEPTH}"));

        let shell = document.build();
        assert_eq!(names(&shell.build_inputs), vec!["s1"]);
    }

    #[test]
    fn reads_document_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shell.toml");
        std::fs::write(&path, "[shell]\nname = \"dev\"\n").unwrap();

        let document = ShellDocument::from_path(&path).unwrap();
        assert_eq!(document.build().name.as_deref(), Some("dev"));

        let err = ShellDocument::from_path(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, SpecError::IORead(_)));
    }
}
