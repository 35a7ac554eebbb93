use anyhow::Result;
use bpaf::Bpaf;
use devshell_spec::{Dependencies, DependencyField, ShellDocument, Specification};
use tracing::instrument;

// List the merged dependencies of the shell
#[derive(Debug, Bpaf, Clone)]
pub struct Inputs {
    /// Only list this field, e.g. 'nativeBuildInputs'
    #[bpaf(positional("FIELD"))]
    field: Option<DependencyField>,
}

impl Inputs {
    #[instrument(name = "inputs", skip_all)]
    pub fn handle(self, document: &ShellDocument) -> Result<()> {
        let shell = document.build();
        print!("{}", render(&shell, self.field));
        Ok(())
    }
}

/// One name per line for a single field,
/// or every field followed by its indented names.
fn render(shell: &Specification, field: Option<DependencyField>) -> String {
    match field {
        Some(field) => shell
            .dependencies(field)
            .iter()
            .map(|dep| format!("{dep}\n"))
            .collect(),
        None => DependencyField::ALL
            .into_iter()
            .map(|field| {
                let deps: String = shell
                    .dependencies(field)
                    .iter()
                    .map(|dep| format!("  {dep}\n"))
                    .collect();
                format!("{field}:\n{deps}")
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn shell() -> Specification {
        let document: ShellDocument = indoc! {r#"
            [specs.cargo]
            [specs.openssl]
            [specs.clippy]
            [specs.pkg]
            nativeBuildInputs = ["cargo"]
            buildInputs = ["openssl"]

            [shell]
            packages = ["clippy"]
            inputsFrom = ["pkg"]
        "#}
        .parse()
        .unwrap();
        document.build()
    }

    #[test]
    fn renders_single_field() {
        assert_eq!(
            render(&shell(), Some(DependencyField::NativeBuildInputs)),
            "clippy\ncargo\n"
        );
    }

    #[test]
    fn renders_all_fields() {
        assert_eq!(render(&shell(), None), indoc! {"
            buildInputs:
              openssl
            nativeBuildInputs:
              clippy
              cargo
            propagatedBuildInputs:
            propagatedNativeBuildInputs:
        "});
    }
}
