use anyhow::Result;
use bpaf::Bpaf;
use devshell_spec::{ShellDocument, Specification};
use tracing::instrument;

use crate::config::{Config, OutputFormat};

// Print the derived shell specification
#[derive(Debug, Bpaf, Clone)]
pub struct Show {
    /// Output format, 'json' or 'toml'
    ///
    /// Defaults to the configured 'output_format'.
    #[bpaf(long, argument("FORMAT"))]
    format: Option<OutputFormat>,
}

impl Show {
    #[instrument(name = "show", skip_all)]
    pub fn handle(self, document: &ShellDocument, config: &Config) -> Result<()> {
        let format = self.format.unwrap_or(config.output_format);
        let shell = document.build();
        println!("{}", render(&shell, format)?);
        Ok(())
    }
}

fn render(shell: &Specification, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => shell.to_json_pretty()?,
        OutputFormat::Toml => shell.to_toml_string()?,
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_requested_format() {
        let document: ShellDocument = "[shell]\nname = \"dev\"\n".parse().unwrap();
        let shell = document.build();

        let json = render(&shell, OutputFormat::Json).unwrap();
        assert!(json.starts_with('{'), "{json}");
        assert!(json.contains("\"name\": \"dev\""), "{json}");

        let toml = render(&shell, OutputFormat::Toml).unwrap();
        assert!(toml.contains("name = \"dev\""), "{toml}");
    }
}
