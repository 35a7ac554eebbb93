use anyhow::Result;
use bpaf::Bpaf;
use devshell_spec::{ShellDocument, Specification};
use tracing::instrument;

use crate::utils::message;

// Print the merged shell hook
#[derive(Debug, Bpaf, Clone)]
pub struct Hook {}

impl Hook {
    #[instrument(name = "hook", skip_all)]
    pub fn handle(self, document: &ShellDocument) -> Result<()> {
        let shell = document.build();
        match render(&shell) {
            Ok(hook) => println!("{hook}"),
            Err(warning) => message::warning(warning),
        }
        Ok(())
    }
}

/// The hook to print, or the warning to show if the shell has none.
fn render(shell: &Specification) -> Result<&str, String> {
    shell.shell_hook.as_deref().ok_or_else(|| {
        format!(
            "shell '{}' has no shell hook",
            shell.name.as_deref().unwrap_or_default()
        )
    })
}
