use anyhow::Result;
use bpaf::Bpaf;
use devshell_spec::script::build_phase_script;
use tracing::instrument;

// Print the build script that records the shell environment
#[derive(Debug, Bpaf, Clone)]
pub struct Script {}

impl Script {
    #[instrument(name = "script", skip_all)]
    pub fn handle(self) -> Result<()> {
        print!("{}", build_phase_script());
        Ok(())
    }
}
