mod hook;
mod inputs;
mod script;
mod show;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bpaf::Bpaf;
use devshell_spec::ShellDocument;
use indoc::indoc;
use tracing::debug;

use crate::config::{Config, DEFAULT_DOCUMENT};

const DEVSHELL_DESCRIPTION: &str = indoc! {"
    Derive a development shell from a package specification.

    Reads a shell document declaring named specifications and a [shell] table,
    then merges the base package's dependencies, the shell's own dependencies
    and those of every 'inputsFrom' entry into a single shell specification."
};

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug)]
pub enum Verbosity {
    Verbose(
        /// Increase logging verbosity
        ///
        /// Invoke multiple times for increasing detail.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Silence logs except for errors
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Bpaf)]
#[bpaf(options, descr(DEVSHELL_DESCRIPTION))]
pub struct DevshellCli(#[bpaf(external(devshell_args))] pub DevshellArgs);

/// Main devshell args parser
///
/// To parse the devshell CLI, use [`DevshellCli`] instead using [`devshell_cli()`].
#[derive(Debug, Bpaf)]
#[bpaf(ignore_rustdoc)] // we don't want this struct to be interpreted as a group
pub struct DevshellArgs {
    /// Verbose mode
    ///
    /// Invoke multiple times for increasing detail.
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    /// Shell document to read
    ///
    /// Defaults to the configured 'default_file', then './shell.toml'.
    #[bpaf(long, short, argument("PATH"))]
    pub file: Option<PathBuf>,

    #[bpaf(external(commands))]
    command: Commands,
}

impl DevshellArgs {
    pub fn handle(self, config: Config) -> Result<()> {
        match self.command {
            Commands::Show(args) => {
                let document = load_document(self.file.as_deref(), &config)?;
                args.handle(&document, &config)
            },
            Commands::Hook(args) => {
                let document = load_document(self.file.as_deref(), &config)?;
                args.handle(&document)
            },
            Commands::Inputs(args) => {
                let document = load_document(self.file.as_deref(), &config)?;
                args.handle(&document)
            },
            Commands::Script(args) => args.handle(),
        }
    }
}

#[derive(Bpaf, Clone, Debug)]
enum Commands {
    /// Print the derived shell specification
    #[bpaf(command)]
    Show(#[bpaf(external(show::show))] show::Show),

    /// Print the merged shell hook
    #[bpaf(command)]
    Hook(#[bpaf(external(hook::hook))] hook::Hook),

    /// List the merged dependencies of the shell
    #[bpaf(command)]
    Inputs(#[bpaf(external(inputs::inputs))] inputs::Inputs),

    /// Print the build script that records the shell environment
    #[bpaf(command)]
    Script(#[bpaf(external(script::script))] script::Script),
}

/// Resolve which shell document to use and load it.
///
/// `--file` wins over the configured `default_file`,
/// which wins over [DEFAULT_DOCUMENT] in the working directory.
fn load_document(file: Option<&Path>, config: &Config) -> Result<ShellDocument> {
    let path = document_path(file, config);
    debug!(path = %path.display(), "loading shell document");

    ShellDocument::from_path(&path)
        .with_context(|| format!("could not load shell document '{}'", path.display()))
}

fn document_path(file: Option<&Path>, config: &Config) -> PathBuf {
    file.map(Path::to_path_buf)
        .or_else(|| config.default_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCUMENT))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn document_path_precedence() {
        let mut config = Config::default();
        assert_eq!(document_path(None, &config), PathBuf::from(DEFAULT_DOCUMENT));

        config.default_file = Some(PathBuf::from("configured.toml"));
        assert_eq!(
            document_path(None, &config),
            PathBuf::from("configured.toml")
        );
        assert_eq!(
            document_path(Some(Path::new("flag.toml")), &config),
            PathBuf::from("flag.toml")
        );
    }

    #[test]
    fn parses_verbosity_and_file() {
        let args = devshell_cli()
            .run_inner(&["-vv", "--file", "dev.toml", "hook"][..])
            .unwrap()
            .0;

        assert!(matches!(args.verbosity, Verbosity::Verbose(2)));
        assert_eq!(args.file, Some(PathBuf::from("dev.toml")));
        assert!(matches!(args.command, Commands::Hook(_)));
    }

    #[test]
    fn missing_document_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = load_document(Some(&path), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("absent.toml"), "{err}");
    }
}
