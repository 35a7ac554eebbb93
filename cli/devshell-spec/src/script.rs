//! The single build phase of a development shell.
//!
//! Realizing a shell doesn't build anything: the phase records the
//! environment it runs in to `$out`, so an interactive shell can source it.

/// Name of the only phase a shell runs.
pub const BUILD_PHASE: &str = "buildPhase";

/// Lines echoed at the top of the realized environment file.
pub const BANNER: [&str; 4] = [
    "------------------------------------------------------------",
    " WARNING: the existence of this path is not guaranteed.",
    " It is an internal implementation detail for pkgs.mkShell.",
    "------------------------------------------------------------",
];

/// Render the script run as the shell's `buildPhase`.
///
/// ```text
/// {
///   echo "<banner line>";
///   ...
///   echo;
///   # Record all build inputs as runtime dependencies
///   export;
/// } >> "$out"
/// ```
pub fn build_phase_script() -> String {
    let mut script = String::from("{\n");
    for line in BANNER {
        // banner lines contain no characters special inside double quotes
        script.push_str(&format!("  echo \"{line}\";\n"));
    }
    script.push_str("  echo;\n");
    script.push_str("  # Record all build inputs as runtime dependencies\n");
    script.push_str("  export;\n");
    script.push_str("} >> \"$out\"\n");
    script
}
