use clap::{Args, Parser};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    name = "prepare-receptor",
    version,
    about = "Prepares a macromolecular receptor for docking: repairs the structure, assigns partial charges, removes non-essential atoms, and writes a PDBQT file.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    #[command(flatten)]
    pub args: PrepareArgs,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Arguments for a receptor preparation run.
#[derive(Args, Debug, Clone)]
pub struct PrepareArgs {
    /// Path to the input receptor structure (PDB, or PDBQT-style columns).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub receptor: PathBuf,

    /// Path for the output PDBQT file. Defaults to `<molecule name>.pdbqt`.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Structural repairs to attempt:
    /// bonds_hydrogens, bonds, hydrogens, checkhydrogens, or None.
    #[arg(short = 'A', long, default_value = "checkhydrogens", value_name = "POLICY")]
    pub repairs: String,

    /// Preserve all input charges, i.e. do not add new charges.
    #[arg(short = 'C', long)]
    pub preserve_input_charges: bool,

    /// Preserve the input charges of all atoms with this AutoDock type
    /// (e.g. -p Zn). May be given multiple times.
    #[arg(short = 'p', long = "preserve", value_name = "TYPE")]
    pub preserve: Vec<String>,

    /// Cleanup to perform, as an underscore-joined token list out of
    /// nphs, lps, waters, nonstdres, deleteAltB.
    #[arg(
        short = 'U',
        long,
        default_value = "nphs_lps_waters_nonstdres",
        value_name = "SPEC"
    )]
    pub cleanup: String,

    /// Delete every nonstandard residue from any chain.
    #[arg(short = 'e', long)]
    pub delete_nonstd_residues: bool,

    /// Preparation mode: automatic writes the output itself, interactive
    /// leaves the write to the wrapper.
    #[arg(short = 'M', long, default_value = "automatic", value_name = "MODE")]
    pub mode: String,
}
