use crate::core::models::ids::AtomId;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Unknown repair policy: '{0}'")]
    UnknownRepairPolicy(String),
    #[error("Unknown cleanup token: '{0}'")]
    UnknownCleanupToken(String),
    #[error("Unknown preparation mode: '{0}'")]
    UnknownMode(String),
}

/// Whether the workflow writes its own output.
///
/// In interactive mode the caller owns the write, typically because it wants to
/// adjust the system further before committing it to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreparationMode {
    #[default]
    Automatic,
    Interactive,
}

impl FromStr for PreparationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "automatic" => Ok(PreparationMode::Automatic),
            "interactive" => Ok(PreparationMode::Interactive),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

/// Structural repairs applied before charge assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepairPolicy {
    /// Connect isolated atoms, then add polar hydrogens.
    BondsHydrogens,
    /// Bond every isolated atom to its closest neighbor.
    Bonds,
    /// Add polar hydrogens to under-coordinated heavy atoms.
    Hydrogens,
    /// Add hydrogens only when the structure has none at all.
    #[default]
    CheckHydrogens,
    /// No repairs.
    None,
}

impl FromStr for RepairPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bonds_hydrogens" => Ok(RepairPolicy::BondsHydrogens),
            "bonds" => Ok(RepairPolicy::Bonds),
            "hydrogens" => Ok(RepairPolicy::Hydrogens),
            "checkhydrogens" => Ok(RepairPolicy::CheckHydrogens),
            "None" | "none" => Ok(RepairPolicy::None),
            _ => Err(ConfigError::UnknownRepairPolicy(s.to_string())),
        }
    }
}

/// How partial charges are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChargePolicy {
    /// Compute Gasteiger (PEOE) charges for every atom.
    #[default]
    Gasteiger,
    /// Leave the charge state from the input file untouched.
    PreserveInput,
}

/// Which non-essential atoms the cleanup stage removes or merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupPolicy {
    /// Merge each nonpolar hydrogen's charge into its carbon and delete it.
    pub merge_nonpolar_hydrogens: bool,
    /// Merge lone-pair pseudo-atoms into their parents and delete them.
    pub merge_lone_pairs: bool,
    /// Remove water residues.
    pub remove_waters: bool,
    /// Remove chains composed entirely of nonstandard residues.
    pub remove_nonstd_chains: bool,
    /// Delete alternate-location B atoms and clear the marker on survivors.
    pub delete_alt_b: bool,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            merge_nonpolar_hydrogens: true,
            merge_lone_pairs: true,
            remove_waters: true,
            remove_nonstd_chains: true,
            delete_alt_b: false,
        }
    }
}

impl CleanupPolicy {
    /// A policy that cleans nothing.
    pub fn none() -> Self {
        Self {
            merge_nonpolar_hydrogens: false,
            merge_lone_pairs: false,
            remove_waters: false,
            remove_nonstd_chains: false,
            delete_alt_b: false,
        }
    }
}

impl FromStr for CleanupPolicy {
    type Err = ConfigError;

    /// Parses an underscore-joined token list, e.g. `nphs_lps_waters_nonstdres`.
    /// An empty string cleans nothing; an unknown token is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut policy = CleanupPolicy::none();
        for token in s.split('_').filter(|t| !t.is_empty()) {
            match token {
                "nphs" => policy.merge_nonpolar_hydrogens = true,
                "lps" => policy.merge_lone_pairs = true,
                "waters" => policy.remove_waters = true,
                "nonstdres" => policy.remove_nonstd_chains = true,
                "deleteAltB" => policy.delete_alt_b = true,
                _ => return Err(ConfigError::UnknownCleanupToken(token.to_string())),
            }
        }
        Ok(policy)
    }
}

/// Charges captured before preparation, keyed by atom ID.
///
/// Each entry records the charge-set name that was active and its value; the
/// engine and the wrapper both restore from this record so the written output
/// and the in-memory system agree.
pub type PreservedCharges = HashMap<AtomId, (String, f64)>;

/// Full parameter set for a preparation run.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparationConfig {
    pub mode: PreparationMode,
    pub repairs: RepairPolicy,
    pub charges: ChargePolicy,
    pub cleanup: CleanupPolicy,
    /// Delete every residue whose name is not in the standard set (`-e`).
    pub delete_nonstd_residues: bool,
    pub output_path: PathBuf,
}

#[derive(Default)]
pub struct PreparationConfigBuilder {
    mode: Option<PreparationMode>,
    repairs: Option<RepairPolicy>,
    charges: Option<ChargePolicy>,
    cleanup: Option<CleanupPolicy>,
    delete_nonstd_residues: Option<bool>,
    output_path: Option<PathBuf>,
}

impl PreparationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: PreparationMode) -> Self {
        self.mode = Some(mode);
        self
    }
    pub fn repairs(mut self, policy: RepairPolicy) -> Self {
        self.repairs = Some(policy);
        self
    }
    pub fn charges(mut self, policy: ChargePolicy) -> Self {
        self.charges = Some(policy);
        self
    }
    pub fn cleanup(mut self, policy: CleanupPolicy) -> Self {
        self.cleanup = Some(policy);
        self
    }
    pub fn delete_nonstd_residues(mut self, delete: bool) -> Self {
        self.delete_nonstd_residues = Some(delete);
        self
    }
    pub fn output_path(mut self, path: PathBuf) -> Self {
        self.output_path = Some(path);
        self
    }

    pub fn build(self) -> Result<PreparationConfig, ConfigError> {
        Ok(PreparationConfig {
            mode: self.mode.unwrap_or_default(),
            repairs: self.repairs.unwrap_or_default(),
            charges: self.charges.unwrap_or_default(),
            cleanup: self.cleanup.unwrap_or_default(),
            delete_nonstd_residues: self.delete_nonstd_residues.unwrap_or(false),
            output_path: self
                .output_path
                .ok_or(ConfigError::MissingParameter("output_path"))?,
        })
    }
}
