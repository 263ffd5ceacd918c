//! The receptor preparation workflow.
//!
//! Runs the configured pipeline over a molecular system: structural repairs,
//! AutoDock typing, partial charge assignment, cleanup, and the output write.
//! The caller captures any charges to preserve beforehand and passes them in;
//! the workflow restores them so the written file honors the record.

use crate::core::chem::bonds::{build_bonds_by_distance, connect_isolated_atoms};
use crate::core::chem::gasteiger::assign_gasteiger_charges;
use crate::core::chem::hydrogens::{add_polar_hydrogens, has_hydrogens};
use crate::core::chem::typing::assign_autodock_types;
use crate::core::io::pdbqt::PdbqtFile;
use crate::core::io::traits::StructureWriter;
use crate::core::models::system::MolecularSystem;
use crate::engine::cleanup;
use crate::engine::config::{
    ChargePolicy, PreparationConfig, PreparationMode, PreservedCharges, RepairPolicy,
};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::PathBuf;
use tracing::{info, instrument};

/// Per-stage counts from a preparation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparationReport {
    pub bonds_added: usize,
    pub hydrogens_added: usize,
    pub atoms_typed: usize,
    pub atoms_charged: usize,
    pub charges_preserved: usize,
    pub hydrogens_merged: usize,
    pub lone_pairs_merged: usize,
    pub waters_removed: usize,
    pub chains_removed: usize,
    pub altloc_atoms_removed: usize,
    pub nonstd_residues_removed: usize,
    /// Where the output landed, if this run wrote it.
    pub output_path: Option<PathBuf>,
}

/// Runs receptor preparation over `system` according to `config`.
///
/// `preserved` holds the charges captured by the caller before the run; after
/// charge assignment each recorded atom is reset to its recorded value, so the
/// output file agrees with what the caller will restore. In interactive mode the
/// output write is skipped and left to the caller.
#[instrument(skip_all, name = "preparation_workflow")]
pub fn run(
    system: &mut MolecularSystem,
    config: &PreparationConfig,
    preserved: &PreservedCharges,
    reporter: &ProgressReporter,
) -> Result<PreparationReport, EngineError> {
    let mut report = PreparationReport::default();

    reporter.report(Progress::StageStart { name: "repairs" });
    match config.repairs {
        RepairPolicy::BondsHydrogens => {
            report.bonds_added = connect_isolated_atoms(system);
            report.hydrogens_added = add_polar_hydrogens(system);
        }
        RepairPolicy::Bonds => {
            report.bonds_added = connect_isolated_atoms(system);
        }
        RepairPolicy::Hydrogens => {
            report.hydrogens_added = add_polar_hydrogens(system);
        }
        RepairPolicy::CheckHydrogens => {
            if !has_hydrogens(system) {
                report.hydrogens_added = add_polar_hydrogens(system);
            }
        }
        RepairPolicy::None => {}
    }
    if report.hydrogens_added > 0 {
        // New hydrogens need bonds before typing and charge equalization can
        // see them; the pass is idempotent for everything already bonded.
        build_bonds_by_distance(system);
    }
    info!(
        bonds = report.bonds_added,
        hydrogens = report.hydrogens_added,
        "Structural repairs complete."
    );
    reporter.report(Progress::StageFinish);

    reporter.report(Progress::StageStart { name: "typing" });
    report.atoms_typed = assign_autodock_types(system);
    reporter.report(Progress::StageFinish);

    reporter.report(Progress::StageStart { name: "charges" });
    match config.charges {
        ChargePolicy::Gasteiger => {
            report.atoms_charged = assign_gasteiger_charges(system);
            for (&atom_id, (set_name, value)) in preserved {
                if let Some(atom) = system.atom_mut(atom_id) {
                    atom.force_charge(set_name, *value);
                    report.charges_preserved += 1;
                }
            }
            info!(
                charged = report.atoms_charged,
                preserved = report.charges_preserved,
                "Assigned Gasteiger charges."
            );
        }
        ChargePolicy::PreserveInput => {
            info!("Charge addition disabled; keeping input charges.");
        }
    }
    reporter.report(Progress::StageFinish);

    reporter.report(Progress::StageStart { name: "cleanup" });
    if config.cleanup.merge_nonpolar_hydrogens {
        report.hydrogens_merged = cleanup::merge_nonpolar_hydrogens(system);
    }
    if config.cleanup.merge_lone_pairs {
        report.lone_pairs_merged = cleanup::merge_lone_pairs(system);
    }
    if config.cleanup.remove_waters {
        report.waters_removed = cleanup::remove_waters(system);
    }
    if config.cleanup.remove_nonstd_chains {
        report.chains_removed = cleanup::remove_nonstd_chains(system);
    }
    if config.cleanup.delete_alt_b {
        report.altloc_atoms_removed = cleanup::delete_alt_b(system);
    }
    if config.delete_nonstd_residues {
        report.nonstd_residues_removed = cleanup::delete_nonstd_residues(system);
    }
    info!(
        hydrogens_merged = report.hydrogens_merged,
        waters_removed = report.waters_removed,
        chains_removed = report.chains_removed,
        "Cleanup complete."
    );
    reporter.report(Progress::StageFinish);

    if config.mode == PreparationMode::Automatic {
        reporter.report(Progress::StageStart { name: "output" });
        PdbqtFile::write_to_path(system, &config.output_path).map_err(|source| {
            EngineError::OutputWrite {
                path: config.output_path.clone(),
                source,
            }
        })?;
        info!(path = %config.output_path.display(), "Wrote prepared receptor.");
        report.output_path = Some(config.output_path.clone());
        reporter.report(Progress::StageFinish);
    }

    Ok(report)
}
