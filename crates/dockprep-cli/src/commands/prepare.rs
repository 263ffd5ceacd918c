//! The receptor preparation command.
//!
//! Wraps the engine workflow with the charge-preservation contract: capture the
//! charges of every atom the user asked to preserve, run the workflow, then
//! force the captured values back, unconditionally. The engine also honors the
//! record when it writes, so the file on disk and the in-memory system agree.

use crate::cli::PrepareArgs;
use crate::error::{CliError, Result};
use dockprep::core::chem::bonds::build_bonds_by_distance;
use dockprep::core::io::pdb::PdbFile;
use dockprep::core::io::pdbqt::PdbqtFile;
use dockprep::core::io::traits::{StructureReader, StructureWriter};
use dockprep::core::models::system::MolecularSystem;
use dockprep::engine::config::{
    ChargePolicy, CleanupPolicy, PreparationMode, PreparationConfigBuilder, PreservedCharges,
    RepairPolicy,
};
use dockprep::engine::progress::{Progress, ProgressReporter};
use dockprep::workflows;
use dockprep::workflows::prepare::PreparationReport;
use std::path::PathBuf;
use tracing::{debug, info};

/// Everything a preparation run produced, for callers that want to inspect it.
pub struct Prepared {
    pub system: MolecularSystem,
    pub report: PreparationReport,
    pub output_path: PathBuf,
}

pub fn run(args: PrepareArgs) -> Result<()> {
    let prepared = execute(&args)?;
    println!(
        "Prepared receptor written to: {}",
        prepared.output_path.display()
    );
    Ok(())
}

pub fn execute(args: &PrepareArgs) -> Result<Prepared> {
    let repairs: RepairPolicy = args
        .repairs
        .parse()
        .map_err(|e| CliError::Argument(format!("{e}")))?;
    let cleanup: CleanupPolicy = args
        .cleanup
        .parse()
        .map_err(|e| CliError::Argument(format!("{e}")))?;
    let mode: PreparationMode = args
        .mode
        .parse()
        .map_err(|e| CliError::Argument(format!("{e}")))?;
    let charges = if args.preserve_input_charges {
        ChargePolicy::PreserveInput
    } else {
        ChargePolicy::Gasteiger
    };

    info!("Loading receptor structure from {:?}", &args.receptor);
    let systems = PdbFile::read_from_path(&args.receptor).map_err(|e| CliError::FileParsing {
        path: args.receptor.clone(),
        source: e.into(),
    })?;
    if systems.is_empty() {
        return Err(CliError::FileParsing {
            path: args.receptor.clone(),
            source: anyhow::anyhow!("File contains no molecules"),
        });
    }
    let mut system = select_largest(systems);
    info!(
        "Preparing '{}' ({} atoms).",
        system.name(),
        system.atom_count()
    );

    let bonds_built = build_bonds_by_distance(&mut system);
    debug!(bonds_built, "Inferred bonds from interatomic distances.");

    // Capture before the engine touches anything. Disabling charge addition
    // makes preservation moot, so the record stays empty.
    let preserved = if args.preserve_input_charges {
        PreservedCharges::new()
    } else {
        capture_preserved_charges(&system, &args.preserve)
    };
    if !preserved.is_empty() {
        info!(
            "Preserving input charges of {} atom(s) with type(s) {:?}.",
            preserved.len(),
            args.preserve
        );
    }

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.pdbqt", system.name())));

    let config = PreparationConfigBuilder::new()
        .mode(mode)
        .repairs(repairs)
        .charges(charges)
        .cleanup(cleanup)
        .delete_nonstd_residues(args.delete_nonstd_residues)
        .output_path(output_path.clone())
        .build()
        .map_err(dockprep::engine::error::EngineError::from)?;

    let reporter = ProgressReporter::with_callback(Box::new(|event| match event {
        Progress::StageStart { name } => debug!("Stage started: {name}"),
        Progress::StageFinish => {}
        Progress::Message(message) => debug!("{message}"),
    }));

    let report = workflows::prepare::run(&mut system, &config, &preserved, &reporter)?;

    // Restore unconditionally, whatever the engine did.
    for (atom_id, (set_name, value)) in &preserved {
        if let Some(atom) = system.atom_mut(*atom_id) {
            atom.force_charge(set_name, *value);
        }
    }

    // Interactive runs leave the write to us, after restoration.
    if mode == PreparationMode::Interactive {
        PdbqtFile::write_to_path(&system, &output_path).map_err(|e| CliError::FileWriting {
            path: output_path.clone(),
            source: e.into(),
        })?;
    }

    Ok(Prepared {
        system,
        report,
        output_path,
    })
}

/// Picks the molecule with the strictly greatest atom count; the first
/// encountered wins ties.
fn select_largest(systems: Vec<MolecularSystem>) -> MolecularSystem {
    let mut best_index = 0;
    let mut best_count = 0;
    for (index, system) in systems.iter().enumerate() {
        if system.atom_count() > best_count {
            best_index = index;
            best_count = system.atom_count();
        }
    }
    if systems.len() > 1 {
        info!(
            "File contains {} molecules; selected molecule {} with {} atoms.",
            systems.len(),
            best_index + 1,
            best_count
        );
    }
    systems
        .into_iter()
        .nth(best_index)
        .expect("Index came from enumerating this vector")
}

/// Records `(active charge set, value)` for every atom whose AutoDock type
/// matches one of the requested codes. Codes that match nothing, and atoms
/// without an active charge set, are silently skipped.
fn capture_preserved_charges(
    system: &MolecularSystem,
    preserve: &[String],
) -> PreservedCharges {
    let mut record = PreservedCharges::new();
    for code in preserve.iter().filter(|c| !c.is_empty()) {
        for (atom_id, atom) in system.atoms_by_type(code) {
            if let Some((set_name, value)) = atom.active_charge() {
                record.insert(atom_id, (set_name.to_string(), value));
            }
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn atom_line(
        record: &str,
        serial: usize,
        name: &str,
        res_name: &str,
        chain: char,
        res_id: isize,
        coords: [f64; 3],
        element: &str,
    ) -> String {
        format!(
            "{:<6}{:>5} {:<4} {:<3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
            record, serial, name, res_name, chain, res_id, coords[0], coords[1], coords[2],
            1.00, 0.00, element
        )
    }

    fn charged_line(
        record: &str,
        serial: usize,
        name: &str,
        res_name: &str,
        chain: char,
        res_id: isize,
        coords: [f64; 3],
        charge: f64,
        autodock_type: &str,
    ) -> String {
        format!(
            "{:<6}{:>5} {:<4} {:<3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}    {:>6.3} {:<2}",
            record, serial, name, res_name, chain, res_id, coords[0], coords[1], coords[2],
            1.00, 0.00, charge, autodock_type
        )
    }

    /// A serine with a zinc ion and a water, PDBQT-style charges on the zinc.
    fn receptor_content() -> String {
        [
            atom_line("ATOM", 1, "N", "SER", 'A', 1, [0.0, 1.4, 0.0], "N"),
            atom_line("ATOM", 2, "CA", "SER", 'A', 1, [0.0, 0.0, 0.0], "C"),
            atom_line("ATOM", 3, "CB", "SER", 'A', 1, [1.5, 0.0, 0.0], "C"),
            atom_line("ATOM", 4, "OG", "SER", 'A', 1, [2.0, 1.3, 0.0], "O"),
            charged_line("HETATM", 5, "ZN", "ZN", 'Z', 200, [6.0, 6.0, 6.0], 2.0, "Zn"),
            atom_line("HETATM", 6, "O", "HOH", 'W', 301, [9.0, 9.0, 9.0], "O"),
        ]
        .join("\n")
    }

    fn write_receptor(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("receptor.pdb");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn default_args(receptor: PathBuf, output: PathBuf) -> PrepareArgs {
        PrepareArgs {
            receptor,
            output: Some(output),
            repairs: "checkhydrogens".to_string(),
            preserve_input_charges: false,
            preserve: Vec::new(),
            cleanup: "nphs_lps_waters_nonstdres".to_string(),
            delete_nonstd_residues: false,
            mode: "automatic".to_string(),
        }
    }

    #[test]
    fn default_run_produces_a_pdbqt_file() {
        let dir = tempfile::tempdir().unwrap();
        let receptor = write_receptor(dir.path(), &receptor_content());
        let out = dir.path().join("out.pdbqt");

        let prepared = execute(&default_args(receptor, out.clone())).unwrap();

        assert!(out.exists());
        assert!(prepared.report.atoms_charged > 0);
        let content = std::fs::read_to_string(&out).unwrap();
        assert!(!content.contains("HOH"));
        assert!(!content.contains("ZN"));
        assert!(content.contains("OA"));
    }

    #[test]
    fn preserve_flag_restores_the_recorded_charge() {
        let dir = tempfile::tempdir().unwrap();
        let receptor = write_receptor(dir.path(), &receptor_content());
        let out = dir.path().join("out.pdbqt");

        let mut args = default_args(receptor, out.clone());
        args.preserve = vec!["Zn".to_string()];
        // Keep the ion: the default cleanup would remove its chain.
        args.cleanup = "nphs_lps_waters".to_string();

        let prepared = execute(&args).unwrap();
        assert_eq!(prepared.report.charges_preserved, 1);

        let zn_id = prepared.system.atom_ids_by_type("Zn")[0];
        assert_eq!(
            prepared.system.atom(zn_id).unwrap().active_charge(),
            Some(("input", 2.0))
        );

        let content = std::fs::read_to_string(&out).unwrap();
        let zn_line = content.lines().find(|l| l.contains("ZN")).unwrap();
        assert_eq!(zn_line[70..76].trim(), "2.000");
    }

    #[test]
    fn atoms_outside_the_preserve_list_keep_engine_charges() {
        let dir = tempfile::tempdir().unwrap();
        let receptor = write_receptor(dir.path(), &receptor_content());
        let out = dir.path().join("out.pdbqt");

        let mut args = default_args(receptor, out);
        args.preserve = vec!["Zn".to_string()];
        args.cleanup = "nphs_lps_waters".to_string();

        let prepared = execute(&args).unwrap();
        let (_, og) = prepared
            .system
            .atoms_iter()
            .find(|(_, a)| a.name == "OG")
            .unwrap();
        assert_eq!(og.active_charge().unwrap().0, "gasteiger");
    }

    #[test]
    fn disabling_charge_addition_skips_capture_and_assignment() {
        let dir = tempfile::tempdir().unwrap();
        let receptor = write_receptor(dir.path(), &receptor_content());
        let out = dir.path().join("out.pdbqt");

        let mut args = default_args(receptor, out);
        args.preserve_input_charges = true;
        args.preserve = vec!["Zn".to_string()];
        args.cleanup = "waters".to_string();

        let prepared = execute(&args).unwrap();
        assert_eq!(prepared.report.atoms_charged, 0);
        assert_eq!(prepared.report.charges_preserved, 0);

        let zn_id = prepared.system.atom_ids_by_type("Zn")[0];
        assert_eq!(
            prepared.system.atom(zn_id).unwrap().active_charge(),
            Some(("input", 2.0))
        );
    }

    #[test]
    fn repeated_preserve_flags_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let content = [
            receptor_content(),
            charged_line("HETATM", 7, "FE", "FE", 'Y', 400, [12.0, 0.0, 0.0], 3.0, "Fe"),
        ]
        .join("\n");
        let receptor = write_receptor(dir.path(), &content);
        let out = dir.path().join("out.pdbqt");

        let mut args = default_args(receptor, out);
        args.preserve = vec!["Zn".to_string(), "Fe".to_string()];
        args.cleanup = "waters".to_string();

        let prepared = execute(&args).unwrap();
        assert_eq!(prepared.report.charges_preserved, 2);
    }

    #[test]
    fn largest_molecule_wins_and_first_wins_ties() {
        let dir = tempfile::tempdir().unwrap();
        let content = format!(
            "MODEL        1\n{}\nENDMDL\nMODEL        2\n{}\n{}\nENDMDL\n",
            atom_line("ATOM", 1, "CA", "GLY", 'A', 1, [0.0, 0.0, 0.0], "C"),
            atom_line("ATOM", 1, "N", "GLY", 'A', 1, [0.0, 1.4, 0.0], "N"),
            atom_line("ATOM", 2, "CA", "GLY", 'A', 1, [0.0, 0.0, 0.0], "C"),
        );
        let receptor = write_receptor(dir.path(), &content);
        let out = dir.path().join("out.pdbqt");

        let prepared = execute(&default_args(receptor, out)).unwrap();
        assert_eq!(prepared.system.name(), "receptor_2");

        // Equal sizes: the first molecule is selected.
        let tie = format!(
            "MODEL        1\n{}\nENDMDL\nMODEL        2\n{}\nENDMDL\n",
            atom_line("ATOM", 1, "CA", "GLY", 'A', 1, [0.0, 0.0, 0.0], "C"),
            atom_line("ATOM", 1, "CA", "GLY", 'A', 1, [0.0, 0.0, 0.0], "C"),
        );
        let receptor = write_receptor(dir.path(), &tie);
        let out = dir.path().join("tie.pdbqt");
        let prepared = execute(&default_args(receptor, out)).unwrap();
        assert_eq!(prepared.system.name(), "receptor_1");
    }

    #[test]
    fn interactive_mode_still_ends_with_a_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let receptor = write_receptor(dir.path(), &receptor_content());
        let out = dir.path().join("out.pdbqt");

        let mut args = default_args(receptor, out.clone());
        args.mode = "interactive".to_string();

        let prepared = execute(&args).unwrap();
        // The engine skipped the write; the wrapper owned it.
        assert_eq!(prepared.report.output_path, None);
        assert!(out.exists());
    }

    #[test]
    fn unknown_policy_values_are_argument_errors() {
        let dir = tempfile::tempdir().unwrap();
        let receptor = write_receptor(dir.path(), &receptor_content());
        let out = dir.path().join("out.pdbqt");

        let mut args = default_args(receptor.clone(), out.clone());
        args.repairs = "everything".to_string();
        assert!(matches!(execute(&args), Err(CliError::Argument(_))));

        let mut args = default_args(receptor, out);
        args.cleanup = "nphs_bogus".to_string();
        assert!(matches!(execute(&args), Err(CliError::Argument(_))));
    }

    #[test]
    fn missing_input_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = default_args(
            dir.path().join("absent.pdb"),
            dir.path().join("out.pdbqt"),
        );
        assert!(matches!(execute(&args), Err(CliError::FileParsing { .. })));
    }
}
