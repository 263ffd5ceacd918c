use crate::core::chem::element::Element;
use crate::core::io::traits::StructureReader;
use crate::core::models::builder::MolecularSystemBuilder;
use crate::core::models::chain::ChainType;
use crate::core::models::residue::is_water_residue;
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;
use std::collections::HashMap;
use std::io::{self, BufRead};
use thiserror::Error;

/// Name of the charge set populated from the input file's charge column.
pub const INPUT_CHARGE_SET: &str = "input";

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must reach the coordinate columns)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

/// Resolves the element for an atom record.
///
/// The trailing type column doubles as the element column in plain PDB files and
/// as the AutoDock type in PDBQT files, so AutoDock-specific codes are mapped
/// first. "NA" is genuinely ambiguous (sodium vs. nitrogen acceptor); a hetero
/// atom actually named "NA" is taken to be sodium.
fn element_for_record(type_str: &str, name: &str, hetero: bool) -> Element {
    match type_str {
        "A" => return Element::C,
        "OA" => return Element::O,
        "SA" => return Element::S,
        "HD" | "HS" => return Element::H,
        "NA" => {
            if hetero && name == "NA" {
                return Element::Na;
            }
            return Element::N;
        }
        _ => {}
    }
    type_str
        .parse::<Element>()
        .unwrap_or_else(|_| Element::from_atom_name(name, hetero))
}

/// Reader for PDB files and their PDBQT-style extension.
///
/// ATOM/HETATM records are parsed by fixed columns; a populated charge column
/// (columns 67-76) lands in the `"input"` charge set, and a populated trailing
/// type column becomes the atom's AutoDock type label. MODEL/ENDMDL blocks yield
/// one system each. CONECT records become bonds; everything else is ignored.
pub struct PdbFile;

impl StructureReader for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<MolecularSystem>, Self::Error> {
        let mut systems = Vec::new();
        let mut builder = MolecularSystemBuilder::new();

        let mut current_chain_id = '\0';
        let mut current_residue_id = isize::MIN;
        let mut chain_types: HashMap<char, ChainType> = HashMap::new();

        fn finalize(builder: &mut MolecularSystemBuilder, systems: &mut Vec<MolecularSystem>) {
            let done = std::mem::take(builder);
            if !done.is_empty() {
                systems.push(done.build());
            }
        }

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let record_type = slice_and_trim(&line, 0, 6);
            match record_type {
                "ATOM" | "HETATM" => {
                    if line.len() < 54 {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }
                    let hetero = record_type == "HETATM";

                    let serial_str = slice_and_trim(&line, 6, 11);
                    let name_str = slice_and_trim(&line, 12, 16);
                    let alt_loc = line
                        .get(16..17)
                        .and_then(|s| s.chars().next())
                        .filter(|c| !c.is_whitespace());
                    let res_name_str = slice_and_trim(&line, 17, 20);
                    let chain_id: char = line
                        .get(21..22)
                        .and_then(|s| s.chars().next())
                        .filter(|c| !c.is_whitespace())
                        .unwrap_or('A');
                    let res_id_str = slice_and_trim(&line, 22, 26);
                    let type_str = slice_and_trim(&line, 76, 79);

                    if name_str.is_empty() {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::MissingRequiredField {
                                columns: "13-16".into(),
                            },
                        });
                    }
                    let serial: usize = serial_str.parse().map_err(|_| PdbError::Parse {
                        line: line_num,
                        kind: PdbParseErrorKind::InvalidInt {
                            columns: "7-11".into(),
                            value: serial_str.into(),
                        },
                    })?;
                    let res_id: isize = res_id_str.parse().map_err(|_| PdbError::Parse {
                        line: line_num,
                        kind: PdbParseErrorKind::InvalidInt {
                            columns: "23-26".into(),
                            value: res_id_str.into(),
                        },
                    })?;

                    let mut coords = [0.0_f64; 3];
                    for (i, (start, end)) in [(30, 38), (38, 46), (46, 54)].iter().enumerate() {
                        let value_str = slice_and_trim(&line, *start, *end);
                        coords[i] = value_str.parse().map_err(|_| PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::InvalidFloat {
                                columns: format!("{}-{}", start + 1, end),
                                value: value_str.into(),
                            },
                        })?;
                    }

                    let occupancy: Option<f64> = slice_and_trim(&line, 54, 60).parse().ok();
                    let temp_factor: Option<f64> = slice_and_trim(&line, 60, 66).parse().ok();
                    let charge: Option<f64> = slice_and_trim(&line, 66, 76).parse().ok();

                    let element = element_for_record(type_str, name_str, hetero);

                    if chain_id != current_chain_id {
                        let chain_type = chain_types.entry(chain_id).or_insert(ChainType::Protein);
                        if is_water_residue(res_name_str) {
                            *chain_type = ChainType::Water;
                        } else if hetero {
                            *chain_type = ChainType::Other;
                        }
                        builder.start_chain(chain_id, *chain_type);
                        current_chain_id = chain_id;
                        current_residue_id = isize::MIN;
                    }
                    if res_id != current_residue_id {
                        builder.start_residue(res_id, res_name_str);
                        current_residue_id = res_id;
                    }

                    let atom_id = builder.add_atom(
                        serial,
                        name_str,
                        element,
                        Point3::new(coords[0], coords[1], coords[2]),
                    );
                    if let Some(atom) = builder.atom_mut(atom_id) {
                        atom.alt_loc = alt_loc;
                        if let Some(occ) = occupancy {
                            atom.occupancy = occ;
                        }
                        if let Some(b) = temp_factor {
                            atom.temp_factor = b;
                        }
                        if !type_str.is_empty() {
                            atom.autodock_type = type_str.to_string();
                        }
                        if let Some(q) = charge {
                            atom.set_charge(INPUT_CHARGE_SET, q);
                        }
                    }
                }
                "CONECT" => {
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    if parts.len() < 3 {
                        continue;
                    }
                    if let Ok(center) = parts[1].parse::<usize>() {
                        for other_str in &parts[2..] {
                            if let Ok(other) = other_str.parse::<usize>() {
                                builder.add_bond_by_serial(center, other);
                            }
                        }
                    }
                }
                "ENDMDL" => {
                    finalize(&mut builder, &mut systems);
                    current_chain_id = '\0';
                    current_residue_id = isize::MIN;
                    chain_types.clear();
                }
                _ => {}
            }
        }
        finalize(&mut builder, &mut systems);
        Ok(systems)
    }
}
