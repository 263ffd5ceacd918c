use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use std::collections::HashMap;

/// Tolerance added to the sum of covalent radii when deciding whether two atoms
/// are bonded.
const BOND_TOLERANCE: f64 = 0.45;
/// Distances below this are treated as coordinate noise, never as bonds.
const MIN_BOND_LENGTH: f64 = 0.4;
/// Upper bound on any inferred bond length; also the spatial grid cell size.
const MAX_BOND_LENGTH: f64 = 2.6;

type CellKey = (i64, i64, i64);

fn cell_of(position: &nalgebra::Point3<f64>) -> CellKey {
    (
        (position.x / MAX_BOND_LENGTH).floor() as i64,
        (position.y / MAX_BOND_LENGTH).floor() as i64,
        (position.z / MAX_BOND_LENGTH).floor() as i64,
    )
}

/// Infers covalent bonds from interatomic distances.
///
/// Two atoms are bonded when their distance falls within the sum of covalent radii
/// plus a tolerance. A uniform spatial grid keeps the candidate pairs local, so
/// the pass stays close to linear in the number of atoms. Hydrogen pairs are never
/// bonded to each other. Existing bonds are kept (adding a bond is idempotent).
///
/// Returns the number of bonds added.
pub fn build_bonds_by_distance(system: &mut MolecularSystem) -> usize {
    let mut grid: HashMap<CellKey, Vec<AtomId>> = HashMap::new();
    for (id, atom) in system.atoms_iter() {
        grid.entry(cell_of(&atom.position)).or_default().push(id);
    }

    let mut candidates: Vec<(AtomId, AtomId)> = Vec::new();
    for (&(cx, cy, cz), cell_atoms) in &grid {
        for dx in -1..=1_i64 {
            for dy in -1..=1_i64 {
                for dz in -1..=1_i64 {
                    let Some(neighbor_atoms) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &a in cell_atoms {
                        for &b in neighbor_atoms {
                            if a < b {
                                candidates.push((a, b));
                            }
                        }
                    }
                }
            }
        }
    }

    let mut added = 0;
    for (a, b) in candidates {
        let (atom_a, atom_b) = match (system.atom(a), system.atom(b)) {
            (Some(x), Some(y)) => (x, y),
            _ => continue,
        };
        if atom_a.is_hydrogen() && atom_b.is_hydrogen() {
            continue;
        }

        let cutoff =
            atom_a.element.covalent_radius() + atom_b.element.covalent_radius() + BOND_TOLERANCE;
        let distance = (atom_a.position - atom_b.position).norm();
        if distance >= MIN_BOND_LENGTH && distance <= cutoff {
            let already_bonded = system
                .get_bonded_neighbors(a)
                .is_some_and(|n| n.contains(&b));
            if !already_bonded && system.add_bond(a, b).is_some() {
                added += 1;
            }
        }
    }
    added
}

/// Bonds every atom that has no bonds to its closest neighbor, whatever the
/// distance.
///
/// This is the `bonds` repair policy: it reconnects stray atoms the distance pass
/// left isolated (e.g., ions sitting outside every covalent cutoff).
///
/// Returns the number of bonds added.
pub fn connect_isolated_atoms(system: &mut MolecularSystem) -> usize {
    let isolated: Vec<AtomId> = system
        .atoms_iter()
        .filter(|(id, _)| {
            system
                .get_bonded_neighbors(*id)
                .is_none_or(|n| n.is_empty())
        })
        .map(|(id, _)| id)
        .collect();

    let mut added = 0;
    for atom_id in isolated {
        let Some(atom) = system.atom(atom_id) else {
            continue;
        };
        let position = atom.position;

        let closest = system
            .atoms_iter()
            .filter(|(other_id, _)| *other_id != atom_id)
            .map(|(other_id, other)| (other_id, (other.position - position).norm_squared()))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((closest_id, _)) = closest {
            if system.add_bond(atom_id, closest_id).is_some() {
                added += 1;
            }
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::element::Element;
    use crate::core::models::atom::Atom;
    use crate::core::models::chain::ChainType;
    use nalgebra::Point3;

    fn system_with_atoms(atoms: Vec<(&str, Element, [f64; 3])>) -> (MolecularSystem, Vec<AtomId>) {
        let mut system = MolecularSystem::new();
        let chain_id = system.add_chain('A', ChainType::Protein);
        let res_id = system.add_residue(chain_id, 1, "GLY").unwrap();
        let ids = atoms
            .into_iter()
            .map(|(name, element, [x, y, z])| {
                let atom = Atom::new(name, res_id, element, Point3::new(x, y, z));
                system.add_atom_to_residue(res_id, atom).unwrap()
            })
            .collect();
        (system, ids)
    }

    #[test]
    fn bonds_atoms_within_covalent_distance() {
        let (mut system, ids) = system_with_atoms(vec![
            ("C1", Element::C, [0.0, 0.0, 0.0]),
            ("C2", Element::C, [1.54, 0.0, 0.0]),
        ]);
        let added = build_bonds_by_distance(&mut system);
        assert_eq!(added, 1);
        assert_eq!(
            system.get_bonded_neighbors(ids[0]).unwrap(),
            &[ids[1]]
        );
    }

    #[test]
    fn does_not_bond_distant_atoms() {
        let (mut system, _) = system_with_atoms(vec![
            ("C1", Element::C, [0.0, 0.0, 0.0]),
            ("C2", Element::C, [4.0, 0.0, 0.0]),
        ]);
        assert_eq!(build_bonds_by_distance(&mut system), 0);
        assert!(system.bonds().is_empty());
    }

    #[test]
    fn bonds_across_grid_cell_boundaries() {
        // 2.59 falls inside S-S cutoff (1.05 + 1.05 + 0.45) but spans two cells.
        let (mut system, _) = system_with_atoms(vec![
            ("SG1", Element::S, [2.0, 0.0, 0.0]),
            ("SG2", Element::S, [4.05, 0.0, 0.0]),
        ]);
        assert_eq!(build_bonds_by_distance(&mut system), 1);
    }

    #[test]
    fn never_bonds_two_hydrogens() {
        let (mut system, _) = system_with_atoms(vec![
            ("H1", Element::H, [0.0, 0.0, 0.0]),
            ("H2", Element::H, [0.74, 0.0, 0.0]),
        ]);
        assert_eq!(build_bonds_by_distance(&mut system), 0);
    }

    #[test]
    fn overlapping_coordinates_are_not_bonded() {
        let (mut system, _) = system_with_atoms(vec![
            ("C1", Element::C, [0.0, 0.0, 0.0]),
            ("C2", Element::C, [0.1, 0.0, 0.0]),
        ]);
        assert_eq!(build_bonds_by_distance(&mut system), 0);
    }

    #[test]
    fn rerunning_does_not_duplicate_bonds() {
        let (mut system, _) = system_with_atoms(vec![
            ("C1", Element::C, [0.0, 0.0, 0.0]),
            ("C2", Element::C, [1.54, 0.0, 0.0]),
        ]);
        assert_eq!(build_bonds_by_distance(&mut system), 1);
        assert_eq!(build_bonds_by_distance(&mut system), 0);
        assert_eq!(system.bonds().len(), 1);
    }

    #[test]
    fn connect_isolated_atoms_picks_closest_neighbor() {
        let (mut system, ids) = system_with_atoms(vec![
            ("C1", Element::C, [0.0, 0.0, 0.0]),
            ("C2", Element::C, [1.54, 0.0, 0.0]),
            ("ZN", Element::Zn, [5.0, 0.0, 0.0]),
        ]);
        build_bonds_by_distance(&mut system);
        assert!(system.get_bonded_neighbors(ids[2]).unwrap().is_empty());

        let added = connect_isolated_atoms(&mut system);
        assert_eq!(added, 1);
        assert_eq!(system.get_bonded_neighbors(ids[2]).unwrap(), &[ids[1]]);
    }
}
