use crate::core::chem::element::Element;
use crate::core::models::atom::Atom;
use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use nalgebra::{Rotation3, Unit, Vector3};

/// N-H bond length in Angstroms.
const N_H_BOND_LENGTH: f64 = 1.01;
/// O-H bond length in Angstroms.
const O_H_BOND_LENGTH: f64 = 0.96;
/// S-H bond length in Angstroms.
const S_H_BOND_LENGTH: f64 = 1.34;
/// C=O bonds are shorter than C-O; below this length an oxygen is treated as a
/// carbonyl and left unprotonated.
const CARBONYL_CO_LENGTH: f64 = 1.28;
/// Half the tetrahedral angle in degrees, used to fan out multiple hydrogens
/// around the anchor direction.
const TETRAHEDRAL_HALF_ANGLE_DEG: f64 = 54.75;

/// AutoDock type label for polar (donor) hydrogens.
const POLAR_HYDROGEN_TYPE: &str = "HD";

/// Returns true if the system contains any hydrogen atoms.
pub fn has_hydrogens(system: &MolecularSystem) -> bool {
    system.atoms_iter().any(|(_, atom)| atom.is_hydrogen())
}

/// Adds missing hydrogens to polar heavy atoms (N, O, S).
///
/// Each under-coordinated polar atom receives as many hydrogens as its typical
/// valence is short, placed at standard bond length opposite the mean direction of
/// its existing neighbors and fanned out tetrahedrally when several are needed.
/// Carbonyl-like oxygens (a single short bond to carbon) are left alone. Receptor
/// preparation only ever keeps polar hydrogens in the output, so nonpolar ones are
/// not generated in the first place.
///
/// Returns the number of hydrogens added.
pub fn add_polar_hydrogens(system: &mut MolecularSystem) -> usize {
    struct Placement {
        parent_id: AtomId,
        count: usize,
    }

    let mut placements = Vec::new();
    for (atom_id, atom) in system.atoms_iter() {
        if !matches!(atom.element, Element::N | Element::O | Element::S) {
            continue;
        }
        let neighbors = system.get_bonded_neighbors(atom_id).unwrap_or(&[]);
        let missing = atom.element.typical_valence().saturating_sub(neighbors.len());
        if missing == 0 {
            continue;
        }
        if is_carbonyl_oxygen(system, atom, neighbors) {
            continue;
        }
        placements.push(Placement {
            parent_id: atom_id,
            count: missing,
        });
    }

    let mut added = 0;
    for placement in placements {
        let Some(parent) = system.atom(placement.parent_id) else {
            continue;
        };
        let parent_name = parent.name.clone();
        let parent_pos = parent.position;
        let parent_res = parent.residue_id;
        let bond_length = match parent.element {
            Element::N => N_H_BOND_LENGTH,
            Element::S => S_H_BOND_LENGTH,
            _ => O_H_BOND_LENGTH,
        };

        let anchor = anchor_direction(system, placement.parent_id, &parent_pos);
        for (index, direction) in
            hydrogen_directions(&anchor, placement.count).into_iter().enumerate()
        {
            let position = parent_pos + direction.into_inner() * bond_length;
            let name = hydrogen_name(&parent_name, placement.count, index);

            let mut hydrogen = Atom::new(&name, parent_res, Element::H, position);
            hydrogen.autodock_type = POLAR_HYDROGEN_TYPE.to_string();

            if let Some(h_id) = system.add_atom_to_residue(parent_res, hydrogen) {
                system.add_bond(placement.parent_id, h_id);
                added += 1;
            }
        }
    }
    added
}

fn is_carbonyl_oxygen(system: &MolecularSystem, atom: &Atom, neighbors: &[AtomId]) -> bool {
    if atom.element != Element::O || neighbors.len() != 1 {
        return false;
    }
    let Some(neighbor) = system.atom(neighbors[0]) else {
        return false;
    };
    neighbor.element == Element::C
        && (neighbor.position - atom.position).norm() < CARBONYL_CO_LENGTH
}

/// Direction pointing away from the existing neighbors of `parent_id`.
fn anchor_direction(
    system: &MolecularSystem,
    parent_id: AtomId,
    parent_pos: &nalgebra::Point3<f64>,
) -> Unit<Vector3<f64>> {
    let mut sum = Vector3::zeros();
    if let Some(neighbors) = system.get_bonded_neighbors(parent_id) {
        for &neighbor_id in neighbors {
            if let Some(neighbor) = system.atom(neighbor_id) {
                let delta = neighbor.position - parent_pos;
                let norm = delta.norm();
                if norm > f64::EPSILON {
                    sum += delta / norm;
                }
            }
        }
    }
    if sum.norm() > 1e-6 {
        Unit::new_normalize(-sum)
    } else {
        Unit::new_unchecked(Vector3::x())
    }
}

/// Fans `count` unit vectors around `anchor`.
///
/// A single hydrogen sits exactly on the anchor; several are tilted off it by half
/// the tetrahedral angle and distributed evenly around it.
fn hydrogen_directions(anchor: &Unit<Vector3<f64>>, count: usize) -> Vec<Unit<Vector3<f64>>> {
    if count <= 1 {
        return vec![*anchor];
    }

    let reference = if anchor.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let tilt_axis = Unit::new_normalize(anchor.cross(&reference));
    let tilted = Rotation3::from_axis_angle(&tilt_axis, TETRAHEDRAL_HALF_ANGLE_DEG.to_radians())
        * anchor.into_inner();

    let spin_step = std::f64::consts::TAU / count as f64;
    (0..count)
        .map(|k| {
            let spin = Rotation3::from_axis_angle(anchor, spin_step * k as f64);
            Unit::new_normalize(spin * tilted)
        })
        .collect()
}

fn hydrogen_name(parent_name: &str, count: usize, index: usize) -> String {
    let suffix: String = parent_name.chars().skip(1).collect();
    let base = format!("H{suffix}");
    let name = if count > 1 {
        format!("{base}{}", index + 1)
    } else {
        base
    };
    name.chars().take(4).collect()
}
