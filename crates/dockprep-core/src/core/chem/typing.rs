use crate::core::chem::element::Element;
use crate::core::models::system::MolecularSystem;

/// Assigns AutoDock atom type labels from elements and connectivity.
///
/// Oxygens and sulfurs are hydrogen-bond acceptors (`OA`/`SA`); a nitrogen is an
/// acceptor (`NA`) unless it carries a hydrogen, in which case it is a donor
/// (`N`); hydrogens bonded to a polar atom are donors (`HD`). Everything else
/// keeps its element symbol. Aromatic carbon (`A`) is not perceived.
///
/// Returns the number of atoms whose label changed.
pub fn assign_autodock_types(system: &mut MolecularSystem) -> usize {
    let updates: Vec<(crate::core::models::ids::AtomId, String)> = system
        .atoms_iter()
        .map(|(atom_id, atom)| {
            let neighbors = system.get_bonded_neighbors(atom_id).unwrap_or(&[]);
            let label = match atom.element {
                Element::O => "OA".to_string(),
                Element::S => "SA".to_string(),
                Element::N => {
                    let has_hydrogen = neighbors
                        .iter()
                        .filter_map(|&id| system.atom(id))
                        .any(|n| n.is_hydrogen());
                    if has_hydrogen { "N" } else { "NA" }.to_string()
                }
                Element::H => {
                    let polar_parent = neighbors.iter().filter_map(|&id| system.atom(id)).any(
                        |n| matches!(n.element, Element::N | Element::O | Element::S),
                    );
                    if polar_parent { "HD" } else { "H" }.to_string()
                }
                other => other.symbol().to_string(),
            };
            (atom_id, label)
        })
        .collect();

    let mut changed = 0;
    for (atom_id, label) in updates {
        if let Some(atom) = system.atom_mut(atom_id) {
            if atom.autodock_type != label {
                atom.autodock_type = label;
                changed += 1;
            }
        }
    }
    changed
}
