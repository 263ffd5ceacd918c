//! Gasteiger-Marsili partial charge assignment.
//!
//! Iterative partial equalization of orbital electronegativity (PEOE). Charge flows
//! along each bond from the less to the more electronegative atom, with a damping
//! factor halving every iteration. Electronegativity coefficients live in an
//! embedded TOML parameter file.

use crate::core::chem::element::Element;
use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Name of the charge set written by this module.
pub const GASTEIGER_CHARGE_SET: &str = "gasteiger";

/// Number of equalization iterations; charges are converged well before this.
const ITERATIONS: u32 = 6;

/// Electronegativity coefficients for chi = a + b*q + c*q^2.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ElectroState {
    pub min_coordination: usize,
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

/// Fallback coefficients (sp3 carbon) for elements without a table entry, such as
/// metals. Their charges are meaningless anyway; preservation via `-p` exists for
/// exactly that reason.
const FALLBACK_STATE: ElectroState = ElectroState {
    min_coordination: 0,
    a: 7.98,
    b: 9.18,
    c: 1.88,
};

#[derive(Debug, Error)]
pub enum GasteigerParamsError {
    #[error("Failed to parse Gasteiger parameters: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize)]
struct ParamsFile {
    params: Vec<ElementEntry>,
}

#[derive(Debug, Deserialize)]
struct ElementEntry {
    symbol: String,
    states: Vec<ElectroState>,
}

/// Electronegativity parameter table, keyed by element symbol.
#[derive(Debug, Clone)]
pub struct GasteigerParams {
    by_symbol: HashMap<String, Vec<ElectroState>>,
}

impl GasteigerParams {
    pub fn load_from_str(content: &str) -> Result<Self, GasteigerParamsError> {
        let file: ParamsFile = toml::from_str(content)?;
        let by_symbol = file
            .params
            .into_iter()
            .map(|entry| (entry.symbol, entry.states))
            .collect();
        Ok(Self { by_symbol })
    }

    /// Looks up the coefficients for an element at a given effective coordination.
    ///
    /// States are listed highest coordination first; the first satisfied entry
    /// wins. Unknown elements fall back to sp3 carbon.
    pub fn lookup(&self, element: Element, coordination: usize) -> ElectroState {
        let Some(states) = self.by_symbol.get(element.symbol()) else {
            return FALLBACK_STATE;
        };
        states
            .iter()
            .find(|state| coordination >= state.min_coordination)
            .copied()
            .unwrap_or(FALLBACK_STATE)
    }
}

static DEFAULT_PARAMS: OnceLock<GasteigerParams> = OnceLock::new();

/// Returns the built-in parameter table.
pub fn default_parameters() -> &'static GasteigerParams {
    DEFAULT_PARAMS.get_or_init(|| {
        const EMBEDDED: &str = include_str!("../../../resources/gasteiger.toml");
        GasteigerParams::load_from_str(EMBEDDED)
            .expect("Failed to parse embedded Gasteiger parameters. This is a library bug.")
    })
}

fn electronegativity(state: &ElectroState, q: f64) -> f64 {
    state.a + state.b * q + state.c * q * q
}

/// Effective coordination used for hybridization-state selection.
///
/// Receptor preparation only materializes polar hydrogens, so heavy atoms are
/// treated as saturated (coordination = typical valence) unless geometry says
/// otherwise: an oxygen with a single short bond to carbon is a carbonyl and keeps
/// its observed coordination of one.
fn effective_coordination(system: &MolecularSystem, atom_id: AtomId) -> usize {
    let Some(atom) = system.atom(atom_id) else {
        return 0;
    };
    let neighbors = system.get_bonded_neighbors(atom_id).unwrap_or(&[]);

    if atom.element == Element::O && neighbors.len() == 1 {
        if let Some(neighbor) = system.atom(neighbors[0]) {
            if neighbor.element == Element::C
                && (neighbor.position - atom.position).norm() < 1.28
            {
                return 1;
            }
        }
    }
    neighbors.len().max(atom.element.typical_valence())
}

/// Computes Gasteiger partial charges for every atom and activates the
/// `"gasteiger"` charge set on each.
///
/// Returns the number of atoms charged.
pub fn assign_gasteiger_charges(system: &mut MolecularSystem) -> usize {
    let params = default_parameters();

    let atom_ids: Vec<AtomId> = system.atoms_iter().map(|(id, _)| id).collect();
    if atom_ids.is_empty() {
        return 0;
    }
    let index_of: HashMap<AtomId, usize> = atom_ids
        .iter()
        .enumerate()
        .map(|(i, &id)| (id, i))
        .collect();

    let states: Vec<ElectroState> = atom_ids
        .iter()
        .map(|&id| {
            let coordination = effective_coordination(system, id);
            let element = system.atom(id).map(|a| a.element).unwrap_or(Element::Other);
            params.lookup(element, coordination)
        })
        .collect();

    let bonds: Vec<(usize, usize)> = system
        .bonds()
        .iter()
        .filter_map(|bond| {
            Some((
                *index_of.get(&bond.atom1_id)?,
                *index_of.get(&bond.atom2_id)?,
            ))
        })
        .collect();

    let mut charges = vec![0.0_f64; atom_ids.len()];
    for iteration in 0..ITERATIONS {
        let damping = 0.5_f64.powi(iteration as i32 + 1);
        let mut delta = vec![0.0_f64; atom_ids.len()];

        for &(a, b) in &bonds {
            let chi_a = electronegativity(&states[a], charges[a]);
            let chi_b = electronegativity(&states[b], charges[b]);
            let diff = chi_b - chi_a;

            // Scale by the more electronegative atom's coefficients.
            let scale = if diff > 0.0 {
                states[b].a + states[b].b + states[b].c
            } else {
                states[a].a + states[a].b + states[a].c
            };
            if scale.abs() < 1e-12 {
                continue;
            }

            let transfer = damping * diff / scale;
            delta[a] += transfer;
            delta[b] -= transfer;
        }

        for (charge, d) in charges.iter_mut().zip(&delta) {
            *charge += d;
        }
    }

    for (i, &atom_id) in atom_ids.iter().enumerate() {
        if let Some(atom) = system.atom_mut(atom_id) {
            atom.set_charge(GASTEIGER_CHARGE_SET, charges[i]);
        }
    }
    atom_ids.len()
}
