use super::ids::ResidueId;
use crate::core::chem::element::Element;
use nalgebra::Point3;
use std::collections::HashMap;

/// Represents an atom in a molecular structure with its properties and charge state.
///
/// This struct encapsulates the identity and physicochemical state of an atom as it
/// moves through receptor preparation. Besides the usual structural fields it carries
/// a table of named charge sets: a structure read from disk may carry an `"input"`
/// charge set, and charge assignment later adds a `"gasteiger"` set. Exactly one set
/// may be active at a time; the active set is what ends up in the written output.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The serial number of the atom from the source file.
    pub serial: usize,
    /// The name of the atom (e.g., "CA", "N", "OG1").
    pub name: String,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    /// The chemical element of the atom.
    pub element: Element,
    /// The AutoDock atom type label (e.g., "C", "OA", "HD", "Zn").
    pub autodock_type: String,
    /// Alternate location indicator from the source file, if any.
    pub alt_loc: Option<char>,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Crystallographic occupancy.
    pub occupancy: f64,
    /// Temperature (B) factor.
    pub temp_factor: f64,
    /// Named charge sets assigned to this atom.
    charges: HashMap<String, f64>,
    /// The name of the currently active charge set, if any.
    active_charge_set: Option<String>,
}

impl Atom {
    /// Creates a new `Atom` with no charge sets assigned.
    ///
    /// The AutoDock type label defaults to the element symbol; preparation may
    /// refine it later (e.g., polar hydrogens become "HD").
    pub fn new(name: &str, residue_id: ResidueId, element: Element, position: Point3<f64>) -> Self {
        Self {
            serial: 0,
            name: name.to_string(),
            residue_id,
            element,
            autodock_type: element.symbol().to_string(),
            alt_loc: None,
            position,
            occupancy: 1.0,
            temp_factor: 0.0,
            charges: HashMap::new(),
            active_charge_set: None,
        }
    }

    /// Stores `value` under the named charge set and makes that set active.
    pub fn set_charge(&mut self, set_name: &str, value: f64) {
        self.charges.insert(set_name.to_string(), value);
        self.active_charge_set = Some(set_name.to_string());
    }

    /// Overwrites the named charge set with `value` and forces it active,
    /// regardless of what charge state the atom currently holds.
    ///
    /// This is the restoration primitive of the charge-preservation mechanism:
    /// whatever a preparation run assigned is discarded in favor of the recorded
    /// value.
    pub fn force_charge(&mut self, set_name: &str, value: f64) {
        self.set_charge(set_name, value);
    }

    /// Adds `delta` to the value of the active charge set, if there is one.
    ///
    /// Used when merging a removed atom's charge into its bonded neighbor.
    pub fn merge_charge(&mut self, delta: f64) {
        if let Some(set_name) = &self.active_charge_set {
            if let Some(value) = self.charges.get_mut(set_name) {
                *value += delta;
            }
        }
    }

    /// Returns the value of the active charge set, if any.
    pub fn partial_charge(&self) -> Option<f64> {
        let set_name = self.active_charge_set.as_ref()?;
        self.charges.get(set_name).copied()
    }

    /// Returns the active charge set as a `(name, value)` pair, if any.
    pub fn active_charge(&self) -> Option<(&str, f64)> {
        let set_name = self.active_charge_set.as_ref()?;
        let value = self.charges.get(set_name).copied()?;
        Some((set_name.as_str(), value))
    }

    /// Returns the value stored under the named charge set, if present.
    pub fn charge_in_set(&self, set_name: &str) -> Option<f64> {
        self.charges.get(set_name).copied()
    }

    /// Returns true if the atom is a hydrogen.
    pub fn is_hydrogen(&self) -> bool {
        self.element == Element::H
    }
}
