pub mod bonds;
pub mod element;
pub mod gasteiger;
pub mod hydrogens;
pub mod typing;
