pub mod chem;
pub mod io;
pub mod models;
