pub mod grid;
pub mod lammps;
pub mod maps;
pub mod zacros;
