pub mod binner;
pub mod grid;
pub mod labeler;
