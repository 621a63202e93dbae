pub mod properties;
pub mod specnum;
