pub mod builder;
pub mod state;
