pub mod number;
pub mod state;
