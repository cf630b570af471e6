pub mod layout;
pub mod plan;
