pub mod feedback;
pub mod policy;
pub mod rules;
