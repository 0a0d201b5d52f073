pub mod analysis;
pub mod course;
pub mod resources;
