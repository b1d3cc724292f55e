pub mod cdn;
pub mod dynatrace;
pub mod resources;
