pub mod blend;
pub mod preset;
pub mod project;
