pub mod games;
pub mod season;
