pub mod clustering;
pub mod cost;
pub mod editing;
pub mod error;
pub mod geometry;
pub mod json;
pub mod pipeline;
pub mod problem;
pub mod solver;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;
