pub mod baseline;
pub mod cost_matrix;
pub mod evaluate;
pub mod export_sites;
pub mod plan;
pub mod solve;
pub mod util;
