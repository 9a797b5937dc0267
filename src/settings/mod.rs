//----------------------------------------
// settings mod
//----------------------------------------
pub mod error;
pub mod types;

pub use types::{
    IndexBlockSettings, IndexRule, Lookahead, OptimalDesignSettings, TestSide, VarianceMode,
};
