//! Log-domain numerics shared by the mixture model.

pub mod stable;

pub use stable::{log_add_exp, log_sum_exp, LN_HALF};
