pub mod stable;

pub use stable::{clamp01, log_sum_exp, nearly_eq, safe_div, EPS};
