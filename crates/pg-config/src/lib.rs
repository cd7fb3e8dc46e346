pub mod model_config;
pub mod resolve;
pub mod scheme;
pub mod validate;

pub use model_config::{ModelConfig, DEFAULT_GRAM_SIZE, DEFAULT_KN_DISCOUNT};
pub use resolve::{resolve_config, CliOverrides};
pub use scheme::SchemeKind;
pub use validate::validate;
