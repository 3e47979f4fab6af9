mod r#impl;
mod stage;
mod structs;

pub use r#impl::{get_config, init_config_from, set_config};
pub use stage::{STAGE_ENV_VAR, load_stage_env, stage_env_file};
pub use structs::*;
