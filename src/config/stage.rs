//! Stage-specific `.env` loading
//!
//! `TRAKI_STAGE=production` loads `.env.production`; without a stage (or when
//! the stage file is missing) the plain `.env` file is used. Variables that are
//! already set in the process environment are never overridden.

use std::path::{Path, PathBuf};

/// 环境变量：部署阶段名
pub const STAGE_ENV_VAR: &str = "TRAKI_STAGE";

/// 计算某个阶段对应的 env 文件名
pub fn stage_env_file(stage: Option<&str>) -> PathBuf {
    match stage.map(str::trim).filter(|s| !s.is_empty()) {
        Some(stage) => PathBuf::from(format!(".env.{}", stage)),
        None => PathBuf::from(".env"),
    }
}

/// 加载阶段 env 文件，返回实际加载的文件路径
pub fn load_stage_env() -> Option<PathBuf> {
    let stage = std::env::var(STAGE_ENV_VAR).ok();
    let preferred = stage_env_file(stage.as_deref());

    if load_env_file(&preferred) {
        return Some(preferred);
    }

    let fallback = stage_env_file(None);
    if fallback != preferred && load_env_file(&fallback) {
        return Some(fallback);
    }

    None
}

fn load_env_file(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }
    match dotenvy::from_path(path) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("[WARN] Failed to load {}: {}", path.display(), e);
            false
        }
    }
}
