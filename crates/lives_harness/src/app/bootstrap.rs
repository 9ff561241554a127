use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

pub(crate) const ROOT_ENV_VAR: &str = "FINITE_LIVES_ROOT";
pub(crate) const USAGE: &str = "usage: lives_harness [content_root] <script.json> [session.json]";
const DEFAULT_SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HarnessConfig {
    pub(crate) content_root: PathBuf,
    pub(crate) script_path: PathBuf,
    pub(crate) session_path: PathBuf,
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

pub(crate) fn root_from_env() -> Option<PathBuf> {
    std::env::var(ROOT_ENV_VAR)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

/// The content root is the first argument when it names a directory,
/// otherwise it comes from the environment. The session file defaults to
/// `session.json` under the content root.
pub(crate) fn build_config(
    args: &[String],
    env_root: Option<PathBuf>,
) -> Result<HarnessConfig, String> {
    let (content_root, rest) = match args.split_first() {
        Some((first, rest)) if PathBuf::from(first).is_dir() => (PathBuf::from(first), rest),
        _ => match env_root {
            Some(root) => (root, args),
            None => return Err(format!("missing content root; pass it or set {ROOT_ENV_VAR}")),
        },
    };

    let (script_path, session_path) = match rest {
        [script] => (PathBuf::from(script), content_root.join(DEFAULT_SESSION_FILE)),
        [script, session] => (PathBuf::from(script), PathBuf::from(session)),
        [] => return Err("missing script path".to_string()),
        [_, _, extra, ..] => return Err(format!("unexpected argument '{extra}'")),
    };

    Ok(HarnessConfig {
        content_root,
        script_path,
        session_path,
    })
}
