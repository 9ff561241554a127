use finite_lives::{ExitMode, Follower};
use serde::Deserialize;

/// One host lifecycle event to replay against the controller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub(crate) enum ScriptEvent {
    ChapterEnter {
        from_save_data: bool,
    },
    LevelLoad {
        chapter: String,
        level: String,
        #[serde(default = "default_true")]
        is_new_level: bool,
        #[serde(default)]
        is_from_loader: bool,
    },
    PlayerDeath {
        #[serde(default)]
        followers: Vec<Follower>,
    },
    LevelExit {
        mode: ExitMode,
    },
    Save,
}

fn default_true() -> bool {
    true
}

pub(crate) fn parse_script_json(raw: &str) -> Result<Vec<ScriptEvent>, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, Vec<ScriptEvent>>(&mut deserializer) {
        Ok(events) => Ok(events),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(format!("parse script json: {source}"))
            } else {
                Err(format!("parse script json at {path}: {source}"))
            }
        }
    }
}
