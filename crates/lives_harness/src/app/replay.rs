use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use finite_lives::{
    has_unwinged_golden_berry, load_from_registry, read_session, registry_from_dir,
    write_session_atomic, ConfigStore, DisplayCall, LevelLoad, LifeCountController,
    RecordingDisplay, RestartRequest, SessionReadState, SessionState,
};
use tracing::{error, info, warn};

use super::bootstrap::HarnessConfig;
use super::script::{parse_script_json, ScriptEvent};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ReplayOutcome {
    pub(crate) restarts: Vec<RestartRequest>,
    pub(crate) saves: usize,
}

pub(crate) fn run(config: &HarnessConfig) -> ExitCode {
    match try_run(config) {
        Ok(outcome) => {
            info!(
                restarts = outcome.restarts.len(),
                saves = outcome.saves,
                "replay_finished"
            );
            ExitCode::SUCCESS
        }
        Err(message) => {
            error!(error = %message, "replay_failed");
            ExitCode::FAILURE
        }
    }
}

fn try_run(config: &HarnessConfig) -> Result<ReplayOutcome, String> {
    let store = load_config_store(&config.content_root)?;
    let mut session = load_session(&config.session_path)?;
    let raw = fs::read_to_string(&config.script_path)
        .map_err(|error| format!("read script '{}': {error}", config.script_path.display()))?;
    let events = parse_script_json(&raw)?;
    info!(
        script = %config.script_path.display(),
        event_count = events.len(),
        "script_loaded"
    );

    let mut controller = LifeCountController::new(&store, RecordingDisplay::new());
    replay_events(&mut controller, &mut session, &events, &config.session_path)
}

fn load_config_store(content_root: &Path) -> Result<ConfigStore, String> {
    let registry = registry_from_dir(content_root)
        .map_err(|error| format!("scan content root: {error}"))?;
    let registry = Mutex::new(registry);
    let mut store = ConfigStore::new();
    let summary = load_from_registry(&mut store, &registry);
    if summary.files_failed > 0 && store.is_empty() {
        return Err(format!(
            "no usable config under '{}': {} source(s) failed to parse",
            content_root.display(),
            summary.files_failed
        ));
    }
    if store.is_empty() {
        warn!(content_root = %content_root.display(), "no_config_sources_found");
    }
    Ok(store)
}

fn load_session(path: &Path) -> Result<SessionState, String> {
    match read_session(path).map_err(|error| error.to_string())? {
        SessionReadState::Present(session) => {
            info!(path = %path.display(), "session_loaded");
            Ok(session)
        }
        SessionReadState::Missing => Ok(SessionState::default()),
        SessionReadState::Unreadable(reason) => {
            warn!(path = %path.display(), reason = %reason, "session_unreadable_starting_over");
            Ok(SessionState::default())
        }
    }
}

pub(crate) fn replay_events(
    controller: &mut LifeCountController<'_, RecordingDisplay>,
    session: &mut SessionState,
    events: &[ScriptEvent],
    session_path: &Path,
) -> Result<ReplayOutcome, String> {
    let mut outcome = ReplayOutcome::default();
    for (index, event) in events.iter().enumerate() {
        match event {
            ScriptEvent::ChapterEnter { from_save_data } => {
                controller.on_chapter_enter(session, *from_save_data);
            }
            ScriptEvent::LevelLoad {
                chapter,
                level,
                is_new_level,
                is_from_loader,
            } => {
                let load = LevelLoad {
                    chapter: chapter.clone(),
                    level: level.clone(),
                    is_new_level: *is_new_level,
                    is_from_loader: *is_from_loader,
                };
                if let Some(request) = controller.on_level_load(session, &load) {
                    info!(index, request = ?request, "host_restart_chapter");
                    outcome.restarts.push(request);
                }
            }
            ScriptEvent::PlayerDeath { followers } => {
                controller.on_player_death(session, has_unwinged_golden_berry(followers));
            }
            ScriptEvent::LevelExit { mode } => controller.on_level_exit(*mode),
            ScriptEvent::Save => {
                write_session_atomic(session_path, session).map_err(|error| error.to_string())?;
                outcome.saves += 1;
                info!(index, path = %session_path.display(), "session_saved");
            }
        }

        for call in controller.display_mut().drain_calls() {
            match call {
                DisplayCall::Text(text) => info!(index, text = %text, "display_text"),
                DisplayCall::Enabled(enabled) => info!(index, enabled, "display_enabled"),
            }
        }
    }
    Ok(outcome)
}
