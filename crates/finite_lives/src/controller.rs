use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ConfigStore;
use crate::display::LivesDisplay;
use crate::session::SessionState;

pub const INFINITE_TEXT: &str = "inf";

const DEFAULT_LIFE_COUNT: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitMode {
    SaveAndQuit,
    GiveUp,
    Restart,
    GoldenBerryRestart,
    Completed,
    CompletedInterlude,
}

impl ExitMode {
    fn keeps_lives(self) -> bool {
        matches!(self, ExitMode::GoldenBerryRestart | ExitMode::SaveAndQuit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Follower {
    Strawberry { golden: bool, winged: bool },
    Other,
}

pub fn has_unwinged_golden_berry(followers: &[Follower]) -> bool {
    followers.iter().any(|follower| {
        matches!(
            follower,
            Follower::Strawberry {
                golden: true,
                winged: false
            }
        )
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelLoad {
    pub chapter: String,
    pub level: String,
    /// First visit to this level in the current play-through.
    pub is_new_level: bool,
    pub is_from_loader: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartRequest {
    Immediate,
    ScreenWipe,
}

pub struct LifeCountController<'a, D: LivesDisplay> {
    config: &'a ConfigStore,
    display: D,
    life_count: u32,
    infinite_lives: bool,
    pending_restart: bool,
    chapter_enabled: bool,
}

impl<'a, D: LivesDisplay> LifeCountController<'a, D> {
    pub fn new(config: &'a ConfigStore, display: D) -> Self {
        Self {
            config,
            display,
            life_count: DEFAULT_LIFE_COUNT,
            infinite_lives: true,
            pending_restart: false,
            chapter_enabled: false,
        }
    }

    pub fn life_count(&self) -> u32 {
        self.life_count
    }

    pub fn infinite_lives(&self) -> bool {
        self.infinite_lives
    }

    pub fn pending_restart(&self) -> bool {
        self.pending_restart
    }

    pub fn chapter_enabled(&self) -> bool {
        self.chapter_enabled
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn display_text(&self) -> String {
        if self.infinite_lives {
            INFINITE_TEXT.to_string()
        } else {
            self.life_count.to_string()
        }
    }

    /// Entering a chapter from a save consumes one life for the attempt.
    pub fn on_chapter_enter(&mut self, session: &mut SessionState, from_save_data: bool) {
        if !from_save_data {
            self.reset_lives();
            self.pending_restart = false;
            info!("chapter_entered_fresh");
            return;
        }

        if !session.checksum_matches() {
            self.pending_restart = true;
            warn!(
                life_count = session.life_count,
                infinite_lives = session.infinite_lives,
                "session_tamper_detected"
            );
            return;
        }

        self.life_count = session.life_count.saturating_sub(1);
        self.infinite_lives = session.infinite_lives;
        self.save_session(session);
        info!(
            life_count = self.life_count,
            infinite_lives = self.infinite_lives,
            "chapter_resumed_from_save"
        );

        if self.life_count == 0 {
            self.pending_restart = true;
            info!("chapter_restart_scheduled");
        }
    }

    pub fn on_level_load(
        &mut self,
        session: &mut SessionState,
        load: &LevelLoad,
    ) -> Option<RestartRequest> {
        self.chapter_enabled = self.config.contains_chapter(&load.chapter);
        self.display.set_enabled(self.chapter_enabled);
        if !self.chapter_enabled {
            return None;
        }

        if self.pending_restart {
            self.pending_restart = false;
            let request = if load.is_from_loader {
                RestartRequest::ScreenWipe
            } else {
                RestartRequest::Immediate
            };
            info!(chapter = %load.chapter, request = ?request, "chapter_restart_requested");
            return Some(request);
        }

        if !load.is_new_level {
            self.display.set_text(&self.life_count.to_string());
            return None;
        }

        let lives = self.config.lives(&load.chapter, &load.level)?;

        // Never lowers a count the player already has.
        self.life_count = self.life_count.max(lives);
        self.infinite_lives = lives == 0;
        self.save_session(session);
        let text = self.display_text();
        self.display.set_text(&text);
        info!(
            chapter = %load.chapter,
            level = %load.level,
            life_count = self.life_count,
            infinite_lives = self.infinite_lives,
            "level_lives_applied"
        );
        None
    }

    pub fn on_player_death(&mut self, session: &mut SessionState, carries_unwinged_golden: bool) {
        if self.infinite_lives || carries_unwinged_golden || !self.chapter_enabled {
            debug!(
                infinite_lives = self.infinite_lives,
                carries_unwinged_golden,
                chapter_enabled = self.chapter_enabled,
                "death_ignored"
            );
            return;
        }

        self.life_count = self.life_count.saturating_sub(1);
        self.save_session(session);
        self.display.set_text(&self.life_count.to_string());
        info!(life_count = self.life_count, "life_lost");

        if self.life_count == 0 && !self.pending_restart {
            self.pending_restart = true;
            info!("chapter_restart_scheduled");
        }
    }

    pub fn on_level_exit(&mut self, mode: ExitMode) {
        info!(mode = ?mode, "level_exited");
        if !mode.keeps_lives() {
            self.reset_lives();
        }
    }

    fn reset_lives(&mut self) {
        self.life_count = DEFAULT_LIFE_COUNT;
        self.infinite_lives = true;
    }

    fn save_session(&self, session: &mut SessionState) {
        session.store(self.life_count, self.infinite_lives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayCall, RecordingDisplay};

    const CONFIG: &str = r#"<finitelives>
        <chapter name="Maps/1-Forsaken">
            <level name="a-00" lives="3"/>
            <level name="a-01" lives="1"/>
            <level name="a-02" lives="0"/>
            <level name="a-03" lives="5"/>
        </chapter>
    </finitelives>"#;

    fn store() -> ConfigStore {
        let mut store = ConfigStore::new();
        store.parse_str("test.xml", CONFIG).expect("config");
        store
    }

    fn load(level: &str) -> LevelLoad {
        LevelLoad {
            chapter: "Maps/1-Forsaken".to_string(),
            level: level.to_string(),
            is_new_level: true,
            is_from_loader: false,
        }
    }

    fn revisit(level: &str) -> LevelLoad {
        LevelLoad {
            is_new_level: false,
            ..load(level)
        }
    }

    fn entered<'a>(
        store: &'a ConfigStore,
        session: &mut SessionState,
        level: &str,
    ) -> LifeCountController<'a, RecordingDisplay> {
        let mut controller = LifeCountController::new(store, RecordingDisplay::new());
        controller.on_chapter_enter(session, false);
        assert_eq!(controller.on_level_load(session, &load(level)), None);
        controller
    }

    #[test]
    fn new_controller_starts_with_defaults() {
        let store = store();
        let controller = LifeCountController::new(&store, RecordingDisplay::new());
        assert_eq!(controller.life_count(), 1);
        assert!(controller.infinite_lives());
        assert!(!controller.pending_restart());
        assert_eq!(controller.display_text(), INFINITE_TEXT);
    }

    #[test]
    fn level_override_sets_count_and_persists() {
        let store = store();
        let mut session = SessionState::default();
        let controller = entered(&store, &mut session, "a-00");

        assert_eq!(controller.life_count(), 3);
        assert!(!controller.infinite_lives());
        assert!(controller.chapter_enabled());
        assert_eq!(controller.display().text(), "3");
        assert!(controller.display().enabled());
        assert_eq!(session.life_count, 3);
        assert!(!session.infinite_lives);
        assert!(session.checksum_matches());
    }

    #[test]
    fn level_override_never_lowers_current_count() {
        let store = store();
        let mut session = SessionState::default();
        let mut controller = entered(&store, &mut session, "a-00");

        controller.on_level_load(&mut session, &load("a-01"));
        assert_eq!(controller.life_count(), 3);
        controller.on_level_load(&mut session, &load("a-03"));
        assert_eq!(controller.life_count(), 5);
    }

    #[test]
    fn zero_override_switches_to_infinite() {
        let store = store();
        let mut session = SessionState::default();
        let mut controller = entered(&store, &mut session, "a-00");

        controller.on_level_load(&mut session, &load("a-02"));
        assert!(controller.infinite_lives());
        assert_eq!(controller.display().text(), INFINITE_TEXT);
        assert!(session.infinite_lives);
    }

    #[test]
    fn level_without_override_changes_nothing() {
        let store = store();
        let mut session = SessionState::default();
        let mut controller = entered(&store, &mut session, "a-00");
        let before = session.clone();
        controller.display_mut().drain_calls();

        controller.on_level_load(&mut session, &load("zz-99"));
        assert_eq!(controller.life_count(), 3);
        assert_eq!(session, before);
        assert_eq!(controller.display().calls(), &[DisplayCall::Enabled(true)]);
    }

    #[test]
    fn revisited_level_only_refreshes_display() {
        let store = store();
        let mut session = SessionState::default();
        let mut controller = entered(&store, &mut session, "a-00");
        controller.on_player_death(&mut session, false);
        controller.display_mut().drain_calls();

        controller.on_level_load(&mut session, &revisit("a-03"));
        assert_eq!(controller.life_count(), 2);
        assert_eq!(
            controller.display().calls(),
            &[DisplayCall::Enabled(true), DisplayCall::Text("2".to_string())]
        );
    }

    #[test]
    fn unknown_chapter_disables_and_ignores_deaths() {
        let store = store();
        let mut session = SessionState::default();
        let mut controller = entered(&store, &mut session, "a-00");

        let other = LevelLoad {
            chapter: "Maps/2-OldSite".to_string(),
            ..load("a-00")
        };
        assert_eq!(controller.on_level_load(&mut session, &other), None);
        assert!(!controller.chapter_enabled());
        assert!(!controller.display().enabled());

        controller.on_player_death(&mut session, false);
        assert_eq!(controller.life_count(), 3);
    }

    #[test]
    fn death_decrements_and_persists() {
        let store = store();
        let mut session = SessionState::default();
        let mut controller = entered(&store, &mut session, "a-00");

        controller.on_player_death(&mut session, false);
        assert_eq!(controller.life_count(), 2);
        assert_eq!(controller.display().text(), "2");
        assert_eq!(session.life_count, 2);
        assert!(session.checksum_matches());
        assert!(!controller.pending_restart());
    }

    #[test]
    fn death_is_ignored_while_infinite_or_carrying_golden() {
        let store = store();
        let mut session = SessionState::default();
        let mut controller = LifeCountController::new(&store, RecordingDisplay::new());
        controller.on_chapter_enter(&mut session, false);
        controller.on_level_load(&mut session, &load("a-02"));
        controller.on_player_death(&mut session, false);
        assert_eq!(controller.life_count(), 1);
        assert!(controller.infinite_lives());

        let mut controller = entered(&store, &mut session, "a-00");
        controller.on_player_death(&mut session, true);
        assert_eq!(controller.life_count(), 3);
    }

    #[test]
    fn reaching_zero_schedules_restart_once() {
        let store = store();
        let mut session = SessionState::default();
        let mut controller = entered(&store, &mut session, "a-01");

        controller.on_player_death(&mut session, false);
        assert_eq!(controller.life_count(), 0);
        assert!(controller.pending_restart());

        controller.on_player_death(&mut session, false);
        assert_eq!(controller.life_count(), 0);
        assert!(controller.pending_restart());

        assert_eq!(
            controller.on_level_load(&mut session, &revisit("a-01")),
            Some(RestartRequest::Immediate)
        );
        assert!(!controller.pending_restart());
        assert_eq!(controller.on_level_load(&mut session, &revisit("a-01")), None);
    }

    #[test]
    fn pending_restart_from_loader_uses_screen_wipe_and_skips_overrides() {
        let store = store();
        let mut session = SessionState::default();
        let mut controller = entered(&store, &mut session, "a-01");
        controller.on_player_death(&mut session, false);
        let before = session.clone();

        let from_loader = LevelLoad {
            is_from_loader: true,
            ..load("a-03")
        };
        assert_eq!(
            controller.on_level_load(&mut session, &from_loader),
            Some(RestartRequest::ScreenWipe)
        );
        assert_eq!(controller.life_count(), 0);
        assert_eq!(session, before);
    }

    #[test]
    fn exit_resets_except_exempt_modes() {
        let store = store();
        for mode in [ExitMode::GoldenBerryRestart, ExitMode::SaveAndQuit] {
            let mut session = SessionState::default();
            let mut controller = entered(&store, &mut session, "a-00");
            controller.on_level_exit(mode);
            assert_eq!(controller.life_count(), 3);
            assert!(!controller.infinite_lives());
        }
        for mode in [
            ExitMode::GiveUp,
            ExitMode::Restart,
            ExitMode::Completed,
            ExitMode::CompletedInterlude,
        ] {
            let mut session = SessionState::default();
            let mut controller = entered(&store, &mut session, "a-00");
            controller.on_level_exit(mode);
            assert_eq!(controller.life_count(), 1);
            assert!(controller.infinite_lives());
        }
    }

    #[test]
    fn fresh_entry_resets_state_and_clears_restart() {
        let store = store();
        let mut session = SessionState::default();
        let mut controller = entered(&store, &mut session, "a-01");
        controller.on_player_death(&mut session, false);
        assert!(controller.pending_restart());

        controller.on_chapter_enter(&mut session, false);
        assert_eq!(controller.life_count(), 1);
        assert!(controller.infinite_lives());
        assert!(!controller.pending_restart());
    }

    #[test]
    fn resume_consumes_one_life() {
        let store = store();
        let mut session = SessionState::default();
        session.store(4, false);

        let mut controller = LifeCountController::new(&store, RecordingDisplay::new());
        controller.on_chapter_enter(&mut session, true);
        assert_eq!(controller.life_count(), 3);
        assert!(!controller.infinite_lives());
        assert!(!controller.pending_restart());
        assert_eq!(session.life_count, 3);
        assert!(session.checksum_matches());
    }

    #[test]
    fn resume_on_last_life_schedules_restart() {
        let store = store();
        let mut session = SessionState::default();
        session.store(1, false);

        let mut controller = LifeCountController::new(&store, RecordingDisplay::new());
        controller.on_chapter_enter(&mut session, true);
        assert_eq!(controller.life_count(), 0);
        assert!(controller.pending_restart());
        assert_eq!(
            controller.on_level_load(&mut session, &load("a-00")),
            Some(RestartRequest::Immediate)
        );
    }

    #[test]
    fn tampered_session_forces_restart_without_adopting_values() {
        let store = store();
        let mut session = SessionState::default();
        session.store(2, false);
        session.life_count = 50;

        let mut controller = LifeCountController::new(&store, RecordingDisplay::new());
        controller.on_chapter_enter(&mut session, true);
        assert!(controller.pending_restart());
        assert_eq!(controller.life_count(), 1);
        assert!(controller.infinite_lives());
        assert_eq!(session.life_count, 50);
        assert!(!session.checksum_matches());
    }

    #[test]
    fn never_stored_session_counts_as_tampered() {
        let store = store();
        let mut session = SessionState::default();
        let mut controller = LifeCountController::new(&store, RecordingDisplay::new());
        controller.on_chapter_enter(&mut session, true);
        assert!(controller.pending_restart());
    }

    #[test]
    fn golden_berry_detection_needs_golden_without_wings() {
        assert!(!has_unwinged_golden_berry(&[]));
        assert!(!has_unwinged_golden_berry(&[Follower::Other]));
        assert!(!has_unwinged_golden_berry(&[Follower::Strawberry {
            golden: false,
            winged: false
        }]));
        assert!(!has_unwinged_golden_berry(&[Follower::Strawberry {
            golden: true,
            winged: true
        }]));
        assert!(has_unwinged_golden_berry(&[
            Follower::Other,
            Follower::Strawberry {
                golden: true,
                winged: false
            }
        ]));
    }
}
