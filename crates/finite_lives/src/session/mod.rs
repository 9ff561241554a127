mod checksum;
mod persist;

use serde::{Deserialize, Serialize};

pub use checksum::compute_checksum;
pub use persist::{read_session, write_session_atomic, SessionIoError, SessionReadState};

/// Per-play-through record the host saves alongside its own save data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionState {
    pub life_count: u32,
    pub infinite_lives: bool,
    pub checksum: String,
}

impl Default for SessionState {
    /// A record that has never been stored carries an empty checksum, so it
    /// never validates on resume.
    fn default() -> Self {
        Self {
            life_count: 1,
            infinite_lives: true,
            checksum: String::new(),
        }
    }
}

impl SessionState {
    pub fn store(&mut self, life_count: u32, infinite_lives: bool) {
        self.life_count = life_count;
        self.infinite_lives = infinite_lives;
        self.checksum = compute_checksum(life_count, infinite_lives);
    }

    pub fn checksum_matches(&self) -> bool {
        self.checksum == compute_checksum(self.life_count, self.infinite_lives)
    }
}
