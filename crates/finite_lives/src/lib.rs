pub mod config;
pub mod controller;
pub mod display;
pub mod session;

pub use config::{
    load_from_registry, registry_from_dir, AssetKind, Chapter, ConfigError, ConfigStore,
    DiscoverySummary, ModAsset, ParseNote, ParseNoteKind, ParseReport, SourceLocation,
    CONFIG_ASSET_SUFFIX,
};
pub use controller::{
    has_unwinged_golden_berry, ExitMode, Follower, LevelLoad, LifeCountController,
    RestartRequest, INFINITE_TEXT,
};
pub use display::{DisplayCall, LivesDisplay, RecordingDisplay};
pub use session::{
    compute_checksum, read_session, write_session_atomic, SessionIoError, SessionReadState,
    SessionState,
};
