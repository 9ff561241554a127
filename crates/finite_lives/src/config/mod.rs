mod chapter;
mod discovery;
mod parser;
mod store;
mod types;

pub use chapter::Chapter;
pub use discovery::{
    load_from_registry, registry_from_dir, AssetKind, DiscoverySummary, ModAsset,
    CONFIG_ASSET_SUFFIX,
};
pub use store::ConfigStore;
pub use types::{ConfigError, ParseNote, ParseNoteKind, ParseReport, SourceLocation};
