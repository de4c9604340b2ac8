//! Plain data shared by the dataset engine and its callers: catalog rows,
//! audio buffers, request options and the diagnostic taxonomy.

pub mod audio;
pub mod catalog;
pub mod error;
pub mod request;
pub mod scale;

pub use audio::AudioBuffer;
pub use catalog::{CatalogRow, EffectDescriptor, NoteKey};
pub use error::DatasetError;
pub use request::{DatasetRequest, DecodeFailurePolicy, StrategyKind};

/// `playStyle` value for picked (plucked with a pick) notes.
pub const PICKING_PLAY_STYLE: u32 = 3;
/// `instrumentSetting` of the reference guitar every dataset is built from.
pub const REFERENCE_INSTRUMENT: u32 = 9;
/// `fxType` sentinel meaning the note was recorded dry.
pub const NO_EFFECT_FX_TYPE: u32 = 11;
/// Folder holding the dry recordings under the samples root.
pub const NO_EFFECT_FOLDER: &str = "NoFX";

/// Tail fade applied to every stitched note, in seconds.
pub const FADE_SECONDS: f64 = 0.1;
/// Nominal length of one recorded note, in seconds.
pub const NOTE_SECONDS: f64 = 2.0;
/// Companding constant (8-bit mu-law).
pub const MU: f32 = 255.0;

pub const DEFAULT_SAMPLE_RATE: u32 = 22050;
pub const DEFAULT_DURATION_SECONDS: f64 = 120.0;
