pub mod analysis;
pub mod buhlmann;
pub mod diagnostics;
pub mod error;
pub mod ffi;
pub mod gas;
pub mod matcher;
pub mod metrics;
pub mod models;
pub mod playback;
pub mod report;
pub mod shearwater;

uniffi::setup_scaffolding!();

pub use analysis::DiveAnalysis;
pub use buhlmann::{Buhlmann, DecoModel};
pub use diagnostics::Diagnostics;
pub use error::DiveLogError;
pub use gas::GasMix;
pub use matcher::{find_best_match, BestMatch};
pub use metrics::{max_depth, DepthBucket, DepthHistogram};
pub use models::{DepthUnits, Dive, Sample};
pub use playback::{playback, playback_default, PlaybackOptions, PlaybackResult};
pub use shearwater::{LogHeader, ShearwaterLog};
