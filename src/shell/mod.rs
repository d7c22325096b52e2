pub(crate) mod audio;
pub(crate) mod card_content;
pub(crate) mod gate;
pub(crate) mod viewer;

pub use audio::{AudioControls, AudioPlayer, AudioSource, PlaybackCommand};
pub use card_content::{BrandColors, CardContent, CardStyle, Platform, SocialLink};
pub use gate::{EntryGate, ViewMode};
pub use viewer::{BackgroundVideo, ViewerShell};
