//! Photostrip composes captured photo frames into a styled, print-ready strip and publishes it
//! behind a short-lived signed link.
//!
//! - Describe the look with a [`StyleSpec`] (or build a [`StyleConfig`] directly)
//! - Render frames with a [`CompositionEngine`] into a [`Composite`]
//! - Hand the composite to a [`PublicationManager`], which uploads it, signs a link, counts
//!   down, and deletes the object exactly once
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod composition;
pub(crate) mod effects;
pub(crate) mod layout;
pub(crate) mod publish;
pub(crate) mod render;

pub use crate::foundation::core::{Affine, PixelRect, Point, Rect, Rgb8, Vec2};
pub use crate::foundation::error::{StripError, StripResult};

pub use crate::assets::decode::{RasterImage, decode_image};
pub use crate::assets::store::{
    AssetResolver, DirAssetResolver, PatternCatalog, PatternEntry, normalize_rel_path,
};
pub use crate::composition::frame::{Composite, Frame, OutputFormat};
pub use crate::composition::style::{
    FooterContent, Sticker, StickerSpec, StyleConfig, StyleSpec, download_filename,
};
pub use crate::effects::filter::{FilterKind, apply_filter};
pub use crate::layout::fit::{FitPlacement, cover_fit, fit_within};
pub use crate::layout::stickers::{Offset, StickerAnchor, sticker_anchors};
pub use crate::layout::strip::{Layout, LayoutParams, StripDesign, compute_layout};
pub use crate::publish::clock::{Clock, FixedClock, SystemClock};
pub use crate::publish::countdown::{CountdownHandle, schedule_countdown};
pub use crate::publish::manager::{
    PublicationManager, PublicationRecord, PublicationState, PublishOptions, PublishOutcome,
};
pub use crate::publish::store::{FsObjectStore, InMemoryObjectStore, ObjectStore, StoreError};
pub use crate::render::encode::encode_rgba8;
pub use crate::render::engine::{CompositionEngine, EngineOptions};
