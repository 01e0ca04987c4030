pub(crate) mod fit;
pub(crate) mod stickers;
pub(crate) mod strip;
