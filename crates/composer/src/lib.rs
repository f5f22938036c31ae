//! Creative composition: rasterizes campaign assets and copy into fixed-size
//! ad creatives, one per output format.

pub mod canvas;
pub mod composer;
pub mod decode;
pub mod layout;
pub mod text;

pub use composer::CreativeComposer;
pub use decode::{DecodeError, DecodedImage, ImageCrateDecoder, ImageDecodeService};
pub use text::FontFace;
