//! Direct actions on recently seen artworks

mod extractor;
mod opener;

pub use extractor::{DirectAction, DirectActionExtractor};
pub use opener::{ResourceOpener, SystemOpener};
