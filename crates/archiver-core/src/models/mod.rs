//! Data models for the archiver
//!
//! Organized by pipeline stage: inbound attachments, classification output,
//! staged local files and remote upload records.

mod attachment;
mod classification;
mod media;
mod staged;
mod upload;

pub use attachment::*;
pub use classification::*;
pub use media::*;
pub use staged::*;
pub use upload::*;
