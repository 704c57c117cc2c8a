// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Types relating to message media and downloadables.
//!
//! Properties containing raw types are public and will either be called "raw" or prefixed with "raw_".\
//! Keep in mind that **these fields are not part of the semantic versioning guarantees**.

mod media;
mod photo_sizes;

pub use media::{Document, DocumentKind, Geo, Media, PeerPhoto, Photo};
pub use photo_sizes::{PhotoSize, VecExt};

use ferrogram_tl_types as tl;

/// Anything whose bytes can be fetched with `upload.getFile`.
pub trait Downloadable {
    /// Where the file lives, or `None` if it cannot be downloaded.
    fn to_raw_input_location(&self) -> Option<tl::enums::InputFileLocation>;

    /// The datacenter where the file is stored, if known.
    ///
    /// Files are fetched from the home datacenter when this is `None`.
    fn dc_id(&self) -> Option<i32> {
        None
    }

    /// Bytes already at hand (such as stripped thumbnails), needing no request.
    fn to_data(&self) -> Option<Vec<u8>> {
        None
    }

    /// Size in bytes, when the server told us.
    fn size(&self) -> Option<u64> {
        None
    }
}
