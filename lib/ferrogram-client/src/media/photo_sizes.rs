// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use ferrogram_tl_types as tl;

use super::Downloadable;

/// The file a [`PhotoSize`] is a thumbnail of.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Owner {
    Photo {
        id: i64,
        access_hash: i64,
        file_reference: Vec<u8>,
        dc_id: i32,
    },
    Document {
        id: i64,
        access_hash: i64,
        file_reference: Vec<u8>,
        dc_id: i32,
    },
}

/// One of the sizes a photo or a document thumbnail is available in.
///
/// Telegram does not keep the original photo, only a few transformed copies of it,
/// each identified by a one-letter type.
///
/// <https://core.telegram.org/api/files#image-thumbnail-types>
#[derive(Clone, Debug, PartialEq)]
pub struct PhotoSize {
    pub raw: tl::enums::PhotoSize,
    owner: Owner,
}

impl PhotoSize {
    pub(crate) fn new(raw: tl::enums::PhotoSize, owner: Owner) -> Self {
        Self { raw, owner }
    }

    /// The type of this size, as used by [`tl::types::InputPhotoFileLocation::thumb_size`].
    pub fn photo_type(&self) -> &str {
        match &self.raw {
            tl::enums::PhotoSize::Empty(size) => &size.r#type,
            tl::enums::PhotoSize::PhotoSize(size) => &size.r#type,
            tl::enums::PhotoSize::Progressive(size) => &size.r#type,
        }
    }

    /// Size of the photo thumb, in bytes.
    pub fn byte_size(&self) -> u64 {
        match &self.raw {
            tl::enums::PhotoSize::Empty(_) => 0,
            tl::enums::PhotoSize::PhotoSize(size) => size.size as u64,
            tl::enums::PhotoSize::Progressive(size) => {
                size.sizes.iter().copied().max().unwrap_or(0) as u64
            }
        }
    }

    /// Width and height, in pixels.
    pub fn resolution(&self) -> Option<(i32, i32)> {
        match &self.raw {
            tl::enums::PhotoSize::Empty(_) => None,
            tl::enums::PhotoSize::PhotoSize(size) => Some((size.w, size.h)),
            tl::enums::PhotoSize::Progressive(size) => Some((size.w, size.h)),
        }
    }
}

impl Downloadable for PhotoSize {
    fn to_raw_input_location(&self) -> Option<tl::enums::InputFileLocation> {
        if let tl::enums::PhotoSize::Empty(_) = self.raw {
            return None;
        }
        let thumb_size = self.photo_type().to_string();
        Some(match &self.owner {
            Owner::Photo {
                id,
                access_hash,
                file_reference,
                ..
            } => tl::types::InputPhotoFileLocation {
                id: *id,
                access_hash: *access_hash,
                file_reference: file_reference.clone(),
                thumb_size,
            }
            .into(),
            Owner::Document {
                id,
                access_hash,
                file_reference,
                ..
            } => tl::types::InputDocumentFileLocation {
                id: *id,
                access_hash: *access_hash,
                file_reference: file_reference.clone(),
                thumb_size,
            }
            .into(),
        })
    }

    fn dc_id(&self) -> Option<i32> {
        match &self.owner {
            Owner::Photo { dc_id, .. } | Owner::Document { dc_id, .. } => Some(*dc_id),
        }
    }

    fn size(&self) -> Option<u64> {
        Some(self.byte_size())
    }
}

pub trait VecExt {
    /// The size with the most bytes, if any.
    fn largest(&self) -> Option<&PhotoSize>;
}

impl VecExt for Vec<PhotoSize> {
    fn largest(&self) -> Option<&PhotoSize> {
        self.iter()
            .filter(|size| !matches!(size.raw, tl::enums::PhotoSize::Empty(_)))
            .max_by_key(|size| size.byte_size())
    }
}
