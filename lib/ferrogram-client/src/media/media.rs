// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use ferrogram_tl_types as tl;

use super::photo_sizes::{Owner, PhotoSize, VecExt};
use super::Downloadable;
use crate::utils::{self, Date};

#[derive(Clone, Debug, PartialEq)]
pub struct Photo {
    pub raw: tl::types::MessageMediaPhoto,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub raw: tl::types::MessageMediaDocument,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Geo {
    pub raw: tl::types::GeoPoint,
}

/// The profile photo of a user, group or channel.
#[derive(Clone, Debug, PartialEq)]
pub struct PeerPhoto {
    pub peer: tl::enums::InputPeer,
    pub photo_id: i64,
    /// Whether to fetch the big version of the photo instead of the small one.
    pub big: bool,
    pub dc_id: i32,
}

/// What a [`Document`] is, according to its attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    Generic,
    Video,
    /// A round video message.
    RoundVideo,
    Audio,
    /// A voice note.
    Voice,
    Sticker,
    /// A silent looping video, such as a GIF.
    Animation,
}

#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Media {
    Photo(Photo),
    Document(Document),
    Geo(Geo),
    /// Media this version of the library does not know how to represent.
    Unsupported,
}

impl Media {
    pub fn from_raw(media: tl::enums::MessageMedia) -> Option<Self> {
        use tl::enums::MessageMedia as M;

        match media {
            M::Empty(_) => None,
            M::Photo(photo) => Some(Self::Photo(Photo::from_raw_media(photo))),
            M::Document(document) => Some(Self::Document(Document::from_raw_media(document))),
            M::Geo(geo) => Geo::from_raw_media(geo).map(Self::Geo),
            M::Unsupported(_) => Some(Self::Unsupported),
        }
    }
}

impl Photo {
    pub fn from_raw(photo: tl::enums::Photo) -> Self {
        Self {
            raw: tl::types::MessageMediaPhoto {
                spoiler: false,
                photo: Some(photo),
                ttl_seconds: None,
            },
        }
    }

    pub fn from_raw_media(photo: tl::types::MessageMediaPhoto) -> Self {
        Self { raw: photo }
    }

    fn photo(&self) -> Option<&tl::types::Photo> {
        match self.raw.photo.as_ref()? {
            tl::enums::Photo::Photo(photo) => Some(photo),
            tl::enums::Photo::Empty(_) => None,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self.raw.photo.as_ref()? {
            tl::enums::Photo::Photo(photo) => Some(photo.id),
            tl::enums::Photo::Empty(photo) => Some(photo.id),
        }
    }

    pub fn date(&self) -> Option<Date> {
        self.photo().map(|photo| utils::date(photo.date))
    }

    /// Get photo thumbs.
    ///
    /// Since Telegram doesn't store the original photo, it can be presented in different sizes
    /// and quality. Downloading a [`Photo`] fetches the largest of them.
    pub fn thumbs(&self) -> Vec<PhotoSize> {
        let Some(photo) = self.photo() else {
            return Vec::new();
        };
        let owner = Owner::Photo {
            id: photo.id,
            access_hash: photo.access_hash,
            file_reference: photo.file_reference.clone(),
            dc_id: photo.dc_id,
        };
        photo
            .sizes
            .iter()
            .map(|size| PhotoSize::new(size.clone(), owner.clone()))
            .collect()
    }

    pub fn is_spoiler(&self) -> bool {
        self.raw.spoiler
    }
}

impl Downloadable for Photo {
    fn to_raw_input_location(&self) -> Option<tl::enums::InputFileLocation> {
        self.thumbs().largest()?.to_raw_input_location()
    }

    fn dc_id(&self) -> Option<i32> {
        self.photo().map(|photo| photo.dc_id)
    }

    fn size(&self) -> Option<u64> {
        self.thumbs().largest().map(PhotoSize::byte_size)
    }
}

impl Document {
    pub fn from_raw_media(document: tl::types::MessageMediaDocument) -> Self {
        Self { raw: document }
    }

    fn document(&self) -> Option<&tl::types::Document> {
        match self.raw.document.as_ref()? {
            tl::enums::Document::Document(document) => Some(document),
            tl::enums::Document::Empty(_) => None,
        }
    }

    fn attributes(&self) -> impl Iterator<Item = &tl::enums::DocumentAttribute> {
        self.document()
            .into_iter()
            .flat_map(|document| document.attributes.iter())
    }

    pub fn id(&self) -> Option<i64> {
        match self.raw.document.as_ref()? {
            tl::enums::Document::Document(document) => Some(document.id),
            tl::enums::Document::Empty(document) => Some(document.id),
        }
    }

    /// The file name the document was sent with, or empty if it had none.
    pub fn name(&self) -> &str {
        self.attributes()
            .find_map(|attr| match attr {
                tl::enums::DocumentAttribute::Filename(attr) => Some(attr.file_name.as_str()),
                _ => None,
            })
            .unwrap_or("")
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.document().map(|document| document.mime_type.as_str())
    }

    pub fn creation_date(&self) -> Option<Date> {
        self.document().map(|document| utils::date(document.date))
    }

    pub fn thumbs(&self) -> Vec<PhotoSize> {
        let Some(document) = self.document() else {
            return Vec::new();
        };
        let owner = Owner::Document {
            id: document.id,
            access_hash: document.access_hash,
            file_reference: document.file_reference.clone(),
            dc_id: document.dc_id,
        };
        document
            .thumbs
            .iter()
            .flatten()
            .map(|size| PhotoSize::new(size.clone(), owner.clone()))
            .collect()
    }

    /// Duration of a video or audio, in seconds.
    pub fn duration(&self) -> Option<f64> {
        self.attributes().find_map(|attr| match attr {
            tl::enums::DocumentAttribute::Video(video) => Some(video.duration),
            tl::enums::DocumentAttribute::Audio(audio) => Some(audio.duration as f64),
            _ => None,
        })
    }

    /// Width and height of a video or image, in pixels.
    pub fn resolution(&self) -> Option<(i32, i32)> {
        self.attributes().find_map(|attr| match attr {
            tl::enums::DocumentAttribute::Video(video) => Some((video.w, video.h)),
            tl::enums::DocumentAttribute::ImageSize(image) => Some((image.w, image.h)),
            _ => None,
        })
    }

    pub fn audio_title(&self) -> Option<&str> {
        self.attributes().find_map(|attr| match attr {
            tl::enums::DocumentAttribute::Audio(audio) => audio.title.as_deref(),
            _ => None,
        })
    }

    pub fn performer(&self) -> Option<&str> {
        self.attributes().find_map(|attr| match attr {
            tl::enums::DocumentAttribute::Audio(audio) => audio.performer.as_deref(),
            _ => None,
        })
    }

    /// The emoji associated with a sticker.
    pub fn sticker_emoji(&self) -> Option<&str> {
        self.attributes().find_map(|attr| match attr {
            tl::enums::DocumentAttribute::Sticker(sticker) => Some(sticker.alt.as_str()),
            _ => None,
        })
    }

    pub fn kind(&self) -> DocumentKind {
        use tl::enums::DocumentAttribute as A;

        let mut kind = DocumentKind::Generic;
        for attr in self.attributes() {
            match attr {
                A::Sticker(_) => return DocumentKind::Sticker,
                A::Animated(_) => kind = DocumentKind::Animation,
                A::Video(video) if kind != DocumentKind::Animation => {
                    kind = if video.round_message || self.raw.round {
                        DocumentKind::RoundVideo
                    } else {
                        DocumentKind::Video
                    };
                }
                A::Audio(audio) if kind == DocumentKind::Generic => {
                    kind = if audio.voice || self.raw.voice {
                        DocumentKind::Voice
                    } else {
                        DocumentKind::Audio
                    };
                }
                _ => {}
            }
        }
        kind
    }

    pub fn is_spoiler(&self) -> bool {
        self.raw.spoiler
    }
}

impl Downloadable for Document {
    fn to_raw_input_location(&self) -> Option<tl::enums::InputFileLocation> {
        self.document().map(|document| {
            tl::types::InputDocumentFileLocation {
                id: document.id,
                access_hash: document.access_hash,
                file_reference: document.file_reference.clone(),
                thumb_size: String::new(),
            }
            .into()
        })
    }

    fn dc_id(&self) -> Option<i32> {
        self.document().map(|document| document.dc_id)
    }

    fn size(&self) -> Option<u64> {
        self.document().map(|document| document.size as u64)
    }
}

impl Geo {
    pub fn from_raw_media(geo: tl::types::MessageMediaGeo) -> Option<Self> {
        match geo.geo {
            tl::enums::GeoPoint::GeoPoint(point) => Some(Self { raw: point }),
            tl::enums::GeoPoint::Empty(_) => None,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.raw.lat
    }

    pub fn longitude(&self) -> f64 {
        self.raw.long
    }

    pub fn accuracy_radius(&self) -> Option<i32> {
        self.raw.accuracy_radius
    }
}

impl Downloadable for PeerPhoto {
    fn to_raw_input_location(&self) -> Option<tl::enums::InputFileLocation> {
        Some(
            tl::types::InputPeerPhotoFileLocation {
                big: self.big,
                peer: self.peer.clone(),
                photo_id: self.photo_id,
            }
            .into(),
        )
    }

    fn dc_id(&self) -> Option<i32> {
        Some(self.dc_id)
    }
}

impl Downloadable for Media {
    fn to_raw_input_location(&self) -> Option<tl::enums::InputFileLocation> {
        match self {
            Self::Photo(photo) => photo.to_raw_input_location(),
            Self::Document(document) => document.to_raw_input_location(),
            Self::Geo(_) | Self::Unsupported => None,
        }
    }

    fn dc_id(&self) -> Option<i32> {
        match self {
            Self::Photo(photo) => photo.dc_id(),
            Self::Document(document) => document.dc_id(),
            Self::Geo(_) | Self::Unsupported => None,
        }
    }

    fn size(&self) -> Option<u64> {
        match self {
            Self::Photo(photo) => Downloadable::size(photo),
            Self::Document(document) => Downloadable::size(document),
            Self::Geo(_) | Self::Unsupported => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(flags: (bool, bool), attributes: Vec<tl::enums::DocumentAttribute>) -> Document {
        Document::from_raw_media(tl::types::MessageMediaDocument {
            nopremium: false,
            spoiler: false,
            video: false,
            round: flags.0,
            voice: flags.1,
            document: Some(
                tl::types::Document {
                    id: 1,
                    access_hash: 2,
                    file_reference: vec![3],
                    date: 0,
                    mime_type: "application/octet-stream".to_string(),
                    size: 1234,
                    thumbs: None,
                    dc_id: 4,
                    attributes,
                }
                .into(),
            ),
            ttl_seconds: None,
        })
    }

    fn video(round_message: bool) -> tl::enums::DocumentAttribute {
        tl::types::DocumentAttributeVideo {
            round_message,
            supports_streaming: false,
            nosound: false,
            duration: 1.5,
            w: 640,
            h: 480,
            preload_prefix_size: None,
            video_start_ts: None,
            video_codec: None,
        }
        .into()
    }

    fn audio(voice: bool) -> tl::enums::DocumentAttribute {
        tl::types::DocumentAttributeAudio {
            voice,
            duration: 3,
            title: None,
            performer: None,
            waveform: None,
        }
        .into()
    }

    #[test]
    fn document_kind_follows_attributes() {
        let animated = tl::types::DocumentAttributeAnimated {}.into();
        let sticker = tl::types::DocumentAttributeSticker {
            mask: false,
            alt: "x".to_string(),
            stickerset: tl::types::InputStickerSetEmpty {}.into(),
        }
        .into();

        assert_eq!(document((false, false), vec![]).kind(), DocumentKind::Generic);
        assert_eq!(document((false, false), vec![video(false)]).kind(), DocumentKind::Video);
        assert_eq!(document((false, false), vec![video(true)]).kind(), DocumentKind::RoundVideo);
        assert_eq!(document((true, false), vec![video(false)]).kind(), DocumentKind::RoundVideo);
        assert_eq!(document((false, false), vec![audio(false)]).kind(), DocumentKind::Audio);
        assert_eq!(document((false, false), vec![audio(true)]).kind(), DocumentKind::Voice);
        assert_eq!(document((false, true), vec![audio(false)]).kind(), DocumentKind::Voice);
        assert_eq!(
            document((false, false), vec![video(false), animated]).kind(),
            DocumentKind::Animation
        );
        assert_eq!(
            document((false, false), vec![sticker, video(false)]).kind(),
            DocumentKind::Sticker
        );
    }

    #[test]
    fn document_location_uses_full_file() {
        let document = document((false, false), vec![]);
        assert_eq!(document.dc_id(), Some(4));
        assert_eq!(Downloadable::size(&document), Some(1234));
        match document.to_raw_input_location() {
            Some(tl::enums::InputFileLocation::InputDocumentFileLocation(location)) => {
                assert_eq!(location.id, 1);
                assert_eq!(location.file_reference, vec![3]);
                assert_eq!(location.thumb_size, "");
            }
            other => panic!("unexpected location {other:?}"),
        }
    }

    #[test]
    fn photo_downloads_largest_size() {
        let size = |t: &str, size| {
            tl::enums::PhotoSize::PhotoSize(tl::types::PhotoSize {
                r#type: t.to_string(),
                w: 1,
                h: 1,
                size,
            })
        };
        let photo = Photo::from_raw(
            tl::types::Photo {
                has_stickers: false,
                id: 9,
                access_hash: 8,
                file_reference: vec![7],
                date: 0,
                sizes: vec![size("s", 10), size("y", 300), size("m", 100)],
                dc_id: 2,
            }
            .into(),
        );

        assert_eq!(Downloadable::size(&photo), Some(300));
        match photo.to_raw_input_location() {
            Some(tl::enums::InputFileLocation::InputPhotoFileLocation(location)) => {
                assert_eq!(location.thumb_size, "y");
            }
            other => panic!("unexpected location {other:?}"),
        }
    }
}
