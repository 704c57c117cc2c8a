// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Methods to download and upload files.
//!
//! Downloads are performed lazily, one chunk at a time, through a [`DownloadIter`].
//! Files stored in a different datacenter are fetched over a dedicated media connection
//! after copying the authorization there, and files served by a CDN are decrypted and
//! verified against the hashes handed out by the master datacenter.

use std::fmt;
use std::future::Future;
use std::io::{self, SeekFrom};
#[cfg(feature = "fs")]
use std::path::{Path, PathBuf};

use ferrogram_crypto::cdn;
use ferrogram_mtsender::InvocationError;
use ferrogram_session::types::PeerId;
use ferrogram_tl_types::{self as tl, RemoteCall};
use futures_util::future::BoxFuture;
use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

use super::Client;
use crate::media::Downloadable;
use crate::message::Message;
use crate::utils::generate_random_id;

pub const MIN_CHUNK_SIZE: i32 = 4 * 1024;
pub const MAX_CHUNK_SIZE: i32 = 1024 * 1024;

/// Largest part used by uploads. Parts must evenly divide this size.
pub const MAX_UPLOAD_PART_SIZE: usize = 512 * 1024;
const MIN_UPLOAD_PART_SIZE: usize = 1024;

/// Files larger than this are uploaded with `upload.saveBigFilePart`.
pub const BIG_FILE_SIZE: usize = 10 * 1024 * 1024;

/// How many parts a single upload may consist of.
pub const MAX_UPLOAD_PARTS: usize = 4000;

/// Size of the blocks CDN file hashes cover when the server has not said otherwise.
const CDN_HASH_BLOCK: i32 = 128 * 1024;

const MAX_CDN_REUPLOADS: usize = 3;
const MAX_PART_ATTEMPTS: usize = 3;

/// Returned by a progress callback to stop a transfer.
///
/// The transfer is aborted cleanly: temporary files are removed, and the
/// operation completes without a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transmission;

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transfer aborted by its progress callback")
    }
}

impl std::error::Error for Transmission {}

/// Callback invoked after every chunk with the bytes transferred so far and the total, if known.
pub type ProgressCallback = Box<dyn FnMut(u64, Option<u64>) -> Result<(), Transmission> + Send>;

/// Like [`ProgressCallback`], but the transfer waits for the returned future before going on.
pub type AsyncProgressCallback =
    Box<dyn FnMut(u64, Option<u64>) -> BoxFuture<'static, Result<(), Transmission>> + Send>;

/// How a transfer reports its progress.
pub enum Progress {
    Sync(ProgressCallback),
    Async(AsyncProgressCallback),
}

impl Progress {
    pub fn new(
        callback: impl FnMut(u64, Option<u64>) -> Result<(), Transmission> + Send + 'static,
    ) -> Self {
        Self::Sync(Box::new(callback))
    }

    pub fn new_async<F, Fut>(mut callback: F) -> Self
    where
        F: FnMut(u64, Option<u64>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), Transmission>> + Send + 'static,
    {
        Self::Async(Box::new(move |done, total| Box::pin(callback(done, total))))
    }

    /// Never reports anything.
    pub fn none() -> Self {
        Self::new(|_, _| Ok(()))
    }

    async fn report(&mut self, done: u64, total: Option<u64>) -> Result<(), Transmission> {
        match self {
            Self::Sync(callback) => callback(done, total),
            Self::Async(callback) => callback(done, total).await,
        }
    }
}

/// The error type which is returned when downloading a file fails.
#[derive(Debug)]
pub enum DownloadError {
    /// A request made while downloading failed.
    Invocation(InvocationError),
    /// Writing the downloaded contents failed.
    Io(io::Error),
    /// A part served by the CDN does not match the hashes of the master datacenter.
    CdnFileHashMismatch(cdn::HashMismatch),
    /// The CDN no longer has the file, and it cannot be re-uploaded to it.
    VolumeLocNotFound,
    /// The file reference has expired and the media must be fetched again.
    FileReferenceExpired,
    /// The server redirected to a CDN with unusable encryption parameters.
    InvalidCdnRedirect,
    /// The progress callback returned [`Transmission`].
    Transmission,
}

impl std::error::Error for DownloadError {}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invocation(err) => write!(f, "download failed: {err}"),
            Self::Io(err) => write!(f, "download failed, IO error: {err}"),
            Self::CdnFileHashMismatch(err) => write!(f, "download failed: {err}"),
            Self::VolumeLocNotFound => write!(f, "download failed: file is gone from the cdn"),
            Self::FileReferenceExpired => write!(f, "download failed: file reference expired"),
            Self::InvalidCdnRedirect => write!(f, "download failed: invalid cdn redirect"),
            Self::Transmission => write!(f, "download aborted"),
        }
    }
}

impl From<InvocationError> for DownloadError {
    fn from(error: InvocationError) -> Self {
        if error.rpc().is_some_and(|rpc| rpc.is_file_reference_expired()) {
            Self::FileReferenceExpired
        } else if error.is("VOLUME_LOC_NOT_FOUND") {
            Self::VolumeLocNotFound
        } else {
            Self::Invocation(error)
        }
    }
}

impl From<io::Error> for DownloadError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<Transmission> for DownloadError {
    fn from(_: Transmission) -> Self {
        Self::Transmission
    }
}

/// The error type which is returned when uploading a file fails.
#[derive(Debug)]
pub enum UploadError {
    /// A request made while uploading failed.
    Invocation(InvocationError),
    /// Reading the file failed.
    Io(io::Error),
    /// The file needs more parts than Telegram accepts.
    TooLarge { size: usize },
    /// Telegram kept refusing the part with the given index.
    PartRejected { part: i32 },
    /// The progress callback returned [`Transmission`].
    Transmission,
}

impl std::error::Error for UploadError {}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invocation(err) => write!(f, "upload failed: {err}"),
            Self::Io(err) => write!(f, "upload failed, IO error: {err}"),
            Self::TooLarge { size } => write!(f, "upload failed: {size} bytes is too large"),
            Self::PartRejected { part } => write!(f, "upload failed: part {part} was rejected"),
            Self::Transmission => write!(f, "upload aborted"),
        }
    }
}

impl From<InvocationError> for UploadError {
    fn from(error: InvocationError) -> Self {
        Self::Invocation(error)
    }
}

impl From<io::Error> for UploadError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<Transmission> for UploadError {
    fn from(_: Transmission) -> Self {
        Self::Transmission
    }
}

/// Where the chunks of a redirected file are fetched from.
struct CdnRedirect {
    dc_id: i32,
    file_token: Vec<u8>,
    key: [u8; 32],
    iv: [u8; 16],
    hashes: Vec<cdn::FileHash>,
}

fn file_hashes(hashes: Vec<tl::enums::FileHash>) -> impl Iterator<Item = cdn::FileHash> {
    hashes.into_iter().map(|tl::enums::FileHash::FileHash(h)| cdn::FileHash {
        offset: h.offset,
        limit: h.limit,
        hash: h.hash,
    })
}

impl CdnRedirect {
    fn new(redirect: tl::types::upload::FileCdnRedirect) -> Result<Self, DownloadError> {
        let key = redirect
            .encryption_key
            .as_slice()
            .try_into()
            .map_err(|_| DownloadError::InvalidCdnRedirect)?;
        let iv = redirect
            .encryption_iv
            .as_slice()
            .try_into()
            .map_err(|_| DownloadError::InvalidCdnRedirect)?;

        Ok(Self {
            dc_id: redirect.dc_id,
            file_token: redirect.file_token,
            key,
            iv,
            hashes: file_hashes(redirect.file_hashes).collect(),
        })
    }

    fn add_hashes(&mut self, hashes: Vec<tl::enums::FileHash>) -> usize {
        let before = self.hashes.len();
        for hash in file_hashes(hashes) {
            if !self.hashes.iter().any(|h| h.offset == hash.offset) {
                self.hashes.push(hash);
            }
        }
        self.hashes.len() - before
    }

    fn block_size(&self) -> i32 {
        self.hashes.first().map(|h| h.limit).unwrap_or(CDN_HASH_BLOCK)
    }
}

/// Lazy iterator over the chunks of a file.
///
/// Created by [`Client::iter_download`]. Every call to [`DownloadIter::next`] makes at
/// most a few requests, so dropping the iterator at any point cancels the download.
pub struct DownloadIter {
    client: Client,
    location: Option<tl::enums::InputFileLocation>,
    data: Option<Vec<u8>>,
    dc_id: Option<i32>,
    offset: i64,
    chunk_size: i32,
    limit: Option<u64>,
    total: Option<u64>,
    downloaded: u64,
    yielded: bool,
    done: bool,
    cdn: Option<CdnRedirect>,
    progress: Option<Progress>,
}

impl DownloadIter {
    fn new(client: &Client, downloadable: &impl Downloadable) -> Self {
        let location = downloadable.to_raw_input_location();
        let data = downloadable.to_data();
        Self {
            client: client.clone(),
            done: location.is_none() && data.is_none(),
            location,
            data,
            dc_id: downloadable.dc_id(),
            offset: 0,
            chunk_size: MAX_CHUNK_SIZE,
            limit: None,
            total: downloadable.size(),
            downloaded: 0,
            yielded: false,
            cdn: None,
            progress: None,
        }
    }

    /// Changes the chunk size, in bytes, used to make requests. Useful if you only need to get a
    /// small part of a file. By default, [`MAX_CHUNK_SIZE`] is used.
    ///
    /// # Panics
    ///
    /// Panics if `size` is not divisible by [`MIN_CHUNK_SIZE`], or if `size` is not in contained in
    /// the range `MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE`.
    pub fn chunk_size(mut self, size: i32) -> Self {
        assert!((MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&size) && size % MIN_CHUNK_SIZE == 0);
        self.chunk_size = size;
        self
    }

    /// Skips `n` chunks to start downloading a different offset from the file. If you want to
    /// skip less data, modify the `chunk_size` before calling this method, and then reset it to
    /// any value you want.
    pub fn skip_chunks(mut self, n: i32) -> Self {
        self.offset += self.chunk_size as i64 * n as i64;
        self
    }

    /// Stop once `bytes` have been downloaded, even if the file is larger.
    pub fn limit(mut self, bytes: u64) -> Self {
        self.limit = Some(bytes);
        self
    }

    /// Call `callback` after every chunk. Returning [`Transmission`] from it aborts the download.
    pub fn progress(
        mut self,
        callback: impl FnMut(u64, Option<u64>) -> Result<(), Transmission> + Send + 'static,
    ) -> Self {
        self.progress = Some(Progress::new(callback));
        self
    }

    /// Like [`Self::progress`], waiting for the future `callback` returns before fetching the
    /// next chunk.
    pub fn progress_async<F, Fut>(mut self, callback: F) -> Self
    where
        F: FnMut(u64, Option<u64>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), Transmission>> + Send + 'static,
    {
        self.progress = Some(Progress::new_async(callback));
        self
    }

    /// The size of the file, if it is known beforehand.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Fetch and return the next chunk.
    ///
    /// A file without contents still produces one (empty) chunk.
    pub async fn next(&mut self) -> Result<Option<Vec<u8>>, DownloadError> {
        if self.done {
            return Ok(None);
        }
        if let Some(data) = self.data.take() {
            self.done = true;
            return self.yield_chunk(data).await.map(Some);
        }

        let mut chunk = loop {
            if self.cdn.is_some() {
                break self.fetch_cdn_chunk().await?;
            }
            if let Some(chunk) = self.fetch_chunk().await? {
                break chunk;
            }
        };

        if chunk.len() < self.chunk_size as usize {
            self.done = true;
        }
        if let Some(limit) = self.limit {
            let remaining = limit.saturating_sub(self.downloaded);
            if chunk.len() as u64 >= remaining {
                chunk.truncate(remaining as usize);
                self.done = true;
            }
        }
        if chunk.is_empty() && self.yielded {
            return Ok(None);
        }

        self.offset += self.chunk_size as i64;
        self.yield_chunk(chunk).await.map(Some)
    }

    async fn yield_chunk(&mut self, chunk: Vec<u8>) -> Result<Vec<u8>, DownloadError> {
        self.yielded = true;
        self.downloaded += chunk.len() as u64;
        if let Some(progress) = self.progress.as_mut() {
            if let Err(abort) = progress.report(self.downloaded, self.total).await {
                info!("download aborted after {} bytes", self.downloaded);
                self.done = true;
                return Err(abort.into());
            }
        }
        Ok(chunk)
    }

    /// Requests a chunk from the datacenter owning the file.
    ///
    /// Returns `None` when the server redirected the download to a CDN.
    async fn fetch_chunk(&mut self) -> Result<Option<Vec<u8>>, DownloadError> {
        let Some(location) = self.location.clone() else {
            return Ok(Some(Vec::new()));
        };
        let request = tl::functions::upload::GetFile {
            precise: false,
            cdn_supported: true,
            location,
            offset: self.offset,
            limit: self.chunk_size,
        };

        let file = loop {
            match self.invoke_origin(&request).await {
                Ok(file) => break file,
                Err(e) if e.is("FILE_MIGRATE") => {
                    let dc_id = e
                        .rpc()
                        .and_then(|rpc| rpc.value)
                        .map(|dc| dc as i32)
                        .ok_or(DownloadError::Invocation(e))?;
                    debug!("file lives in dc {}, retrying there", dc_id);
                    self.dc_id = Some(dc_id);
                }
                Err(e) => return Err(e.into()),
            }
        };

        match file {
            tl::enums::upload::File::File(file) => Ok(Some(file.bytes)),
            tl::enums::upload::File::CdnRedirect(redirect) => {
                info!("download redirected to cdn dc {}", redirect.dc_id);
                self.cdn = Some(CdnRedirect::new(redirect)?);
                Ok(None)
            }
        }
    }

    async fn fetch_cdn_chunk(&mut self) -> Result<Vec<u8>, DownloadError> {
        let mut reuploads = 0;
        loop {
            let Some(cdn) = self.cdn.as_ref() else {
                return Err(DownloadError::InvalidCdnRedirect);
            };
            let request = tl::functions::upload::GetCdnFile {
                file_token: cdn.file_token.clone(),
                offset: self.offset,
                limit: self.chunk_size,
            };
            let dc_id = cdn.dc_id;

            match self.client.invoke_in_media_dc(dc_id, &request).await? {
                tl::enums::upload::CdnFile::CdnFile(file) => {
                    let mut bytes = file.bytes;
                    if let Some(cdn) = self.cdn.as_ref() {
                        cdn::decrypt_part(&mut bytes, &cdn.key, &cdn.iv, self.offset);
                    }
                    self.verify_cdn_chunk(&bytes).await?;
                    return Ok(bytes);
                }
                tl::enums::upload::CdnFile::ReuploadNeeded(needed) => {
                    reuploads += 1;
                    if reuploads > MAX_CDN_REUPLOADS {
                        return Err(DownloadError::VolumeLocNotFound);
                    }
                    debug!("cdn dc {} needs the file re-uploaded", dc_id);
                    let file_token = request.file_token;
                    let hashes = self
                        .invoke_origin(&tl::functions::upload::ReuploadCdnFile {
                            file_token,
                            request_token: needed.request_token,
                        })
                        .await?;
                    if let Some(cdn) = self.cdn.as_mut() {
                        cdn.add_hashes(hashes);
                    }
                }
            }
        }
    }

    /// Make sure every block in the chunk has a known hash, and that the chunk matches them.
    async fn verify_cdn_chunk(&mut self, bytes: &[u8]) -> Result<(), DownloadError> {
        loop {
            let Some(cdn) = self.cdn.as_ref() else {
                return Err(DownloadError::InvalidCdnRedirect);
            };
            let missing = cdn::missing_hash_offsets(
                self.offset,
                bytes.len(),
                cdn.block_size(),
                &cdn.hashes,
            );
            let Some(&offset) = missing.first() else {
                return cdn::verify_part(bytes, self.offset, &cdn.hashes)
                    .map_err(DownloadError::CdnFileHashMismatch);
            };

            let hashes = self
                .invoke_origin(&tl::functions::upload::GetCdnFileHashes {
                    file_token: cdn.file_token.clone(),
                    offset,
                })
                .await?;
            let added = self.cdn.as_mut().map(|cdn| cdn.add_hashes(hashes)).unwrap_or(0);
            if added == 0 {
                warn!("no hash available for cdn block at offset {}", offset);
                return Err(DownloadError::CdnFileHashMismatch(cdn::HashMismatch { offset }));
            }
        }
    }

    /// Invoke a request in the datacenter where the file is stored.
    async fn invoke_origin<R: RemoteCall>(&self, request: &R) -> Result<R::Return, InvocationError> {
        match self.dc_id {
            Some(dc_id) if dc_id != self.client.0.session.home_dc_id() => {
                self.client.copy_auth_to_dc(dc_id).await?;
                self.client.invoke_in_media_dc(dc_id, request).await
            }
            _ => self.client.invoke(request).await,
        }
    }
}

/// Removes the file on drop unless told to keep it.
#[cfg(feature = "fs")]
struct PartialFile {
    path: PathBuf,
    keep: bool,
}

#[cfg(feature = "fs")]
impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.keep {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("failed to remove {}: {}", self.path.display(), e);
                }
            }
        }
    }
}

/// Picks the largest power-of-two part size (up to [`MAX_UPLOAD_PART_SIZE`]) the file needs.
fn upload_part_size(size: usize) -> usize {
    size.next_power_of_two()
        .clamp(MIN_UPLOAD_PART_SIZE, MAX_UPLOAD_PART_SIZE)
}

/// The state of an upload in progress.
struct PartUpload {
    file_id: i64,
    total_parts: i32,
    big_file: bool,
    part_size: usize,
    /// Stream position of the first byte of the file.
    start: u64,
    /// Every part sent so far, for small files only.
    sent_parts: Vec<Vec<u8>>,
}

impl PartUpload {
    /// The contents of an earlier part. Big files are not kept in memory, so their parts
    /// are read again from the stream, which is then left where it was.
    async fn reread<S: AsyncRead + AsyncSeek + Unpin>(
        &self,
        stream: &mut S,
        index: i32,
    ) -> io::Result<Vec<u8>> {
        if let Some(bytes) = self.sent_parts.get(index as usize) {
            return Ok(bytes.clone());
        }
        let resume = stream.stream_position().await?;
        let offset = self.start + index as u64 * self.part_size as u64;
        stream.seek(SeekFrom::Start(offset)).await?;
        let mut bytes = vec![0; self.part_size];
        let read = read_part(stream, &mut bytes).await?;
        bytes.truncate(read);
        stream.seek(SeekFrom::Start(resume)).await?;
        Ok(bytes)
    }
}

/// Reads until `buf` is full or the stream ends, returning how many bytes were read.
async fn read_part<S: AsyncRead + Unpin>(stream: &mut S, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]).await? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Method implementations related to uploading or downloading files.
impl Client {
    /// Returns a new iterator over the contents of a media document that will be downloaded.
    ///
    /// # Examples
    ///
    /// ```
    /// # async fn f(downloadable: ferrogram_client::media::Media, client: ferrogram_client::Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let mut file_bytes = Vec::new();
    /// let mut download = client.iter_download(&downloadable);
    ///
    /// while let Some(chunk) = download.next().await? {
    ///     file_bytes.extend(chunk);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn iter_download<D: Downloadable>(&self, downloadable: &D) -> DownloadIter {
        DownloadIter::new(self, downloadable)
    }

    /// Downloads the entire file into memory.
    pub async fn download_media<D: Downloadable>(
        &self,
        downloadable: &D,
    ) -> Result<Vec<u8>, DownloadError> {
        let mut download = self.iter_download(downloadable);
        let mut bytes = Vec::new();
        while let Some(chunk) = download.next().await? {
            bytes.extend(chunk);
        }
        Ok(bytes)
    }

    /// Downloads the media in the message, fetching the message again if its file reference
    /// expired.
    ///
    /// Returns `None` if the message has no media that can be downloaded.
    pub async fn download_message_media(
        &self,
        message: &Message,
    ) -> Result<Option<Vec<u8>>, DownloadError> {
        let Some(media) = message.media() else {
            return Ok(None);
        };
        match self.download_media(&media).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(DownloadError::FileReferenceExpired) => {
                let Some(chat) = message.chat() else {
                    return Err(DownloadError::FileReferenceExpired);
                };
                let fresh = self.refetch_message(chat, message.id()).await?;
                match fresh.and_then(|m| m.media()) {
                    Some(media) => self.download_media(&media).await.map(Some),
                    None => Ok(None),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Like [`Self::download_message_media`], for a message known only by its chat and identifier.
    ///
    /// Messages this client has seen recently are not fetched again.
    pub async fn download_media_by_id(
        &self,
        chat: PeerId,
        message_id: i32,
    ) -> Result<Option<Vec<u8>>, DownloadError> {
        let message = match self.cached_message(chat, message_id) {
            Some(message) => Some(message),
            None => self.refetch_message(chat, message_id).await?,
        };
        match message {
            Some(message) => self.download_message_media(&message).await,
            None => Ok(None),
        }
    }

    async fn refetch_message(
        &self,
        chat: PeerId,
        message_id: i32,
    ) -> Result<Option<Message>, DownloadError> {
        let Some(info) = self.0.session.peer(chat) else {
            return Err(DownloadError::FileReferenceExpired);
        };
        debug!("fetching message {} in {} again to refresh its media", message_id, chat);
        let mut messages = self.get_messages_by_id(&info, &[message_id]).await?;
        Ok(messages.pop().flatten())
    }

    /// Drains the download into the file at the given path.
    ///
    /// The contents are written to a `.part` file first, which is renamed once complete,
    /// and deleted if the download fails or is cancelled. Returns the amount of bytes written,
    /// or `None` if the progress callback aborted the download.
    #[cfg(feature = "fs")]
    pub async fn download_to_path<P: AsRef<Path>>(
        &self,
        mut download: DownloadIter,
        path: P,
    ) -> Result<Option<u64>, DownloadError> {
        use tokio::io::AsyncWriteExt;

        let path = path.as_ref();
        let mut part_name = path.as_os_str().to_owned();
        part_name.push(".part");
        let mut partial = PartialFile {
            path: PathBuf::from(part_name),
            keep: false,
        };

        let mut file = tokio::fs::File::create(&partial.path).await?;
        let mut written = 0;
        loop {
            match download.next().await {
                Ok(Some(chunk)) => {
                    file.write_all(&chunk).await?;
                    written += chunk.len() as u64;
                }
                Ok(None) => break,
                Err(DownloadError::Transmission) => return Ok(None),
                Err(e) => return Err(e),
            }
        }
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&partial.path, path).await?;
        partial.keep = true;
        Ok(Some(written))
    }

    /// Uploads an async stream to Telegram servers.
    ///
    /// The file is not sent to any chat, but can be used as media when sending messages for a
    /// certain period of time (less than a day). You can use this uploaded file multiple times.
    ///
    /// Refer to [`InputMessage`] to learn more uses for `uploaded_file`.
    ///
    /// The stream size must be known beforehand. If this is not possible, you might need to
    /// process the entire async stream to determine its size, and then use the size and the
    /// downloaded buffer.
    ///
    /// [`InputMessage`]: https://core.telegram.org/api/files#uploading-files
    ///
    /// The stream is read once from its current position. Only the parts Telegram reports lost
    /// are read again, by seeking back to them.
    pub async fn upload_stream<S: AsyncRead + AsyncSeek + Unpin>(
        &self,
        stream: &mut S,
        size: usize,
        name: String,
    ) -> Result<tl::enums::InputFile, UploadError> {
        match self
            .upload_stream_with_progress(stream, size, name, Progress::none())
            .await?
        {
            Some(file) => Ok(file),
            None => Err(UploadError::Transmission),
        }
    }

    /// Like [`Self::upload_stream`], calling `progress` after every part.
    ///
    /// Returns `None` if `progress` aborted the upload.
    pub async fn upload_stream_with_progress<S: AsyncRead + AsyncSeek + Unpin>(
        &self,
        stream: &mut S,
        size: usize,
        name: String,
        mut progress: Progress,
    ) -> Result<Option<tl::enums::InputFile>, UploadError> {
        let file_id = generate_random_id();
        let part_size = upload_part_size(size);
        let total_parts = size.div_ceil(part_size).max(1);
        if total_parts > MAX_UPLOAD_PARTS {
            return Err(UploadError::TooLarge { size });
        }
        let mut upload = PartUpload {
            file_id,
            total_parts: total_parts as i32,
            big_file: size > BIG_FILE_SIZE,
            part_size,
            start: stream.stream_position().await?,
            sent_parts: Vec::new(),
        };
        debug!(
            "uploading {} bytes in {} parts of {} bytes",
            size, total_parts, part_size
        );

        let mut buffer = vec![0; part_size];
        let mut uploaded = 0u64;

        for part in 0..total_parts {
            let read = read_part(stream, &mut buffer).await?;
            let bytes = buffer[..read].to_vec();
            uploaded += bytes.len() as u64;

            self.save_part(&mut upload, stream, part as i32, bytes).await?;

            if progress.report(uploaded, Some(size as u64)).await.is_err() {
                info!("upload aborted after {} bytes", uploaded);
                return Ok(None);
            }
        }

        Ok(Some(if upload.big_file {
            tl::types::InputFileBig {
                id: file_id,
                parts: total_parts as i32,
                name,
            }
            .into()
        } else {
            tl::types::InputFile {
                id: file_id,
                parts: total_parts as i32,
                name,
                md5_checksum: format!("{:x}", md5::compute(upload.sent_parts.concat())),
            }
            .into()
        }))
    }

    /// Sends one part, along with any earlier part Telegram says it lost.
    async fn save_part<S: AsyncRead + AsyncSeek + Unpin>(
        &self,
        upload: &mut PartUpload,
        stream: &mut S,
        part: i32,
        bytes: Vec<u8>,
    ) -> Result<(), UploadError> {
        let mut attempts = 0;
        let mut index = part;
        loop {
            attempts += 1;
            let data = if index == part {
                bytes.clone()
            } else {
                upload.reread(stream, index).await?
            };
            let result = if upload.big_file {
                self.invoke(&tl::functions::upload::SaveBigFilePart {
                    file_id: upload.file_id,
                    file_part: index,
                    file_total_parts: upload.total_parts,
                    bytes: data,
                })
                .await
            } else {
                self.invoke(&tl::functions::upload::SaveFilePart {
                    file_id: upload.file_id,
                    file_part: index,
                    bytes: data,
                })
                .await
            };

            match result {
                Ok(true) if index == part => break,
                Ok(true) => {
                    // The lost part is back, carry on with the one that was being sent.
                    index = part;
                }
                Ok(false) => warn!("part {} of file {} was not saved", index, upload.file_id),
                Err(e) if e.is("FILE_PART_MISSING") => {
                    let missing = e.rpc().and_then(|rpc| rpc.value).unwrap_or(part as u32) as i32;
                    warn!("file {} is missing part {}, sending it again", upload.file_id, missing);
                    if missing > part {
                        return Err(UploadError::PartRejected { part: missing });
                    }
                    index = missing;
                }
                Err(e) => return Err(e.into()),
            }

            if attempts >= MAX_PART_ATTEMPTS * 2 {
                return Err(UploadError::PartRejected { part: index });
            }
        }

        // Small files are kept around to compute their checksum.
        if !upload.big_file {
            upload.sent_parts.push(bytes);
        }
        Ok(())
    }

    /// Uploads a local file to Telegram servers.
    ///
    /// The file is not sent to any chat, but can be used as media when sending messages for a
    /// certain period of time (less than a day). You can use this uploaded file multiple times.
    ///
    /// If you need more control over the uploaded data, such as performing only a partial upload
    /// or with a different name, use [`Client::upload_stream`] instead.
    #[cfg(feature = "fs")]
    pub async fn upload_file<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<tl::enums::InputFile, UploadError> {
        let path = path.as_ref();
        let mut file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len() as usize;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.upload_stream(&mut file, size, name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_upload_part_size() {
        assert_eq!(upload_part_size(0), MIN_UPLOAD_PART_SIZE);
        assert_eq!(upload_part_size(3000), 4096);
        assert_eq!(upload_part_size(300 * 1024), 512 * 1024);
        assert_eq!(upload_part_size(100 * 1024 * 1024), MAX_UPLOAD_PART_SIZE);
        // Every size must evenly divide the largest part.
        for size in [0, 1, 1500, 70_000, 600_000] {
            assert_eq!(MAX_UPLOAD_PART_SIZE % upload_part_size(size), 0);
        }
    }

    #[test]
    fn check_upload_limits() {
        let largest = MAX_UPLOAD_PART_SIZE * MAX_UPLOAD_PARTS;
        assert_eq!(largest.div_ceil(upload_part_size(largest)), MAX_UPLOAD_PARTS);
        assert!((largest + 1).div_ceil(upload_part_size(largest + 1)) > MAX_UPLOAD_PARTS);
    }

    #[test]
    fn check_invocation_errors_are_classified() {
        let rpc = |name: &str| {
            InvocationError::Rpc(ferrogram_mtsender::RpcError {
                code: 400,
                name: name.to_string(),
                value: None,
                caused_by: None,
            })
        };
        assert!(matches!(
            DownloadError::from(rpc("FILE_REFERENCE_EXPIRED")),
            DownloadError::FileReferenceExpired
        ));
        assert!(matches!(
            DownloadError::from(rpc("VOLUME_LOC_NOT_FOUND")),
            DownloadError::VolumeLocNotFound
        ));
        assert!(matches!(
            DownloadError::from(rpc("LIMIT_INVALID")),
            DownloadError::Invocation(_)
        ));
    }

    #[test]
    fn check_cdn_redirect_requires_key_and_iv() {
        let redirect = |key_len, iv_len| tl::types::upload::FileCdnRedirect {
            dc_id: 203,
            file_token: vec![1],
            encryption_key: vec![0; key_len],
            encryption_iv: vec![0; iv_len],
            file_hashes: vec![
                tl::types::FileHash {
                    offset: 0,
                    limit: 131072,
                    hash: vec![0; 32],
                }
                .into(),
            ],
        };
        assert!(matches!(
            CdnRedirect::new(redirect(16, 16)),
            Err(DownloadError::InvalidCdnRedirect)
        ));
        let cdn = CdnRedirect::new(redirect(32, 16)).ok().unwrap();
        assert_eq!(cdn.dc_id, 203);
        assert_eq!(cdn.block_size(), 131072);
        assert_eq!(cdn.hashes.len(), 1);
    }
}
