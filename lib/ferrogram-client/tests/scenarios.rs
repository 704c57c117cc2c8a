// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! End-to-end behaviour of the client over a scripted network.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ferrogram_client::client::{
    AutoSleep, BIG_FILE_SIZE, ClientConfiguration, MAX_UPLOAD_PART_SIZE, Network, Progress,
    Transmission, UpdatesConfiguration,
};
use ferrogram_client::dispatch::{
    Context, DispatcherConfiguration, EventKind, HandlerError, Propagation, filters,
};
use ferrogram_client::media::Downloadable;
use ferrogram_client::peer::PeerMap;
use ferrogram_client::sender::{InvocationError, RpcError, UpdatesLike};
use ferrogram_client::session::storages::MemorySession;
use ferrogram_client::session::types::{DcOption, LoggedInUser, PeerId, PeerInfo, UpdateState};
use ferrogram_client::session::Session;
use ferrogram_client::tl::{self, Deserializable, Identifiable, Serializable};
use ferrogram_client::{Client, Dispatcher, Update};
use futures_util::future::BoxFuture;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use tokio::sync::mpsc;

const API_ID: i32 = 1;
const SELF_ID: i64 = 1000;

type Reply = Result<Vec<u8>, InvocationError>;
type Script = Box<dyn FnMut(i32, bool, &[u8]) -> Reply + Send>;

/// A network answering every request with whatever the script decides.
struct MockNetwork {
    script: Mutex<Script>,
    calls: Mutex<Vec<(i32, bool, u32)>>,
}

impl MockNetwork {
    fn new(script: impl FnMut(i32, bool, &[u8]) -> Reply + Send + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(Box::new(script)),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(i32, bool, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Network for MockNetwork {
    fn invoke_in_dc(&self, dc_id: i32, media: bool, body: Vec<u8>) -> BoxFuture<'_, Reply> {
        let id = u32::from_le_bytes(body[..4].try_into().unwrap());
        self.calls.lock().unwrap().push((dc_id, media, id));
        let mut script = self.script.lock().unwrap();
        let reply = (&mut **script)(dc_id, media, &body);
        drop(script);
        Box::pin(async move { reply })
    }

    fn disconnect_from_dc(&self, _dc_id: i32) {}

    fn quit(&self) {}
}

fn init_logging() {
    let _ = SimpleLogger::new().with_level(LevelFilter::Debug).init();
}

fn ok(value: impl Serializable) -> Reply {
    Ok(value.to_bytes())
}

fn rpc_error(code: i32, message: &str) -> Reply {
    Err(InvocationError::Rpc(RpcError::from(tl::types::RpcError {
        error_code: code,
        error_message: message.to_string(),
    })))
}

fn id_of(body: &[u8]) -> u32 {
    u32::from_le_bytes(body[..4].try_into().unwrap())
}

fn logged_in_session() -> Arc<MemorySession> {
    let session = Arc::new(MemorySession::default());
    session.set_logged_in_user(Some(LoggedInUser {
        id: SELF_ID,
        bot: false,
    }));
    session
}

fn client_with(
    session: Arc<MemorySession>,
    network: Arc<MockNetwork>,
    configuration: ClientConfiguration,
) -> Client {
    Client::with_network(session, API_ID, network, configuration)
}

fn user(id: i64, min: bool) -> tl::enums::User {
    tl::types::User {
        is_self: false,
        contact: false,
        deleted: false,
        bot: false,
        min,
        id,
        access_hash: Some(id * 7),
        first_name: Some(format!("user {id}")),
        last_name: None,
        username: None,
        phone: None,
        status: None,
    }
    .into()
}

fn channel(id: i64) -> tl::enums::Chat {
    tl::types::Channel {
        creator: false,
        left: false,
        broadcast: false,
        megagroup: true,
        min: false,
        gigagroup: false,
        id,
        access_hash: Some(id * 3),
        title: "group".to_string(),
        username: None,
        date: 1_700_000_000,
        participants_count: None,
    }
    .into()
}

fn channel_message(id: i32, channel_id: i64, sender: i64) -> tl::enums::Message {
    tl::types::Message {
        out: false,
        mentioned: false,
        silent: false,
        post: false,
        id,
        from_id: Some(tl::types::PeerUser { user_id: sender }.into()),
        peer_id: tl::types::PeerChannel { channel_id }.into(),
        reply_to_msg_id: None,
        date: 1_700_000_000,
        message: "hello".to_string(),
        media: None,
        entities: None,
        views: None,
        edit_date: None,
        post_author: None,
        grouped_id: None,
    }
    .into()
}

#[tokio::test]
async fn short_sent_message_exposes_id_date_and_direction() {
    let session = logged_in_session();
    let network = MockNetwork::new(|_, _, body| {
        let request = tl::functions::messages::SendMessage::from_bytes(body).unwrap();
        assert_eq!(request.message, "hi");
        ok(tl::enums::Updates::UpdateShortSentMessage(
            tl::types::UpdateShortSentMessage {
                out: true,
                id: 55,
                pts: 10,
                pts_count: 1,
                date: 1_700_000_123,
                media: None,
                entities: None,
                ttl_period: None,
            },
        ))
    });
    let client = client_with(session, network, ClientConfiguration::default());

    let chat = PeerInfo::from(&user(2000, false));
    let message = client.send_message(&chat, "hi").await.unwrap();

    assert_eq!(message.id(), 55);
    assert!(message.outgoing());
    assert_eq!(message.date().timestamp(), 1_700_000_123);
    assert_eq!(message.text(), "hi");
    assert_eq!(message.chat(), Some(PeerId::user(2000)));
    assert_eq!(message.sender(), Some(PeerId::user(SELF_ID)));
}

#[tokio::test(start_paused = true)]
async fn flood_wait_below_threshold_sleeps_and_repeats_once() {
    let mut attempts = 0;
    let network = MockNetwork::new(move |_, _, _| {
        attempts += 1;
        if attempts == 1 {
            rpc_error(420, "FLOOD_WAIT_3")
        } else {
            ok(tl::enums::updates::State::State(tl::types::updates::State {
                pts: 1,
                qts: 0,
                date: 0,
                seq: 0,
                unread_count: 0,
            }))
        }
    });
    let client = client_with(
        logged_in_session(),
        Arc::clone(&network),
        ClientConfiguration {
            retry_policy: Box::new(AutoSleep {
                threshold: Duration::from_secs(10),
                ..Default::default()
            }),
            ..Default::default()
        },
    );

    let start = tokio::time::Instant::now();
    client
        .invoke(&tl::functions::updates::GetState {})
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_secs(3));
    assert!(elapsed < Duration::from_secs(4));
    assert_eq!(network.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn flood_wait_above_threshold_is_returned() {
    let network = MockNetwork::new(|_, _, _| rpc_error(420, "FLOOD_WAIT_30"));
    let client = client_with(
        logged_in_session(),
        Arc::clone(&network),
        ClientConfiguration {
            retry_policy: Box::new(AutoSleep {
                threshold: Duration::from_secs(10),
                ..Default::default()
            }),
            ..Default::default()
        },
    );

    let error = client
        .invoke(&tl::functions::updates::GetState {})
        .await
        .unwrap_err();
    assert!(error.is("FLOOD_WAIT"));
    assert_eq!(network.calls().len(), 1);
}

#[tokio::test]
async fn phone_migrate_moves_home_and_repeats() {
    let session = Arc::new(MemorySession::default());
    let network = MockNetwork::new(|dc_id, _, body| {
        assert_eq!(id_of(body), tl::functions::auth::SendCode::CONSTRUCTOR_ID);
        if dc_id == 5 {
            ok(tl::enums::auth::SentCode::SentCode(tl::types::auth::SentCode {
                r#type: tl::types::auth::SentCodeTypeApp { length: 5 }.into(),
                phone_code_hash: "hash".to_string(),
                next_type: None,
                timeout: None,
            }))
        } else {
            rpc_error(303, "PHONE_MIGRATE_5")
        }
    });
    let client = client_with(
        Arc::clone(&session),
        Arc::clone(&network),
        ClientConfiguration::default(),
    );

    let home = session.home_dc_id();
    assert_ne!(home, 5);
    let token = client.request_login_code("+1234", "api hash").await.unwrap();

    assert_eq!(token.phone(), "+1234");
    assert_eq!(session.home_dc_id(), 5);
    let dcs = network
        .calls()
        .into_iter()
        .map(|(dc_id, _, _)| dc_id)
        .collect::<Vec<_>>();
    assert_eq!(dcs, vec![home, 5]);
}

struct RemoteFile;

impl Downloadable for RemoteFile {
    fn to_raw_input_location(&self) -> Option<tl::enums::InputFileLocation> {
        Some(
            tl::types::InputDocumentFileLocation {
                id: 1,
                access_hash: 2,
                file_reference: vec![3],
                thumb_size: String::new(),
            }
            .into(),
        )
    }
}

const CDN_DC: i32 = 203;
const CDN_KEY: [u8; 32] = [7; 32];
const CDN_IV: [u8; 16] = [9; 16];

fn cdn_network(plain: Vec<u8>, served: Vec<u8>) -> Arc<MockNetwork> {
    let mut encrypted = served;
    ferrogram_crypto::cdn::decrypt_part(&mut encrypted, &CDN_KEY, &CDN_IV, 0);
    let hash = ferrogram_crypto::sha256!(&plain).to_vec();
    let mut reuploaded = false;

    MockNetwork::new(move |dc_id, media, body| match id_of(body) {
        tl::functions::upload::GetFile::CONSTRUCTOR_ID => {
            ok(tl::enums::upload::File::CdnRedirect(
                tl::types::upload::FileCdnRedirect {
                    dc_id: CDN_DC,
                    file_token: b"token".to_vec(),
                    encryption_key: CDN_KEY.to_vec(),
                    encryption_iv: CDN_IV.to_vec(),
                    file_hashes: Vec::new(),
                },
            ))
        }
        tl::functions::upload::GetCdnFile::CONSTRUCTOR_ID => {
            assert_eq!((dc_id, media), (CDN_DC, true));
            if reuploaded {
                ok(tl::enums::upload::CdnFile::CdnFile(tl::types::upload::CdnFile {
                    bytes: encrypted.clone(),
                }))
            } else {
                ok(tl::enums::upload::CdnFile::ReuploadNeeded(
                    tl::types::upload::CdnFileReuploadNeeded {
                        request_token: b"request".to_vec(),
                    },
                ))
            }
        }
        tl::functions::upload::ReuploadCdnFile::CONSTRUCTOR_ID => {
            assert_ne!(dc_id, CDN_DC);
            let request = tl::functions::upload::ReuploadCdnFile::from_bytes(body).unwrap();
            assert_eq!(request.request_token, b"request");
            reuploaded = true;
            ok(vec![tl::enums::FileHash::FileHash(tl::types::FileHash {
                offset: 0,
                limit: 128 * 1024,
                hash: hash.clone(),
            })])
        }
        id => panic!("unexpected request {id:08x}"),
    })
}

#[tokio::test]
async fn cdn_download_reuploads_decrypts_and_verifies() {
    init_logging();
    let plain = (0..300u32).map(|i| i as u8).collect::<Vec<_>>();
    let network = cdn_network(plain.clone(), plain.clone());
    let client = client_with(
        logged_in_session(),
        Arc::clone(&network),
        ClientConfiguration::default(),
    );

    let bytes = client.download_media(&RemoteFile).await.unwrap();
    assert_eq!(bytes, plain);

    let requests = network
        .calls()
        .into_iter()
        .map(|(_, _, id)| id)
        .collect::<Vec<_>>();
    assert_eq!(
        requests,
        vec![
            tl::functions::upload::GetFile::CONSTRUCTOR_ID,
            tl::functions::upload::GetCdnFile::CONSTRUCTOR_ID,
            tl::functions::upload::ReuploadCdnFile::CONSTRUCTOR_ID,
            tl::functions::upload::GetCdnFile::CONSTRUCTOR_ID,
        ]
    );
}

#[tokio::test]
async fn cdn_download_rejects_tampered_parts() {
    let plain = vec![1u8; 64];
    let mut tampered = plain.clone();
    tampered[10] ^= 0xff;
    let network = cdn_network(plain, tampered);
    let client = client_with(logged_in_session(), network, ClientConfiguration::default());

    let error = client.download_media(&RemoteFile).await.unwrap_err();
    assert!(matches!(
        error,
        ferrogram_client::client::DownloadError::CdnFileHashMismatch(_)
    ));
}

#[tokio::test]
async fn empty_file_yields_one_empty_chunk() {
    let network = MockNetwork::new(|_, _, _| {
        ok(tl::enums::upload::File::File(tl::types::upload::File {
            r#type: tl::types::storage::FileUnknown {}.into(),
            mtime: 0,
            bytes: Vec::new(),
        }))
    });
    let client = client_with(logged_in_session(), network, ClientConfiguration::default());

    let mut download = client.iter_download(&RemoteFile);
    assert_eq!(download.next().await.unwrap(), Some(Vec::new()));
    assert_eq!(download.next().await.unwrap(), None);
}

#[tokio::test]
async fn progress_callback_aborts_download() {
    let network = MockNetwork::new(|_, _, _| {
        ok(tl::enums::upload::File::File(tl::types::upload::File {
            r#type: tl::types::storage::FileUnknown {}.into(),
            mtime: 0,
            bytes: vec![0; 4096],
        }))
    });
    let client = client_with(logged_in_session(), network, ClientConfiguration::default());

    let mut download = client
        .iter_download(&RemoteFile)
        .chunk_size(4096)
        .progress(|so_far, _| {
            if so_far > 4096 {
                Err(ferrogram_client::client::Transmission)
            } else {
                Ok(())
            }
        });
    assert!(download.next().await.unwrap().is_some());
    assert!(matches!(
        download.next().await,
        Err(ferrogram_client::client::DownloadError::Transmission)
    ));
    assert_eq!(download.next().await.unwrap(), None);
}

#[tokio::test]
async fn async_progress_is_awaited_between_chunks() {
    let network = MockNetwork::new(|_, _, _| {
        ok(tl::enums::upload::File::File(tl::types::upload::File {
            r#type: tl::types::storage::FileUnknown {}.into(),
            mtime: 0,
            bytes: vec![0; 4096],
        }))
    });
    let client = client_with(logged_in_session(), network, ClientConfiguration::default());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut download = client
        .iter_download(&RemoteFile)
        .chunk_size(4096)
        .progress_async(move |so_far, _| {
            let tx = tx.clone();
            async move {
                tokio::task::yield_now().await;
                tx.send(so_far).unwrap();
                Ok(())
            }
        });
    assert!(download.next().await.unwrap().is_some());
    assert_eq!(rx.try_recv().unwrap(), 4096);
    assert!(download.next().await.unwrap().is_some());
    assert_eq!(rx.try_recv().unwrap(), 8192);
}

#[tokio::test]
async fn small_upload_resends_missing_part_and_computes_checksum() {
    let data = vec![42u8; 3000];
    let mut missing_reported = false;
    let network = MockNetwork::new(move |_, _, body| {
        let request = tl::functions::upload::SaveFilePart::from_bytes(body).unwrap();
        assert_eq!(request.file_part, 0);
        if !missing_reported {
            missing_reported = true;
            return rpc_error(400, "FILE_PART_0_MISSING");
        }
        ok(true)
    });
    let client = client_with(
        logged_in_session(),
        Arc::clone(&network),
        ClientConfiguration::default(),
    );

    let file = client
        .upload_stream(&mut Cursor::new(data.clone()), data.len(), "a.bin".to_string())
        .await
        .unwrap();

    let tl::enums::InputFile::InputFile(file) = file else {
        panic!("small files are not uploaded as big files");
    };
    assert_eq!(file.parts, 1);
    assert_eq!(file.name, "a.bin");
    assert_eq!(file.md5_checksum, format!("{:x}", md5::compute(&data)));
    assert_eq!(network.calls().len(), 2);
}

#[tokio::test]
async fn min_channel_peer_is_fetched_through_channel_difference() {
    const CHANNEL: i64 = 77;
    const SENDER: i64 = 500;
    init_logging();

    let session = Arc::new(MemorySession::default());
    session.update_peers(&[PeerInfo::from(&channel(CHANNEL))]);

    let network = MockNetwork::new(|_, _, body| {
        let request = tl::functions::updates::GetChannelDifference::from_bytes(body).unwrap();
        let tl::enums::ChannelMessagesFilter::ChannelMessagesFilter(filter) = &request.filter
        else {
            panic!("expected a range filter");
        };
        assert_eq!(
            filter.ranges,
            vec![tl::enums::MessageRange::MessageRange(tl::types::MessageRange {
                min_id: 100,
                max_id: 100,
            })]
        );
        assert_eq!(request.pts, 41);
        assert_eq!(request.limit, 42);

        ok(tl::enums::updates::ChannelDifference::ChannelDifference(
            tl::types::updates::ChannelDifference {
                r#final: true,
                pts: 42,
                timeout: None,
                new_messages: vec![channel_message(100, CHANNEL, SENDER)],
                other_updates: Vec::new(),
                chats: vec![channel(CHANNEL)],
                users: vec![user(SENDER, false)],
            },
        ))
    });
    let client = client_with(
        Arc::clone(&session),
        Arc::clone(&network),
        ClientConfiguration::default(),
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let mut stream = client.stream_updates(rx, UpdatesConfiguration::default());
    tx.send(UpdatesLike::Updates(
        tl::types::Updates {
            updates: vec![
                tl::types::UpdateNewChannelMessage {
                    message: channel_message(100, CHANNEL, SENDER),
                    pts: 42,
                    pts_count: 1,
                }
                .into(),
            ],
            users: vec![user(SENDER, true)],
            chats: vec![channel(CHANNEL)],
            date: 1_700_000_000,
            seq: 0,
        }
        .into(),
    ))
    .unwrap();

    let update = stream.next().await.unwrap();
    let Update::NewMessage(message) = update else {
        panic!("expected a new message");
    };
    assert_eq!(message.id(), 100);
    // The full sender is known by the time the update is handed out.
    assert!(!session.peer(PeerId::user(SENDER)).unwrap().min);
    assert_eq!(network.calls().len(), 1);
}

fn private_message(id: i32, sender: i64, text: &str) -> tl::enums::Message {
    tl::types::Message {
        out: false,
        mentioned: false,
        silent: false,
        post: false,
        id,
        from_id: Some(tl::types::PeerUser { user_id: sender }.into()),
        peer_id: tl::types::PeerUser { user_id: sender }.into(),
        reply_to_msg_id: None,
        date: 1_700_000_000,
        message: text.to_string(),
        media: None,
        entities: None,
        views: None,
        edit_date: None,
        post_author: None,
        grouped_id: None,
    }
    .into()
}

fn new_message_update() -> Update {
    let raw = tl::types::UpdateNewMessage {
        message: private_message(1, 2000, "ping"),
        pts: 1,
        pts_count: 1,
    };
    Update::from_raw(raw.into(), &PeerMap::default())
}

type Outcome = Result<Propagation, HandlerError>;

/// Runs the update through groups `0: [a, b]` and `1: [c]`, where `a` behaves as told.
async fn run_groups(first: fn() -> Outcome) -> Vec<&'static str> {
    let network = MockNetwork::new(|_, _, _| rpc_error(500, "UNEXPECTED"));
    let client = client_with(logged_in_session(), network, ClientConfiguration::default());
    let ran = Arc::new(Mutex::new(Vec::new()));

    let mut dispatcher = Dispatcher::new(client);
    let handler = |name: &'static str, outcome: fn() -> Outcome| {
        let ran = Arc::clone(&ran);
        move |_: Client, _: Context| {
            ran.lock().unwrap().push(name);
            async move { outcome() }
        }
    };
    dispatcher
        .add_handler(0, EventKind::Message, filters::all(), handler("a", first))
        .add_handler(
            0,
            EventKind::Message,
            filters::text(),
            handler("b", || Ok(Propagation::EndGroup)),
        )
        .add_handler(
            1,
            EventKind::Raw,
            filters::all(),
            handler("c", || Ok(Propagation::Stop)),
        );

    dispatcher.dispatch(&new_message_update()).await;
    let ran = ran.lock().unwrap().clone();
    ran
}

#[tokio::test]
async fn dispatcher_groups_follow_propagation() {
    assert_eq!(run_groups(|| Ok(Propagation::Continue)).await, ["a", "b", "c"]);
    assert_eq!(run_groups(|| Ok(Propagation::EndGroup)).await, ["a", "c"]);
    assert_eq!(run_groups(|| Ok(Propagation::Stop)).await, ["a"]);
    assert_eq!(run_groups(|| Err("boom".into())).await, ["a", "c"]);
}

fn state(pts: i32) -> tl::enums::updates::State {
    tl::types::updates::State {
        pts,
        qts: 0,
        date: 1_700_000_000,
        seq: 0,
        unread_count: 0,
    }
    .into()
}

fn new_message_updates(pts: i32, sender: i64, text: &str) -> UpdatesLike {
    UpdatesLike::Updates(
        tl::types::Updates {
            updates: vec![
                tl::types::UpdateNewMessage {
                    message: private_message(pts, sender, text),
                    pts,
                    pts_count: 1,
                }
                .into(),
            ],
            users: vec![user(sender, false)],
            chats: Vec::new(),
            date: 1_700_000_000,
            seq: 0,
        }
        .into(),
    )
}

/// Starts at pts 10 and answers the difference from there with a single message.
fn difference_network(new_pts: i32) -> Arc<MockNetwork> {
    MockNetwork::new(move |_, _, body| match id_of(body) {
        tl::functions::updates::GetState::CONSTRUCTOR_ID => ok(state(10)),
        tl::functions::updates::GetDifference::CONSTRUCTOR_ID => {
            let request = tl::functions::updates::GetDifference::from_bytes(body).unwrap();
            assert_eq!(request.pts, 10);
            ok(tl::enums::updates::Difference::Difference(
                tl::types::updates::Difference {
                    new_messages: vec![private_message(11, 2000, "missed")],
                    new_encrypted_messages: Vec::new(),
                    other_updates: Vec::new(),
                    chats: Vec::new(),
                    users: vec![user(2000, false)],
                    state: state(new_pts),
                },
            ))
        }
        id => panic!("unexpected request {id:08x}"),
    })
}

fn request_ids(network: &MockNetwork) -> Vec<u32> {
    network.calls().into_iter().map(|(_, _, id)| id).collect()
}

#[tokio::test]
async fn pts_gap_is_filled_with_the_difference() {
    init_logging();
    let session = logged_in_session();
    let network = difference_network(13);
    let client = client_with(
        Arc::clone(&session),
        Arc::clone(&network),
        ClientConfiguration::default(),
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let mut stream = client.stream_updates(rx, UpdatesConfiguration::default());
    // Local pts is 10, so an update at 13 with a count of 1 leaves 11 and 12 missing.
    tx.send(new_message_updates(13, 2000, "late")).unwrap();

    let Update::NewMessage(message) = stream.next().await.unwrap() else {
        panic!("expected a new message");
    };
    assert_eq!(message.text(), "missed");
    assert_eq!(
        request_ids(&network),
        [
            tl::functions::updates::GetState::CONSTRUCTOR_ID,
            tl::functions::updates::GetDifference::CONSTRUCTOR_ID,
        ]
    );
    assert_eq!(session.updates_state().pts, 13);
}

#[tokio::test]
async fn updates_too_long_fetches_the_difference() {
    let session = logged_in_session();
    let network = difference_network(11);
    let client = client_with(
        Arc::clone(&session),
        Arc::clone(&network),
        ClientConfiguration::default(),
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let mut stream = client.stream_updates(rx, UpdatesConfiguration::default());
    tx.send(UpdatesLike::Updates(tl::enums::Updates::TooLong(
        tl::types::UpdatesTooLong {},
    )))
    .unwrap();

    let Update::NewMessage(message) = stream.next().await.unwrap() else {
        panic!("expected a new message");
    };
    assert_eq!(message.text(), "missed");
    assert_eq!(
        request_ids(&network).last(),
        Some(&tl::functions::updates::GetDifference::CONSTRUCTOR_ID)
    );
    assert_eq!(session.updates_state().pts, 11);
}

#[tokio::test]
async fn revoked_authorization_clears_the_session() {
    let session = logged_in_session();
    let home = session.home_dc_id();
    session.set_dc_option(&DcOption {
        auth_key: Some([1; 256]),
        ..session.dc_option(home).unwrap()
    });
    session.set_update_state(UpdateState::Primary {
        pts: 5,
        date: 1_700_000_000,
        seq: 2,
    });

    let network = MockNetwork::new(|_, _, _| rpc_error(401, "AUTH_KEY_UNREGISTERED"));
    let client = client_with(
        Arc::clone(&session),
        Arc::clone(&network),
        ClientConfiguration::default(),
    );

    let error = client
        .invoke(&tl::functions::updates::GetState {})
        .await
        .unwrap_err();
    assert!(error.is("AUTH_KEY_UNREGISTERED"));
    assert_eq!(network.calls().len(), 1);
    assert_eq!(session.logged_in_user(), None);
    assert_eq!(session.updates_state().pts, 0);
    assert_eq!(session.dc_option(home).unwrap().auth_key, None);
}

#[tokio::test]
async fn big_upload_resends_earlier_missing_part() {
    let size = BIG_FILE_SIZE + 1000;
    let data = (0..size).map(|i| (i % 251) as u8).collect::<Vec<_>>();
    let sent = Arc::new(Mutex::new(Vec::new()));

    let network = {
        let data = data.clone();
        let sent = Arc::clone(&sent);
        let mut missing_reported = false;
        MockNetwork::new(move |_, _, body| {
            let request = tl::functions::upload::SaveBigFilePart::from_bytes(body).unwrap();
            assert_eq!(request.file_total_parts, 21);
            let offset = request.file_part as usize * MAX_UPLOAD_PART_SIZE;
            let end = (offset + MAX_UPLOAD_PART_SIZE).min(size);
            assert_eq!(request.bytes, data[offset..end]);

            sent.lock().unwrap().push(request.file_part);
            if request.file_part == 3 && !missing_reported {
                missing_reported = true;
                return rpc_error(400, "FILE_PART_1_MISSING");
            }
            ok(true)
        })
    };
    let client = client_with(logged_in_session(), network, ClientConfiguration::default());

    let file = client
        .upload_stream(&mut Cursor::new(data), size, "big.bin".to_string())
        .await
        .unwrap();

    let tl::enums::InputFile::Big(file) = file else {
        panic!("big files are uploaded as big files");
    };
    assert_eq!(file.parts, 21);
    let mut expected = vec![0, 1, 2, 3, 1, 3];
    expected.extend(4..21);
    assert_eq!(*sent.lock().unwrap(), expected);
}

#[tokio::test]
async fn async_progress_aborts_upload() {
    let size = 2 * MAX_UPLOAD_PART_SIZE + 1;
    let data = vec![5u8; size];
    let network = MockNetwork::new(|_, _, _| ok(true));
    let client = client_with(
        logged_in_session(),
        Arc::clone(&network),
        ClientConfiguration::default(),
    );

    let reported = Arc::new(Mutex::new(Vec::new()));
    let progress = {
        let reported = Arc::clone(&reported);
        Progress::new_async(move |done, total| {
            let reported = Arc::clone(&reported);
            async move {
                tokio::task::yield_now().await;
                reported.lock().unwrap().push((done, total));
                if done >= 2 * MAX_UPLOAD_PART_SIZE as u64 {
                    Err(Transmission)
                } else {
                    Ok(())
                }
            }
        })
    };

    let file = client
        .upload_stream_with_progress(&mut Cursor::new(data), size, "a.bin".to_string(), progress)
        .await
        .unwrap();

    assert!(file.is_none());
    assert_eq!(network.calls().len(), 2);
    let part = MAX_UPLOAD_PART_SIZE as u64;
    assert_eq!(
        *reported.lock().unwrap(),
        [(part, Some(size as u64)), (2 * part, Some(size as u64))]
    );
}

#[tokio::test]
async fn busy_handlers_do_not_hold_back_updates() {
    let session = logged_in_session();
    let network = MockNetwork::new(|_, _, body| match id_of(body) {
        tl::functions::updates::GetState::CONSTRUCTOR_ID => ok(state(0)),
        id => panic!("unexpected request {id:08x}"),
    });
    let client = client_with(Arc::clone(&session), network, ClientConfiguration::default());

    let gate = Arc::new(tokio::sync::Semaphore::new(0));
    let handled = Arc::new(AtomicUsize::new(0));
    let mut dispatcher = Dispatcher::new(client.clone());
    {
        let gate = Arc::clone(&gate);
        let handled = Arc::clone(&handled);
        dispatcher.add_handler(0, EventKind::Message, filters::all(), move |_, _| {
            let gate = Arc::clone(&gate);
            let handled = Arc::clone(&handled);
            async move {
                let _permit = gate.acquire().await?;
                handled.fetch_add(1, Ordering::SeqCst);
                Ok::<_, HandlerError>(Propagation::EndGroup)
            }
        });
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let updates = client.stream_updates(rx, UpdatesConfiguration::default());
    let run = tokio::spawn(dispatcher.run(updates, DispatcherConfiguration { workers: 1 }));

    tx.send(new_message_updates(1, 2000, "first")).unwrap();
    tx.send(new_message_updates(2, 3000, "second")).unwrap();

    // The only worker is stuck on the first update, yet the second one is still read.
    tokio::time::timeout(Duration::from_secs(5), async {
        while session.peer(PeerId::user(3000)).is_none() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
    assert_eq!(handled.load(Ordering::SeqCst), 0);

    gate.add_permits(2);
    drop(tx);
    run.await.unwrap().unwrap();
    assert_eq!(handled.load(Ordering::SeqCst), 2);
}
