// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::deserialize::{Buffer, Error, Result};
use crate::serialize::{BOOL_FALSE_ID, BOOL_TRUE_ID};
use crate::{Deserializable, Serializable};

macro_rules! tl_objects {
    ($( $variant:ident($ty:ty) ),* $(,)?) => {
        /// Any boxed value of the schema, for when the constructor
        /// identifier of incoming data is not known in advance.
        #[derive(Clone, Debug, PartialEq)]
        pub enum Object {
            Bool(bool),
            $( $variant($ty), )*
        }

        impl Object {
            /// Reads the next value, choosing its type from its constructor
            /// identifier.
            ///
            /// Identifiers outside the schema fail with
            /// [`Error::SchemaMismatch`] and leave the buffer untouched.
            pub fn read(buf: Buffer) -> Result<Self> {
                let id = buf.peek_u32()?;
                if id == BOOL_TRUE_ID || id == BOOL_FALSE_ID {
                    return Ok(Self::Bool(bool::deserialize(buf)?));
                }
                $(
                    if <$ty>::CONSTRUCTOR_IDS.contains(&id) {
                        return Ok(Self::$variant(<$ty>::deserialize(buf)?));
                    }
                )*
                Err(Error::SchemaMismatch { id, dump: hex_dump(buf.remaining()) })
            }

            /// The constructor identifier this value would be serialized with.
            pub fn constructor_id(&self) -> u32 {
                let mut bytes = Vec::with_capacity(4);
                match self {
                    Self::Bool(value) => value.serialize(&mut bytes),
                    $( Self::$variant(value) => value.serialize(&mut bytes), )*
                }
                u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
            }
        }

        impl Serializable for Object {
            fn serialize(&self, buf: &mut impl Extend<u8>) {
                match self {
                    Self::Bool(value) => value.serialize(buf),
                    $( Self::$variant(value) => value.serialize(buf), )*
                }
            }
        }
    };
}

tl_objects! {
    ResPq(crate::enums::ResPq),
    PQInnerData(crate::enums::PQInnerData),
    ServerDhParams(crate::enums::ServerDhParams),
    ServerDhInnerData(crate::enums::ServerDhInnerData),
    ClientDhInnerData(crate::enums::ClientDhInnerData),
    SetClientDhParamsAnswer(crate::enums::SetClientDhParamsAnswer),
    RpcError(crate::enums::RpcError),
    RpcDropAnswer(crate::enums::RpcDropAnswer),
    FutureSalt(crate::enums::FutureSalt),
    FutureSalts(crate::enums::FutureSalts),
    Pong(crate::enums::Pong),
    DestroySessionRes(crate::enums::DestroySessionRes),
    NewSession(crate::enums::NewSession),
    MsgsAck(crate::enums::MsgsAck),
    BadMsgNotification(crate::enums::BadMsgNotification),
    MsgsStateReq(crate::enums::MsgsStateReq),
    MsgsStateInfo(crate::enums::MsgsStateInfo),
    MsgsAllInfo(crate::enums::MsgsAllInfo),
    MsgDetailedInfo(crate::enums::MsgDetailedInfo),
    MsgResendReq(crate::enums::MsgResendReq),
    DcOption(crate::enums::DcOption),
    Config(crate::enums::Config),
    CdnPublicKey(crate::enums::CdnPublicKey),
    CdnConfig(crate::enums::CdnConfig),
    InputPeer(crate::enums::InputPeer),
    InputUser(crate::enums::InputUser),
    InputChannel(crate::enums::InputChannel),
    InputMessage(crate::enums::InputMessage),
    Peer(crate::enums::Peer),
    InputFile(crate::enums::InputFile),
    InputFileLocation(crate::enums::InputFileLocation),
    InputStickerSet(crate::enums::InputStickerSet),
    StorageFileType(crate::enums::storage::FileType),
    UploadFile(crate::enums::upload::File),
    UploadCdnFile(crate::enums::upload::CdnFile),
    FileHash(crate::enums::FileHash),
    UserStatus(crate::enums::UserStatus),
    User(crate::enums::User),
    Chat(crate::enums::Chat),
    PhotoSize(crate::enums::PhotoSize),
    Photo(crate::enums::Photo),
    Document(crate::enums::Document),
    DocumentAttribute(crate::enums::DocumentAttribute),
    GeoPoint(crate::enums::GeoPoint),
    MessageMedia(crate::enums::MessageMedia),
    MessageAction(crate::enums::MessageAction),
    MessageEntity(crate::enums::MessageEntity),
    Message(crate::enums::Message),
    MessageRange(crate::enums::MessageRange),
    ChannelMessagesFilter(crate::enums::ChannelMessagesFilter),
    ForumTopic(crate::enums::ForumTopic),
    EncryptedFile(crate::enums::EncryptedFile),
    EncryptedMessage(crate::enums::EncryptedMessage),
    PollAnswerVoters(crate::enums::PollAnswerVoters),
    PollResults(crate::enums::PollResults),
    Update(crate::enums::Update),
    Updates(crate::enums::Updates),
    UpdatesState(crate::enums::updates::State),
    UpdatesDifference(crate::enums::updates::Difference),
    UpdatesChannelDifference(crate::enums::updates::ChannelDifference),
    CodeSettings(crate::enums::CodeSettings),
    AuthSentCodeType(crate::enums::auth::SentCodeType),
    AuthCodeType(crate::enums::auth::CodeType),
    AuthSentCode(crate::enums::auth::SentCode),
    AuthAuthorization(crate::enums::auth::Authorization),
    AuthExportedAuthorization(crate::enums::auth::ExportedAuthorization),
    AuthLoggedOut(crate::enums::auth::LoggedOut),
    InputCheckPasswordSrp(crate::enums::InputCheckPasswordSrp),
    PasswordKdfAlgo(crate::enums::PasswordKdfAlgo),
    SecurePasswordKdfAlgo(crate::enums::SecurePasswordKdfAlgo),
    AccountPassword(crate::enums::account::Password),
    MessagesMessages(crate::enums::messages::Messages),
    ContactsResolvedPeer(crate::enums::contacts::ResolvedPeer),
}

/// Longest prefix of the data kept in a [`Error::SchemaMismatch`].
const DUMP_LIMIT: usize = 64;

fn hex_dump(data: &[u8]) -> String {
    let mut dump = data
        .iter()
        .take(DUMP_LIMIT)
        .map(|byte| format!("{byte:02x}"))
        .collect::<String>();
    if data.len() > DUMP_LIMIT {
        dump.push_str("...");
    }
    dump
}

/// The schema name of a constructor, mostly useful for logging.
///
/// # Examples
///
/// ```
/// assert_eq!(ferrogram_tl_types::name_for_id(0x7abe77ec), Some("ping"));
/// assert_eq!(ferrogram_tl_types::name_for_id(0), None);
/// ```
pub fn name_for_id(id: u32) -> Option<&'static str> {
    use crate::{functions, types};

    [
        types::CONSTRUCTORS,
        types::account::CONSTRUCTORS,
        types::auth::CONSTRUCTORS,
        types::contacts::CONSTRUCTORS,
        types::messages::CONSTRUCTORS,
        types::storage::CONSTRUCTORS,
        types::updates::CONSTRUCTORS,
        types::upload::CONSTRUCTORS,
        functions::CONSTRUCTORS,
        functions::GENERIC_CONSTRUCTORS,
        functions::account::CONSTRUCTORS,
        functions::auth::CONSTRUCTORS,
        functions::channels::CONSTRUCTORS,
        functions::contacts::CONSTRUCTORS,
        functions::help::CONSTRUCTORS,
        functions::messages::CONSTRUCTORS,
        functions::updates::CONSTRUCTORS,
        functions::upload::CONSTRUCTORS,
        functions::users::CONSTRUCTORS,
    ]
    .into_iter()
    .flatten()
    .find(|(constructor, _)| *constructor == id)
    .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cursor, Identifiable, enums, types};

    #[test]
    fn check_read_picks_type() {
        let pong = enums::Pong::Pong(types::Pong {
            msg_id: 12,
            ping_id: 34,
        });
        let bytes = pong.to_bytes();
        let mut cursor = Cursor::from_slice(&bytes);
        assert_eq!(Object::read(&mut cursor), Ok(Object::Pong(pong)));
        assert_eq!(cursor.pos(), bytes.len());
    }

    #[test]
    fn check_read_bool() {
        let mut cursor = Cursor::from_slice(&[0xb5, 0x75, 0x72, 0x99]);
        assert_eq!(Object::read(&mut cursor), Ok(Object::Bool(true)));
    }

    #[test]
    fn check_unknown_constructor_is_a_schema_mismatch() {
        let data = [0xef, 0xbe, 0xad, 0xde, 0x01, 0x02];
        let mut cursor = Cursor::from_slice(&data);
        assert_eq!(
            Object::read(&mut cursor),
            Err(Error::SchemaMismatch {
                id: 0xdeadbeef,
                dump: "efbeadde0102".to_string(),
            })
        );
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn check_constructor_id() {
        let object = Object::Peer(enums::Peer::Channel(types::PeerChannel { channel_id: 1 }));
        assert_eq!(object.constructor_id(), types::PeerChannel::CONSTRUCTOR_ID);
        assert_eq!(name_for_id(object.constructor_id()), Some("peerChannel"));
    }
}
