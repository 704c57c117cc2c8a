// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! All of the boxed types, each represented by an `enum` with one variant
//! per constructor.
#![allow(clippy::large_enum_variant)]

tl_enums! {
    ResPq {
        ResPq(crate::types::ResPq),
    }
    PQInnerData {
        PQInnerData(crate::types::PQInnerData),
    }
    ServerDhParams {
        Fail(crate::types::ServerDhParamsFail),
        Ok(crate::types::ServerDhParamsOk),
    }
    ServerDhInnerData {
        ServerDhInnerData(crate::types::ServerDhInnerData),
    }
    ClientDhInnerData {
        ClientDhInnerData(crate::types::ClientDhInnerData),
    }
    SetClientDhParamsAnswer {
        DhGenOk(crate::types::DhGenOk),
        DhGenRetry(crate::types::DhGenRetry),
        DhGenFail(crate::types::DhGenFail),
    }
    RpcError {
        RpcError(crate::types::RpcError),
    }
    RpcDropAnswer {
        RpcAnswerUnknown(crate::types::RpcAnswerUnknown),
        RpcAnswerDroppedRunning(crate::types::RpcAnswerDroppedRunning),
        RpcAnswerDropped(crate::types::RpcAnswerDropped),
    }
    FutureSalt {
        FutureSalt(crate::types::FutureSalt),
    }
    FutureSalts {
        FutureSalts(crate::types::FutureSalts),
    }
    Pong {
        Pong(crate::types::Pong),
    }
    DestroySessionRes {
        DestroySessionOk(crate::types::DestroySessionOk),
        DestroySessionNone(crate::types::DestroySessionNone),
    }
    NewSession {
        Created(crate::types::NewSessionCreated),
    }
    MsgsAck {
        MsgsAck(crate::types::MsgsAck),
    }
    BadMsgNotification {
        BadMsgNotification(crate::types::BadMsgNotification),
        BadServerSalt(crate::types::BadServerSalt),
    }
    MsgsStateReq {
        MsgsStateReq(crate::types::MsgsStateReq),
    }
    MsgsStateInfo {
        MsgsStateInfo(crate::types::MsgsStateInfo),
    }
    MsgsAllInfo {
        MsgsAllInfo(crate::types::MsgsAllInfo),
    }
    MsgDetailedInfo {
        MsgDetailedInfo(crate::types::MsgDetailedInfo),
        MsgNewDetailedInfo(crate::types::MsgNewDetailedInfo),
    }
    MsgResendReq {
        MsgResendReq(crate::types::MsgResendReq),
    }
    DcOption {
        DcOption(crate::types::DcOption),
    }
    Config {
        Config(crate::types::Config),
    }
    CdnPublicKey {
        CdnPublicKey(crate::types::CdnPublicKey),
    }
    CdnConfig {
        CdnConfig(crate::types::CdnConfig),
    }
    InputPeer {
        Empty(crate::types::InputPeerEmpty),
        PeerSelf(crate::types::InputPeerSelf),
        Chat(crate::types::InputPeerChat),
        User(crate::types::InputPeerUser),
        Channel(crate::types::InputPeerChannel),
    }
    InputUser {
        Empty(crate::types::InputUserEmpty),
        UserSelf(crate::types::InputUserSelf),
        InputUser(crate::types::InputUser),
    }
    InputChannel {
        Empty(crate::types::InputChannelEmpty),
        InputChannel(crate::types::InputChannel),
    }
    InputMessage {
        Id(crate::types::InputMessageId),
    }
    Peer {
        User(crate::types::PeerUser),
        Chat(crate::types::PeerChat),
        Channel(crate::types::PeerChannel),
    }
    InputFile {
        InputFile(crate::types::InputFile),
        Big(crate::types::InputFileBig),
    }
    InputFileLocation {
        InputPhotoFileLocation(crate::types::InputPhotoFileLocation),
        InputDocumentFileLocation(crate::types::InputDocumentFileLocation),
        InputPeerPhotoFileLocation(crate::types::InputPeerPhotoFileLocation),
    }
    InputStickerSet {
        Empty(crate::types::InputStickerSetEmpty),
        Id(crate::types::InputStickerSetId),
        ShortName(crate::types::InputStickerSetShortName),
    }
    FileHash {
        FileHash(crate::types::FileHash),
    }
    UserStatus {
        Empty(crate::types::UserStatusEmpty),
        Online(crate::types::UserStatusOnline),
        Offline(crate::types::UserStatusOffline),
        Recently(crate::types::UserStatusRecently),
    }
    User {
        Empty(crate::types::UserEmpty),
        User(crate::types::User),
    }
    Chat {
        Empty(crate::types::ChatEmpty),
        Chat(crate::types::Chat),
        Forbidden(crate::types::ChatForbidden),
        Channel(crate::types::Channel),
        ChannelForbidden(crate::types::ChannelForbidden),
    }
    PhotoSize {
        Empty(crate::types::PhotoSizeEmpty),
        PhotoSize(crate::types::PhotoSize),
        Progressive(crate::types::PhotoSizeProgressive),
    }
    Photo {
        Empty(crate::types::PhotoEmpty),
        Photo(crate::types::Photo),
    }
    Document {
        Empty(crate::types::DocumentEmpty),
        Document(crate::types::Document),
    }
    DocumentAttribute {
        ImageSize(crate::types::DocumentAttributeImageSize),
        Animated(crate::types::DocumentAttributeAnimated),
        Sticker(crate::types::DocumentAttributeSticker),
        Video(crate::types::DocumentAttributeVideo),
        Audio(crate::types::DocumentAttributeAudio),
        Filename(crate::types::DocumentAttributeFilename),
    }
    GeoPoint {
        Empty(crate::types::GeoPointEmpty),
        GeoPoint(crate::types::GeoPoint),
    }
    MessageMedia {
        Empty(crate::types::MessageMediaEmpty),
        Photo(crate::types::MessageMediaPhoto),
        Geo(crate::types::MessageMediaGeo),
        Unsupported(crate::types::MessageMediaUnsupported),
        Document(crate::types::MessageMediaDocument),
    }
    MessageAction {
        Empty(crate::types::MessageActionEmpty),
        ChatEditTitle(crate::types::MessageActionChatEditTitle),
        PinMessage(crate::types::MessageActionPinMessage),
    }
    MessageEntity {
        Unknown(crate::types::MessageEntityUnknown),
        Mention(crate::types::MessageEntityMention),
        Hashtag(crate::types::MessageEntityHashtag),
        BotCommand(crate::types::MessageEntityBotCommand),
        Url(crate::types::MessageEntityUrl),
        Email(crate::types::MessageEntityEmail),
        Bold(crate::types::MessageEntityBold),
        Italic(crate::types::MessageEntityItalic),
        Code(crate::types::MessageEntityCode),
    }
    Message {
        Empty(crate::types::MessageEmpty),
        Message(crate::types::Message),
        Service(crate::types::MessageService),
    }
    MessageRange {
        MessageRange(crate::types::MessageRange),
    }
    ChannelMessagesFilter {
        Empty(crate::types::ChannelMessagesFilterEmpty),
        ChannelMessagesFilter(crate::types::ChannelMessagesFilter),
    }
    ForumTopic {
        Deleted(crate::types::ForumTopicDeleted),
    }
    EncryptedFile {
        Empty(crate::types::EncryptedFileEmpty),
        EncryptedFile(crate::types::EncryptedFile),
    }
    EncryptedMessage {
        EncryptedMessage(crate::types::EncryptedMessage),
        Service(crate::types::EncryptedMessageService),
    }
    PollAnswerVoters {
        PollAnswerVoters(crate::types::PollAnswerVoters),
    }
    PollResults {
        PollResults(crate::types::PollResults),
    }
    Update {
        NewMessage(crate::types::UpdateNewMessage),
        MessageId(crate::types::UpdateMessageId),
        DeleteMessages(crate::types::UpdateDeleteMessages),
        UserStatus(crate::types::UpdateUserStatus),
        NewChannelMessage(crate::types::UpdateNewChannelMessage),
        EditMessage(crate::types::UpdateEditMessage),
        EditChannelMessage(crate::types::UpdateEditChannelMessage),
        DeleteChannelMessages(crate::types::UpdateDeleteChannelMessages),
        ChannelTooLong(crate::types::UpdateChannelTooLong),
        BotCallbackQuery(crate::types::UpdateBotCallbackQuery),
        BotInlineQuery(crate::types::UpdateBotInlineQuery),
        MessagePoll(crate::types::UpdateMessagePoll),
    }
    Updates {
        TooLong(crate::types::UpdatesTooLong),
        UpdateShortMessage(crate::types::UpdateShortMessage),
        UpdateShortChatMessage(crate::types::UpdateShortChatMessage),
        UpdateShort(crate::types::UpdateShort),
        Combined(crate::types::UpdatesCombined),
        Updates(crate::types::Updates),
        UpdateShortSentMessage(crate::types::UpdateShortSentMessage),
    }
    CodeSettings {
        CodeSettings(crate::types::CodeSettings),
    }
    InputCheckPasswordSrp {
        InputCheckPasswordEmpty(crate::types::InputCheckPasswordEmpty),
        InputCheckPasswordSrp(crate::types::InputCheckPasswordSrp),
    }
    PasswordKdfAlgo {
        Unknown(crate::types::PasswordKdfAlgoUnknown),
        Sha256Sha256Pbkdf2Hmacsha512iter100000Sha256ModPow(crate::types::PasswordKdfAlgoSha256Sha256Pbkdf2Hmacsha512iter100000Sha256ModPow),
    }
    SecurePasswordKdfAlgo {
        Unknown(crate::types::SecurePasswordKdfAlgoUnknown),
        Pbkdf2Hmacsha512iter100000(crate::types::SecurePasswordKdfAlgoPbkdf2Hmacsha512iter100000),
        Sha512(crate::types::SecurePasswordKdfAlgoSha512),
    }
}

pub mod account {
    tl_enums! {
        Password {
            Password(crate::types::account::Password),
        }
    }
}

pub mod auth {
    tl_enums! {
        SentCodeType {
            App(crate::types::auth::SentCodeTypeApp),
            Sms(crate::types::auth::SentCodeTypeSms),
            Call(crate::types::auth::SentCodeTypeCall),
        }
        CodeType {
            Sms(crate::types::auth::CodeTypeSms),
            Call(crate::types::auth::CodeTypeCall),
            FlashCall(crate::types::auth::CodeTypeFlashCall),
        }
        SentCode {
            SentCode(crate::types::auth::SentCode),
        }
        Authorization {
            Authorization(crate::types::auth::Authorization),
            SignUpRequired(crate::types::auth::AuthorizationSignUpRequired),
        }
        ExportedAuthorization {
            ExportedAuthorization(crate::types::auth::ExportedAuthorization),
        }
        LoggedOut {
            LoggedOut(crate::types::auth::LoggedOut),
        }
    }
}

pub mod contacts {
    tl_enums! {
        ResolvedPeer {
            ResolvedPeer(crate::types::contacts::ResolvedPeer),
        }
    }
}

pub mod messages {
    tl_enums! {
        Messages {
            Messages(crate::types::messages::Messages),
            Slice(crate::types::messages::MessagesSlice),
            ChannelMessages(crate::types::messages::ChannelMessages),
            NotModified(crate::types::messages::MessagesNotModified),
        }
    }
}

pub mod storage {
    tl_enums! {
        FileType {
            FileUnknown(crate::types::storage::FileUnknown),
            FilePartial(crate::types::storage::FilePartial),
            FileJpeg(crate::types::storage::FileJpeg),
            FileGif(crate::types::storage::FileGif),
            FilePng(crate::types::storage::FilePng),
            FilePdf(crate::types::storage::FilePdf),
            FileMp3(crate::types::storage::FileMp3),
            FileMov(crate::types::storage::FileMov),
            FileMp4(crate::types::storage::FileMp4),
            FileWebp(crate::types::storage::FileWebp),
        }
    }
}

pub mod updates {
    tl_enums! {
        State {
            State(crate::types::updates::State),
        }
        Difference {
            Empty(crate::types::updates::DifferenceEmpty),
            Difference(crate::types::updates::Difference),
            Slice(crate::types::updates::DifferenceSlice),
            TooLong(crate::types::updates::DifferenceTooLong),
        }
        ChannelDifference {
            Empty(crate::types::updates::ChannelDifferenceEmpty),
            TooLong(crate::types::updates::ChannelDifferenceTooLong),
            ChannelDifference(crate::types::updates::ChannelDifference),
        }
    }
}

pub mod upload {
    tl_enums! {
        File {
            File(crate::types::upload::File),
            CdnRedirect(crate::types::upload::FileCdnRedirect),
        }
        CdnFile {
            ReuploadNeeded(crate::types::upload::CdnFileReuploadNeeded),
            CdnFile(crate::types::upload::CdnFile),
        }
    }
}
