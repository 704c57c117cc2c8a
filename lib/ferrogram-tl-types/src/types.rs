// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! All of the bare types, each represented by a `struct`.
//!
//! All of them implement [`crate::Identifiable`], [`crate::Serializable`]
//! and [`crate::Deserializable`]. The first group belongs to the MTProto
//! protocol itself, the rest to the Telegram API.
#![allow(clippy::unreadable_literal)]

tl_structs! {
    /// `resPQ#05162463 nonce:int128 server_nonce:int128 pq:bytes server_public_key_fingerprints:Vector<long> = ResPQ`
    "resPQ" ResPq = 0x05162463 {
        nonce: [u8; 16],
        server_nonce: [u8; 16],
        pq: Vec<u8>,
        server_public_key_fingerprints: Vec<i64>,
    }
    /// `p_q_inner_data#83c95aec pq:bytes p:bytes q:bytes nonce:int128 server_nonce:int128 new_nonce:int256 = P_Q_inner_data`
    "p_q_inner_data" PQInnerData = 0x83c95aec {
        pq: Vec<u8>,
        p: Vec<u8>,
        q: Vec<u8>,
        nonce: [u8; 16],
        server_nonce: [u8; 16],
        new_nonce: [u8; 32],
    }
    /// `server_DH_params_fail#79cb045d nonce:int128 server_nonce:int128 new_nonce_hash:int128 = Server_DH_Params`
    "server_DH_params_fail" ServerDhParamsFail = 0x79cb045d {
        nonce: [u8; 16],
        server_nonce: [u8; 16],
        new_nonce_hash: [u8; 16],
    }
    /// `server_DH_params_ok#d0e8075c nonce:int128 server_nonce:int128 encrypted_answer:bytes = Server_DH_Params`
    "server_DH_params_ok" ServerDhParamsOk = 0xd0e8075c {
        nonce: [u8; 16],
        server_nonce: [u8; 16],
        encrypted_answer: Vec<u8>,
    }
    /// `server_DH_inner_data#b5890dba nonce:int128 server_nonce:int128 g:int dh_prime:bytes g_a:bytes server_time:int = Server_DH_inner_data`
    "server_DH_inner_data" ServerDhInnerData = 0xb5890dba {
        nonce: [u8; 16],
        server_nonce: [u8; 16],
        g: i32,
        dh_prime: Vec<u8>,
        g_a: Vec<u8>,
        server_time: i32,
    }
    /// `client_DH_inner_data#6643b654 nonce:int128 server_nonce:int128 retry_id:long g_b:bytes = Client_DH_Inner_Data`
    "client_DH_inner_data" ClientDhInnerData = 0x6643b654 {
        nonce: [u8; 16],
        server_nonce: [u8; 16],
        retry_id: i64,
        g_b: Vec<u8>,
    }
    /// `dh_gen_ok#3bcbf734 nonce:int128 server_nonce:int128 new_nonce_hash1:int128 = Set_client_DH_params_answer`
    "dh_gen_ok" DhGenOk = 0x3bcbf734 {
        nonce: [u8; 16],
        server_nonce: [u8; 16],
        new_nonce_hash1: [u8; 16],
    }
    /// `dh_gen_retry#46dc1fb9 nonce:int128 server_nonce:int128 new_nonce_hash2:int128 = Set_client_DH_params_answer`
    "dh_gen_retry" DhGenRetry = 0x46dc1fb9 {
        nonce: [u8; 16],
        server_nonce: [u8; 16],
        new_nonce_hash2: [u8; 16],
    }
    /// `dh_gen_fail#a69dae02 nonce:int128 server_nonce:int128 new_nonce_hash3:int128 = Set_client_DH_params_answer`
    "dh_gen_fail" DhGenFail = 0xa69dae02 {
        nonce: [u8; 16],
        server_nonce: [u8; 16],
        new_nonce_hash3: [u8; 16],
    }
    /// `rpc_error#2144ca19 error_code:int error_message:string = RpcError`
    "rpc_error" RpcError = 0x2144ca19 {
        error_code: i32,
        error_message: String,
    }
    /// `rpc_answer_unknown#5e2ad36e = RpcDropAnswer`
    "rpc_answer_unknown" RpcAnswerUnknown = 0x5e2ad36e {}
    /// `rpc_answer_dropped_running#cd78e586 = RpcDropAnswer`
    "rpc_answer_dropped_running" RpcAnswerDroppedRunning = 0xcd78e586 {}
    /// `rpc_answer_dropped#a43ad8b7 msg_id:long seq_no:int bytes:int = RpcDropAnswer`
    "rpc_answer_dropped" RpcAnswerDropped = 0xa43ad8b7 {
        msg_id: i64,
        seq_no: i32,
        bytes: i32,
    }
    /// `future_salt#0949d9dc valid_since:int valid_until:int salt:long = FutureSalt`
    "future_salt" FutureSalt = 0x0949d9dc {
        valid_since: i32,
        valid_until: i32,
        salt: i64,
    }
    /// `future_salts#ae500895 req_msg_id:long now:int salts:vector<future_salt> = FutureSalts`
    "future_salts" FutureSalts = 0xae500895 {
        req_msg_id: i64,
        now: i32,
        salts: crate::RawVec<crate::types::FutureSalt>,
    }
    /// `pong#347773c5 msg_id:long ping_id:long = Pong`
    "pong" Pong = 0x347773c5 {
        msg_id: i64,
        ping_id: i64,
    }
    /// `destroy_session_ok#e22045fc session_id:long = DestroySessionRes`
    "destroy_session_ok" DestroySessionOk = 0xe22045fc {
        session_id: i64,
    }
    /// `destroy_session_none#62d350c9 session_id:long = DestroySessionRes`
    "destroy_session_none" DestroySessionNone = 0x62d350c9 {
        session_id: i64,
    }
    /// `new_session_created#9ec20908 first_msg_id:long unique_id:long server_salt:long = NewSession`
    "new_session_created" NewSessionCreated = 0x9ec20908 {
        first_msg_id: i64,
        unique_id: i64,
        server_salt: i64,
    }
    /// `msgs_ack#62d6b459 msg_ids:Vector<long> = MsgsAck`
    "msgs_ack" MsgsAck = 0x62d6b459 {
        msg_ids: Vec<i64>,
    }
    /// `bad_msg_notification#a7eff811 bad_msg_id:long bad_msg_seqno:int error_code:int = BadMsgNotification`
    "bad_msg_notification" BadMsgNotification = 0xa7eff811 {
        bad_msg_id: i64,
        bad_msg_seqno: i32,
        error_code: i32,
    }
    /// `bad_server_salt#edab447b bad_msg_id:long bad_msg_seqno:int error_code:int new_server_salt:long = BadMsgNotification`
    "bad_server_salt" BadServerSalt = 0xedab447b {
        bad_msg_id: i64,
        bad_msg_seqno: i32,
        error_code: i32,
        new_server_salt: i64,
    }
    /// `msgs_state_req#da69fb52 msg_ids:Vector<long> = MsgsStateReq`
    "msgs_state_req" MsgsStateReq = 0xda69fb52 {
        msg_ids: Vec<i64>,
    }
    /// `msgs_state_info#04deb57d req_msg_id:long info:bytes = MsgsStateInfo`
    "msgs_state_info" MsgsStateInfo = 0x04deb57d {
        req_msg_id: i64,
        info: Vec<u8>,
    }
    /// `msgs_all_info#8cc0d131 msg_ids:Vector<long> info:bytes = MsgsAllInfo`
    "msgs_all_info" MsgsAllInfo = 0x8cc0d131 {
        msg_ids: Vec<i64>,
        info: Vec<u8>,
    }
    /// `msg_detailed_info#276d3ec6 msg_id:long answer_msg_id:long bytes:int status:int = MsgDetailedInfo`
    "msg_detailed_info" MsgDetailedInfo = 0x276d3ec6 {
        msg_id: i64,
        answer_msg_id: i64,
        bytes: i32,
        status: i32,
    }
    /// `msg_new_detailed_info#809db6df answer_msg_id:long bytes:int status:int = MsgDetailedInfo`
    "msg_new_detailed_info" MsgNewDetailedInfo = 0x809db6df {
        answer_msg_id: i64,
        bytes: i32,
        status: i32,
    }
    /// `msg_resend_req#7d861a08 msg_ids:Vector<long> = MsgResendReq`
    "msg_resend_req" MsgResendReq = 0x7d861a08 {
        msg_ids: Vec<i64>,
    }
    /// `dcOption#18b7a10d flags:# ipv6:flags.0?true media_only:flags.1?true tcpo_only:flags.2?true cdn:flags.3?true static:flags.4?true this_port_only:flags.5?true id:int ip_address:string port:int secret:flags.10?bytes = DcOption`
    "dcOption" DcOption = 0x18b7a10d [flags] {
        #[flag(0)] ipv6: bool,
        #[flag(1)] media_only: bool,
        #[flag(2)] tcpo_only: bool,
        #[flag(3)] cdn: bool,
        #[flag(4)] r#static: bool,
        #[flag(5)] this_port_only: bool,
        id: i32,
        ip_address: String,
        port: i32,
        #[flag(10)] secret: Option<Vec<u8>>,
    }
    /// `config flags:# default_p2p_contacts:flags.3?true test_mode:flags.1?true date:int expires:int this_dc:int dc_options:Vector<DcOption> dc_txt_domain_name:string chat_size_max:int megagroup_size_max:int tmp_sessions:flags.0?int = Config`
    "config" Config = 0xabbd3f06 [flags] {
        #[flag(3)] default_p2p_contacts: bool,
        #[flag(1)] test_mode: bool,
        date: i32,
        expires: i32,
        this_dc: i32,
        dc_options: Vec<crate::enums::DcOption>,
        dc_txt_domain_name: String,
        chat_size_max: i32,
        megagroup_size_max: i32,
        #[flag(0)] tmp_sessions: Option<i32>,
    }
    /// `cdnPublicKey#c982eaba dc_id:int public_key:string = CdnPublicKey`
    "cdnPublicKey" CdnPublicKey = 0xc982eaba {
        dc_id: i32,
        public_key: String,
    }
    /// `cdnConfig#5725e40a public_keys:Vector<CdnPublicKey> = CdnConfig`
    "cdnConfig" CdnConfig = 0x5725e40a {
        public_keys: Vec<crate::enums::CdnPublicKey>,
    }
    /// `inputPeerEmpty#7f3b18ea = InputPeer`
    "inputPeerEmpty" InputPeerEmpty = 0x7f3b18ea {}
    /// `inputPeerSelf#7da07ec9 = InputPeer`
    "inputPeerSelf" InputPeerSelf = 0x7da07ec9 {}
    /// `inputPeerChat#35a95cb9 chat_id:long = InputPeer`
    "inputPeerChat" InputPeerChat = 0x35a95cb9 {
        chat_id: i64,
    }
    /// `inputPeerUser#dde8a54c user_id:long access_hash:long = InputPeer`
    "inputPeerUser" InputPeerUser = 0xdde8a54c {
        user_id: i64,
        access_hash: i64,
    }
    /// `inputPeerChannel#27bcbbfc channel_id:long access_hash:long = InputPeer`
    "inputPeerChannel" InputPeerChannel = 0x27bcbbfc {
        channel_id: i64,
        access_hash: i64,
    }
    /// `inputUserEmpty#b98886cf = InputUser`
    "inputUserEmpty" InputUserEmpty = 0xb98886cf {}
    /// `inputUserSelf#f7c1b13f = InputUser`
    "inputUserSelf" InputUserSelf = 0xf7c1b13f {}
    /// `inputUser#f21158c6 user_id:long access_hash:long = InputUser`
    "inputUser" InputUser = 0xf21158c6 {
        user_id: i64,
        access_hash: i64,
    }
    /// `inputChannelEmpty#ee8c1e86 = InputChannel`
    "inputChannelEmpty" InputChannelEmpty = 0xee8c1e86 {}
    /// `inputChannel#f35aec28 channel_id:long access_hash:long = InputChannel`
    "inputChannel" InputChannel = 0xf35aec28 {
        channel_id: i64,
        access_hash: i64,
    }
    /// `inputMessageID#a676a322 id:int = InputMessage`
    "inputMessageID" InputMessageId = 0xa676a322 {
        id: i32,
    }
    /// `peerUser#59511722 user_id:long = Peer`
    "peerUser" PeerUser = 0x59511722 {
        user_id: i64,
    }
    /// `peerChat#36c6019a chat_id:long = Peer`
    "peerChat" PeerChat = 0x36c6019a {
        chat_id: i64,
    }
    /// `peerChannel#a2a5371e channel_id:long = Peer`
    "peerChannel" PeerChannel = 0xa2a5371e {
        channel_id: i64,
    }
    /// `inputFile#f52ff27f id:long parts:int name:string md5_checksum:string = InputFile`
    "inputFile" InputFile = 0xf52ff27f {
        id: i64,
        parts: i32,
        name: String,
        md5_checksum: String,
    }
    /// `inputFileBig#fa4f0bb5 id:long parts:int name:string = InputFile`
    "inputFileBig" InputFileBig = 0xfa4f0bb5 {
        id: i64,
        parts: i32,
        name: String,
    }
    /// `inputPhotoFileLocation#40181ffe id:long access_hash:long file_reference:bytes thumb_size:string = InputFileLocation`
    "inputPhotoFileLocation" InputPhotoFileLocation = 0x40181ffe {
        id: i64,
        access_hash: i64,
        file_reference: Vec<u8>,
        thumb_size: String,
    }
    /// `inputDocumentFileLocation#bad07584 id:long access_hash:long file_reference:bytes thumb_size:string = InputFileLocation`
    "inputDocumentFileLocation" InputDocumentFileLocation = 0xbad07584 {
        id: i64,
        access_hash: i64,
        file_reference: Vec<u8>,
        thumb_size: String,
    }
    /// `inputPeerPhotoFileLocation#37257e99 flags:# big:flags.0?true peer:InputPeer photo_id:long = InputFileLocation`
    "inputPeerPhotoFileLocation" InputPeerPhotoFileLocation = 0x37257e99 [flags] {
        #[flag(0)] big: bool,
        peer: crate::enums::InputPeer,
        photo_id: i64,
    }
    /// `inputStickerSetEmpty#ffb62b95 = InputStickerSet`
    "inputStickerSetEmpty" InputStickerSetEmpty = 0xffb62b95 {}
    /// `inputStickerSetID#9de7a269 id:long access_hash:long = InputStickerSet`
    "inputStickerSetID" InputStickerSetId = 0x9de7a269 {
        id: i64,
        access_hash: i64,
    }
    /// `inputStickerSetShortName#861cc8a0 short_name:string = InputStickerSet`
    "inputStickerSetShortName" InputStickerSetShortName = 0x861cc8a0 {
        short_name: String,
    }
    /// `fileHash#f39b035c offset:long limit:int hash:bytes = FileHash`
    "fileHash" FileHash = 0xf39b035c {
        offset: i64,
        limit: i32,
        hash: Vec<u8>,
    }
    /// `userStatusEmpty#9d05049 = UserStatus`
    "userStatusEmpty" UserStatusEmpty = 0x09d05049 {}
    /// `userStatusOnline#edb93949 expires:int = UserStatus`
    "userStatusOnline" UserStatusOnline = 0xedb93949 {
        expires: i32,
    }
    /// `userStatusOffline#8c703f was_online:int = UserStatus`
    "userStatusOffline" UserStatusOffline = 0x008c703f {
        was_online: i32,
    }
    /// `userStatusRecently#7b197dc8 flags:# by_me:flags.0?true = UserStatus`
    "userStatusRecently" UserStatusRecently = 0x7b197dc8 [flags] {
        #[flag(0)] by_me: bool,
    }
    /// `userEmpty#d3bc4b7a id:long = User`
    "userEmpty" UserEmpty = 0xd3bc4b7a {
        id: i64,
    }
    /// `user flags:# self:flags.10?true contact:flags.11?true deleted:flags.13?true bot:flags.14?true min:flags.20?true id:long access_hash:flags.0?long first_name:flags.1?string last_name:flags.2?string username:flags.3?string phone:flags.4?string status:flags.6?UserStatus = User`
    "user" User = 0xe96f7d00 [flags] {
        #[flag(10)] is_self: bool,
        #[flag(11)] contact: bool,
        #[flag(13)] deleted: bool,
        #[flag(14)] bot: bool,
        #[flag(20)] min: bool,
        id: i64,
        #[flag(0)] access_hash: Option<i64>,
        #[flag(1)] first_name: Option<String>,
        #[flag(2)] last_name: Option<String>,
        #[flag(3)] username: Option<String>,
        #[flag(4)] phone: Option<String>,
        #[flag(6)] status: Option<crate::enums::UserStatus>,
    }
    /// `chatEmpty#29562865 id:long = Chat`
    "chatEmpty" ChatEmpty = 0x29562865 {
        id: i64,
    }
    /// `chat flags:# creator:flags.0?true left:flags.2?true deactivated:flags.5?true id:long title:string participants_count:int date:int version:int = Chat`
    "chat" Chat = 0xd9bbcc46 [flags] {
        #[flag(0)] creator: bool,
        #[flag(2)] left: bool,
        #[flag(5)] deactivated: bool,
        id: i64,
        title: String,
        participants_count: i32,
        date: i32,
        version: i32,
    }
    /// `chatForbidden#6592a1a7 id:long title:string = Chat`
    "chatForbidden" ChatForbidden = 0x6592a1a7 {
        id: i64,
        title: String,
    }
    /// `channel flags:# creator:flags.0?true left:flags.2?true broadcast:flags.5?true megagroup:flags.8?true min:flags.12?true gigagroup:flags.26?true id:long access_hash:flags.13?long title:string username:flags.6?string date:int participants_count:flags.17?int = Chat`
    "channel" Channel = 0x3c642a97 [flags] {
        #[flag(0)] creator: bool,
        #[flag(2)] left: bool,
        #[flag(5)] broadcast: bool,
        #[flag(8)] megagroup: bool,
        #[flag(12)] min: bool,
        #[flag(26)] gigagroup: bool,
        id: i64,
        #[flag(13)] access_hash: Option<i64>,
        title: String,
        #[flag(6)] username: Option<String>,
        date: i32,
        #[flag(17)] participants_count: Option<i32>,
    }
    /// `channelForbidden#17d493d5 flags:# broadcast:flags.5?true megagroup:flags.8?true id:long access_hash:long title:string until_date:flags.16?int = Chat`
    "channelForbidden" ChannelForbidden = 0x17d493d5 [flags] {
        #[flag(5)] broadcast: bool,
        #[flag(8)] megagroup: bool,
        id: i64,
        access_hash: i64,
        title: String,
        #[flag(16)] until_date: Option<i32>,
    }
    /// `photoSizeEmpty#e17e23c type:string = PhotoSize`
    "photoSizeEmpty" PhotoSizeEmpty = 0x0e17e23c {
        r#type: String,
    }
    /// `photoSize#75c78e60 type:string w:int h:int size:int = PhotoSize`
    "photoSize" PhotoSize = 0x75c78e60 {
        r#type: String,
        w: i32,
        h: i32,
        size: i32,
    }
    /// `photoSizeProgressive#fa3efb95 type:string w:int h:int sizes:Vector<int> = PhotoSize`
    "photoSizeProgressive" PhotoSizeProgressive = 0xfa3efb95 {
        r#type: String,
        w: i32,
        h: i32,
        sizes: Vec<i32>,
    }
    /// `photoEmpty#2331b22d id:long = Photo`
    "photoEmpty" PhotoEmpty = 0x2331b22d {
        id: i64,
    }
    /// `photo#fb197a65 flags:# has_stickers:flags.0?true id:long access_hash:long file_reference:bytes date:int sizes:Vector<PhotoSize> dc_id:int = Photo`
    "photo" Photo = 0xfb197a65 [flags] {
        #[flag(0)] has_stickers: bool,
        id: i64,
        access_hash: i64,
        file_reference: Vec<u8>,
        date: i32,
        sizes: Vec<crate::enums::PhotoSize>,
        dc_id: i32,
    }
    /// `documentEmpty#36f8c871 id:long = Document`
    "documentEmpty" DocumentEmpty = 0x36f8c871 {
        id: i64,
    }
    /// `document#8fd4c4d8 flags:# id:long access_hash:long file_reference:bytes date:int mime_type:string size:long thumbs:flags.0?Vector<PhotoSize> dc_id:int attributes:Vector<DocumentAttribute> = Document`
    "document" Document = 0x8fd4c4d8 [flags] {
        id: i64,
        access_hash: i64,
        file_reference: Vec<u8>,
        date: i32,
        mime_type: String,
        size: i64,
        #[flag(0)] thumbs: Option<Vec<crate::enums::PhotoSize>>,
        dc_id: i32,
        attributes: Vec<crate::enums::DocumentAttribute>,
    }
    /// `documentAttributeImageSize#6c37c15c w:int h:int = DocumentAttribute`
    "documentAttributeImageSize" DocumentAttributeImageSize = 0x6c37c15c {
        w: i32,
        h: i32,
    }
    /// `documentAttributeAnimated#11b58939 = DocumentAttribute`
    "documentAttributeAnimated" DocumentAttributeAnimated = 0x11b58939 {}
    /// `documentAttributeSticker#6319d612 flags:# mask:flags.1?true alt:string stickerset:InputStickerSet = DocumentAttribute`
    "documentAttributeSticker" DocumentAttributeSticker = 0x6319d612 [flags] {
        #[flag(1)] mask: bool,
        alt: String,
        stickerset: crate::enums::InputStickerSet,
    }
    /// `documentAttributeVideo#43c57c48 flags:# round_message:flags.0?true supports_streaming:flags.1?true nosound:flags.3?true duration:double w:int h:int preload_prefix_size:flags.2?int video_start_ts:flags.4?double video_codec:flags.5?string = DocumentAttribute`
    "documentAttributeVideo" DocumentAttributeVideo = 0x43c57c48 [flags] {
        #[flag(0)] round_message: bool,
        #[flag(1)] supports_streaming: bool,
        #[flag(3)] nosound: bool,
        duration: f64,
        w: i32,
        h: i32,
        #[flag(2)] preload_prefix_size: Option<i32>,
        #[flag(4)] video_start_ts: Option<f64>,
        #[flag(5)] video_codec: Option<String>,
    }
    /// `documentAttributeAudio#9852f9c6 flags:# voice:flags.10?true duration:int title:flags.0?string performer:flags.1?string waveform:flags.2?bytes = DocumentAttribute`
    "documentAttributeAudio" DocumentAttributeAudio = 0x9852f9c6 [flags] {
        #[flag(10)] voice: bool,
        duration: i32,
        #[flag(0)] title: Option<String>,
        #[flag(1)] performer: Option<String>,
        #[flag(2)] waveform: Option<Vec<u8>>,
    }
    /// `documentAttributeFilename#15590068 file_name:string = DocumentAttribute`
    "documentAttributeFilename" DocumentAttributeFilename = 0x15590068 {
        file_name: String,
    }
    /// `geoPointEmpty#1117dd5f = GeoPoint`
    "geoPointEmpty" GeoPointEmpty = 0x1117dd5f {}
    /// `geoPoint#b2a2f663 flags:# long:double lat:double access_hash:long accuracy_radius:flags.0?int = GeoPoint`
    "geoPoint" GeoPoint = 0xb2a2f663 [flags] {
        long: f64,
        lat: f64,
        access_hash: i64,
        #[flag(0)] accuracy_radius: Option<i32>,
    }
    /// `messageMediaEmpty#3ded6320 = MessageMedia`
    "messageMediaEmpty" MessageMediaEmpty = 0x3ded6320 {}
    /// `messageMediaPhoto#695150d7 flags:# spoiler:flags.3?true photo:flags.0?Photo ttl_seconds:flags.2?int = MessageMedia`
    "messageMediaPhoto" MessageMediaPhoto = 0x695150d7 [flags] {
        #[flag(3)] spoiler: bool,
        #[flag(0)] photo: Option<crate::enums::Photo>,
        #[flag(2)] ttl_seconds: Option<i32>,
    }
    /// `messageMediaGeo#56e0d474 geo:GeoPoint = MessageMedia`
    "messageMediaGeo" MessageMediaGeo = 0x56e0d474 {
        geo: crate::enums::GeoPoint,
    }
    /// `messageMediaUnsupported#9f84f49e = MessageMedia`
    "messageMediaUnsupported" MessageMediaUnsupported = 0x9f84f49e {}
    /// `messageMediaDocument flags:# nopremium:flags.3?true spoiler:flags.4?true video:flags.6?true round:flags.7?true voice:flags.8?true document:flags.0?Document ttl_seconds:flags.2?int = MessageMedia`
    "messageMediaDocument" MessageMediaDocument = 0x9cb070d7 [flags] {
        #[flag(3)] nopremium: bool,
        #[flag(4)] spoiler: bool,
        #[flag(6)] video: bool,
        #[flag(7)] round: bool,
        #[flag(8)] voice: bool,
        #[flag(0)] document: Option<crate::enums::Document>,
        #[flag(2)] ttl_seconds: Option<i32>,
    }
    /// `messageActionEmpty#b6aef7b0 = MessageAction`
    "messageActionEmpty" MessageActionEmpty = 0xb6aef7b0 {}
    /// `messageActionChatEditTitle#b5a1ce5a title:string = MessageAction`
    "messageActionChatEditTitle" MessageActionChatEditTitle = 0xb5a1ce5a {
        title: String,
    }
    /// `messageActionPinMessage#94bd38ed = MessageAction`
    "messageActionPinMessage" MessageActionPinMessage = 0x94bd38ed {}
    /// `messageEntityUnknown#bb92ba95 offset:int length:int = MessageEntity`
    "messageEntityUnknown" MessageEntityUnknown = 0xbb92ba95 {
        offset: i32,
        length: i32,
    }
    /// `messageEntityMention#fa04579d offset:int length:int = MessageEntity`
    "messageEntityMention" MessageEntityMention = 0xfa04579d {
        offset: i32,
        length: i32,
    }
    /// `messageEntityHashtag#6f635b0d offset:int length:int = MessageEntity`
    "messageEntityHashtag" MessageEntityHashtag = 0x6f635b0d {
        offset: i32,
        length: i32,
    }
    /// `messageEntityBotCommand#6cef8ac7 offset:int length:int = MessageEntity`
    "messageEntityBotCommand" MessageEntityBotCommand = 0x6cef8ac7 {
        offset: i32,
        length: i32,
    }
    /// `messageEntityUrl#6ed02538 offset:int length:int = MessageEntity`
    "messageEntityUrl" MessageEntityUrl = 0x6ed02538 {
        offset: i32,
        length: i32,
    }
    /// `messageEntityEmail#64e475c2 offset:int length:int = MessageEntity`
    "messageEntityEmail" MessageEntityEmail = 0x64e475c2 {
        offset: i32,
        length: i32,
    }
    /// `messageEntityBold#bd610bc9 offset:int length:int = MessageEntity`
    "messageEntityBold" MessageEntityBold = 0xbd610bc9 {
        offset: i32,
        length: i32,
    }
    /// `messageEntityItalic#826f8b60 offset:int length:int = MessageEntity`
    "messageEntityItalic" MessageEntityItalic = 0x826f8b60 {
        offset: i32,
        length: i32,
    }
    /// `messageEntityCode#28a20571 offset:int length:int = MessageEntity`
    "messageEntityCode" MessageEntityCode = 0x28a20571 {
        offset: i32,
        length: i32,
    }
    /// `messageEmpty#90a6ca84 flags:# id:int peer_id:flags.0?Peer = Message`
    "messageEmpty" MessageEmpty = 0x90a6ca84 [flags] {
        id: i32,
        #[flag(0)] peer_id: Option<crate::enums::Peer>,
    }
    /// `message flags:# out:flags.1?true mentioned:flags.4?true silent:flags.13?true post:flags.14?true id:int from_id:flags.8?Peer peer_id:Peer reply_to_msg_id:flags.3?int date:int message:string media:flags.9?MessageMedia entities:flags.7?Vector<MessageEntity> views:flags.10?int edit_date:flags.15?int post_author:flags.16?string grouped_id:flags.17?long = Message`
    "message" Message = 0x1ec68dc6 [flags] {
        #[flag(1)] out: bool,
        #[flag(4)] mentioned: bool,
        #[flag(13)] silent: bool,
        #[flag(14)] post: bool,
        id: i32,
        #[flag(8)] from_id: Option<crate::enums::Peer>,
        peer_id: crate::enums::Peer,
        #[flag(3)] reply_to_msg_id: Option<i32>,
        date: i32,
        message: String,
        #[flag(9)] media: Option<crate::enums::MessageMedia>,
        #[flag(7)] entities: Option<Vec<crate::enums::MessageEntity>>,
        #[flag(10)] views: Option<i32>,
        #[flag(15)] edit_date: Option<i32>,
        #[flag(16)] post_author: Option<String>,
        #[flag(17)] grouped_id: Option<i64>,
    }
    /// `messageService flags:# out:flags.1?true silent:flags.13?true post:flags.14?true id:int from_id:flags.8?Peer peer_id:Peer date:int action:MessageAction = Message`
    "messageService" MessageService = 0x5340eb04 [flags] {
        #[flag(1)] out: bool,
        #[flag(13)] silent: bool,
        #[flag(14)] post: bool,
        id: i32,
        #[flag(8)] from_id: Option<crate::enums::Peer>,
        peer_id: crate::enums::Peer,
        date: i32,
        action: crate::enums::MessageAction,
    }
    /// `messageRange#ae30253 min_id:int max_id:int = MessageRange`
    "messageRange" MessageRange = 0x0ae30253 {
        min_id: i32,
        max_id: i32,
    }
    /// `channelMessagesFilterEmpty#94d42ee7 = ChannelMessagesFilter`
    "channelMessagesFilterEmpty" ChannelMessagesFilterEmpty = 0x94d42ee7 {}
    /// `channelMessagesFilter#cd77d957 flags:# exclude_new_messages:flags.1?true ranges:Vector<MessageRange> = ChannelMessagesFilter`
    "channelMessagesFilter" ChannelMessagesFilter = 0xcd77d957 [flags] {
        #[flag(1)] exclude_new_messages: bool,
        ranges: Vec<crate::enums::MessageRange>,
    }
    /// `forumTopicDeleted#23f109b id:int = ForumTopic`
    "forumTopicDeleted" ForumTopicDeleted = 0x023f109b {
        id: i32,
    }
    /// `encryptedFileEmpty#c21f497e = EncryptedFile`
    "encryptedFileEmpty" EncryptedFileEmpty = 0xc21f497e {}
    /// `encryptedFile#a8008cd8 id:long access_hash:long size:long dc_id:int key_fingerprint:int = EncryptedFile`
    "encryptedFile" EncryptedFile = 0xa8008cd8 {
        id: i64,
        access_hash: i64,
        size: i64,
        dc_id: i32,
        key_fingerprint: i32,
    }
    /// `encryptedMessage#ed18c118 random_id:long chat_id:int date:int bytes:bytes file:EncryptedFile = EncryptedMessage`
    "encryptedMessage" EncryptedMessage = 0xed18c118 {
        random_id: i64,
        chat_id: i32,
        date: i32,
        bytes: Vec<u8>,
        file: crate::enums::EncryptedFile,
    }
    /// `encryptedMessageService#23734b06 random_id:long chat_id:int date:int bytes:bytes = EncryptedMessage`
    "encryptedMessageService" EncryptedMessageService = 0x23734b06 {
        random_id: i64,
        chat_id: i32,
        date: i32,
        bytes: Vec<u8>,
    }
    /// `pollAnswerVoters#3b6ddad2 flags:# chosen:flags.0?true correct:flags.1?true option:bytes voters:int = PollAnswerVoters`
    "pollAnswerVoters" PollAnswerVoters = 0x3b6ddad2 [flags] {
        #[flag(0)] chosen: bool,
        #[flag(1)] correct: bool,
        option: Vec<u8>,
        voters: i32,
    }
    /// `pollResults#7adf2420 flags:# min:flags.0?true results:flags.1?Vector<PollAnswerVoters> total_voters:flags.2?int recent_voters:flags.3?Vector<Peer> solution:flags.4?string solution_entities:flags.4?Vector<MessageEntity> = PollResults`
    "pollResults" PollResults = 0x7adf2420 [flags] {
        #[flag(0)] min: bool,
        #[flag(1)] results: Option<Vec<crate::enums::PollAnswerVoters>>,
        #[flag(2)] total_voters: Option<i32>,
        #[flag(3)] recent_voters: Option<Vec<crate::enums::Peer>>,
        #[flag(4)] solution: Option<String>,
        #[flag(4)] solution_entities: Option<Vec<crate::enums::MessageEntity>>,
    }
    /// `updateNewMessage#1f2b0afd message:Message pts:int pts_count:int = Update`
    "updateNewMessage" UpdateNewMessage = 0x1f2b0afd {
        message: crate::enums::Message,
        pts: i32,
        pts_count: i32,
    }
    /// `updateMessageID#4e90bfd6 id:int random_id:long = Update`
    "updateMessageID" UpdateMessageId = 0x4e90bfd6 {
        id: i32,
        random_id: i64,
    }
    /// `updateDeleteMessages#a20db0e5 messages:Vector<int> pts:int pts_count:int = Update`
    "updateDeleteMessages" UpdateDeleteMessages = 0xa20db0e5 {
        messages: Vec<i32>,
        pts: i32,
        pts_count: i32,
    }
    /// `updateUserStatus#e5bdf8de user_id:long status:UserStatus = Update`
    "updateUserStatus" UpdateUserStatus = 0xe5bdf8de {
        user_id: i64,
        status: crate::enums::UserStatus,
    }
    /// `updateNewChannelMessage#62ba04d9 message:Message pts:int pts_count:int = Update`
    "updateNewChannelMessage" UpdateNewChannelMessage = 0x62ba04d9 {
        message: crate::enums::Message,
        pts: i32,
        pts_count: i32,
    }
    /// `updateEditMessage#e40370a3 message:Message pts:int pts_count:int = Update`
    "updateEditMessage" UpdateEditMessage = 0xe40370a3 {
        message: crate::enums::Message,
        pts: i32,
        pts_count: i32,
    }
    /// `updateEditChannelMessage#1b3f4df7 message:Message pts:int pts_count:int = Update`
    "updateEditChannelMessage" UpdateEditChannelMessage = 0x1b3f4df7 {
        message: crate::enums::Message,
        pts: i32,
        pts_count: i32,
    }
    /// `updateDeleteChannelMessages#c32d5b12 channel_id:long messages:Vector<int> pts:int pts_count:int = Update`
    "updateDeleteChannelMessages" UpdateDeleteChannelMessages = 0xc32d5b12 {
        channel_id: i64,
        messages: Vec<i32>,
        pts: i32,
        pts_count: i32,
    }
    /// `updateChannelTooLong#108d941f flags:# channel_id:long pts:flags.0?int = Update`
    "updateChannelTooLong" UpdateChannelTooLong = 0x108d941f [flags] {
        channel_id: i64,
        #[flag(0)] pts: Option<i32>,
    }
    /// `updateBotCallbackQuery#b9cfc48d flags:# query_id:long user_id:long peer:Peer msg_id:int chat_instance:long data:flags.0?bytes game_short_name:flags.1?string = Update`
    "updateBotCallbackQuery" UpdateBotCallbackQuery = 0xb9cfc48d [flags] {
        query_id: i64,
        user_id: i64,
        peer: crate::enums::Peer,
        msg_id: i32,
        chat_instance: i64,
        #[flag(0)] data: Option<Vec<u8>>,
        #[flag(1)] game_short_name: Option<String>,
    }
    /// `updateBotInlineQuery#496f379c flags:# query_id:long user_id:long query:string geo:flags.0?GeoPoint offset:string = Update`
    "updateBotInlineQuery" UpdateBotInlineQuery = 0x496f379c [flags] {
        query_id: i64,
        user_id: i64,
        query: String,
        #[flag(0)] geo: Option<crate::enums::GeoPoint>,
        offset: String,
    }
    /// `updateMessagePoll#aca1657b flags:# poll_id:long results:PollResults = Update`
    "updateMessagePoll" UpdateMessagePoll = 0xaca1657b [flags] {
        poll_id: i64,
        results: crate::enums::PollResults,
    }
    /// `updatesTooLong#e317af7e = Updates`
    "updatesTooLong" UpdatesTooLong = 0xe317af7e {}
    /// `updateShortMessage#313bc7f8 flags:# out:flags.1?true mentioned:flags.4?true media_unread:flags.5?true silent:flags.13?true id:int user_id:long message:string pts:int pts_count:int date:int via_bot_id:flags.11?long entities:flags.7?Vector<MessageEntity> ttl_period:flags.25?int = Updates`
    "updateShortMessage" UpdateShortMessage = 0x313bc7f8 [flags] {
        #[flag(1)] out: bool,
        #[flag(4)] mentioned: bool,
        #[flag(5)] media_unread: bool,
        #[flag(13)] silent: bool,
        id: i32,
        user_id: i64,
        message: String,
        pts: i32,
        pts_count: i32,
        date: i32,
        #[flag(11)] via_bot_id: Option<i64>,
        #[flag(7)] entities: Option<Vec<crate::enums::MessageEntity>>,
        #[flag(25)] ttl_period: Option<i32>,
    }
    /// `updateShortChatMessage#4d6deea5 flags:# out:flags.1?true mentioned:flags.4?true media_unread:flags.5?true silent:flags.13?true id:int from_id:long chat_id:long message:string pts:int pts_count:int date:int via_bot_id:flags.11?long entities:flags.7?Vector<MessageEntity> ttl_period:flags.25?int = Updates`
    "updateShortChatMessage" UpdateShortChatMessage = 0x4d6deea5 [flags] {
        #[flag(1)] out: bool,
        #[flag(4)] mentioned: bool,
        #[flag(5)] media_unread: bool,
        #[flag(13)] silent: bool,
        id: i32,
        from_id: i64,
        chat_id: i64,
        message: String,
        pts: i32,
        pts_count: i32,
        date: i32,
        #[flag(11)] via_bot_id: Option<i64>,
        #[flag(7)] entities: Option<Vec<crate::enums::MessageEntity>>,
        #[flag(25)] ttl_period: Option<i32>,
    }
    /// `updateShort#78d4dec1 update:Update date:int = Updates`
    "updateShort" UpdateShort = 0x78d4dec1 {
        update: crate::enums::Update,
        date: i32,
    }
    /// `updatesCombined#725b04c3 updates:Vector<Update> users:Vector<User> chats:Vector<Chat> date:int seq_start:int seq:int = Updates`
    "updatesCombined" UpdatesCombined = 0x725b04c3 {
        updates: Vec<crate::enums::Update>,
        users: Vec<crate::enums::User>,
        chats: Vec<crate::enums::Chat>,
        date: i32,
        seq_start: i32,
        seq: i32,
    }
    /// `updates#74ae4240 updates:Vector<Update> users:Vector<User> chats:Vector<Chat> date:int seq:int = Updates`
    "updates" Updates = 0x74ae4240 {
        updates: Vec<crate::enums::Update>,
        users: Vec<crate::enums::User>,
        chats: Vec<crate::enums::Chat>,
        date: i32,
        seq: i32,
    }
    /// `updateShortSentMessage#9015e101 flags:# out:flags.1?true id:int pts:int pts_count:int date:int media:flags.9?MessageMedia entities:flags.7?Vector<MessageEntity> ttl_period:flags.25?int = Updates`
    "updateShortSentMessage" UpdateShortSentMessage = 0x9015e101 [flags] {
        #[flag(1)] out: bool,
        id: i32,
        pts: i32,
        pts_count: i32,
        date: i32,
        #[flag(9)] media: Option<crate::enums::MessageMedia>,
        #[flag(7)] entities: Option<Vec<crate::enums::MessageEntity>>,
        #[flag(25)] ttl_period: Option<i32>,
    }
    /// `codeSettings#ad253d78 flags:# allow_flashcall:flags.0?true current_number:flags.1?true allow_app_hash:flags.4?true allow_missed_call:flags.5?true allow_firebase:flags.7?true unknown_number:flags.9?true = CodeSettings`
    "codeSettings" CodeSettings = 0xad253d78 [flags] {
        #[flag(0)] allow_flashcall: bool,
        #[flag(1)] current_number: bool,
        #[flag(4)] allow_app_hash: bool,
        #[flag(5)] allow_missed_call: bool,
        #[flag(7)] allow_firebase: bool,
        #[flag(9)] unknown_number: bool,
    }
    /// `inputCheckPasswordEmpty#9880f658 = InputCheckPasswordSRP`
    "inputCheckPasswordEmpty" InputCheckPasswordEmpty = 0x9880f658 {}
    /// `inputCheckPasswordSRP#d27ff082 srp_id:long A:bytes M1:bytes = InputCheckPasswordSRP`
    "inputCheckPasswordSRP" InputCheckPasswordSrp = 0xd27ff082 {
        srp_id: i64,
        a: Vec<u8>,
        m1: Vec<u8>,
    }
    /// `passwordKdfAlgoUnknown#d45ab096 = PasswordKdfAlgo`
    "passwordKdfAlgoUnknown" PasswordKdfAlgoUnknown = 0xd45ab096 {}
    /// `passwordKdfAlgoSHA256SHA256PBKDF2HMACSHA512iter100000SHA256ModPow#3a912d4a salt1:bytes salt2:bytes g:int p:bytes = PasswordKdfAlgo`
    "passwordKdfAlgoSHA256SHA256PBKDF2HMACSHA512iter100000SHA256ModPow" PasswordKdfAlgoSha256Sha256Pbkdf2Hmacsha512iter100000Sha256ModPow = 0x3a912d4a {
        salt1: Vec<u8>,
        salt2: Vec<u8>,
        g: i32,
        p: Vec<u8>,
    }
    /// `securePasswordKdfAlgoUnknown#4a8537 = SecurePasswordKdfAlgo`
    "securePasswordKdfAlgoUnknown" SecurePasswordKdfAlgoUnknown = 0x004a8537 {}
    /// `securePasswordKdfAlgoPBKDF2HMACSHA512iter100000#bbf2dda0 salt:bytes = SecurePasswordKdfAlgo`
    "securePasswordKdfAlgoPBKDF2HMACSHA512iter100000" SecurePasswordKdfAlgoPbkdf2Hmacsha512iter100000 = 0xbbf2dda0 {
        salt: Vec<u8>,
    }
    /// `securePasswordKdfAlgoSHA512#86471d92 salt:bytes = SecurePasswordKdfAlgo`
    "securePasswordKdfAlgoSHA512" SecurePasswordKdfAlgoSha512 = 0x86471d92 {
        salt: Vec<u8>,
    }
}

pub mod account {
    tl_structs! {
        /// `account.password#957b50fb flags:# has_recovery:flags.0?true has_secure_values:flags.1?true has_password:flags.2?true current_algo:flags.2?PasswordKdfAlgo srp_B:flags.2?bytes srp_id:flags.2?long hint:flags.3?string email_unconfirmed_pattern:flags.4?string new_algo:PasswordKdfAlgo new_secure_algo:SecurePasswordKdfAlgo secure_random:bytes pending_reset_date:flags.5?int login_email_pattern:flags.6?string = account.Password`
        "account.password" Password = 0x957b50fb [flags] {
            #[flag(0)] has_recovery: bool,
            #[flag(1)] has_secure_values: bool,
            #[flag(2)] has_password: bool,
            #[flag(2)] current_algo: Option<crate::enums::PasswordKdfAlgo>,
            #[flag(2)] srp_b: Option<Vec<u8>>,
            #[flag(2)] srp_id: Option<i64>,
            #[flag(3)] hint: Option<String>,
            #[flag(4)] email_unconfirmed_pattern: Option<String>,
            new_algo: crate::enums::PasswordKdfAlgo,
            new_secure_algo: crate::enums::SecurePasswordKdfAlgo,
            secure_random: Vec<u8>,
            #[flag(5)] pending_reset_date: Option<i32>,
            #[flag(6)] login_email_pattern: Option<String>,
        }
    }
}

pub mod auth {
    tl_structs! {
        /// `auth.sentCodeTypeApp#3dbb5986 length:int = auth.SentCodeType`
        "auth.sentCodeTypeApp" SentCodeTypeApp = 0x3dbb5986 {
            length: i32,
        }
        /// `auth.sentCodeTypeSms#c000bba2 length:int = auth.SentCodeType`
        "auth.sentCodeTypeSms" SentCodeTypeSms = 0xc000bba2 {
            length: i32,
        }
        /// `auth.sentCodeTypeCall#5353e5a7 length:int = auth.SentCodeType`
        "auth.sentCodeTypeCall" SentCodeTypeCall = 0x5353e5a7 {
            length: i32,
        }
        /// `auth.codeTypeSms#72a3158c = auth.CodeType`
        "auth.codeTypeSms" CodeTypeSms = 0x72a3158c {}
        /// `auth.codeTypeCall#741cd3e3 = auth.CodeType`
        "auth.codeTypeCall" CodeTypeCall = 0x741cd3e3 {}
        /// `auth.codeTypeFlashCall#226ccefb = auth.CodeType`
        "auth.codeTypeFlashCall" CodeTypeFlashCall = 0x226ccefb {}
        /// `auth.sentCode#5e002502 flags:# type:auth.SentCodeType phone_code_hash:string next_type:flags.1?auth.CodeType timeout:flags.2?int = auth.SentCode`
        "auth.sentCode" SentCode = 0x5e002502 [flags] {
            r#type: crate::enums::auth::SentCodeType,
            phone_code_hash: String,
            #[flag(1)] next_type: Option<crate::enums::auth::CodeType>,
            #[flag(2)] timeout: Option<i32>,
        }
        /// `auth.authorization#2ea2c0d4 flags:# setup_password_required:flags.1?true otherwise_relogin_days:flags.1?int tmp_sessions:flags.0?int future_auth_token:flags.2?bytes user:User = auth.Authorization`
        "auth.authorization" Authorization = 0x2ea2c0d4 [flags] {
            #[flag(1)] setup_password_required: bool,
            #[flag(1)] otherwise_relogin_days: Option<i32>,
            #[flag(0)] tmp_sessions: Option<i32>,
            #[flag(2)] future_auth_token: Option<Vec<u8>>,
            user: crate::enums::User,
        }
        /// `auth.authorizationSignUpRequired#44747e9a flags:# = auth.Authorization`
        "auth.authorizationSignUpRequired" AuthorizationSignUpRequired = 0x44747e9a [flags] {}
        /// `auth.exportedAuthorization#b434e2b8 id:long bytes:bytes = auth.ExportedAuthorization`
        "auth.exportedAuthorization" ExportedAuthorization = 0xb434e2b8 {
            id: i64,
            bytes: Vec<u8>,
        }
        /// `auth.loggedOut#c3a2835f flags:# future_auth_token:flags.0?bytes = auth.LoggedOut`
        "auth.loggedOut" LoggedOut = 0xc3a2835f [flags] {
            #[flag(0)] future_auth_token: Option<Vec<u8>>,
        }
    }
}

pub mod contacts {
    tl_structs! {
        /// `contacts.resolvedPeer#7f077ad9 peer:Peer chats:Vector<Chat> users:Vector<User> = contacts.ResolvedPeer`
        "contacts.resolvedPeer" ResolvedPeer = 0x7f077ad9 {
            peer: crate::enums::Peer,
            chats: Vec<crate::enums::Chat>,
            users: Vec<crate::enums::User>,
        }
    }
}

pub mod messages {
    tl_structs! {
        /// `messages.messages#8c718e87 messages:Vector<Message> chats:Vector<Chat> users:Vector<User> = messages.Messages`
        "messages.messages" Messages = 0x8c718e87 {
            messages: Vec<crate::enums::Message>,
            chats: Vec<crate::enums::Chat>,
            users: Vec<crate::enums::User>,
        }
        /// `messages.messagesSlice#3a54685e flags:# inexact:flags.1?true count:int next_rate:flags.0?int offset_id_offset:flags.2?int messages:Vector<Message> chats:Vector<Chat> users:Vector<User> = messages.Messages`
        "messages.messagesSlice" MessagesSlice = 0x3a54685e [flags] {
            #[flag(1)] inexact: bool,
            count: i32,
            #[flag(0)] next_rate: Option<i32>,
            #[flag(2)] offset_id_offset: Option<i32>,
            messages: Vec<crate::enums::Message>,
            chats: Vec<crate::enums::Chat>,
            users: Vec<crate::enums::User>,
        }
        /// `messages.channelMessages#c776ba4e flags:# inexact:flags.1?true pts:int count:int offset_id_offset:flags.2?int messages:Vector<Message> topics:Vector<ForumTopic> chats:Vector<Chat> users:Vector<User> = messages.Messages`
        "messages.channelMessages" ChannelMessages = 0xc776ba4e [flags] {
            #[flag(1)] inexact: bool,
            pts: i32,
            count: i32,
            #[flag(2)] offset_id_offset: Option<i32>,
            messages: Vec<crate::enums::Message>,
            topics: Vec<crate::enums::ForumTopic>,
            chats: Vec<crate::enums::Chat>,
            users: Vec<crate::enums::User>,
        }
        /// `messages.messagesNotModified#74535f21 count:int = messages.Messages`
        "messages.messagesNotModified" MessagesNotModified = 0x74535f21 {
            count: i32,
        }
    }
}

pub mod storage {
    tl_structs! {
        /// `storage.fileUnknown#aa963b05 = storage.FileType`
        "storage.fileUnknown" FileUnknown = 0xaa963b05 {}
        /// `storage.filePartial#40bc6f52 = storage.FileType`
        "storage.filePartial" FilePartial = 0x40bc6f52 {}
        /// `storage.fileJpeg#7efe0e = storage.FileType`
        "storage.fileJpeg" FileJpeg = 0x007efe0e {}
        /// `storage.fileGif#cae1aadf = storage.FileType`
        "storage.fileGif" FileGif = 0xcae1aadf {}
        /// `storage.filePng#a4f63c0 = storage.FileType`
        "storage.filePng" FilePng = 0x0a4f63c0 {}
        /// `storage.filePdf#ae1e508d = storage.FileType`
        "storage.filePdf" FilePdf = 0xae1e508d {}
        /// `storage.fileMp3#528a0677 = storage.FileType`
        "storage.fileMp3" FileMp3 = 0x528a0677 {}
        /// `storage.fileMov#4b09ebbc = storage.FileType`
        "storage.fileMov" FileMov = 0x4b09ebbc {}
        /// `storage.fileMp4#b3cea0e4 = storage.FileType`
        "storage.fileMp4" FileMp4 = 0xb3cea0e4 {}
        /// `storage.fileWebp#1081464c = storage.FileType`
        "storage.fileWebp" FileWebp = 0x1081464c {}
    }
}

pub mod updates {
    tl_structs! {
        /// `updates.state#a56c2a3e pts:int qts:int date:int seq:int unread_count:int = updates.State`
        "updates.state" State = 0xa56c2a3e {
            pts: i32,
            qts: i32,
            date: i32,
            seq: i32,
            unread_count: i32,
        }
        /// `updates.differenceEmpty#5d75a138 date:int seq:int = updates.Difference`
        "updates.differenceEmpty" DifferenceEmpty = 0x5d75a138 {
            date: i32,
            seq: i32,
        }
        /// `updates.difference#f49ca0 new_messages:Vector<Message> new_encrypted_messages:Vector<EncryptedMessage> other_updates:Vector<Update> chats:Vector<Chat> users:Vector<User> state:updates.State = updates.Difference`
        "updates.difference" Difference = 0x00f49ca0 {
            new_messages: Vec<crate::enums::Message>,
            new_encrypted_messages: Vec<crate::enums::EncryptedMessage>,
            other_updates: Vec<crate::enums::Update>,
            chats: Vec<crate::enums::Chat>,
            users: Vec<crate::enums::User>,
            state: crate::enums::updates::State,
        }
        /// `updates.differenceSlice#a8fb1981 new_messages:Vector<Message> new_encrypted_messages:Vector<EncryptedMessage> other_updates:Vector<Update> chats:Vector<Chat> users:Vector<User> intermediate_state:updates.State = updates.Difference`
        "updates.differenceSlice" DifferenceSlice = 0xa8fb1981 {
            new_messages: Vec<crate::enums::Message>,
            new_encrypted_messages: Vec<crate::enums::EncryptedMessage>,
            other_updates: Vec<crate::enums::Update>,
            chats: Vec<crate::enums::Chat>,
            users: Vec<crate::enums::User>,
            intermediate_state: crate::enums::updates::State,
        }
        /// `updates.differenceTooLong#4afe8f6d pts:int = updates.Difference`
        "updates.differenceTooLong" DifferenceTooLong = 0x4afe8f6d {
            pts: i32,
        }
        /// `updates.channelDifferenceEmpty#3e11affb flags:# final:flags.0?true pts:int timeout:flags.1?int = updates.ChannelDifference`
        "updates.channelDifferenceEmpty" ChannelDifferenceEmpty = 0x3e11affb [flags] {
            #[flag(0)] r#final: bool,
            pts: i32,
            #[flag(1)] timeout: Option<i32>,
        }
        /// `updates.channelDifferenceTooLong flags:# final:flags.0?true timeout:flags.1?int pts:int messages:Vector<Message> chats:Vector<Chat> users:Vector<User> = updates.ChannelDifference`
        "updates.channelDifferenceTooLong" ChannelDifferenceTooLong = 0xf06b2097 [flags] {
            #[flag(0)] r#final: bool,
            #[flag(1)] timeout: Option<i32>,
            pts: i32,
            messages: Vec<crate::enums::Message>,
            chats: Vec<crate::enums::Chat>,
            users: Vec<crate::enums::User>,
        }
        /// `updates.channelDifference#2064674e flags:# final:flags.0?true pts:int timeout:flags.1?int new_messages:Vector<Message> other_updates:Vector<Update> chats:Vector<Chat> users:Vector<User> = updates.ChannelDifference`
        "updates.channelDifference" ChannelDifference = 0x2064674e [flags] {
            #[flag(0)] r#final: bool,
            pts: i32,
            #[flag(1)] timeout: Option<i32>,
            new_messages: Vec<crate::enums::Message>,
            other_updates: Vec<crate::enums::Update>,
            chats: Vec<crate::enums::Chat>,
            users: Vec<crate::enums::User>,
        }
    }
}

pub mod upload {
    tl_structs! {
        /// `upload.file#96a18d5 type:storage.FileType mtime:int bytes:bytes = upload.File`
        "upload.file" File = 0x096a18d5 {
            r#type: crate::enums::storage::FileType,
            mtime: i32,
            bytes: Vec<u8>,
        }
        /// `upload.fileCdnRedirect#f18cda44 dc_id:int file_token:bytes encryption_key:bytes encryption_iv:bytes file_hashes:Vector<FileHash> = upload.File`
        "upload.fileCdnRedirect" FileCdnRedirect = 0xf18cda44 {
            dc_id: i32,
            file_token: Vec<u8>,
            encryption_key: Vec<u8>,
            encryption_iv: Vec<u8>,
            file_hashes: Vec<crate::enums::FileHash>,
        }
        /// `upload.cdnFileReuploadNeeded#eea8e46e request_token:bytes = upload.CdnFile`
        "upload.cdnFileReuploadNeeded" CdnFileReuploadNeeded = 0xeea8e46e {
            request_token: Vec<u8>,
        }
        /// `upload.cdnFile#a99fca4f bytes:bytes = upload.CdnFile`
        "upload.cdnFile" CdnFile = 0xa99fca4f {
            bytes: Vec<u8>,
        }
    }
}
