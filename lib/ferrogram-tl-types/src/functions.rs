// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! All of the functions, each represented by a `struct`.
//!
//! The type Telegram answers with is the associated type of their
//! [`crate::RemoteCall`] implementation.
#![allow(clippy::unreadable_literal)]
use crate::{Identifiable, RemoteCall, Serializable};

tl_functions! {
    /// `req_pq_multi#be7e8ef1 nonce:int128 = ResPQ`
    "req_pq_multi" ReqPqMulti = 0xbe7e8ef1 {
        nonce: [u8; 16],
    } -> crate::enums::ResPq;
    /// `req_DH_params#d712e4be nonce:int128 server_nonce:int128 p:bytes q:bytes public_key_fingerprint:long encrypted_data:bytes = Server_DH_Params`
    "req_DH_params" ReqDhParams = 0xd712e4be {
        nonce: [u8; 16],
        server_nonce: [u8; 16],
        p: Vec<u8>,
        q: Vec<u8>,
        public_key_fingerprint: i64,
        encrypted_data: Vec<u8>,
    } -> crate::enums::ServerDhParams;
    /// `set_client_DH_params#f5045f1f nonce:int128 server_nonce:int128 encrypted_data:bytes = Set_client_DH_params_answer`
    "set_client_DH_params" SetClientDhParams = 0xf5045f1f {
        nonce: [u8; 16],
        server_nonce: [u8; 16],
        encrypted_data: Vec<u8>,
    } -> crate::enums::SetClientDhParamsAnswer;
    /// `rpc_drop_answer#58e4a740 req_msg_id:long = RpcDropAnswer`
    "rpc_drop_answer" RpcDropAnswer = 0x58e4a740 {
        req_msg_id: i64,
    } -> crate::enums::RpcDropAnswer;
    /// `get_future_salts#b921bd04 num:int = FutureSalts`
    "get_future_salts" GetFutureSalts = 0xb921bd04 {
        num: i32,
    } -> crate::enums::FutureSalts;
    /// `ping#7abe77ec ping_id:long = Pong`
    "ping" Ping = 0x7abe77ec {
        ping_id: i64,
    } -> crate::enums::Pong;
    /// `ping_delay_disconnect#f3427b8c ping_id:long disconnect_delay:int = Pong`
    "ping_delay_disconnect" PingDelayDisconnect = 0xf3427b8c {
        ping_id: i64,
        disconnect_delay: i32,
    } -> crate::enums::Pong;
    /// `destroy_session#e7512126 session_id:long = DestroySessionRes`
    "destroy_session" DestroySession = 0xe7512126 {
        session_id: i64,
    } -> crate::enums::DestroySessionRes;
}

pub mod account {
    tl_functions! {
        /// `account.getPassword#548a30f5 = account.Password`
        "account.getPassword" GetPassword = 0x548a30f5 {} -> crate::enums::account::Password;
    }
}

pub mod auth {
    tl_functions! {
        /// `auth.sendCode#a677244f phone_number:string api_id:int api_hash:string settings:CodeSettings = auth.SentCode`
        "auth.sendCode" SendCode = 0xa677244f {
            phone_number: String,
            api_id: i32,
            api_hash: String,
            settings: crate::enums::CodeSettings,
        } -> crate::enums::auth::SentCode;
        /// `auth.signIn#8d52a951 flags:# phone_number:string phone_code_hash:string phone_code:flags.0?string = auth.Authorization`
        "auth.signIn" SignIn = 0x8d52a951 [flags] {
            phone_number: String,
            phone_code_hash: String,
            #[flag(0)] phone_code: Option<String>,
        } -> crate::enums::auth::Authorization;
        /// `auth.logOut#3e72ba19 = auth.LoggedOut`
        "auth.logOut" LogOut = 0x3e72ba19 {} -> crate::enums::auth::LoggedOut;
        /// `auth.exportAuthorization#e5bfffcd dc_id:int = auth.ExportedAuthorization`
        "auth.exportAuthorization" ExportAuthorization = 0xe5bfffcd {
            dc_id: i32,
        } -> crate::enums::auth::ExportedAuthorization;
        /// `auth.importAuthorization#a57a7dad id:long bytes:bytes = auth.Authorization`
        "auth.importAuthorization" ImportAuthorization = 0xa57a7dad {
            id: i64,
            bytes: Vec<u8>,
        } -> crate::enums::auth::Authorization;
        /// `auth.importBotAuthorization#67a3ff2c flags:int api_id:int api_hash:string bot_auth_token:string = auth.Authorization`
        "auth.importBotAuthorization" ImportBotAuthorization = 0x67a3ff2c {
            flags: i32,
            api_id: i32,
            api_hash: String,
            bot_auth_token: String,
        } -> crate::enums::auth::Authorization;
        /// `auth.checkPassword#d18b4d16 password:InputCheckPasswordSRP = auth.Authorization`
        "auth.checkPassword" CheckPassword = 0xd18b4d16 {
            password: crate::enums::InputCheckPasswordSrp,
        } -> crate::enums::auth::Authorization;
    }
}

pub mod channels {
    tl_functions! {
        /// `channels.getMessages#ad8c9a23 channel:InputChannel id:Vector<InputMessage> = messages.Messages`
        "channels.getMessages" GetMessages = 0xad8c9a23 {
            channel: crate::enums::InputChannel,
            id: Vec<crate::enums::InputMessage>,
        } -> crate::enums::messages::Messages;
    }
}

pub mod contacts {
    tl_functions! {
        /// `contacts.resolveUsername#f93ccba3 username:string = contacts.ResolvedPeer`
        "contacts.resolveUsername" ResolveUsername = 0xf93ccba3 {
            username: String,
        } -> crate::enums::contacts::ResolvedPeer;
    }
}

pub mod help {
    tl_functions! {
        /// `help.getConfig#c4f9186b = Config`
        "help.getConfig" GetConfig = 0xc4f9186b {} -> crate::enums::Config;
        /// `help.getCdnConfig#52029342 = CdnConfig`
        "help.getCdnConfig" GetCdnConfig = 0x52029342 {} -> crate::enums::CdnConfig;
    }
}

pub mod messages {
    tl_functions! {
        /// `messages.getMessages#63c66506 id:Vector<InputMessage> = messages.Messages`
        "messages.getMessages" GetMessages = 0x63c66506 {
            id: Vec<crate::enums::InputMessage>,
        } -> crate::enums::messages::Messages;
        /// `messages.sendMessage#983f9745 flags:# no_webpage:flags.1?true silent:flags.5?true background:flags.6?true clear_draft:flags.7?true noforwards:flags.14?true peer:InputPeer message:string random_id:long schedule_date:flags.10?int = Updates`
        "messages.sendMessage" SendMessage = 0x983f9745 [flags] {
            #[flag(1)] no_webpage: bool,
            #[flag(5)] silent: bool,
            #[flag(6)] background: bool,
            #[flag(7)] clear_draft: bool,
            #[flag(14)] noforwards: bool,
            peer: crate::enums::InputPeer,
            message: String,
            random_id: i64,
            #[flag(10)] schedule_date: Option<i32>,
        } -> crate::enums::Updates;
    }
}

pub mod updates {
    tl_functions! {
        /// `updates.getState#edd4882a = updates.State`
        "updates.getState" GetState = 0xedd4882a {} -> crate::enums::updates::State;
        /// `updates.getDifference#19c2f763 flags:# pts:int pts_limit:flags.1?int pts_total_limit:flags.0?int date:int qts:int qts_limit:flags.2?int = updates.Difference`
        "updates.getDifference" GetDifference = 0x19c2f763 [flags] {
            pts: i32,
            #[flag(1)] pts_limit: Option<i32>,
            #[flag(0)] pts_total_limit: Option<i32>,
            date: i32,
            qts: i32,
            #[flag(2)] qts_limit: Option<i32>,
        } -> crate::enums::updates::Difference;
        /// `updates.getChannelDifference#3173d78 flags:# force:flags.0?true channel:InputChannel filter:ChannelMessagesFilter pts:int limit:int = updates.ChannelDifference`
        "updates.getChannelDifference" GetChannelDifference = 0x03173d78 [flags] {
            #[flag(0)] force: bool,
            channel: crate::enums::InputChannel,
            filter: crate::enums::ChannelMessagesFilter,
            pts: i32,
            limit: i32,
        } -> crate::enums::updates::ChannelDifference;
    }
}

pub mod upload {
    tl_functions! {
        /// `upload.saveFilePart#b304a621 file_id:long file_part:int bytes:bytes = Bool`
        "upload.saveFilePart" SaveFilePart = 0xb304a621 {
            file_id: i64,
            file_part: i32,
            bytes: Vec<u8>,
        } -> bool;
        /// `upload.getFile#be5335be flags:# precise:flags.0?true cdn_supported:flags.1?true location:InputFileLocation offset:long limit:int = upload.File`
        "upload.getFile" GetFile = 0xbe5335be [flags] {
            #[flag(0)] precise: bool,
            #[flag(1)] cdn_supported: bool,
            location: crate::enums::InputFileLocation,
            offset: i64,
            limit: i32,
        } -> crate::enums::upload::File;
        /// `upload.saveBigFilePart#de7b673d file_id:long file_part:int file_total_parts:int bytes:bytes = Bool`
        "upload.saveBigFilePart" SaveBigFilePart = 0xde7b673d {
            file_id: i64,
            file_part: i32,
            file_total_parts: i32,
            bytes: Vec<u8>,
        } -> bool;
        /// `upload.getCdnFile#395f69da file_token:bytes offset:long limit:int = upload.CdnFile`
        "upload.getCdnFile" GetCdnFile = 0x395f69da {
            file_token: Vec<u8>,
            offset: i64,
            limit: i32,
        } -> crate::enums::upload::CdnFile;
        /// `upload.reuploadCdnFile#9b2754a8 file_token:bytes request_token:bytes = Vector<FileHash>`
        "upload.reuploadCdnFile" ReuploadCdnFile = 0x9b2754a8 {
            file_token: Vec<u8>,
            request_token: Vec<u8>,
        } -> Vec<crate::enums::FileHash>;
        /// `upload.getCdnFileHashes#91dc3f31 file_token:bytes offset:long = Vector<FileHash>`
        "upload.getCdnFileHashes" GetCdnFileHashes = 0x91dc3f31 {
            file_token: Vec<u8>,
            offset: i64,
        } -> Vec<crate::enums::FileHash>;
    }
}

pub mod users {
    tl_functions! {
        /// `users.getUsers#d91a548 id:Vector<InputUser> = Vector<User>`
        "users.getUsers" GetUsers = 0x0d91a548 {
            id: Vec<crate::enums::InputUser>,
        } -> Vec<crate::enums::User>;
    }
}

/// `invokeAfterMsg#cb9f372d {X:Type} msg_id:long query:!X = X`
#[derive(Clone, Debug, PartialEq)]
pub struct InvokeAfterMsg<X: RemoteCall> {
    pub msg_id: i64,
    pub query: X,
}

/// `invokeWithLayer#da9b0d0d {X:Type} layer:int query:!X = X`
#[derive(Clone, Debug, PartialEq)]
pub struct InvokeWithLayer<X: RemoteCall> {
    pub layer: i32,
    pub query: X,
}

/// `initConnection#c1cd5ea9 {X:Type} flags:# api_id:int device_model:string system_version:string app_version:string system_lang_code:string lang_pack:string lang_code:string query:!X = X`
///
/// The `proxy` and `params` conditional fields are never sent.
#[derive(Clone, Debug, PartialEq)]
pub struct InitConnection<X: RemoteCall> {
    pub api_id: i32,
    pub device_model: String,
    pub system_version: String,
    pub app_version: String,
    pub system_lang_code: String,
    pub lang_pack: String,
    pub lang_code: String,
    pub query: X,
}

impl<X: RemoteCall> Identifiable for InvokeAfterMsg<X> {
    const CONSTRUCTOR_ID: u32 = 0xcb9f372d;
}

impl<X: RemoteCall> Identifiable for InvokeWithLayer<X> {
    const CONSTRUCTOR_ID: u32 = 0xda9b0d0d;
}

impl<X: RemoteCall> Identifiable for InitConnection<X> {
    const CONSTRUCTOR_ID: u32 = 0xc1cd5ea9;
}

impl<X: RemoteCall> Serializable for InvokeAfterMsg<X> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.msg_id.serialize(buf);
        self.query.serialize(buf);
    }
}

impl<X: RemoteCall> Serializable for InvokeWithLayer<X> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.layer.serialize(buf);
        self.query.serialize(buf);
    }
}

impl<X: RemoteCall> Serializable for InitConnection<X> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        0u32.serialize(buf);
        self.api_id.serialize(buf);
        self.device_model.serialize(buf);
        self.system_version.serialize(buf);
        self.app_version.serialize(buf);
        self.system_lang_code.serialize(buf);
        self.lang_pack.serialize(buf);
        self.lang_code.serialize(buf);
        self.query.serialize(buf);
    }
}

impl<X: RemoteCall> RemoteCall for InvokeAfterMsg<X> {
    type Return = X::Return;
}

impl<X: RemoteCall> RemoteCall for InvokeWithLayer<X> {
    type Return = X::Return;
}

impl<X: RemoteCall> RemoteCall for InitConnection<X> {
    type Return = X::Return;
}

pub(crate) const GENERIC_CONSTRUCTORS: &[(u32, &str)] = &[
    (0xcb9f372d, "invokeAfterMsg"),
    (0xda9b0d0d, "invokeWithLayer"),
    (0xc1cd5ea9, "initConnection"),
];
