// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use ferrogram_tl_types::{
    Deserializable, Identifiable, RemoteCall, Serializable, enums, functions, name_for_id, types,
};
use regex::Regex;
use std::fs;

struct Definition {
    name: String,
    explicit_id: Option<u32>,
    derived_id: u32,
}

/// Normalizes a definition the way Telegram does before hashing it into
/// the constructor identifier.
fn normalize(line: &str) -> String {
    let line = line.trim().trim_end_matches(';').trim();
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
    let name = head.split('#').next().unwrap();

    let generics = Regex::new(r"\{[^}]*\}\s*").unwrap();
    let true_flags = Regex::new(r" \w+:flags\d*\.\d+\?true").unwrap();
    let bytes = Regex::new(r"([:?<])bytes\b").unwrap();
    let spaces = Regex::new(r"\s+").unwrap();

    let line = format!("{name} {rest}");
    let line = generics.replace_all(&line, "");
    let line = true_flags.replace_all(&line, "");
    let line = bytes.replace_all(&line, "${1}string");
    let line = line.replace('<', " ").replace('>', "");
    spaces.replace_all(&line, " ").trim().to_string()
}

fn load(path: &str) -> Vec<Definition> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//") && !line.starts_with("---"))
        .map(|line| {
            let head = line.split(' ').next().unwrap();
            let (name, explicit_id) = match head.split_once('#') {
                Some((name, id)) => (name, Some(u32::from_str_radix(id, 16).unwrap())),
                None => (head, None),
            };
            Definition {
                name: name.to_string(),
                explicit_id,
                derived_id: crc32fast::hash(normalize(line).as_bytes()),
            }
        })
        .collect()
}

fn all_definitions() -> Vec<Definition> {
    let mut definitions = load("tl/mtproto.tl");
    definitions.extend(load("tl/api.tl"));
    definitions
}

#[test]
fn check_normalization() {
    assert_eq!(
        normalize("inputPeerUser#dde8a54c user_id:long access_hash:long = InputPeer;"),
        "inputPeerUser user_id:long access_hash:long = InputPeer"
    );
    assert_eq!(
        normalize("msgs_ack#62d6b459 msg_ids:Vector<long> = MsgsAck;"),
        "msgs_ack msg_ids:Vector long = MsgsAck"
    );
    assert_eq!(crc32fast::hash(b"msgs_ack msg_ids:Vector long = MsgsAck"), 0x62d6b459);
}

#[test]
fn check_every_definition_is_known() {
    let definitions = all_definitions();
    assert!(definitions.len() > 150);

    for definition in definitions {
        let id = definition.explicit_id.unwrap_or(definition.derived_id);
        assert_eq!(
            name_for_id(id),
            Some(definition.name.as_str()),
            "wrong or missing constructor {id:08x}"
        );
    }
}

#[test]
fn check_unreduced_definitions_hash_to_their_id() {
    // Definitions whose conditional fields were trimmed keep the official
    // identifier, so only those listed in full can be checked.
    for name in ["resPQ", "bad_server_salt", "inputPeerUser", "upload.fileCdnRedirect"] {
        let definition = all_definitions()
            .into_iter()
            .find(|d| d.name == name)
            .unwrap();
        assert_eq!(definition.explicit_id, Some(definition.derived_id), "{name}");
    }
}

#[test]
fn check_flags_are_computed_from_fields() {
    let request = functions::messages::SendMessage {
        no_webpage: false,
        silent: true,
        background: false,
        clear_draft: false,
        noforwards: false,
        peer: enums::InputPeer::PeerSelf(types::InputPeerSelf {}),
        message: "Hi".to_string(),
        random_id: 7,
        schedule_date: Some(1),
    };
    let bytes = request.to_bytes();

    assert_eq!(
        bytes[..4],
        functions::messages::SendMessage::CONSTRUCTOR_ID.to_le_bytes()
    );
    let flags = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    assert_eq!(flags, (1 << 5) | (1 << 10));
    assert_eq!(bytes[8..12], types::InputPeerSelf::CONSTRUCTOR_ID.to_le_bytes());
    assert_eq!(bytes[12..16], [0x02, b'H', b'i', 0x00]);
    assert_eq!(bytes[16..24], 7i64.to_le_bytes());
    assert_eq!(bytes[24..], 1i32.to_le_bytes());
    assert_eq!(functions::messages::SendMessage::from_bytes(&bytes), Ok(request));
}

#[test]
fn check_absent_conditional_fields_are_skipped() {
    let user = types::User {
        is_self: true,
        contact: false,
        deleted: false,
        bot: true,
        min: false,
        id: 123,
        access_hash: None,
        first_name: Some("bot".to_string()),
        last_name: None,
        username: None,
        phone: None,
        status: None,
    };
    let bytes = user.to_bytes();
    // flags, id, first_name
    assert_eq!(bytes.len(), 4 + 8 + 4);
    assert_eq!(types::User::from_bytes(&bytes), Ok(user));
}

#[test]
fn check_nested_boxed_values() {
    let updates = enums::Updates::UpdateShort(types::UpdateShort {
        update: enums::Update::DeleteChannelMessages(types::UpdateDeleteChannelMessages {
            channel_id: 100,
            messages: vec![1, 2, 3],
            pts: 42,
            pts_count: 3,
        }),
        date: 1_700_000_000,
    });
    let bytes = updates.to_bytes();
    assert_eq!(enums::Updates::from_bytes(&bytes), Ok(updates));
    assert!(enums::Updates::CONSTRUCTOR_IDS.contains(&types::UpdateShort::CONSTRUCTOR_ID));
}

#[test]
fn check_wrapped_query_returns_inner_type() {
    fn returns<R: RemoteCall<Return = enums::Config>>(_: &R) {}

    let request = functions::InvokeWithLayer {
        layer: ferrogram_tl_types::LAYER,
        query: functions::InitConnection {
            api_id: 1,
            device_model: "pc".to_string(),
            system_version: "linux".to_string(),
            app_version: "0.1.0".to_string(),
            system_lang_code: "en".to_string(),
            lang_pack: String::new(),
            lang_code: "en".to_string(),
            query: functions::help::GetConfig {},
        },
    };
    returns(&request);

    let bytes = request.to_bytes();
    assert_eq!(bytes[..4], 0xda9b0d0du32.to_le_bytes());
    assert_eq!(bytes[8..12], 0xc1cd5ea9u32.to_le_bytes());
    assert_eq!(bytes[bytes.len() - 4..], 0xc4f9186bu32.to_le_bytes());
}

#[test]
fn check_functions_without_fields_are_only_their_id() {
    let request = functions::help::GetCdnConfig {};
    assert_eq!(request.to_bytes(), 0x52029342u32.to_le_bytes());
    assert_eq!(
        functions::help::GetCdnConfig::from_bytes(&0x52029342u32.to_le_bytes()),
        Ok(request)
    );
    assert!(functions::help::GetCdnConfig::from_bytes(&0xc4f9186bu32.to_le_bytes()).is_err());
}
