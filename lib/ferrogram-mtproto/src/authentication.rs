// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Negotiation of a new authorization key with a server.
//!
//! The exchange takes three round trips. Every step function returns the
//! request to send and the state needed to process its response:
//!
//! ```no_run
//! use ferrogram_mtproto::authentication::{self, Finished};
//!
//! fn exchange(request: &[u8]) -> Result<Vec<u8>, authentication::Error> {
//!     unimplemented!()
//! }
//!
//! fn main() -> Result<(), authentication::Error> {
//!     let (req_pq, state) = authentication::step1()?;
//!     let (req_dh, state) = authentication::step2(state, &exchange(&req_pq)?)?;
//!     let (set_dh, state) = authentication::step3(state, &exchange(&req_dh)?)?;
//!     let Finished { auth_key, .. } = authentication::create_key(state, &exchange(&set_dh)?)?;
//!     # let _ = auth_key;
//!     Ok(())
//! }
//! ```
use ferrogram_crypto::hex;
use ferrogram_crypto::two_factor_auth::{check_g_in_range, check_p_and_g};
use ferrogram_crypto::{AuthKey, factorize::factorize, rsa};
use ferrogram_tl_types::{self as tl, Cursor, Deserializable, RemoteCall, Serializable};
use log::trace;
use num_bigint::BigUint;
use sha1::{Digest, Sha1};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Random bytes consumed by [`step2`]: the new nonce, then RSA padding.
const STEP2_RANDOM: usize = 32 + 224;

/// Random bytes consumed by [`step3`]: the secret exponent, then padding.
const STEP3_RANDOM: usize = 256 + 16;

/// Why a key exchange was aborted.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A response could not be parsed.
    InvalidResponse { error: tl::deserialize::Error },
    /// A value echoed or hashed by the server differs from ours.
    ///
    /// `field` is one of `nonce`, `server_nonce`, `new_nonce_hash` or
    /// `answer_hash`.
    Mismatch {
        field: &'static str,
        got: Vec<u8>,
        expected: Vec<u8>,
    },
    /// `pq` must fit in 64 bits.
    InvalidPQSize { size: usize },
    InvalidPQ { pq: u64 },
    /// None of the offered keys is one we trust.
    UnknownFingerprints { fingerprints: Vec<i64> },
    /// The server answered `server_DH_params_fail`.
    DHParamsFail,
    /// The encrypted answer is not a whole number of AES blocks.
    EncryptedResponseNotPadded { len: usize },
    InvalidDhInnerData { error: tl::deserialize::Error },
    UnsafeDhPrime { g: i32 },
    /// `g_a` or `g_b` fell outside the safe range.
    GParameterOutOfRange { name: &'static str },
    DHGenRetry,
    DHGenFail,
}

impl Error {
    /// Whether starting the exchange over could succeed.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::DHParamsFail | Self::DHGenRetry | Self::GParameterOutOfRange { .. }
        )
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidResponse { error } | Self::InvalidDhInnerData { error } => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidResponse { error } => write!(f, "bad handshake response: {error}"),
            Self::Mismatch {
                field,
                got,
                expected,
            } => write!(
                f,
                "{field} mismatch: server sent {}, expected {}",
                hex::to_hex(got),
                hex::to_hex(expected)
            ),
            Self::InvalidPQSize { size } => write!(f, "pq is {size} bytes long"),
            Self::InvalidPQ { pq } => write!(f, "could not factorize pq {pq}"),
            Self::UnknownFingerprints { fingerprints } => {
                write!(f, "no trusted key among fingerprints {fingerprints:?}")
            }
            Self::DHParamsFail => f.write_str("server refused to send dh params"),
            Self::EncryptedResponseNotPadded { len } => {
                write!(f, "encrypted answer of {len} bytes is not block aligned")
            }
            Self::InvalidDhInnerData { error } => write!(f, "bad dh inner data: {error}"),
            Self::UnsafeDhPrime { g } => write!(f, "unsafe dh prime for g = {g}"),
            Self::GParameterOutOfRange { name } => write!(f, "{name} out of the safe range"),
            Self::DHGenRetry => f.write_str("server asked to retry dh generation"),
            Self::DHGenFail => f.write_str("server failed dh generation"),
        }
    }
}

impl From<tl::deserialize::Error> for Error {
    fn from(error: tl::deserialize::Error) -> Self {
        Self::InvalidResponse { error }
    }
}

fn ensure_eq(field: &'static str, got: &[u8], expected: &[u8]) -> Result<(), Error> {
    if got == expected {
        return Ok(());
    }
    Err(Error::Mismatch {
        field,
        got: got.to_vec(),
        expected: expected.to_vec(),
    })
}

fn random<const N: usize>() -> [u8; N] {
    let mut buffer = [0; N];
    getrandom::fill(&mut buffer).expect("os random source unavailable");
    buffer
}

/// State after sending `req_pq_multi`.
pub struct Step1 {
    nonce: [u8; 16],
}

/// State after sending `req_DH_params`.
pub struct Step2 {
    nonce: [u8; 16],
    server_nonce: [u8; 16],
    new_nonce: [u8; 32],
}

/// State after sending `set_client_DH_params`.
pub struct Step3 {
    nonce: [u8; 16],
    server_nonce: [u8; 16],
    new_nonce: [u8; 32],
    gab: BigUint,
    time_offset: i32,
}

/// Outcome of a successful exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct Finished {
    pub auth_key: [u8; 256],
    /// Seconds to add to the local clock to match the server's.
    pub time_offset: i32,
    pub first_salt: i64,
}

/// Starts an exchange with a fresh nonce.
pub fn step1() -> Result<(Vec<u8>, Step1), Error> {
    do_step1(&random())
}

// Randomness and time are parameters below so the exchange can be replayed.
fn do_step1(nonce: &[u8; 16]) -> Result<(Vec<u8>, Step1), Error> {
    trace!("handshake: sending nonce {}", hex::to_hex(nonce));
    let request = tl::functions::ReqPqMulti { nonce: *nonce }.to_bytes();
    Ok((request, Step1 { nonce: *nonce }))
}

/// Handles `resPQ`: factorizes `pq` and sends the RSA encrypted inner data.
pub fn step2(state: Step1, response: &[u8]) -> Result<(Vec<u8>, Step2), Error> {
    do_step2(state, response, &[], &random())
}

/// Like [`step2`], also accepting the given keys. CDN datacenters only
/// know the keys announced by `help.getCdnConfig`.
pub fn step2_with_keys(
    state: Step1,
    response: &[u8],
    extra_keys: &[rsa::Key],
) -> Result<(Vec<u8>, Step2), Error> {
    do_step2(state, response, extra_keys, &random())
}

/// Big-endian bytes without the leading zeros. The server rejects `p` and
/// `q` in any longer form.
fn minimal_be_bytes(n: u64) -> Vec<u8> {
    let skip = (n.leading_zeros() / 8).min(7) as usize;
    n.to_be_bytes()[skip..].to_vec()
}

fn do_step2(
    state: Step1,
    response: &[u8],
    extra_keys: &[rsa::Key],
    random: &[u8; STEP2_RANDOM],
) -> Result<(Vec<u8>, Step2), Error> {
    let nonce = state.nonce;
    let tl::enums::ResPq::ResPq(res_pq) =
        <tl::functions::ReqPqMulti as RemoteCall>::Return::from_bytes(response)?;
    ensure_eq("nonce", &res_pq.nonce, &nonce)?;
    let server_nonce = res_pq.server_nonce;

    let size = res_pq.pq.len();
    if !(1..=8).contains(&size) {
        return Err(Error::InvalidPQSize { size });
    }
    let mut pq_bytes = [0; 8];
    pq_bytes[8 - size..].copy_from_slice(&res_pq.pq);
    let pq = u64::from_be_bytes(pq_bytes);
    let (p, q) = factorize(pq).ok_or(Error::InvalidPQ { pq })?;
    let (p, q) = (minimal_be_bytes(p), minimal_be_bytes(q));

    let mut new_nonce = [0; 32];
    new_nonce.copy_from_slice(&random[..32]);
    let mut rsa_padding = [0; 256];
    rsa_padding[..224].copy_from_slice(&random[32..]);

    let Some((fingerprint, key)) = res_pq
        .server_public_key_fingerprints
        .iter()
        .find_map(|&fp| key_for_fingerprint(fp, extra_keys).map(|key| (fp, key)))
    else {
        return Err(Error::UnknownFingerprints {
            fingerprints: res_pq.server_public_key_fingerprints,
        });
    };

    let inner = tl::enums::PQInnerData::from(tl::types::PQInnerData {
        pq: res_pq.pq,
        p: p.clone(),
        q: q.clone(),
        nonce,
        server_nonce,
        new_nonce,
    });
    let encrypted_data = rsa::encrypt_hashed(&inner.to_bytes(), &key, &rsa_padding);
    trace!("handshake: encrypted inner data with key {fingerprint}");

    let request = tl::functions::ReqDhParams {
        nonce,
        server_nonce,
        p,
        q,
        public_key_fingerprint: fingerprint,
        encrypted_data,
    };
    let state = Step2 {
        nonce,
        server_nonce,
        new_nonce,
    };
    Ok((request.to_bytes(), state))
}

/// Handles `server_DH_params`: checks the prime and sends our half of the
/// Diffie-Hellman exchange.
pub fn step3(state: Step2, response: &[u8]) -> Result<(Vec<u8>, Step3), Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |since| since.as_secs() as i32);
    do_step3(state, response, &random(), now)
}

fn do_step3(
    state: Step2,
    response: &[u8],
    random: &[u8; STEP3_RANDOM],
    now: i32,
) -> Result<(Vec<u8>, Step3), Error> {
    let Step2 {
        nonce,
        server_nonce,
        new_nonce,
    } = state;

    let params = match <tl::functions::ReqDhParams as RemoteCall>::Return::from_bytes(response)? {
        tl::enums::ServerDhParams::Ok(params) => params,
        tl::enums::ServerDhParams::Fail(fail) => {
            // A failure is only believed if it proves it knows the new nonce.
            ensure_eq("nonce", &fail.nonce, &nonce)?;
            ensure_eq("server_nonce", &fail.server_nonce, &server_nonce)?;
            let digest = Sha1::digest(new_nonce);
            ensure_eq("new_nonce_hash", &fail.new_nonce_hash, &digest[4..])?;
            return Err(Error::DHParamsFail);
        }
    };
    ensure_eq("nonce", &params.nonce, &nonce)?;
    ensure_eq("server_nonce", &params.server_nonce, &server_nonce)?;

    let len = params.encrypted_answer.len();
    if len % 16 != 0 || len < 32 {
        return Err(Error::EncryptedResponseNotPadded { len });
    }

    let (key, iv) = ferrogram_crypto::generate_key_data_from_nonce(&server_nonce, &new_nonce);
    // Layout: sha1 of the inner data, the inner data, then padding.
    let answer = ferrogram_crypto::decrypt_ige(&params.encrypted_answer, &key, &iv);
    let (answer_hash, rest) = answer.split_at(20);

    let mut cursor = Cursor::from_slice(rest);
    let tl::enums::ServerDhInnerData::ServerDhInnerData(inner) =
        tl::enums::ServerDhInnerData::deserialize(&mut cursor)
            .map_err(|error| Error::InvalidDhInnerData { error })?;
    let digest = Sha1::digest(&rest[..cursor.pos()]);
    ensure_eq("answer_hash", answer_hash, &digest)?;
    ensure_eq("nonce", &inner.nonce, &nonce)?;
    ensure_eq("server_nonce", &inner.server_nonce, &server_nonce)?;

    if !check_p_and_g(&inner.dh_prime, inner.g) {
        return Err(Error::UnsafeDhPrime { g: inner.g });
    }

    let prime = BigUint::from_bytes_be(&inner.dh_prime);
    let b = BigUint::from_bytes_be(&random[..256]);
    let g_b = BigUint::from(inner.g as u32).modpow(&b, &prime).to_bytes_be();
    let gab = BigUint::from_bytes_be(&inner.g_a).modpow(&b, &prime);

    // https://core.telegram.org/mtproto/auth_key#dh-key-exchange-complete
    for (name, value) in [("g_a", inner.g_a.as_slice()), ("g_b", g_b.as_slice())] {
        if !check_g_in_range(value, &inner.dh_prime) {
            return Err(Error::GParameterOutOfRange { name });
        }
    }

    let client_inner = tl::enums::ClientDhInnerData::from(tl::types::ClientDhInnerData {
        nonce,
        server_nonce,
        retry_id: 0,
        g_b,
    })
    .to_bytes();

    let mut plain = Sha1::digest(&client_inner).to_vec();
    plain.extend(&client_inner);
    // Padding comes from the given randomness so the output is reproducible.
    let padding = plain.len().next_multiple_of(16) - plain.len();
    plain.extend(&random[256..256 + padding]);
    let encrypted_data = ferrogram_crypto::encrypt_ige(&plain, &key, &iv);

    let time_offset = inner.server_time - now;
    trace!("handshake: server clock is {time_offset}s ahead");

    let request = tl::functions::SetClientDhParams {
        nonce,
        server_nonce,
        encrypted_data,
    };
    let state = Step3 {
        nonce,
        server_nonce,
        new_nonce,
        gab,
        time_offset,
    };
    Ok((request.to_bytes(), state))
}

/// Handles the `dh_gen_*` answer and derives the key and first salt.
pub fn create_key(state: Step3, response: &[u8]) -> Result<Finished, Error> {
    use tl::enums::SetClientDhParamsAnswer as Answer;

    let Step3 {
        nonce,
        server_nonce,
        new_nonce,
        gab,
        time_offset,
    } = state;

    let (answer_nonce, answer_server_nonce, hash, number) =
        match <tl::functions::SetClientDhParams as RemoteCall>::Return::from_bytes(response)? {
            Answer::DhGenOk(a) => (a.nonce, a.server_nonce, a.new_nonce_hash1, 1),
            Answer::DhGenRetry(a) => (a.nonce, a.server_nonce, a.new_nonce_hash2, 2),
            Answer::DhGenFail(a) => (a.nonce, a.server_nonce, a.new_nonce_hash3, 3),
        };
    ensure_eq("nonce", &answer_nonce, &nonce)?;
    ensure_eq("server_nonce", &answer_server_nonce, &server_nonce)?;

    // Left-pad in case `gab` has leading zero bytes.
    let gab = gab.to_bytes_be();
    let mut key = [0; 256];
    key[256 - gab.len()..].copy_from_slice(&gab);
    let auth_key = AuthKey::from_bytes(key);

    ensure_eq(
        "new_nonce_hash",
        &hash,
        &auth_key.calc_new_nonce_hash(&new_nonce, number),
    )?;

    match number {
        1 => {}
        2 => return Err(Error::DHGenRetry),
        _ => return Err(Error::DHGenFail),
    }

    let mut salt = [0; 8];
    for (i, byte) in salt.iter_mut().enumerate() {
        *byte = new_nonce[i] ^ server_nonce[i];
    }
    trace!("handshake: created auth key {:x}", auth_key.id());
    Ok(Finished {
        auth_key: auth_key.to_bytes(),
        time_offset,
        first_salt: i64::from_le_bytes(salt),
    })
}

/// Public keys used by the production and test servers, respectively.
#[allow(clippy::unreadable_literal)]
const SERVER_KEYS: [(&str, &str); 2] = [
    ("29379598170669337022986177149456128565388431120058863768162556424047512191330847455146576344487764408661701890505066208632169112269581063774293102577308490531282748465986139880977280302242772832972539403531316010870401287642763009136156734339538042419388722777357134487746169093539093850251243897188928735903389451772730245253062963384108812842079887538976360465290946139638691491496062099570836476454855996319192747663615955633778034897140982517446405334423701359108810182097749467210509584293428076654573384828809574217079944388301239431309115013843331317877374435868468779972014486325557807783825502498215169806323", "65537"),
    ("25342889448840415564971689590713473206898847759084779052582026594546022463853940585885215951168491965708222649399180603818074200620463776135424884632162512403163793083921641631564740959529419359595852941166848940585952337613333022396096584117954892216031229237302943701877588456738335398602461675225081791820393153757504952636234951323237820036543581047826906120927972487366805292115792231423684261262330394324750785450942589751755390156647751460719351439969059949569615302809050721500330239005077889855323917509948255722081644689442127297605422579707142646660768825302832201908302295573257427896031830742328565032949", "65537"),
];

/// The fingerprint of a key is the lower 64 bits of the SHA1 of its
/// modulus and exponent, each serialized as a byte string.
fn fingerprint(key: &rsa::Key) -> i64 {
    let (n, e) = key.components();
    let mut hasher = Sha1::new();
    hasher.update(n.to_bytes());
    hasher.update(e.to_bytes());
    let sha: [u8; 20] = hasher.finalize().into();

    let mut buffer = [0; 8];
    buffer.copy_from_slice(&sha[12..20]);
    i64::from_le_bytes(buffer)
}

fn key_for_fingerprint(fingerprint_to_find: i64, extra_keys: &[rsa::Key]) -> Option<rsa::Key> {
    SERVER_KEYS
        .iter()
        .filter_map(|(n, e)| rsa::Key::new(n, e))
        .chain(extra_keys.iter().cloned())
        .find(|key| fingerprint(key) == fingerprint_to_find)
}
