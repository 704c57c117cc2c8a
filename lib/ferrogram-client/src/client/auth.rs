// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Logging in as a user (code, then optional 2FA password) or as a bot.

use std::fmt;
use std::io;

use ferrogram_crypto::two_factor_auth::{SrpParams, calculate_2fa, check_g_in_range, check_p_and_g};
use ferrogram_mtsender::InvocationError;
use ferrogram_session::types::{LoggedInUser, PeerInfo, UpdateState, UpdatesState};
use ferrogram_tl_types as tl;
use log::{info, warn};

use super::Client;
use crate::peer::User;

type SrpAlgo = tl::types::PasswordKdfAlgoSha256Sha256Pbkdf2Hmacsha512iter100000Sha256ModPow;

/// Why [`Client::sign_in`], [`Client::check_password`] or
/// [`Client::bot_sign_in`] did not produce a logged-in user.
#[derive(Debug)]
#[allow(clippy::large_enum_variant)]
pub enum SignInError {
    /// The phone number has no account yet. Accounts can only be created
    /// from official apps.
    SignUpRequired,
    /// The code was right, but the account also has a password. Pass the
    /// token to [`Client::check_password`].
    PasswordRequired(PasswordToken),
    InvalidCode,
    /// The password was wrong. The token can be used for another attempt.
    InvalidPassword(PasswordToken),
    /// The SRP group sent by the server did not pass validation, even after
    /// fetching it a second time.
    BadPasswordParameters,
    Other(InvocationError),
}

impl fmt::Display for SignInError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignUpRequired => f.write_str("account does not exist, sign up from an official app"),
            Self::PasswordRequired(_) => f.write_str("account is protected by a password"),
            Self::InvalidCode => f.write_str("login code is invalid or expired"),
            Self::InvalidPassword(_) => f.write_str("password is incorrect"),
            Self::BadPasswordParameters => f.write_str("server sent unsafe SRP parameters"),
            Self::Other(e) => write!(f, "sign in failed: {e}"),
        }
    }
}

impl std::error::Error for SignInError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Other(e) => Some(e),
            _ => None,
        }
    }
}

impl From<InvocationError> for SignInError {
    fn from(error: InvocationError) -> Self {
        Self::Other(error)
    }
}

/// Returned by [`Client::request_login_code`], consumed by [`Client::sign_in`].
#[derive(Clone, Debug)]
pub struct LoginToken {
    pub(crate) phone: String,
    pub(crate) phone_code_hash: String,
}

impl LoginToken {
    pub fn phone(&self) -> &str {
        &self.phone
    }
}

/// SRP parameters of an account's password, as last fetched from the server.
#[derive(Debug)]
pub struct PasswordToken {
    pub(crate) password: tl::types::account::Password,
}

impl PasswordToken {
    pub fn new(password: tl::types::account::Password) -> Self {
        Self { password }
    }

    /// The hint the user chose when setting the password.
    pub fn hint(&self) -> Option<&str> {
        self.password.hint.as_deref()
    }

    fn algo(&self) -> Option<&SrpAlgo> {
        match self.password.current_algo.as_ref()? {
            tl::enums::PasswordKdfAlgo::Sha256Sha256Pbkdf2Hmacsha512iter100000Sha256ModPow(algo) => {
                Some(algo)
            }
            tl::enums::PasswordKdfAlgo::Unknown(_) => None,
        }
    }

    fn is_safe(&self) -> bool {
        self.algo().is_some_and(|algo| check_p_and_g(&algo.p, algo.g))
    }
}

impl Client {
    /// Whether the session is logged in.
    ///
    /// Any 401 is taken as "no". Other errors are returned as they are.
    pub async fn is_authorized(&self) -> Result<bool, InvocationError> {
        match self.invoke(&tl::functions::updates::GetState {}).await {
            Ok(_) => Ok(true),
            Err(InvocationError::Rpc(e)) if e.code == 401 => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Turns the server's answer to a login request into a user, saving
    /// the account and a fresh updates state to the session.
    async fn finish_login(
        &self,
        authorization: tl::enums::auth::Authorization,
    ) -> Result<User, SignInError> {
        let auth = match authorization {
            tl::enums::auth::Authorization::Authorization(auth) => auth,
            tl::enums::auth::Authorization::SignUpRequired(_) => {
                return Err(SignInError::SignUpRequired);
            }
        };

        let user = User { raw: auth.user };
        let session = &self.0.session;
        session.set_logged_in_user(Some(LoggedInUser {
            id: user.id(),
            bot: user.is_bot(),
        }));
        session.update_peers(&[PeerInfo::from(&user.raw)]);
        info!("logged in as user {} (bot: {})", user.id(), user.is_bot());

        // Without a state, the first update stream fetches one instead.
        match self.invoke(&tl::functions::updates::GetState {}).await {
            Ok(tl::enums::updates::State::State(state)) => {
                session.set_update_state(UpdateState::All(UpdatesState {
                    pts: state.pts,
                    qts: state.qts,
                    date: state.date,
                    seq: state.seq,
                    channels: Vec::new(),
                }));
            }
            Err(e) => warn!("could not fetch updates state after login: {e}"),
        }

        Ok(user)
    }

    /// Logs in with a token issued by @BotFather.
    ///
    /// ```
    /// # async fn f(client: ferrogram_client::Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let bot = client.bot_sign_in("123456:ABC-token", "0123456789abcdef").await?;
    /// println!("running as @{}", bot.username().unwrap_or("?"));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn bot_sign_in(&self, token: &str, api_hash: &str) -> Result<User, SignInError> {
        let authorization = self
            .invoke(&tl::functions::auth::ImportBotAuthorization {
                flags: 0,
                api_id: self.0.api_id,
                api_hash: api_hash.to_string(),
                bot_auth_token: token.to_string(),
            })
            .await?;
        self.finish_login(authorization).await
    }

    /// Asks the server to send a login code to the phone number.
    ///
    /// If the account belongs to another datacenter, the client migrates
    /// there before the code is sent.
    pub async fn request_login_code(
        &self,
        phone: &str,
        api_hash: &str,
    ) -> Result<LoginToken, InvocationError> {
        let settings = tl::types::CodeSettings {
            allow_flashcall: false,
            current_number: false,
            allow_app_hash: false,
            allow_missed_call: false,
            allow_firebase: false,
            unknown_number: false,
        };
        let tl::enums::auth::SentCode::SentCode(sent) = self
            .invoke(&tl::functions::auth::SendCode {
                phone_number: phone.to_string(),
                api_id: self.0.api_id,
                api_hash: api_hash.to_string(),
                settings: settings.into(),
            })
            .await?;

        Ok(LoginToken {
            phone: phone.to_string(),
            phone_code_hash: sent.phone_code_hash,
        })
    }

    /// Completes a login started by [`Client::request_login_code`].
    ///
    /// ```
    /// # use ferrogram_client::SignInError;
    /// # async fn f(client: ferrogram_client::Client, code: &str, pass: &str) -> Result<(), Box<dyn std::error::Error>> {
    /// let token = client.request_login_code("+34600000000", "0123456789abcdef").await?;
    /// let user = match client.sign_in(&token, code).await {
    ///     Err(SignInError::PasswordRequired(password)) => client.check_password(password, pass).await?,
    ///     result => result?,
    /// };
    /// # Ok(())
    /// # }
    /// ```
    pub async fn sign_in(&self, token: &LoginToken, code: &str) -> Result<User, SignInError> {
        let result = self
            .invoke(&tl::functions::auth::SignIn {
                phone_number: token.phone.clone(),
                phone_code_hash: token.phone_code_hash.clone(),
                phone_code: Some(code.to_string()),
            })
            .await;

        match result {
            Ok(authorization) => self.finish_login(authorization).await,
            Err(e) if e.is("SESSION_PASSWORD_NEEDED") => Err(SignInError::PasswordRequired(
                self.fetch_password_token().await?,
            )),
            Err(e) if e.is("PHONE_CODE_*") => Err(SignInError::InvalidCode),
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch_password_token(&self) -> Result<PasswordToken, InvocationError> {
        let tl::enums::account::Password::Password(password) =
            self.invoke(&tl::functions::account::GetPassword {}).await?;
        Ok(PasswordToken::new(password))
    }

    /// Proves knowledge of the account password through SRP. The password
    /// itself is never sent.
    pub async fn check_password(
        &self,
        token: PasswordToken,
        password: impl AsRef<[u8]>,
    ) -> Result<User, SignInError> {
        let mut token = token;
        if !token.is_safe() {
            warn!("refetching password parameters that failed validation");
            token = self.fetch_password_token().await?;
            if !token.is_safe() {
                return Err(SignInError::BadPasswordParameters);
            }
        }

        let input = {
            let (Some(algo), Some(g_b), Some(srp_id)) = (
                token.algo(),
                token.password.srp_b.as_deref(),
                token.password.srp_id,
            ) else {
                return Err(SignInError::BadPasswordParameters);
            };
            if !check_g_in_range(g_b, &algo.p) {
                return Err(SignInError::BadPasswordParameters);
            }

            let mut a = [0u8; 256];
            getrandom::fill(&mut a)
                .map_err(|e| SignInError::Other(InvocationError::Io(io::Error::other(e))))?;
            let server_random = &token.password.secure_random;
            if !server_random.is_empty() {
                for (byte, extra) in a.iter_mut().zip(server_random.iter().cycle()) {
                    *byte ^= extra;
                }
            }

            let srp = SrpParams {
                salt1: &algo.salt1,
                salt2: &algo.salt2,
                g: algo.g,
                p: &algo.p,
                g_b,
            };
            let (m1, g_a) = calculate_2fa(&srp, &a, password.as_ref());
            tl::types::InputCheckPasswordSrp {
                srp_id,
                a: g_a,
                m1: m1.to_vec(),
            }
        };

        match self
            .invoke(&tl::functions::auth::CheckPassword {
                password: input.into(),
            })
            .await
        {
            Ok(authorization) => self.finish_login(authorization).await,
            Err(e) if e.is("PASSWORD_HASH_INVALID") => Err(SignInError::InvalidPassword(token)),
            Err(e) => Err(e.into()),
        }
    }

    /// Logs out and forgets the authorization.
    ///
    /// The home connection is closed. Its key is no longer valid, so the
    /// next request negotiates a new one.
    pub async fn sign_out(&self) -> Result<tl::enums::auth::LoggedOut, InvocationError> {
        let logged_out = self.invoke(&tl::functions::auth::LogOut {}).await?;

        let session = &self.0.session;
        session.set_logged_in_user(None);
        session.clear_authorization();
        self.0.auth_copied_to_dcs.lock().await.clear();
        self.0.network.disconnect_from_dc(session.home_dc_id());
        info!("logged out");

        Ok(logged_out)
    }
}
