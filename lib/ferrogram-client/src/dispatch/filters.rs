// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Filters decide whether a handler is interested in an update.
//!
//! Filters are composed with [`FilterExt::and`], [`FilterExt::or`] and [`FilterExt::not`]:
//!
//! ```
//! use ferrogram_client::dispatch::filters::{self, FilterExt};
//!
//! let filter = filters::private().and(filters::command("start").or(filters::command("help")));
//! ```
//!
//! Some filters attach what they matched to the [`Matches`] of the [`Context`], so that the
//! handler does not need to parse the update again.

use std::collections::HashSet;

use ferrogram_session::types::{PeerId, PeerIdKind};
use regex::Regex;

use crate::media::{DocumentKind, Media};
use crate::peer::Peer;
use crate::update::Update;

/// What the filters of a handler matched on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Matches {
    /// Set by [`Command`].
    pub command: Option<CommandMatch>,
    /// The capture groups of the last [`RegexFilter`] that matched, the whole match first.
    pub captures: Option<Vec<Option<String>>>,
}

/// A command found at the start of a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandMatch {
    /// The prefix that introduced the command, such as `/`.
    pub prefix: String,
    /// The command name, without prefix nor mention of the bot.
    pub name: String,
    /// The rest of the tokens of the message.
    pub args: Vec<String>,
}

/// The input of the filters, and later of the handler.
#[derive(Clone, Debug)]
pub struct Context {
    pub update: Update,
    /// The identifier of the logged-in account, if any.
    pub self_id: Option<i64>,
    pub matches: Matches,
}

impl Context {
    pub fn new(update: Update, self_id: Option<i64>) -> Self {
        Self {
            update,
            self_id,
            matches: Matches::default(),
        }
    }
}

pub trait Filter: Send + Sync + 'static {
    /// Whether the update in the context passes this filter.
    ///
    /// Filters may record what they matched in [`Context::matches`].
    fn check(&self, context: &mut Context) -> bool;
}

impl Filter for Box<dyn Filter> {
    fn check(&self, context: &mut Context) -> bool {
        (**self).check(context)
    }
}

/// Combinators available on every [`Filter`].
pub trait FilterExt: Filter + Sized {
    /// Both filters must pass. The second is only checked if the first passes.
    fn and<F: Filter>(self, other: F) -> And<Self, F> {
        And(self, other)
    }

    /// Either filter must pass. The second is only checked if the first fails.
    fn or<F: Filter>(self, other: F) -> Or<Self, F> {
        Or(self, other)
    }

    /// The filter must not pass.
    fn not(self) -> Not<Self> {
        Not(self)
    }
}

impl<T: Filter> FilterExt for T {}

pub struct And<A, B>(A, B);
pub struct Or<A, B>(A, B);
pub struct Not<A>(A);

impl<A: Filter, B: Filter> Filter for And<A, B> {
    fn check(&self, context: &mut Context) -> bool {
        self.0.check(context) && self.1.check(context)
    }
}

impl<A: Filter, B: Filter> Filter for Or<A, B> {
    fn check(&self, context: &mut Context) -> bool {
        self.0.check(context) || self.1.check(context)
    }
}

impl<A: Filter> Filter for Not<A> {
    fn check(&self, context: &mut Context) -> bool {
        // Whatever the inner filter matched is meaningless once negated.
        let matches = context.matches.clone();
        let passed = self.0.check(context);
        context.matches = matches;
        !passed
    }
}

/// A filter backed by an arbitrary function.
pub struct Custom<F>(F);

impl<F> Filter for Custom<F>
where
    F: Fn(&Context) -> bool + Send + Sync + 'static,
{
    fn check(&self, context: &mut Context) -> bool {
        (self.0)(context)
    }
}

/// Wraps a function into a [`Filter`].
pub fn custom<F>(f: F) -> Custom<F>
where
    F: Fn(&Context) -> bool + Send + Sync + 'static,
{
    Custom(f)
}

/// Passes every update.
pub fn all() -> impl Filter {
    custom(|_| true)
}

// Identity

/// Passes updates that occur in any of the given chats.
pub fn chat(chats: impl IntoIterator<Item = PeerId>) -> impl Filter {
    let chats = chats.into_iter().collect::<HashSet<_>>();
    custom(move |context| context.update.chat().is_some_and(|id| chats.contains(&id)))
}

/// Passes updates caused by any of the given users or chats.
pub fn user(users: impl IntoIterator<Item = PeerId>) -> impl Filter {
    let users = users.into_iter().collect::<HashSet<_>>();
    custom(move |context| context.update.sender().is_some_and(|id| users.contains(&id)))
}

/// Passes updates caused by the logged-in account itself.
pub fn me() -> impl Filter {
    custom(|context| {
        let by_self_id = context
            .self_id
            .is_some_and(|me| context.update.sender() == Some(PeerId::user(me)));
        by_self_id || context.update.message().is_some_and(|m| m.outgoing())
    })
}

/// The kind of chat an update occured in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChatKind {
    Private,
    Group,
    Channel,
}

fn chat_kind(update: &Update) -> Option<ChatKind> {
    let id = update.chat()?;
    Some(match id.kind() {
        PeerIdKind::User => ChatKind::Private,
        PeerIdKind::Chat => ChatKind::Group,
        PeerIdKind::Channel => {
            let message = update.message();
            match message.and_then(|m| m.chat_peer()) {
                Some(Peer::Channel(_)) => ChatKind::Channel,
                Some(_) => ChatKind::Group,
                None if message.is_some_and(|m| m.post()) => ChatKind::Channel,
                None => ChatKind::Group,
            }
        }
    })
}

/// Passes updates in one-to-one conversations.
pub fn private() -> impl Filter {
    custom(|context| chat_kind(&context.update) == Some(ChatKind::Private))
}

/// Passes updates in small groups and megagroups.
pub fn group() -> impl Filter {
    custom(|context| chat_kind(&context.update) == Some(ChatKind::Group))
}

/// Passes updates in broadcast channels.
pub fn channel() -> impl Filter {
    custom(|context| chat_kind(&context.update) == Some(ChatKind::Channel))
}

// Message kind

fn message_filter<F>(f: F) -> impl Filter
where
    F: Fn(&crate::message::Message) -> bool + Send + Sync + 'static,
{
    custom(move |context| context.update.message().is_some_and(|m| f(m)))
}

fn document_filter(kind: DocumentKind) -> impl Filter {
    message_filter(move |m| matches!(m.media(), Some(Media::Document(d)) if d.kind() == kind))
}

/// Passes messages with text, including media captions.
pub fn text() -> impl Filter {
    message_filter(|m| !m.text().is_empty())
}

pub fn outgoing() -> impl Filter {
    message_filter(|m| m.outgoing())
}

pub fn incoming() -> impl Filter {
    message_filter(|m| !m.outgoing())
}

/// Passes messages with any kind of media.
pub fn media() -> impl Filter {
    message_filter(|m| m.media().is_some())
}

pub fn photo() -> impl Filter {
    message_filter(|m| matches!(m.media(), Some(Media::Photo(_))))
}

/// Passes documents that are not of any more specific kind.
pub fn document() -> impl Filter {
    document_filter(DocumentKind::Generic)
}

pub fn video() -> impl Filter {
    document_filter(DocumentKind::Video)
}

pub fn video_note() -> impl Filter {
    document_filter(DocumentKind::RoundVideo)
}

pub fn audio() -> impl Filter {
    document_filter(DocumentKind::Audio)
}

pub fn voice() -> impl Filter {
    document_filter(DocumentKind::Voice)
}

pub fn sticker() -> impl Filter {
    document_filter(DocumentKind::Sticker)
}

pub fn animation() -> impl Filter {
    document_filter(DocumentKind::Animation)
}

pub fn geo() -> impl Filter {
    message_filter(|m| matches!(m.media(), Some(Media::Geo(_))))
}

/// Passes service messages, such as a user joining a group.
pub fn service() -> impl Filter {
    message_filter(|m| m.is_service())
}

// Commands

/// Passes messages that start with any of the configured commands.
///
/// By default, commands are introduced by `/`, tokens are separated by whitespace,
/// and names are compared ignoring case. A trailing mention of the bot (`/start@bot`)
/// is ignored.
pub struct Command {
    names: Vec<String>,
    prefixes: Vec<String>,
    separator: Option<char>,
    case_sensitive: bool,
}

/// Creates a [`Command`] filter for a single command name.
pub fn command(name: &str) -> Command {
    Command::new([name])
}

impl Command {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            prefixes: vec!["/".to_string()],
            separator: None,
            case_sensitive: false,
        }
    }

    /// Prefixes that introduce a command. The first that matches is used.
    pub fn prefixes<S: Into<String>>(mut self, prefixes: impl IntoIterator<Item = S>) -> Self {
        self.prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Split tokens on this character instead of whitespace.
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = Some(separator);
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    fn tokens<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self.separator {
            Some(separator) => text.split(separator).filter(|t| !t.is_empty()).collect(),
            None => text.split_whitespace().collect(),
        }
    }

    /// Parse the command out of a text, if it is one of ours.
    pub fn parse(&self, text: &str) -> Option<CommandMatch> {
        let prefix = self.prefixes.iter().find(|p| text.starts_with(p.as_str()))?;
        let mut tokens = self.tokens(&text[prefix.len()..]).into_iter();
        let first = tokens.next()?;
        let name = first.split_once('@').map_or(first, |(name, _bot)| name);

        let known = self.names.iter().any(|known| {
            if self.case_sensitive {
                known == name
            } else {
                known.eq_ignore_ascii_case(name)
            }
        });
        known.then(|| CommandMatch {
            prefix: prefix.clone(),
            name: name.to_string(),
            args: tokens.map(str::to_string).collect(),
        })
    }
}

impl Filter for Command {
    fn check(&self, context: &mut Context) -> bool {
        let found = context.update.message().and_then(|m| self.parse(m.text()));
        match found {
            Some(found) => {
                context.matches.command = Some(found);
                true
            }
            None => false,
        }
    }
}

// Regex

/// Passes updates whose text matches a regular expression.
///
/// The text is that of messages, inline queries, or the data of callback queries.
pub struct RegexFilter {
    regex: Regex,
}

/// Compiles the pattern once into a [`RegexFilter`].
pub fn regex(pattern: &str) -> Result<RegexFilter, regex::Error> {
    Ok(RegexFilter {
        regex: Regex::new(pattern)?,
    })
}

impl Filter for RegexFilter {
    fn check(&self, context: &mut Context) -> bool {
        let text = match &context.update {
            Update::CallbackQuery(query) => String::from_utf8_lossy(query.data()).into_owned(),
            Update::InlineQuery(query) => query.text().to_string(),
            update => match update.message() {
                Some(message) => message.text().to_string(),
                None => return false,
            },
        };

        match self.regex.captures(&text) {
            Some(captures) => {
                context.matches.captures = Some(
                    captures
                        .iter()
                        .map(|group| group.map(|g| g.as_str().to_string()))
                        .collect(),
                );
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::PeerMap;
    use ferrogram_tl_types as tl;

    fn message(text: &str, out: bool, peer_id: tl::enums::Peer) -> Context {
        let raw = tl::types::UpdateNewMessage {
            message: tl::types::Message {
                out,
                mentioned: false,
                silent: false,
                post: false,
                id: 1,
                from_id: Some(tl::types::PeerUser { user_id: 5 }.into()),
                peer_id,
                reply_to_msg_id: None,
                date: 0,
                message: text.to_string(),
                media: None,
                entities: None,
                views: None,
                edit_date: None,
                post_author: None,
                grouped_id: None,
            }
            .into(),
            pts: 1,
            pts_count: 1,
        };
        Context::new(Update::from_raw(raw.into(), &PeerMap::default()), Some(5))
    }

    fn private_text(text: &str) -> Context {
        message(text, false, tl::types::PeerUser { user_id: 5 }.into())
    }

    #[test]
    fn check_command_tokens_are_attached() {
        let mut context = private_text("/Start@my_bot hello world");
        assert!(command("start").check(&mut context));
        assert_eq!(
            context.matches.command,
            Some(CommandMatch {
                prefix: "/".to_string(),
                name: "Start".to_string(),
                args: vec!["hello".to_string(), "world".to_string()],
            })
        );
    }

    #[test]
    fn check_command_options() {
        let filter = command("start").case_sensitive(true);
        assert!(!filter.check(&mut private_text("/START")));

        let filter = Command::new(["go"]).prefixes(["!", "."]).separator(',');
        let mut context = private_text(".go,a,b");
        assert!(filter.check(&mut context));
        assert_eq!(context.matches.command.unwrap().args, vec!["a", "b"]);
        assert!(!filter.check(&mut private_text("/go")));
        assert!(!filter.check(&mut private_text("!gone")));
    }

    #[test]
    fn check_regex_captures() {
        let filter = regex(r"(\d+) apples?").unwrap();
        let mut context = private_text("I want 12 apples");
        assert!(filter.check(&mut context));
        assert_eq!(
            context.matches.captures,
            Some(vec![Some("12 apples".to_string()), Some("12".to_string())])
        );
        assert!(!filter.check(&mut private_text("no fruit")));
    }

    #[test]
    fn check_combinators() {
        let filter = private().and(text()).and(command("x").not());
        assert!(filter.check(&mut private_text("hello")));
        assert!(!filter.check(&mut private_text("/x")));

        let group_message = || message("hi", false, tl::types::PeerChat { chat_id: 3 }.into());
        assert!(!filter.check(&mut group_message()));
        assert!(private().or(group()).check(&mut group_message()));
        assert!(chat([PeerId::chat(3)]).check(&mut group_message()));
        assert!(!channel().check(&mut group_message()));
    }

    #[test]
    fn check_negated_filter_leaves_no_matches() {
        let mut context = private_text("/x");
        assert!(!command("x").not().check(&mut context));
        assert_eq!(context.matches, Matches::default());
    }

    #[test]
    fn check_identity() {
        assert!(me().check(&mut private_text("hi")));
        assert!(user([PeerId::user(5)]).check(&mut private_text("hi")));
        assert!(!user([PeerId::user(6)]).check(&mut private_text("hi")));
        assert!(outgoing().check(&mut message("hi", true, tl::types::PeerUser { user_id: 9 }.into())));
        assert!(!media().check(&mut private_text("hi")));
        assert!(!service().check(&mut private_text("hi")));
    }
}
