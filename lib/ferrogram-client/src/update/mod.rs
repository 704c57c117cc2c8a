// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Typed views over the updates the server pushes.
//!
//! Each view keeps the raw update it was built from in a public `raw` field
//! for anything the accessors do not cover. Raw types follow the schema
//! layer and may change between releases.

mod callback_query;
mod inline_query;
mod message;
pub(crate) mod message_box;
mod message_deletion;
mod poll;
mod update;
mod user_status;

pub use callback_query::CallbackQuery;
pub use inline_query::InlineQuery;
pub use message::Message;
pub use message_deletion::MessageDeletion;
pub use poll::Poll;
pub use update::Update;
pub use user_status::UserStatus;
