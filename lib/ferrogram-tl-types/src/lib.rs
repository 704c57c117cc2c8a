// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This library contains the Rust definitions for the subset of Telegram's
//! [`types`] and [`functions`] that the rest of `ferrogram` speaks, in the
//! form of `struct` and `enum`.
//!
//! Every definition implements [`Serializable`] and [`Deserializable`].
//! Bare types and functions also implement [`Identifiable`], and functions
//! implement [`RemoteCall`] so the caller knows what the server answers with.
//!
//! The definitions are maintained by hand from the schema files under `tl/`.
//! Each constructor carries its schema line as documentation. Constructors
//! whose definition was reduced to fewer fields than the official one have
//! no explicit identifier in the schema file, so their identifier is derived
//! from the reduced definition and will never collide with the official one.
//!
//! When the constructor identifier of incoming data is not known in advance,
//! use [`Object::read`] to pick the right boxed type.
#[macro_use]
mod macros;

pub mod deserialize;
pub mod enums;
pub mod functions;
mod object;
mod serialize;
pub mod types;

pub use deserialize::{Cursor, Deserializable};
pub use object::{Object, name_for_id};
pub use serialize::Serializable;

/// The API layer the definitions were taken from.
pub const LAYER: i32 = 181;

/// The bare `vector` type, as opposed to the boxed `Vector`.
///
/// `Vec<T>` always carries the `vector` constructor identifier, while this
/// new-type omits it (only the length and the items are present).
#[derive(Clone, Debug, PartialEq)]
pub struct RawVec<T>(pub Vec<T>);

/// An unparsed blob which should not be deserialized as a byte string.
///
/// Used by generic functions that pass the result of the inner query through
/// without any interpretation.
#[derive(Clone, Debug, PartialEq)]
pub struct Blob(pub Vec<u8>);

impl From<Vec<u8>> for Blob {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

/// Anything implementing this trait is identifiable by both ends of the
/// connection when transmitting objects.
pub trait Identifiable {
    /// The unique identifier for the type.
    const CONSTRUCTOR_ID: u32;
}

/// Structures implementing this trait are suitable to perform Remote
/// Procedure Calls, and know what the type of the response will be.
pub trait RemoteCall: Serializable {
    /// The type of the value coming from the other end of the connection.
    type Return: Deserializable;
}
