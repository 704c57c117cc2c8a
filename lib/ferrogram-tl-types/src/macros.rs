// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Declarative macros that expand the schema subset into Rust definitions.
//!
//! A definition looks like the following:
//!
//! ```text
//! "inputPeerUser" InputPeerUser = 0xdde8a54c {
//!     user_id: i64,
//!     access_hash: i64,
//! }
//! ```
//!
//! Definitions with a `flags:#` field are marked with `[flags]`, and their
//! conditional fields with `#[flag(bit)]`. A conditional `bool` is a `true`
//! flag that lives only in the bitmask, anything else is an `Option`.
use crate::deserialize::{Buffer, Result};
use crate::{Deserializable, Serializable};

/// A field whose presence is controlled by one bit of the `flags` bitmask.
pub(crate) trait Flag: Sized {
    fn is_set(&self) -> bool;

    fn serialize_if_set(&self, buf: &mut impl Extend<u8>);

    fn deserialize_if(present: bool, buf: Buffer) -> Result<Self>;
}

impl Flag for bool {
    fn is_set(&self) -> bool {
        *self
    }

    fn serialize_if_set(&self, _buf: &mut impl Extend<u8>) {}

    fn deserialize_if(present: bool, _buf: Buffer) -> Result<Self> {
        Ok(present)
    }
}

impl<T: Serializable + Deserializable> Flag for Option<T> {
    fn is_set(&self) -> bool {
        self.is_some()
    }

    fn serialize_if_set(&self, buf: &mut impl Extend<u8>) {
        if let Some(value) = self {
            value.serialize(buf);
        }
    }

    fn deserialize_if(present: bool, buf: Buffer) -> Result<Self> {
        Ok(if present { Some(T::deserialize(buf)?) } else { None })
    }
}

macro_rules! tl_field {
    (@bit $value:expr) => {
        0u32
    };
    (@bit $value:expr, $bit:literal) => {
        if $crate::macros::Flag::is_set(&$value) { 1u32 << $bit } else { 0 }
    };
    (@ser $value:expr, $buf:ident) => {
        $crate::Serializable::serialize(&$value, $buf)
    };
    (@ser $value:expr, $buf:ident, $bit:literal) => {
        $crate::macros::Flag::serialize_if_set(&$value, $buf)
    };
    (@de $ty:ty, $buf:ident, $flags:ident) => {
        <$ty as $crate::Deserializable>::deserialize($buf)?
    };
    (@de $ty:ty, $buf:ident, $flags:ident, $bit:literal) => {
        <$ty as $crate::macros::Flag>::deserialize_if($flags & (1u32 << $bit) != 0, $buf)?
    };
    (@write_flags $flags:ident, $buf:ident) => {
        let _ = $flags;
    };
    (@write_flags $flags:ident, $buf:ident flags) => {
        $crate::Serializable::serialize(&$flags, $buf)
    };
    (@read_flags $buf:ident) => {
        0u32
    };
    (@read_flags $buf:ident flags) => {
        <u32 as $crate::Deserializable>::deserialize($buf)?
    };
}

/// Bare types: a `struct` per constructor, serialized without identifier.
macro_rules! tl_structs {
    ($(
        $(#[$meta:meta])*
        $tl:literal $name:ident = $id:literal $([$has_flags:ident])? {
            $( $(#[flag($bit:literal)])? $field:ident : $ty:ty ),* $(,)?
        }
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Debug, PartialEq)]
            pub struct $name {
                $( pub $field: $ty, )*
            }

            impl $crate::Identifiable for $name {
                const CONSTRUCTOR_ID: u32 = $id;
            }

            impl $crate::Serializable for $name {
                #[allow(unused_variables)]
                fn serialize(&self, buf: &mut impl Extend<u8>) {
                    let flags: u32 = 0 $( | tl_field!(@bit self.$field $(, $bit)?) )*;
                    tl_field!(@write_flags flags, buf $($has_flags)?);
                    $( tl_field!(@ser self.$field, buf $(, $bit)?); )*
                }
            }

            impl $crate::Deserializable for $name {
                #[allow(unused_variables)]
                fn deserialize(buf: $crate::deserialize::Buffer) -> $crate::deserialize::Result<Self> {
                    let flags: u32 = tl_field!(@read_flags buf $($has_flags)?);
                    Ok(Self {
                        $( $field: tl_field!(@de $ty, buf, flags $(, $bit)?), )*
                    })
                }
            }
        )*

        /// Constructor identifiers and schema names of the definitions in this module.
        #[allow(dead_code)]
        pub(crate) const CONSTRUCTORS: &[(u32, &str)] = &[ $( ($id, $tl), )* ];
    };
}

/// Functions: like bare types, but serialized with their identifier and
/// carrying the type of their response.
macro_rules! tl_functions {
    ($(
        $(#[$meta:meta])*
        $tl:literal $name:ident = $id:literal $([$has_flags:ident])? {
            $( $(#[flag($bit:literal)])? $field:ident : $ty:ty ),* $(,)?
        } -> $ret:ty;
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Debug, PartialEq)]
            pub struct $name {
                $( pub $field: $ty, )*
            }

            impl $crate::Identifiable for $name {
                const CONSTRUCTOR_ID: u32 = $id;
            }

            impl $crate::RemoteCall for $name {
                type Return = $ret;
            }

            impl $crate::Serializable for $name {
                #[allow(unused_variables)]
                fn serialize(&self, buf: &mut impl Extend<u8>) {
                    $crate::Serializable::serialize(&<Self as $crate::Identifiable>::CONSTRUCTOR_ID, buf);
                    let flags: u32 = 0 $( | tl_field!(@bit self.$field $(, $bit)?) )*;
                    tl_field!(@write_flags flags, buf $($has_flags)?);
                    $( tl_field!(@ser self.$field, buf $(, $bit)?); )*
                }
            }

            impl $crate::Deserializable for $name {
                #[allow(unused_variables)]
                fn deserialize(buf: $crate::deserialize::Buffer) -> $crate::deserialize::Result<Self> {
                    let id = <u32 as $crate::Deserializable>::deserialize(buf)?;
                    if id != <Self as $crate::Identifiable>::CONSTRUCTOR_ID {
                        return Err($crate::deserialize::Error::UnexpectedConstructor { id });
                    }
                    let flags: u32 = tl_field!(@read_flags buf $($has_flags)?);
                    Ok(Self {
                        $( $field: tl_field!(@de $ty, buf, flags $(, $bit)?), )*
                    })
                }
            }
        )*

        #[allow(dead_code)]
        pub(crate) const CONSTRUCTORS: &[(u32, &str)] = &[ $( ($id, $tl), )* ];
    };
}

/// Boxed types: an `enum` over the bare types that share the same result
/// type, serialized with the identifier of the variant in use.
macro_rules! tl_enums {
    ($(
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident($ty:ty) ),* $(,)?
        }
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Debug, PartialEq)]
            pub enum $name {
                $( $variant($ty), )*
            }

            impl $name {
                /// Identifiers of every constructor this type may take.
                pub const CONSTRUCTOR_IDS: &'static [u32] =
                    &[ $( <$ty as $crate::Identifiable>::CONSTRUCTOR_ID, )* ];
            }

            impl $crate::Serializable for $name {
                fn serialize(&self, buf: &mut impl Extend<u8>) {
                    match self {
                        $(
                            Self::$variant(value) => {
                                $crate::Serializable::serialize(
                                    &<$ty as $crate::Identifiable>::CONSTRUCTOR_ID,
                                    buf,
                                );
                                $crate::Serializable::serialize(value, buf);
                            }
                        )*
                    }
                }
            }

            impl $crate::Deserializable for $name {
                fn deserialize(buf: $crate::deserialize::Buffer) -> $crate::deserialize::Result<Self> {
                    let id = <u32 as $crate::Deserializable>::deserialize(buf)?;
                    $(
                        if id == <$ty as $crate::Identifiable>::CONSTRUCTOR_ID {
                            return Ok(Self::$variant(<$ty as $crate::Deserializable>::deserialize(buf)?));
                        }
                    )*
                    Err($crate::deserialize::Error::UnexpectedConstructor { id })
                }
            }

            $(
                impl From<$ty> for $name {
                    fn from(value: $ty) -> Self {
                        Self::$variant(value)
                    }
                }
            )*
        )*
    };
}
