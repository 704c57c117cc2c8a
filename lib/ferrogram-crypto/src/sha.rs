// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/// Hashes every argument in order with SHA-1, evaluating to a `[u8; 20]`.
#[macro_export]
macro_rules! sha1 {
    ( $( $x:expr ),+ $(,)? ) => {{
        use $crate::__private::sha1::{Digest, Sha1};
        let mut hasher = Sha1::new();
        $( hasher.update($x); )+
        let digest: [u8; 20] = hasher.finalize().into();
        digest
    }};
}

/// Hashes every argument in order with SHA-256, evaluating to a `[u8; 32]`.
#[macro_export]
macro_rules! sha256 {
    ( $( $x:expr ),+ $(,)? ) => {{
        use $crate::__private::sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        $( hasher.update($x); )+
        let digest: [u8; 32] = hasher.finalize().into();
        digest
    }};
}
