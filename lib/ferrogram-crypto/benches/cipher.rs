// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use bencher::{Bencher, benchmark_group, benchmark_main, black_box};
use ferrogram_crypto::aes::{ctr256_apply, ige_decrypt, ige_encrypt};

macro_rules! define_benches {
    ($(fn $func:ident($method:ident, $n:expr);)+) => {
        $(
            fn $func(bench: &mut Bencher) {
                let mut data = black_box(vec![1; $n]);
                let key = black_box([2; 32]);
                let iv = black_box([3; 32]);

                bench.iter(|| $method(&mut data, &key, &iv));
                bench.bytes = data.len() as u64;
            }
        )+
    };
}

fn ctr(data: &mut [u8], key: &[u8; 32], iv: &[u8; 32]) {
    let mut short_iv = [0; 16];
    short_iv.copy_from_slice(&iv[..16]);
    ctr256_apply(data, key, &short_iv)
}

define_benches!(
    fn ige_encrypt_b0256(ige_encrypt, 256);
    fn ige_encrypt_kb0016(ige_encrypt, 16 * 1024);
    fn ige_encrypt_kb0512(ige_encrypt, 512 * 1024);

    fn ige_decrypt_b0256(ige_decrypt, 256);
    fn ige_decrypt_kb0016(ige_decrypt, 16 * 1024);
    fn ige_decrypt_kb0512(ige_decrypt, 512 * 1024);

    fn ctr_kb0128(ctr, 128 * 1024);
    fn ctr_kb1024(ctr, 1024 * 1024);
);

benchmark_group!(
    ige,
    ige_encrypt_b0256,
    ige_encrypt_kb0016,
    ige_encrypt_kb0512,
    ige_decrypt_b0256,
    ige_decrypt_kb0016,
    ige_decrypt_kb0512
);
benchmark_group!(cdn, ctr_kb0128, ctr_kb1024);
benchmark_main!(ige, cdn);
