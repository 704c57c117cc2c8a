// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Splitting the `pq` sent by the server during key exchange.

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn square_plus(y: u128, c: u128, n: u128) -> u128 {
    (y * y % n + c) % n
}

/// Splits `pq` into its two prime factors, the smaller one first.
///
/// Uses Brent's variant of [Pollard's rho algorithm], retrying with a different
/// polynomial `f(x) = x² + c` whenever a round fails to find a divisor.
/// Returns `None` if `pq` is too small or every round failed.
///
/// [Pollard's rho algorithm]: https://en.wikipedia.org/wiki/Pollard%27s_rho_algorithm
#[allow(clippy::many_single_char_names)]
pub fn factorize(pq: u64) -> Option<(u64, u64)> {
    if pq < 4 {
        return None;
    }
    if pq % 2 == 0 {
        return Some((2, pq / 2));
    }

    [43u64, 47, 53, 59, 61]
        .into_iter()
        .map(|multiplier| brent(pq, multiplier * (pq / 103)))
        .find(|&(p, _)| p != 1)
}

fn brent(pq: u64, c: u64) -> (u64, u64) {
    let n = pq as u128;
    let c = c as u128;
    let abs_diff = |a: u128, b: u128| a.max(b) - a.min(b);

    let mut y = 3 * (n / 7);
    let m = 7 * (n / 13);
    let mut g = 1u128;
    let mut r = 1u128;
    let mut q = 1u128;
    let mut x = 0u128;
    let mut ys = 0u128;

    while g == 1 {
        x = y;
        for _ in 0..r {
            y = square_plus(y, c, n);
        }

        let mut k = 0;
        while k < r && g == 1 {
            ys = y;
            for _ in 0..m.min(r - k) {
                y = square_plus(y, c, n);
                q = q * abs_diff(x, y) % n;
            }
            g = gcd(q, n);
            k += m;
        }

        r *= 2;
    }

    if g == n {
        loop {
            ys = square_plus(ys, c, n);
            g = gcd(abs_diff(x, ys), n);
            if g > 1 {
                break;
            }
        }
    }

    if g == n {
        return (1, pq);
    }

    let (p, q) = (g as u64, (n / g) as u64);
    (p.min(q), p.max(q))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_known_products() {
        assert_eq!(
            factorize(1470626929934143021),
            Some((1206429347, 1218991343))
        );
        assert_eq!(
            factorize(2363612107535801713),
            Some((1518968219, 1556064227))
        );
        assert_eq!(
            factorize(2804275833720261793),
            Some((1555252417, 1803100129))
        );
    }

    #[test]
    fn small_and_even_inputs() {
        assert_eq!(factorize(3), None);
        assert_eq!(factorize(14), Some((2, 7)));
    }
}
