//! Prime search for the outer table size.

/// Trial-division primality test.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut j = 3;
    while j * j <= n {
        if n % j == 0 {
            return false;
        }
        j += 2;
    }
    true
}

/// Largest prime `<= n`, or `None` when `n < 2`.
pub fn prev_prime(n: u64) -> Option<u64> {
    (2..=n).rev().find(|&c| is_prime(c))
}
