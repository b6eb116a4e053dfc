/// Smallest capacity a table is ever allocated with.
pub const MINPRIME: usize = 101;

/// Largest capacity a table is ever allocated with.
pub const MAXPRIME: usize = 99991;

/// Returns `true` if `n` is prime.
///
/// Plain trial division; capacities never exceed [`MAXPRIME`], so this stays
/// cheap next to allocating the table itself.
///
/// # Examples
///
/// ```rust
/// # use prime_cache::prime::is_prime;
/// assert!(is_prime(101));
/// assert!(!is_prime(100));
/// assert!(!is_prime(1));
/// ```
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut divisor = 2;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 1;
    }
    true
}

/// Returns the smallest prime strictly greater than `n`, never below
/// [`MINPRIME`] and clamped to [`MAXPRIME`].
///
/// # Examples
///
/// ```rust
/// # use prime_cache::prime::{next_prime, MAXPRIME, MINPRIME};
/// assert_eq!(next_prime(0), MINPRIME);
/// assert_eq!(next_prime(101), 103);
/// assert_eq!(next_prime(204), 211);
/// assert_eq!(next_prime(MAXPRIME), MAXPRIME);
/// ```
pub fn next_prime(n: usize) -> usize {
    let start = n.max(MINPRIME - 1).saturating_add(1);
    (start..MAXPRIME).find(|&candidate| is_prime(candidate)).unwrap_or(MAXPRIME)
}

/// Picks the capacity for a table asked to hold `requested` slots.
///
/// Requests are clamped into `[MINPRIME, MAXPRIME]`; a prime request is used
/// as-is, anything else rounds up to the next prime.
///
/// # Examples
///
/// ```rust
/// # use prime_cache::prime::capacity_for;
/// assert_eq!(capacity_for(0), 101);
/// assert_eq!(capacity_for(211), 211);
/// assert_eq!(capacity_for(212), 223);
/// assert_eq!(capacity_for(usize::MAX), 99991);
/// ```
pub fn capacity_for(requested: usize) -> usize {
    if requested < MINPRIME {
        MINPRIME
    } else if requested > MAXPRIME {
        MAXPRIME
    } else if is_prime(requested) {
        requested
    } else {
        next_prime(requested)
    }
}
