//! Wire-format constants for the canonical codec.

/// Size in bytes of a SHA-256 content identifier.
pub const CONTENT_ID_SIZE: usize = 32;

/// Digits accepted by the fast decimal scanner before falling back to the
/// slow path. u64::MAX is 20 digits; we cap at 19 so every accepted run
/// fits in a u64 without an overflow check on the last digit.
pub const MAX_FAST_DECIMAL_DIGITS: usize = 19;

/// Number of elements at or below which the canonical builder uses
/// insertion sort instead of a general-purpose comparison sort.
/// Insertion sort's O(n^2) behavior is cheaper than a sort's constant
/// overhead for dictionaries/sets this small, which dominate real frames.
pub const SMALL_CONTAINER_THRESHOLD: usize = 8;
