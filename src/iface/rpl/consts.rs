/// The RPL instance used when none is configured.
pub const RPL_DEFAULT_INSTANCE: u8 = 0x1e;

// ------------------------------------
// Constants used for the trickle timer:
// ------------------------------------
/// This is 3 in the standard, but in Contiki they use:
pub const DEFAULT_DIO_INTERVAL_MIN: u8 = 12;
/// This is 20 in the standard, but in Contiki they use:
pub const DEFAULT_DIO_INTERVAL_DOUBLINGS: u8 = 8;
pub const DEFAULT_DIO_REDUNDANCY_CONSTANT: u8 = 10;

// ---------------------------
// Constants used for the Rank:
// ---------------------------
pub const DEFAULT_MIN_HOP_RANK_INCREASE: u16 = 256;
pub const DEFAULT_MAX_RANK_INCREASE: u16 = 7 * DEFAULT_MIN_HOP_RANK_INCREASE;
pub const INFINITE_RANK: u16 = 0xffff;

/// Objective Function Zero.
pub const DEFAULT_OBJECTIVE_CODE_POINT: u16 = 0;

// ------------------------------
// Constants used for the routes:
// ------------------------------
/// Default route lifetime, in lifetime units.
pub const DEFAULT_LIFETIME: u8 = 30;
/// Default lifetime unit, in seconds.
pub const DEFAULT_LIFETIME_UNIT: u16 = 60;
/// A DAO advertising this lifetime withdraws its target (No-Path DAO).
pub const ZERO_LIFETIME: u8 = 0;
/// A DAO advertising this lifetime installs a route that never expires.
pub const INFINITE_LIFETIME: u8 = 0xff;
/// Seconds a withdrawn route is kept before it expires.
pub const DAO_EXPIRATION_TIMEOUT: u32 = 60;
