//! CLI Exit Code Registry
//!
//! Single source of truth for `carelink` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success (operator failures are warnings only)      |
//! | 1    | General error                                      |
//! | 2    | Usage error (bad args, no root configured)         |
//! | 3    | Configuration file unreadable or invalid           |
//! | 4    | Operator root cannot be enumerated                 |
//! | 5    | Store error (fix log or live collection)           |
//! | 6    | Migration aborted                                  |
//! | 7    | `--strict`: one or more operators failed           |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown operator, no root.
pub const EXIT_USAGE: u8 = 2;

/// Settings file missing, unparsable, or failing validation.
pub const EXIT_CONFIG: u8 = 3;

/// The operator root directory cannot be listed.
pub const EXIT_ROOT: u8 = 4;

/// Reading or writing the fix log or a live collection failed.
pub const EXIT_STORE: u8 = 5;

/// A migration aborted; earlier migrations stay committed.
pub const EXIT_MIGRATION: u8 = 6;

/// Aggregation finished but some operators were skipped (only with `--strict`).
pub const EXIT_PARTIAL: u8 = 7;
