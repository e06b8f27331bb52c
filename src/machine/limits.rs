/**
  Constants specifying limits.
*/


use super::{ActionMask, CodePoint};

/// The largest admissible code point. Character sets never hold values above this.
pub const MAX_CODE_POINT : CodePoint = 0x10FFFF;

// Action Mask Limits
// These maxima exist in order to maintain the invariant that every action's
// `1 << order_key` bit fits in an `ActionMask`.
pub const MAX_ACTIONS : usize = (0 as ActionMask).count_zeros() as usize; //< 64, the mask width
