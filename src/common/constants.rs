// Schema
pub const MAX_STRING_LENGTH: u16 = 255;
pub const MAX_INT_DIGITS: u16 = 10;

// Table
pub const AUTO_INCREMENT_START: i32 = 1;
