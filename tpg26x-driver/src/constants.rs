pub(crate) const END_OF_TEXT: u8 = 0x03;
pub(crate) const CR: u8 = 0x0D;
pub(crate) const LF: u8 = 0x0A;
pub(crate) const ENQUIRY: u8 = 0x05;
pub(crate) const ACK: u8 = 0x06;
pub(crate) const NACK: u8 = 0x15;
pub(crate) const PARAM_SEPARATOR: char = ',';
// Fixed line settings of the controller's RS-232 interface
pub(crate) const BAUD_RATE: u32 = 9600;
pub const DEFAULT_TIMEOUT_MS: u64 = 500;
// Longest reply is PNR/PRX, well below this
pub(crate) const MAX_FRAME_SIZE: usize = 64;
