//! Request IDs, reply IDs and LL/CP codepoints

// Server IDs
pub const SERVER_SIGNON: u16 = 0xE009;

// Request IDs; a reply carries its request ID with the high bit set
pub const REQ_EXCHANGE_SEEDS: u16 = 0x7001;
pub const REQ_START_SERVER: u16 = 0x7002;
pub const REQ_EXCHANGE_ATTRIBUTES: u16 = 0x7003;
pub const REQ_SIGNON_INFO: u16 = 0x7004;
pub const REQ_END_JOB: u16 = 0x1004;

pub const REPLY_EXCHANGE_SEEDS: u16 = 0xF001;
pub const REPLY_START_SERVER: u16 = 0xF002;
pub const REPLY_EXCHANGE_ATTRIBUTES: u16 = 0xF003;
pub const REPLY_SIGNON_INFO: u16 = 0xF004;

// LL/CP codepoints
pub const CP_CLIENT_VERSION: u16 = 0x1101;
pub const CP_DATASTREAM_LEVEL: u16 = 0x1102;
pub const CP_SEED: u16 = 0x1103;
pub const CP_USER_ID: u16 = 0x1104;
pub const CP_PASSWORD: u16 = 0x1105;
pub const CP_CURRENT_SIGNON_DATE: u16 = 0x1106;
pub const CP_LAST_SIGNON_DATE: u16 = 0x1107;
pub const CP_PASSWORD_EXPIRATION_DATE: u16 = 0x1108;
pub const CP_INVALID_SIGNON_COUNT: u16 = 0x110A;
pub const CP_CLIENT_CCSID: u16 = 0x1113;
pub const CP_SERVER_CCSID: u16 = 0x1114;
pub const CP_PASSWORD_LEVEL: u16 = 0x1119;
pub const CP_JOB_NAME: u16 = 0x111F;
pub const CP_RETURN_MESSAGES: u16 = 0x1128;
pub const CP_MESSAGE: u16 = 0x112A;
pub const CP_MESSAGE_ID: u16 = 0x112B;
pub const CP_MESSAGE_TEXT: u16 = 0x112C;
pub const CP_MESSAGE_SEVERITY: u16 = 0x112D;
