//! Protocol constants

/// Class byte of every PC/SC pseudo-APDU addressed to the reader
pub const CLA_READER: u8 = 0xFF;

/// Size of one MIFARE data block in bytes
pub const BLOCK_SIZE: usize = 16;

/// Size of the trailing status word in bytes
pub const STATUS_WORD_SIZE: usize = 2;

/// Length of a card identifier in bytes
pub const CARD_ID_SIZE: usize = 4;

/// Length of a MIFARE sector key in bytes
pub const KEY_SIZE: usize = 6;

/// Well-known factory default key
pub const DEFAULT_KEY: [u8; KEY_SIZE] = [0xFF; KEY_SIZE];

/// Instruction bytes (INS)
pub mod ins {
    /// Load authentication keys into the reader
    pub const LOAD_KEY: u8 = 0x82;

    /// Authenticate to a block (HID Omnikey form)
    pub const AUTHENTICATE: u8 = 0x88;

    /// General Authenticate (PC/SC part 3 form)
    pub const GENERAL_AUTHENTICATE: u8 = 0x86;

    /// Get data (card serial number)
    pub const GET_DATA: u8 = 0xCA;

    /// Read binary
    pub const READ_BINARY: u8 = 0xB0;

    /// Update binary
    pub const UPDATE_BINARY: u8 = 0xD6;
}

/// MIFARE key types (only key A is used)
pub mod key_type {
    /// Key A
    pub const KEY_A: u8 = 0x60;
}

/// Reader key slots
pub mod key_slot {
    /// Non-volatile slot used by HID Omnikey readers
    pub const OMNIKEY: u8 = 0x1A;

    /// Volatile slot used by ACS readers
    pub const ACS: u8 = 0x00;
}

/// ATR layout used for capacity detection
pub mod atr {
    /// ATR length of the supported MIFARE Classic cards
    pub const MIFARE_LEN: usize = 20;

    /// Offset of the byte that must be zero
    pub const CARD_NAME_HIGH: usize = 13;

    /// Offset of the byte that selects the card family
    pub const CARD_NAME_LOW: usize = 14;

    /// ATR reported for a MIFARE Classic 1K by a PC/SC part 3 reader
    pub const MIFARE_1K: [u8; MIFARE_LEN] = [
        0x3B, 0x8F, 0x80, 0x01, 0x80, 0x4F, 0x0C, 0xA0, 0x00, 0x00,
        0x03, 0x06, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x6A,
    ];

    /// ATR reported for a MIFARE Classic 4K by a PC/SC part 3 reader
    pub const MIFARE_4K: [u8; MIFARE_LEN] = [
        0x3B, 0x8F, 0x80, 0x01, 0x80, 0x4F, 0x0C, 0xA0, 0x00, 0x00,
        0x03, 0x06, 0x03, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x69,
    ];
}
