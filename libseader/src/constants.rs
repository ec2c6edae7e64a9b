// libseader-rs/libseader/src/constants.rs
//! Common protocol constants used across the crate

/// Serial frame sync byte
pub const SYNC: u8 = 0x03;

/// Serial frame control byte for CCID traffic
pub const CTRL: u8 = 0x06;

/// Reader NAK control byte, always sent as a `SYNC NAK xx` triple
pub const NAK: u8 = 0x15;

/// Sync + control + CCID header (type, length(4), slot, seq, 3 params)
pub const FRAME_HEADER_LEN: usize = 12;

/// Bytes a frame carries on top of its payload: header plus the LRC
pub const FRAME_OVERHEAD: usize = FRAME_HEADER_LEN + 1;

/// Largest payload the framer accepts. Anything longer is treated as line
/// noise and the framer resynchronises.
pub const MAX_MESSAGE_LEN: usize = 300;

/// Number of CCID slots on the SAM reader
pub const SLOT_COUNT: usize = 2;

/// PC_to_RDR_IccPowerOn
pub const CCID_POWER_ON: u8 = 0x62;
/// PC_to_RDR_GetSlotStatus
pub const CCID_GET_SLOT_STATUS: u8 = 0x65;
/// PC_to_RDR_SetParameters
pub const CCID_SET_PARAMETERS: u8 = 0x61;
/// PC_to_RDR_XfrBlock
pub const CCID_XFR_BLOCK: u8 = 0x6F;

/// RDR_to_PC_DataBlock
pub const CCID_DATA_BLOCK: u8 = 0x80;
/// RDR_to_PC_SlotStatus
pub const CCID_SLOT_STATUS: u8 = 0x81;
/// RDR_to_PC_Parameters
pub const CCID_PARAMETERS: u8 = 0x82;
/// RDR_to_PC_NotifySlotChange (2-byte short form)
pub const CCID_NOTIFY_SLOT_CHANGE: u8 = 0x50;

/// NotifySlotChange bit fields: slot 0 uses bits 0-1, slot 1 bits 2-3
pub const SLOT_0_MASK: u8 = 0x03;
pub const CARD_IN_0: u8 = 0x03;
pub const CARD_OUT_0: u8 = 0x02;
pub const SLOT_1_MASK: u8 = 0x0C;
pub const CARD_IN_1: u8 = 0x0C;
pub const CARD_OUT_1: u8 = 0x08;

/// bStatus/bError pairs reported when the slot hardware is unusable
pub const HW_FAULT_STATUS_A: u8 = 0x41;
pub const HW_FAULT_STATUS_B: u8 = 0x42;
pub const HW_FAULT_ERROR: u8 = 0xFE;

/// bProtocolNum for T=1
pub const PROTOCOL_T1: u8 = 0x01;

/// Answer-To-Reset of a supported SAM
pub const SAM_ATR: [u8; 15] = [
    0x3B, 0x95, 0x96, 0x80, 0xB1, 0xFE, 0x55, 0x1F, 0xC7, 0x47, 0x72, 0x61, 0x63, 0x65, 0x13,
];

/// Answer-To-Reset of the second supported SAM revision
pub const SAM_ATR2: [u8; 11] = [
    0x3B, 0x90, 0x96, 0x91, 0x81, 0xB1, 0xFE, 0x55, 0x1F, 0xC7, 0xD4,
];

/// Proprietary APDU header wrapping every payload sent to the SAM
pub const SAM_APDU_HEADER: [u8; 4] = [0xA0, 0xDA, 0x02, 0x63];

/// CLA INS P1 P2 Lc
pub const APDU_HEADER_LEN: usize = 5;

/// Largest APDU the SAM link carries
pub const MAX_APDU_LEN: usize = 300;

/// Routing prefix ahead of every DER payload: to, from, reply_to, 0, 0, 0
pub const PAYLOAD_PREFIX_LEN: usize = 6;

/// Status words
pub const SW1_SUCCESS: u8 = 0x90;
pub const SW1_MORE_DATA: u8 = 0x61;

/// Picopass commands seen in SAM conversations
pub const PICOPASS_CMD_READ4: u8 = 0x06;
pub const PICOPASS_CMD_UPDATE: u8 = 0x87;

/// Picopass READ4 requests (with CRC) that return SIO blocks
pub const READ4_BLOCK6: [u8; 4] = [PICOPASS_CMD_READ4, 0x06, 0x45, 0x56];
pub const READ4_BLOCK9: [u8; 4] = [PICOPASS_CMD_READ4, 0x09, 0xB2, 0xAE];
pub const READ4_BLOCK10: [u8; 4] = [PICOPASS_CMD_READ4, 0x0A, 0x29, 0x9C];
pub const READ4_BLOCK13: [u8; 4] = [PICOPASS_CMD_READ4, 0x0D, 0x96, 0xE8];

/// Picopass UPDATE of block 2 (e-purse)
pub const UPDATE_BLOCK2: [u8; 2] = [PICOPASS_CMD_UPDATE, 0x02];

/// DESFire EV1 read returning the SIO in the clear
pub const DESFIRE_READ_SIO: [u8; 13] = [
    0x90, 0xBD, 0x00, 0x00, 0x07, 0x0F, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// DESFire EV2 application select answered locally
pub const DESFIRE_EV2_SELECT: [u8; 16] = [
    0x00, 0xA4, 0x04, 0x00, 0x0A, 0xA0, 0x00, 0x00, 0x04, 0x40, 0x00, 0x01, 0x01, 0x00, 0x01,
    0x00,
];

/// ISO7816 "file not found"
pub const SW_FILE_NOT_FOUND: [u8; 2] = [0x6A, 0x82];

/// Size of the SIO buffer kept for a credential
pub const SIO_MAX_LEN: usize = 128;
