//! Structured commands and their wire representation
//!
//! A command travels as an opcode byte optionally followed by one
//! parameter byte. The original controller documentation describes the
//! parameter as overlapping bit fields; here each instruction is a
//! tagged variant with named fields, and every bit position outside an
//! instruction's fields is reserved and must be zero.

use crate::opcode::{self, Opcode};

// ENTRY_MODE_SET parameter bits
const ID_FLAG: u8 = 1 << 0;
const SHIFT_ENTIRE_DISPLAY: u8 = 1 << 1;

// DISPLAY_ON_OFF_CTL parameter bits
const DISPLAY_ON_OFF: u8 = 1 << 0;
const CURSOR_ON_OFF: u8 = 1 << 1;
const CURSOR_BLINK_ON_OFF: u8 = 1 << 2;

// CURSOR_OR_DISPLAY_SHIFT parameter bits (bits 0-1 reserved)
const RL_SEL: u8 = 1 << 2;
const SCROLL_OR_SHIFT_SEL: u8 = 1 << 3;

// FUNCTION_SET parameter bits (bits 0-1 reserved)
const FORMAT_MODE: u8 = 1 << 2;
const LINE_NUMBER: u8 = 1 << 3;
const DATA_LENGTH: u8 = 1 << 4;

/// CGRAM addresses are 5 bits wide.
pub const CGRAM_ADDRESS_MASK: u8 = 0x1F;
/// DDRAM addresses are 6 bits wide.
pub const DDRAM_ADDRESS_MASK: u8 = 0x3F;

/// Errors that can occur when decoding a command from its wire bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// The opcode byte matches no instruction (zero or several bits set)
    UnknownOpcode,
    /// The parameter byte has a bit set outside the instruction's fields
    ReservedBitSet,
}

/// A character-controller command
///
/// The six parameterized instructions carry their fields directly;
/// `encode` forces every unused bit to zero and `decode` rejects any
/// byte that violates that invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Clear the display and reset the DDRAM address
    ClearDisplay,
    /// Return the cursor to the home position
    ReturnHome,
    /// How the cursor and display react to data writes
    EntryModeSet {
        /// `false` increments the cursor position, `true` decrements it
        id_flag: bool,
        /// `false` moves the cursor only, `true` scrolls the entire display
        shift_entire_display: bool,
    },
    /// Display, cursor, and blink enables
    DisplayOnOffCtl {
        /// Display enable
        display_on_off: bool,
        /// Cursor visibility
        cursor_on_off: bool,
        /// Cursor blink enable
        cursor_blink_on_off: bool,
    },
    /// Move the cursor or scroll the display without writing data
    CursorOrDisplayShift {
        /// `false` shifts left, `true` shifts right
        rl_sel: bool,
        /// `false` moves the cursor, `true` scrolls the display
        scroll_or_shift_sel: bool,
    },
    /// Interface width, line count, and dot format
    FunctionSet {
        /// `false` for 5x8 dots, `true` for 5x11 dots
        format_mode: bool,
        /// `false` for 1-line mode, `true` for 2-line mode
        line_number: bool,
        /// `false` for 4-bit transfers, `true` for 8-bit transfers
        data_length: bool,
    },
    /// Select a character-generator RAM address
    SetCgramAddress {
        /// CGRAM index; bits above [`CGRAM_ADDRESS_MASK`] are discarded
        address: u8,
    },
    /// Select a display-data RAM address
    SetDdramAddress {
        /// DDRAM index; bits above [`DDRAM_ADDRESS_MASK`] are discarded
        address: u8,
    },
}

impl Command {
    /// Encode into the wire representation: an opcode byte and, for the
    /// parameterized instructions, a parameter byte with reserved bits
    /// clear.
    pub fn encode(self) -> (u8, Option<u8>) {
        match self {
            Command::ClearDisplay => (opcode::CLEAR_DISPLAY, None),
            Command::ReturnHome => (opcode::RETURN_HOME, None),
            Command::EntryModeSet {
                id_flag,
                shift_entire_display,
            } => {
                let mut param = 0;
                if id_flag {
                    param |= ID_FLAG;
                }
                if shift_entire_display {
                    param |= SHIFT_ENTIRE_DISPLAY;
                }
                (opcode::ENTRY_MODE_SET, Some(param))
            }
            Command::DisplayOnOffCtl {
                display_on_off,
                cursor_on_off,
                cursor_blink_on_off,
            } => {
                let mut param = 0;
                if display_on_off {
                    param |= DISPLAY_ON_OFF;
                }
                if cursor_on_off {
                    param |= CURSOR_ON_OFF;
                }
                if cursor_blink_on_off {
                    param |= CURSOR_BLINK_ON_OFF;
                }
                (opcode::DISPLAY_ON_OFF_CTL, Some(param))
            }
            Command::CursorOrDisplayShift {
                rl_sel,
                scroll_or_shift_sel,
            } => {
                let mut param = 0;
                if rl_sel {
                    param |= RL_SEL;
                }
                if scroll_or_shift_sel {
                    param |= SCROLL_OR_SHIFT_SEL;
                }
                (opcode::CURSOR_OR_DISPLAY_SHIFT, Some(param))
            }
            Command::FunctionSet {
                format_mode,
                line_number,
                data_length,
            } => {
                let mut param = 0;
                if format_mode {
                    param |= FORMAT_MODE;
                }
                if line_number {
                    param |= LINE_NUMBER;
                }
                if data_length {
                    param |= DATA_LENGTH;
                }
                (opcode::FUNCTION_SET, Some(param))
            }
            Command::SetCgramAddress { address } => {
                (opcode::SET_CGRAM_ADDRESS, Some(address & CGRAM_ADDRESS_MASK))
            }
            Command::SetDdramAddress { address } => {
                (opcode::SET_DDRAM_ADDRESS, Some(address & DDRAM_ADDRESS_MASK))
            }
        }
    }

    /// Decode a command from its wire bytes.
    ///
    /// An absent parameter byte decodes as 0x00 (all fields clear).
    /// Returns `UnknownOpcode` for a byte that matches no instruction
    /// and `ReservedBitSet` when any bit outside the instruction's
    /// fields is set — including a nonzero parameter supplied to a
    /// parameterless instruction. Never produces a partial command.
    pub fn decode(opcode_byte: u8, param: Option<u8>) -> Result<Self, DecodeError> {
        let opcode = Opcode::from_byte(opcode_byte).ok_or(DecodeError::UnknownOpcode)?;
        let param = param.unwrap_or(0);

        let field_mask = match opcode {
            Opcode::ClearDisplay | Opcode::ReturnHome => 0,
            Opcode::EntryModeSet => ID_FLAG | SHIFT_ENTIRE_DISPLAY,
            Opcode::DisplayOnOffCtl => DISPLAY_ON_OFF | CURSOR_ON_OFF | CURSOR_BLINK_ON_OFF,
            Opcode::CursorOrDisplayShift => RL_SEL | SCROLL_OR_SHIFT_SEL,
            Opcode::FunctionSet => FORMAT_MODE | LINE_NUMBER | DATA_LENGTH,
            Opcode::SetCgramAddress => CGRAM_ADDRESS_MASK,
            Opcode::SetDdramAddress => DDRAM_ADDRESS_MASK,
        };
        if param & !field_mask != 0 {
            return Err(DecodeError::ReservedBitSet);
        }

        Ok(match opcode {
            Opcode::ClearDisplay => Command::ClearDisplay,
            Opcode::ReturnHome => Command::ReturnHome,
            Opcode::EntryModeSet => Command::EntryModeSet {
                id_flag: param & ID_FLAG != 0,
                shift_entire_display: param & SHIFT_ENTIRE_DISPLAY != 0,
            },
            Opcode::DisplayOnOffCtl => Command::DisplayOnOffCtl {
                display_on_off: param & DISPLAY_ON_OFF != 0,
                cursor_on_off: param & CURSOR_ON_OFF != 0,
                cursor_blink_on_off: param & CURSOR_BLINK_ON_OFF != 0,
            },
            Opcode::CursorOrDisplayShift => Command::CursorOrDisplayShift {
                rl_sel: param & RL_SEL != 0,
                scroll_or_shift_sel: param & SCROLL_OR_SHIFT_SEL != 0,
            },
            Opcode::FunctionSet => Command::FunctionSet {
                format_mode: param & FORMAT_MODE != 0,
                line_number: param & LINE_NUMBER != 0,
                data_length: param & DATA_LENGTH != 0,
            },
            Opcode::SetCgramAddress => Command::SetCgramAddress { address: param },
            Opcode::SetDdramAddress => Command::SetDdramAddress { address: param },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_entry_mode_set_encoding() {
        let command = Command::EntryModeSet {
            id_flag: true,
            shift_entire_display: false,
        };
        assert_eq!(command.encode(), (0x04, Some(0x01)));
    }

    #[test]
    fn test_function_set_encoding() {
        let command = Command::FunctionSet {
            format_mode: false,
            line_number: true,
            data_length: true,
        };
        assert_eq!(command.encode(), (0x20, Some(0x18)));
    }

    #[test]
    fn test_parameterless_commands_have_no_param() {
        assert_eq!(Command::ClearDisplay.encode(), (0x01, None));
        assert_eq!(Command::ReturnHome.encode(), (0x02, None));
    }

    #[test]
    fn test_display_ctl_encoding() {
        let command = Command::DisplayOnOffCtl {
            display_on_off: true,
            cursor_on_off: false,
            cursor_blink_on_off: true,
        };
        assert_eq!(command.encode(), (0x08, Some(0x05)));
    }

    #[test]
    fn test_shift_fields_skip_reserved_bits() {
        let command = Command::CursorOrDisplayShift {
            rl_sel: true,
            scroll_or_shift_sel: true,
        };
        // bits 0-1 reserved, fields start at bit 2
        assert_eq!(command.encode(), (0x10, Some(0x0C)));
    }

    #[test]
    fn test_addresses_are_masked_on_encode() {
        let (_, param) = Command::SetCgramAddress { address: 0xFF }.encode();
        assert_eq!(param, Some(0x1F));
        let (_, param) = Command::SetDdramAddress { address: 0xFF }.encode();
        assert_eq!(param, Some(0x3F));
    }

    #[test]
    fn test_decode_unknown_opcode() {
        assert_eq!(Command::decode(0x00, None), Err(DecodeError::UnknownOpcode));
        assert_eq!(
            Command::decode(0x03, Some(0x00)),
            Err(DecodeError::UnknownOpcode)
        );
        assert_eq!(Command::decode(0xFF, None), Err(DecodeError::UnknownOpcode));
    }

    #[test]
    fn test_decode_reserved_bits() {
        // bits 0-1 of CURSOR_OR_DISPLAY_SHIFT are reserved
        assert_eq!(
            Command::decode(0x10, Some(0x01)),
            Err(DecodeError::ReservedBitSet)
        );
        // bits 0-1 of FUNCTION_SET are reserved
        assert_eq!(
            Command::decode(0x20, Some(0x03)),
            Err(DecodeError::ReservedBitSet)
        );
        // bit above the 5-bit CGRAM address
        assert_eq!(
            Command::decode(0x40, Some(0x20)),
            Err(DecodeError::ReservedBitSet)
        );
        // bit above the 6-bit DDRAM address
        assert_eq!(
            Command::decode(0x80, Some(0x40)),
            Err(DecodeError::ReservedBitSet)
        );
        // any bit above ENTRY_MODE_SET's two fields
        assert_eq!(
            Command::decode(0x04, Some(0x04)),
            Err(DecodeError::ReservedBitSet)
        );
    }

    #[test]
    fn test_decode_parameterless_with_nonzero_param() {
        assert_eq!(Command::decode(0x01, Some(0x00)), Ok(Command::ClearDisplay));
        assert_eq!(
            Command::decode(0x01, Some(0x01)),
            Err(DecodeError::ReservedBitSet)
        );
        assert_eq!(
            Command::decode(0x02, Some(0x80)),
            Err(DecodeError::ReservedBitSet)
        );
    }

    #[test]
    fn test_decode_absent_param_means_zero() {
        assert_eq!(
            Command::decode(0x04, None),
            Ok(Command::EntryModeSet {
                id_flag: false,
                shift_entire_display: false,
            })
        );
        assert_eq!(
            Command::decode(0x80, None),
            Ok(Command::SetDdramAddress { address: 0 })
        );
    }

    fn any_command() -> impl Strategy<Value = Command> {
        prop_oneof![
            Just(Command::ClearDisplay),
            Just(Command::ReturnHome),
            (any::<bool>(), any::<bool>()).prop_map(|(id_flag, shift_entire_display)| {
                Command::EntryModeSet {
                    id_flag,
                    shift_entire_display,
                }
            }),
            (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
                |(display_on_off, cursor_on_off, cursor_blink_on_off)| {
                    Command::DisplayOnOffCtl {
                        display_on_off,
                        cursor_on_off,
                        cursor_blink_on_off,
                    }
                }
            ),
            (any::<bool>(), any::<bool>()).prop_map(|(rl_sel, scroll_or_shift_sel)| {
                Command::CursorOrDisplayShift {
                    rl_sel,
                    scroll_or_shift_sel,
                }
            }),
            (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
                |(format_mode, line_number, data_length)| {
                    Command::FunctionSet {
                        format_mode,
                        line_number,
                        data_length,
                    }
                }
            ),
            (0u8..=CGRAM_ADDRESS_MASK)
                .prop_map(|address| Command::SetCgramAddress { address }),
            (0u8..=DDRAM_ADDRESS_MASK)
                .prop_map(|address| Command::SetDdramAddress { address }),
        ]
    }

    proptest! {
        #[test]
        fn roundtrip_all_valid_commands(command in any_command()) {
            let (opcode, param) = command.encode();
            prop_assert_eq!(Command::decode(opcode, param), Ok(command));
        }

        #[test]
        fn encoded_opcodes_are_single_bit(command in any_command()) {
            let (opcode, _) = command.encode();
            prop_assert_eq!(opcode.count_ones(), 1);
        }
    }
}
