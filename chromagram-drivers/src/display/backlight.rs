//! Backlight controller bring-up
//!
//! Runs once at attach, before the device accepts sessions. The display
//! stays usable without its backlight, so the writes are best effort: a
//! failed step is logged and the sequence continues.

use embedded_hal_async::i2c::I2c;

use super::reg::{self, Target};
use super::transport::Transport;

/// LED_OUT value selecting individual PWM control on every channel.
const LED_OUT_PWM: u8 = 0xAA;

/// Default PWM duty for each color channel (mid brightness).
const DEFAULT_PWM: u8 = 0x7F;

/// Backlight color applied during bring-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BacklightConfig {
    /// Red channel PWM duty
    pub red: u8,
    /// Green channel PWM duty
    pub green: u8,
    /// Blue channel PWM duty
    pub blue: u8,
}

impl Default for BacklightConfig {
    /// Mid-brightness white.
    fn default() -> Self {
        Self {
            red: DEFAULT_PWM,
            green: DEFAULT_PWM,
            blue: DEFAULT_PWM,
        }
    }
}

/// Run the bring-up sequence against the backlight controller.
///
/// Fixed order: MODE1 (wake), MODE2 (driver config), the three PWM
/// channels, then LED_OUT. Each step is one serialized transport write.
pub(crate) async fn initialize<B: I2c>(transport: &Transport<B>, config: &BacklightConfig) {
    let steps = [
        (reg::backlight::MODE1, 0x00),
        (reg::backlight::MODE2, 0x00),
        (reg::backlight::PWM_BLUE, config.blue),
        (reg::backlight::PWM_GREEN, config.green),
        (reg::backlight::PWM_RED, config.red),
        (reg::backlight::LED_OUT, LED_OUT_PWM),
    ];

    for (register, value) in steps {
        if transport
            .write(Target::Backlight, register, value)
            .await
            .is_err()
        {
            #[cfg(feature = "defmt")]
            defmt::warn!("backlight bring-up: write to reg {=u8:#x} failed", register);
        }
    }
}
