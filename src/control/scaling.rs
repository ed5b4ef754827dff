// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Conversions between record units and peripheral units.

use crate::config::{ADC_FULL_SCALE, ADC_VREF_MV, BATTERY_DIVIDER, MOTOR_MAX_SPEED};

/// H-bridge duty pair `(forward, reverse)` for a signed speed command.
///
/// Commands beyond `±MOTOR_MAX_SPEED` are clamped to full duty. Zero gives `(0, 0)` (coast).
pub fn motor_duty(speed: i16, max_duty: u16) -> (u16, u16) {
    let limit = MOTOR_MAX_SPEED as u32;
    let magnitude = (speed.unsigned_abs() as u32).min(limit);
    let duty = (magnitude * max_duty as u32 / limit) as u16;

    if speed >= 0 {
        (duty, 0)
    } else {
        (0, duty)
    }
}

/// Raw 12-bit ADC count to millivolts at the pin.
#[inline]
pub fn adc_millivolts(raw: u16) -> u16 {
    let raw = (raw as u32).min(ADC_FULL_SCALE);
    (raw * ADC_VREF_MV / ADC_FULL_SCALE) as u16
}

/// Raw battery-sense ADC count to pack millivolts.
#[inline]
pub fn battery_millivolts(raw: u16) -> u16 {
    (adc_millivolts(raw) as u32 * BATTERY_DIVIDER) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duty_follows_direction() {
        assert_eq!(motor_duty(0, 1000), (0, 0));
        assert_eq!(motor_duty(150, 1000), (500, 0));
        assert_eq!(motor_duty(-150, 1000), (0, 500));
    }

    #[test]
    fn duty_clamps_at_max_speed() {
        assert_eq!(motor_duty(MOTOR_MAX_SPEED, 4000), (4000, 0));
        assert_eq!(motor_duty(i16::MAX, 4000), (4000, 0));
        assert_eq!(motor_duty(i16::MIN, 4000), (0, 4000));
    }

    #[test]
    fn adc_scales_to_reference() {
        assert_eq!(adc_millivolts(0), 0);
        assert_eq!(adc_millivolts(4095), 3300);
        assert_eq!(adc_millivolts(u16::MAX), 3300);
        assert_eq!(battery_millivolts(4095), 9900);
    }
}
