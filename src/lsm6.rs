// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! LSM6DS33 6-axis IMU on the robot's I2C bus.
//!
//! The IMU sits next to the robot controller on the host's bus and is talked to directly. This
//! driver covers what the host needs: output data rates, high-performance modes, the FIFO
//! configuration and a burst read of the gyro and accelerometer outputs. Configuration fields
//! share registers with other settings, so every setter is a masked read-modify-write.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::config::POINTER_SETTLE_US;

/// 7-bit address with SA0 high (the robot's strapping).
pub const ADDRESS: u8 = 0x6B;
/// 7-bit address with SA0 low.
pub const ADDRESS_SA0_LOW: u8 = 0x6A;

/// Identity value of `WHO_AM_I`.
pub const WHO_AM_I_VALUE: u8 = 0x69;

// Register addresses
pub mod reg {
    pub const FUNC_CFG_ACCESS: u8 = 0x01;
    pub const FIFO_CTRL1: u8 = 0x06;
    pub const FIFO_CTRL2: u8 = 0x07;
    pub const FIFO_CTRL3: u8 = 0x08;
    pub const FIFO_CTRL4: u8 = 0x09;
    pub const FIFO_CTRL5: u8 = 0x0A;
    pub const ORIENT_CFG_G: u8 = 0x0B;
    pub const INT1_CTRL: u8 = 0x0D;
    pub const INT2_CTRL: u8 = 0x0E;
    pub const WHO_AM_I: u8 = 0x0F;
    pub const CTRL1_XL: u8 = 0x10;
    pub const CTRL2_G: u8 = 0x11;
    pub const CTRL3_C: u8 = 0x12;
    pub const CTRL4_C: u8 = 0x13;
    pub const CTRL5_C: u8 = 0x14;
    pub const CTRL6_C: u8 = 0x15;
    pub const CTRL7_G: u8 = 0x16;
    pub const CTRL8_XL: u8 = 0x17;
    pub const CTRL9_XL: u8 = 0x18;
    pub const CTRL10_C: u8 = 0x19;
    pub const STATUS_REG: u8 = 0x1E;
    pub const OUT_TEMP_L: u8 = 0x20;
    pub const OUTX_L_G: u8 = 0x22;
    pub const OUTX_L_XL: u8 = 0x28;
    pub const FIFO_STATUS1: u8 = 0x3A;
    pub const FIFO_DATA_OUT_L: u8 = 0x3E;
    pub const TIMESTAMP0_REG: u8 = 0x40;
    pub const STEP_COUNTER_L: u8 = 0x4B;
}

/// Field masks.
pub mod mask {
    /// `CTRL1_XL` / `CTRL2_G` output data rate.
    pub const ODR: u8 = 0b1111_0000;
    /// `FIFO_CTRL5` FIFO data rate (the ODR code shifted down one bit).
    pub const FIFO_ODR: u8 = ODR >> 1;
    /// `FIFO_CTRL5` FIFO mode.
    pub const FIFO_MODE: u8 = 0b0000_0111;
    /// `CTRL6_C` accelerometer high-performance disable.
    pub const XL_HM_MODE: u8 = 0b0001_0000;
    /// `CTRL7_G` gyroscope high-performance disable.
    pub const G_HM_MODE: u8 = 0b1000_0000;
}

/// Output data rate, encoded as the upper nibble of `CTRL1_XL`/`CTRL2_G`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Odr {
    Off = 0x00,
    Hz13 = 0x10,
    Hz26 = 0x20,
    Hz52 = 0x30,
    Hz104 = 0x40,
    Hz208 = 0x50,
    Hz416 = 0x60,
    Hz833 = 0x70,
    Hz1660 = 0x80,
    /// Accelerometer only.
    Hz3330 = 0x90,
    /// Accelerometer only.
    Hz6660 = 0xA0,
}

impl Odr {
    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Decode the ODR nibble. `None` for reserved codes.
    pub fn from_bits(bits: u8) -> Option<Self> {
        Some(match bits & mask::ODR {
            0x00 => Odr::Off,
            0x10 => Odr::Hz13,
            0x20 => Odr::Hz26,
            0x30 => Odr::Hz52,
            0x40 => Odr::Hz104,
            0x50 => Odr::Hz208,
            0x60 => Odr::Hz416,
            0x70 => Odr::Hz833,
            0x80 => Odr::Hz1660,
            0x90 => Odr::Hz3330,
            0xA0 => Odr::Hz6660,
            _ => return None,
        })
    }

    /// True if the gyroscope supports this rate.
    #[inline]
    pub fn gyro_capable(self) -> bool {
        self.bits() <= Odr::Hz1660.bits()
    }
}

/// `FIFO_CTRL5` mode field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FifoMode {
    Bypass = 0b000,
    /// Stop collecting when full.
    Fifo = 0b001,
    ContinuousToFifo = 0b011,
    BypassToContinuous = 0b100,
    /// Overwrite the oldest samples when full.
    Continuous = 0b110,
}

impl FifoMode {
    pub fn from_bits(bits: u8) -> Option<Self> {
        Some(match bits & mask::FIFO_MODE {
            0b000 => FifoMode::Bypass,
            0b001 => FifoMode::Fifo,
            0b011 => FifoMode::ContinuousToFifo,
            0b100 => FifoMode::BypassToContinuous,
            0b110 => FifoMode::Continuous,
            _ => return None,
        })
    }
}

/// One gyroscope + accelerometer sample, raw signed counts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ImuData {
    /// Angular rate x, y, z.
    pub gyro: [i16; 3],
    /// Linear acceleration x, y, z.
    pub accel: [i16; 3],
}

impl ImuData {
    /// Decode the 12 bytes starting at `OUTX_L_G` (gyro then accel, little-endian).
    pub fn from_bytes(raw: &[u8; 12]) -> Self {
        let word = |i: usize| i16::from_le_bytes([raw[2 * i], raw[2 * i + 1]]);
        Self {
            gyro: [word(0), word(1), word(2)],
            accel: [word(3), word(4), word(5)],
        }
    }
}

/// Errors from [`Lsm6`] operations.
#[derive(Debug, PartialEq)]
pub enum Lsm6Error<E> {
    /// Underlying I2C bus error.
    Bus(E),
    /// Rate the gyroscope cannot run at.
    UnsupportedRate(Odr),
}

impl<E: fmt::Debug> fmt::Display for Lsm6Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lsm6Error::Bus(e) => write!(f, "i2c bus error: {:?}", e),
            Lsm6Error::UnsupportedRate(odr) => write!(f, "gyroscope cannot run at {:?}", odr),
        }
    }
}

/// LSM6 driver over an `embedded-hal` I2C bus.
pub struct Lsm6<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C, D> Lsm6<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            address: ADDRESS,
        }
    }

    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Release the bus and delay.
    pub fn free(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Read consecutive registers starting at `register` (the IMU auto-increments).
    pub fn read_registers(
        &mut self,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), Lsm6Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[register])
            .map_err(Lsm6Error::Bus)?;
        self.delay.delay_us(POINTER_SETTLE_US);
        self.i2c.read(self.address, buf).map_err(Lsm6Error::Bus)
    }

    pub fn read_register(&mut self, register: u8) -> Result<u8, Lsm6Error<I2C::Error>> {
        let mut value = [0u8; 1];
        self.read_registers(register, &mut value)?;
        Ok(value[0])
    }

    pub fn write_register(&mut self, register: u8, value: u8) -> Result<(), Lsm6Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(Lsm6Error::Bus)?;
        self.delay.delay_us(POINTER_SETTLE_US);
        Ok(())
    }

    /// Bits of `register` selected by `mask`, in place.
    pub fn read_masked(&mut self, register: u8, mask: u8) -> Result<u8, Lsm6Error<I2C::Error>> {
        Ok(self.read_register(register)? & mask)
    }

    /// Replace the bits of `register` selected by `mask` with those of `value`.
    pub fn update_register(
        &mut self,
        register: u8,
        value: u8,
        mask: u8,
    ) -> Result<(), Lsm6Error<I2C::Error>> {
        let current = self.read_register(register)?;
        self.write_register(register, (current & !mask) | (value & mask))
    }

    pub fn who_am_i(&mut self) -> Result<u8, Lsm6Error<I2C::Error>> {
        self.read_register(reg::WHO_AM_I)
    }

    /// Accelerometer rate. `None` if the register holds a reserved code.
    pub fn accel_odr(&mut self) -> Result<Option<Odr>, Lsm6Error<I2C::Error>> {
        Ok(Odr::from_bits(self.read_masked(reg::CTRL1_XL, mask::ODR)?))
    }

    pub fn set_accel_odr(&mut self, odr: Odr) -> Result<(), Lsm6Error<I2C::Error>> {
        self.update_register(reg::CTRL1_XL, odr.bits(), mask::ODR)
    }

    /// Gyroscope rate. `None` if the register holds a reserved code.
    pub fn gyro_odr(&mut self) -> Result<Option<Odr>, Lsm6Error<I2C::Error>> {
        Ok(Odr::from_bits(self.read_masked(reg::CTRL2_G, mask::ODR)?))
    }

    /// Set the gyroscope rate. 3.33 kHz and up are refused without touching the bus.
    pub fn set_gyro_odr(&mut self, odr: Odr) -> Result<(), Lsm6Error<I2C::Error>> {
        if !odr.gyro_capable() {
            return Err(Lsm6Error::UnsupportedRate(odr));
        }
        self.update_register(reg::CTRL2_G, odr.bits(), mask::ODR)
    }

    /// True unless `XL_HM_MODE` in `CTRL6_C` turns high-performance mode off.
    pub fn accel_high_performance(&mut self) -> Result<bool, Lsm6Error<I2C::Error>> {
        Ok(self.read_masked(reg::CTRL6_C, mask::XL_HM_MODE)? == 0)
    }

    pub fn set_accel_high_performance(&mut self, on: bool) -> Result<(), Lsm6Error<I2C::Error>> {
        let value = if on { 0 } else { mask::XL_HM_MODE };
        self.update_register(reg::CTRL6_C, value, mask::XL_HM_MODE)
    }

    /// True unless `G_HM_MODE` in `CTRL7_G` turns high-performance mode off.
    pub fn gyro_high_performance(&mut self) -> Result<bool, Lsm6Error<I2C::Error>> {
        Ok(self.read_masked(reg::CTRL7_G, mask::G_HM_MODE)? == 0)
    }

    pub fn set_gyro_high_performance(&mut self, on: bool) -> Result<(), Lsm6Error<I2C::Error>> {
        let value = if on { 0 } else { mask::G_HM_MODE };
        self.update_register(reg::CTRL7_G, value, mask::G_HM_MODE)
    }

    /// FIFO rate, reported with the same codes as the sensor rates.
    pub fn fifo_odr(&mut self) -> Result<Option<Odr>, Lsm6Error<I2C::Error>> {
        Ok(Odr::from_bits(
            self.read_masked(reg::FIFO_CTRL5, mask::FIFO_ODR)? << 1,
        ))
    }

    pub fn set_fifo_odr(&mut self, odr: Odr) -> Result<(), Lsm6Error<I2C::Error>> {
        self.update_register(reg::FIFO_CTRL5, odr.bits() >> 1, mask::FIFO_ODR)
    }

    /// FIFO mode. `None` if the register holds a reserved code.
    pub fn fifo_mode(&mut self) -> Result<Option<FifoMode>, Lsm6Error<I2C::Error>> {
        Ok(FifoMode::from_bits(
            self.read_masked(reg::FIFO_CTRL5, mask::FIFO_MODE)?,
        ))
    }

    pub fn set_fifo_mode(&mut self, mode: FifoMode) -> Result<(), Lsm6Error<I2C::Error>> {
        self.update_register(reg::FIFO_CTRL5, mode as u8, mask::FIFO_MODE)
    }

    /// Burst-read one gyro + accel sample.
    pub fn imu_data(&mut self) -> Result<ImuData, Lsm6Error<I2C::Error>> {
        let mut raw = [0u8; 12];
        self.read_registers(reg::OUTX_L_G, &mut raw)?;
        Ok(ImuData::from_bytes(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    /// Register file with an auto-incrementing pointer, like the real part.
    struct FakeImu {
        regs: [u8; 0x80],
        pointer: usize,
        writes: usize,
    }

    impl FakeImu {
        fn new() -> Self {
            let mut regs = [0u8; 0x80];
            regs[reg::WHO_AM_I as usize] = WHO_AM_I_VALUE;
            Self {
                regs,
                pointer: 0,
                writes: 0,
            }
        }
    }

    impl ErrorType for FakeImu {
        type Error = ErrorKind;
    }

    impl I2c for FakeImu {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if address != ADDRESS {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => {
                        if let Some((&first, data)) = bytes.split_first() {
                            self.pointer = first as usize;
                            for &b in data {
                                self.regs[self.pointer] = b;
                                self.pointer += 1;
                                self.writes += 1;
                            }
                        }
                    }
                    Operation::Read(buf) => {
                        for b in buf.iter_mut() {
                            *b = self.regs[self.pointer];
                            self.pointer += 1;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn imu() -> Lsm6<FakeImu, NoDelay> {
        Lsm6::new(FakeImu::new(), NoDelay)
    }

    fn regs(imu: Lsm6<FakeImu, NoDelay>) -> [u8; 0x80] {
        imu.free().0.regs
    }

    #[test]
    fn identifies_itself() {
        assert_eq!(imu().who_am_i(), Ok(WHO_AM_I_VALUE));
    }

    #[test]
    fn odr_updates_keep_the_low_nibble() {
        let mut imu = imu();
        imu.write_register(reg::CTRL1_XL, 0b0000_1010).unwrap();

        imu.set_accel_odr(Odr::Hz833).unwrap();
        assert_eq!(imu.accel_odr(), Ok(Some(Odr::Hz833)));
        imu.set_gyro_odr(Odr::Hz104).unwrap();
        assert_eq!(imu.gyro_odr(), Ok(Some(Odr::Hz104)));

        let regs = regs(imu);
        assert_eq!(regs[reg::CTRL1_XL as usize], 0x70 | 0b0000_1010);
        assert_eq!(regs[reg::CTRL2_G as usize], 0x40);
    }

    #[test]
    fn gyro_refuses_accel_only_rates() {
        let mut imu = imu();
        assert_eq!(
            imu.set_gyro_odr(Odr::Hz6660),
            Err(Lsm6Error::UnsupportedRate(Odr::Hz6660))
        );
        assert_eq!(imu.free().0.writes, 0);
    }

    #[test]
    fn high_performance_bits_are_independent() {
        let mut imu = imu();
        imu.write_register(reg::CTRL6_C, 0b0000_0011).unwrap();
        assert_eq!(imu.accel_high_performance(), Ok(true));

        imu.set_accel_high_performance(false).unwrap();
        imu.set_gyro_high_performance(false).unwrap();
        assert_eq!(imu.accel_high_performance(), Ok(false));
        assert_eq!(imu.gyro_high_performance(), Ok(false));

        imu.set_accel_high_performance(true).unwrap();
        assert_eq!(imu.accel_high_performance(), Ok(true));
        assert_eq!(imu.gyro_high_performance(), Ok(false));

        let regs = regs(imu);
        assert_eq!(regs[reg::CTRL6_C as usize], 0b0000_0011);
        assert_eq!(regs[reg::CTRL7_G as usize], 0b1000_0000);
    }

    #[test]
    fn fifo_rate_and_mode_share_a_register() {
        let mut imu = imu();

        imu.set_fifo_odr(Odr::Hz416).unwrap();
        imu.set_fifo_mode(FifoMode::Continuous).unwrap();
        assert_eq!(imu.fifo_odr(), Ok(Some(Odr::Hz416)));
        assert_eq!(imu.fifo_mode(), Ok(Some(FifoMode::Continuous)));

        imu.set_fifo_mode(FifoMode::Bypass).unwrap();
        assert_eq!(imu.fifo_odr(), Ok(Some(Odr::Hz416)));

        assert_eq!(regs(imu)[reg::FIFO_CTRL5 as usize], 0x60 >> 1);
    }

    #[test]
    fn reserved_codes_decode_to_none() {
        let mut imu = imu();
        imu.write_register(reg::CTRL1_XL, 0xF0).unwrap();
        imu.write_register(reg::FIFO_CTRL5, 0b0000_0010).unwrap();
        assert_eq!(imu.accel_odr(), Ok(None));
        assert_eq!(imu.fifo_mode(), Ok(None));
    }

    #[test]
    fn imu_data_reads_gyro_then_accel() {
        let mut imu = imu();
        let raw: [u8; 12] = [
            0x01, 0x00, 0xFF, 0xFF, 0x00, 0x80, // gyro 1, -1, i16::MIN
            0x10, 0x27, 0xF0, 0xD8, 0xFF, 0x7F, // accel 10000, -10000, i16::MAX
        ];
        let mut frame = [0u8; 13];
        frame[0] = reg::OUTX_L_G;
        frame[1..].copy_from_slice(&raw);
        imu.i2c.write(ADDRESS, &frame).unwrap();

        assert_eq!(
            imu.imu_data(),
            Ok(ImuData {
                gyro: [1, -1, i16::MIN],
                accel: [10000, -10000, i16::MAX],
            })
        );
    }

    #[test]
    fn other_address_is_not_acknowledged() {
        let mut imu = imu().with_address(ADDRESS_SA0_LOW);
        assert_eq!(
            imu.who_am_i(),
            Err(Lsm6Error::Bus(ErrorKind::NoAcknowledge(
                NoAcknowledgeSource::Address
            )))
        );
    }
}
