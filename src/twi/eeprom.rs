use std::time::Duration;

use super::{
	reliable_sleep,
	PortRegisters,
	TwiBus,
};

/// Command bytes and burst limits for one device variant.
///
/// Write-select and read-select differ only in bit 0 (clear selects a write,
/// set selects a read); the device type code and the chip-select strapping
/// sit in the upper bits of both.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DeviceConfig {
	pub select_write: u8,
	pub select_read: u8,
	/// Longest write burst the device accepts without wrapping inside a page.
	pub page_size: usize,
	/// Pause before each attempt to re-select a busy device.
	pub poll_interval: Duration,
	/// Number of re-select attempts before giving up on a busy device.
	pub poll_limit: usize,
}

impl DeviceConfig {
	/// Config for a 24-series EEPROM with the given chip-select strapping
	/// (state of the A2..A0 pins, 3 bits).
	pub fn for_chip_select(chip_select: u8) -> Self {
		assert!(chip_select < 8);
		let select_write = 0b1010_0000 | chip_select << 1;
		DeviceConfig {
			select_write,
			select_read: select_write | 0x01,
			page_size: 64,
			poll_interval: Duration::from_micros(10),
			poll_limit: 1000,
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Fail)]
pub enum EepromError {
	#[fail(display = "device select not acknowledged")]
	SelectNotAcknowledged,
	#[fail(display = "address byte not acknowledged")]
	AddressNotAcknowledged,
	#[fail(display = "data byte not acknowledged after {} written", written)]
	DataNotAcknowledged { written: usize },
	#[fail(display = "device still busy after {} select attempts", polls)]
	DeviceNeverReady { polls: usize },
}

/// Addressed, page-bounded access to a serial EEPROM behind a `TwiBus`.
pub struct Eeprom<R: PortRegisters> {
	bus: TwiBus<R>,
	config: DeviceConfig,
}

impl<R: PortRegisters> Eeprom<R> {
	pub fn new(mut bus: TwiBus<R>, config: DeviceConfig) -> Self {
		bus.init();
		Eeprom { bus, config }
	}

	pub fn config(&self) -> &DeviceConfig {
		&self.config
	}

	// select the device for writing and transmit the 16-bit address, high
	// byte first; on failure the transaction is abandoned where it stands
	// (no stop), matching what the device-side state machine expects from
	// an aborted select
	fn select_and_address(&mut self, address: u16) -> Result<(), EepromError> {
		self.bus.start();

		if !self.bus.send_byte(self.config.select_write).is_acked() {
			self.bus.note("select rejected");
			return Err(EepromError::SelectNotAcknowledged);
		}
		if !self.bus.send_byte((address >> 8) as u8).is_acked() {
			self.bus.note("address high rejected");
			return Err(EepromError::AddressNotAcknowledged);
		}
		if !self.bus.send_byte(address as u8).is_acked() {
			self.bus.note("address low rejected");
			return Err(EepromError::AddressNotAcknowledged);
		}

		Ok(())
	}

	// the device starts its internal write cycle on the stop condition and
	// refuses to be selected until done; re-select until it answers again
	fn poll_until_ready(&mut self) -> Result<(), EepromError> {
		for _ in 0..self.config.poll_limit {
			reliable_sleep(self.config.poll_interval);

			self.bus.start();
			if self.bus.send_byte(self.config.select_write).is_acked() {
				self.bus.stop();
				return Ok(());
			}
			self.bus.note("device busy");
		}

		// leave the lines released even though the device never answered
		self.bus.stop();
		Err(EepromError::DeviceNeverReady {
			polls: self.config.poll_limit,
		})
	}

	/// Write `data` starting at `address`.
	///
	/// The burst must stay within one device page; longer bursts wrap at the
	/// page boundary inside the device (not checked here). The write cycle
	/// is always polled to completion before returning, also after a
	/// rejected data byte, so the bus ends up idle and the device selectable.
	pub fn write(&mut self, address: u16, data: &[u8]) -> Result<(), EepromError> {
		self.select_and_address(address)?;

		let mut failed_after = None;
		for (i, b) in data.iter().enumerate() {
			if !self.bus.send_byte(*b).is_acked() {
				self.bus.note("data rejected");
				failed_after = Some(i);
				break;
			}
		}

		self.bus.stop();
		self.poll_until_ready()?;

		match failed_after {
			Some(written) => Err(EepromError::DataNotAcknowledged { written }),
			None => Ok(()),
		}
	}

	/// Read `target.len()` bytes starting at `address`.
	///
	/// The address pointer is set with a write-select transaction, then the
	/// device is re-selected for reading. Every byte is acknowledged except
	/// the last, which terminates the burst.
	pub fn read(&mut self, address: u16, target: &mut [u8]) -> Result<(), EepromError> {
		if target.is_empty() {
			return Ok(());
		}

		self.select_and_address(address)?;
		self.bus.stop();

		self.bus.start();
		if !self.bus.send_byte(self.config.select_read).is_acked() {
			self.bus.note("read select rejected");
			return Err(EepromError::SelectNotAcknowledged);
		}

		let last = target.len() - 1;
		for (i, t) in target.iter_mut().enumerate() {
			*t = self.bus.receive_byte(i < last);
			self.bus.pause();
		}

		self.bus.stop();
		Ok(())
	}
}
