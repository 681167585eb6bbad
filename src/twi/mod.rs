/// Software ("bit-banged") two-wire bus with a 24-series serial EEPROM
/// protocol on top (e.g. 24C256, organized as 32768 x 8bit in 64-byte pages).
///
/// Both lines are open-drain: a line is driven low by switching its pin to
/// output (the output latch stays low), and released high by switching the
/// pin back to input, where the external pull-up floats it. A line is never
/// driven electrically high.
///
/// Framing:
/// - START: data falls while clock is high
/// - STOP: data rises while clock is high
/// - otherwise data only changes while clock is low
///
/// Bytes go out most-significant bit first, 8 clocks each, followed by a 9th
/// clock in which the *receiver* may pull data low to acknowledge.
///
/// EEPROM transactions:
/// - write: START, write-select, address high, address low, data bytes, STOP;
///   then the device is busy with its internal write cycle and refuses to be
///   selected until done
/// - read: START, write-select + address (sets the device address pointer),
///   STOP, START, read-select, data bytes (all acked by the master except the
///   last), STOP

mod bus;
mod eeprom;
mod hardware;


pub use self::bus::{
	Ack,
	DiagHook,
	TwiBus,
};

pub use self::eeprom::{
	DeviceConfig,
	Eeprom,
	EepromError,
};

pub use self::hardware::{
	PortRegisters,
};

use std::thread;
use std::time::{
	Duration,
	Instant,
};

// the single timing parameter of the bus; every line change is followed by
// one settle interval
const SETTLE_DELAY: Duration = Duration::from_micros(20);

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}
