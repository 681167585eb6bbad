use super::{
	reliable_sleep,
	SETTLE_DELAY,
};

/// Access to the GPIO port registers both bus lines live on.
///
/// The registers are shared with other pins on the same port; implementations
/// expose them whole and the bus engine read-modify-writes only its two bits.
/// A set direction bit means the pin is an output; with the output latch held
/// low that drives the line low. A clear direction bit releases the pin to
/// input, where the external pull-up takes the line high.
pub trait PortRegisters {
	fn direction(&self) -> u8;
	fn set_direction(&mut self, value: u8);

	fn output(&self) -> u8;
	fn set_output(&mut self, value: u8);

	fn input(&self) -> u8;

	// delay for (at least) one settle interval
	fn delay(&mut self) {
		reliable_sleep(SETTLE_DELAY);
	}
}

impl<'a, R: ?Sized + PortRegisters> PortRegisters for &'a mut R {
	fn direction(&self) -> u8 {
		R::direction(*self)
	}
	fn set_direction(&mut self, value: u8) {
		R::set_direction(*self, value)
	}

	fn output(&self) -> u8 {
		R::output(*self)
	}
	fn set_output(&mut self, value: u8) {
		R::set_output(*self, value)
	}

	fn input(&self) -> u8 {
		R::input(*self)
	}

	fn delay(&mut self) {
		R::delay(*self)
	}
}
