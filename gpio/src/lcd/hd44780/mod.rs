//! HD44780 LCD module.
//!
//! Write-only driver for HD44780-compatible character displays connected over the 4-bit parallel
//! interface (RS, E and D4–D7; RW tied to ground). See [driver::LiquidCrystal] for the operations
//! and [driver::GpioLiquidCrystal] for the GPIO implementation.
pub mod driver;
