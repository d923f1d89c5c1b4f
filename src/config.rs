use core::fmt::Display;

use log::LevelFilter;

/// Default address of PCF8574 backpacks with A0-A2 pulled high.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x27;
pub const DEFAULT_WIDTH: u8 = 16;
pub const DEFAULT_COLS: u8 = 16;
pub const DEFAULT_ROWS: u8 = 2;
pub const DEFAULT_BUS: u8 = 1;

/// Number of rows the controller can address.
pub const MAX_ROWS: u8 = 4;
/// Length of one DDRAM line.
pub const MAX_COLS: u8 = 40;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
/// Reasons an `LcdConfig` is rejected
pub enum ConfigError {
    /// Address does not fit in 7 bits
    InvalidAddress(u8),
    /// Width of zero columns
    ZeroWidth,
    /// Column count outside 1..=40
    ColumnsOutOfRange(u8),
    /// Row count outside 1..=4
    RowsOutOfRange(u8),
}

impl From<&ConfigError> for &'static str {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::InvalidAddress(_) => "I2C address is not a 7-bit address",
            ConfigError::ZeroWidth => "Display width must be at least one column",
            ConfigError::ColumnsOutOfRange(_) => "Column count out of range",
            ConfigError::RowsOutOfRange(_) => "Row count out of range",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl ufmt::uDisplay for ConfigError {
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        match self {
            ConfigError::InvalidAddress(v)
            | ConfigError::ColumnsOutOfRange(v)
            | ConfigError::RowsOutOfRange(v) => write!(f, "{}: {}", msg, v),
            ConfigError::ZeroWidth => write!(f, "{}", msg),
        }
    }
}

/// Construction parameters of a display. Fixed once the display is built.
///
/// `width` bounds text layout (`print`, `write_at`) while `cols` bounds cursor
/// addressing (`set_cursor`). Both are 16 on the common 1602 module.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct LcdConfig {
    pub(crate) address: u8,
    pub(crate) width: u8,
    pub(crate) cols: u8,
    pub(crate) rows: u8,
    pub(crate) bus: u8,
    pub(crate) backlight: bool,
    pub(crate) verbosity: LevelFilter,
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_I2C_ADDRESS,
            width: DEFAULT_WIDTH,
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            bus: DEFAULT_BUS,
            backlight: true,
            verbosity: LevelFilter::Info,
        }
    }
}

impl LcdConfig {
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn with_width(mut self, width: u8) -> Self {
        self.width = width;
        self
    }

    pub fn with_cols(mut self, cols: u8) -> Self {
        self.cols = cols;
        self
    }

    pub fn with_rows(mut self, rows: u8) -> Self {
        self.rows = rows;
        self
    }

    /// Bus identifier. Only reported in diagnostics; the bus itself is the
    /// handle passed to the display.
    pub fn with_bus(mut self, bus: u8) -> Self {
        self.bus = bus;
        self
    }

    /// Backlight state applied by the initialization sequence.
    pub fn with_backlight(mut self, on: bool) -> Self {
        self.backlight = on;
        self
    }

    /// Maximum log level, applied process-wide when the display is constructed.
    pub fn with_verbosity(mut self, verbosity: LevelFilter) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn bus(&self) -> u8 {
        self.bus
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }

    pub fn verbosity(&self) -> LevelFilter {
        self.verbosity
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address > 0x7F {
            return Err(ConfigError::InvalidAddress(self.address));
        }
        if self.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.cols == 0 || self.cols > MAX_COLS {
            return Err(ConfigError::ColumnsOutOfRange(self.cols));
        }
        if self.rows == 0 || self.rows > MAX_ROWS {
            return Err(ConfigError::RowsOutOfRange(self.rows));
        }
        Ok(())
    }
}
