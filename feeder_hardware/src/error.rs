use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("scale timeout")]
    Timeout,
    #[error("hx711 data-ready timeout")]
    DataReadyTimeout,
    #[error("wall clock unavailable: {0}")]
    Clock(String),
    #[error("scale not calibrated: {0}")]
    Calibration(&'static str),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "hardware")]
impl From<rppal::gpio::Error> for HwError {
    fn from(e: rppal::gpio::Error) -> Self {
        HwError::Gpio(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HwError>;
