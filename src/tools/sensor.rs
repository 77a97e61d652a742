use std::env;
use std::io::{Read, Write};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUD: u32 = 9600;

const READ_TIMEOUT: Duration = Duration::from_secs(1);
// The sensor firmware needs this long to answer; it is a device property,
// and it dominates the cost of every read. Retries are a caller decision.
const SETTLE_DELAY: Duration = Duration::from_secs(2);
const COMMAND_FRAME: [u8; 4] = *b"READ";
const RESPONSE_MARKER: &str = "CO2:";

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("serial transport failure: {0}")]
    Transport(String),
    #[error("sensor response is not ASCII text: {raw:?}")]
    Decode { raw: Vec<u8> },
    #[error("sensor response missing 'CO2:' marker: {raw:?}")]
    Malformed { raw: String },
}

impl From<serialport::Error> for SensorError {
    fn from(e: serialport::Error) -> Self {
        SensorError::Transport(e.to_string())
    }
}

impl From<std::io::Error> for SensorError {
    fn from(e: std::io::Error) -> Self {
        SensorError::Transport(e.to_string())
    }
}

// Seam between the orchestrator and the hardware.
#[cfg_attr(test, mockall::automock)]
pub trait Co2Source: Send + Sync {
    fn read(&self) -> Result<u32, SensorError>;
}

pub struct SensorReader {
    port: String,
    baud: u32,
}

impl SensorReader {
    pub fn new(port: String, baud: u32) -> Self {
        Self { port, baud }
    }

    pub fn from_env() -> Self {
        let port = env::var("CO2_SENSOR_PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
        let baud = env::var("CO2_SENSOR_BAUD")
            .ok()
            .and_then(|b| b.parse().ok())
            .unwrap_or(DEFAULT_BAUD);
        Self::new(port, baud)
    }
}

impl Co2Source for SensorReader {
    // One command/response exchange. The port handle is dropped on every
    // exit path, so the device is released even when the read fails.
    fn read(&self) -> Result<u32, SensorError> {
        let mut port = serialport::new(self.port.as_str(), self.baud)
            .timeout(READ_TIMEOUT)
            .open()?;
        debug!(port = %self.port, baud = self.baud, "serial port open");

        port.write_all(&COMMAND_FRAME)?;
        port.flush()?;
        thread::sleep(SETTLE_DELAY);

        let available = port.bytes_to_read()? as usize;
        if available == 0 {
            return Err(SensorError::Transport(
                "no response from sensor within timeout".to_string(),
            ));
        }
        let mut raw = vec![0u8; available];
        port.read_exact(&mut raw)?;

        let ppm = parse_response(raw)?;
        info!(ppm, "CO2 reading");
        Ok(ppm)
    }
}

// Decode/validate/parse steps, split out so the wire protocol is testable
// without hardware. Raw payloads ride along in the errors for diagnosis.
pub fn parse_response(raw: Vec<u8>) -> Result<u32, SensorError> {
    if !raw.is_ascii() {
        return Err(SensorError::Decode { raw });
    }
    let text = match String::from_utf8(raw) {
        Ok(t) => t,
        Err(e) => {
            return Err(SensorError::Decode {
                raw: e.into_bytes(),
            });
        }
    };

    let Some(rest) = text.trim().strip_prefix(RESPONSE_MARKER) else {
        return Err(SensorError::Malformed { raw: text });
    };
    match rest.trim().parse::<u32>() {
        Ok(ppm) => Ok(ppm),
        Err(_) => Err(SensorError::Malformed { raw: text }),
    }
}
