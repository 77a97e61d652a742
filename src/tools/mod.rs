pub use self::sensor::SensorReader;

pub mod sensor;
pub mod ventilation;
