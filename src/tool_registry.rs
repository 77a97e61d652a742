use serde_json::Value;
use thiserror::Error;

pub const MEASURE_CO2: &str = "measure_co2";
pub const DETERMINE_VENTILATION_STATUS: &str = "determine_ventilation_status";

// The closed set of capabilities the model may invoke. Resolution failures
// are reportable conversation content, never a crash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    MeasureCo2,
    DetermineVentilationStatus,
}

#[derive(Debug, Error)]
#[error("unknown capability '{0}'; available capabilities: measure_co2, determine_ventilation_status")]
pub struct UnknownCapability(pub String);

#[derive(Clone)]
pub struct ToolRegistry {
    schemas: Value,
}

impl ToolRegistry {
    pub fn new() -> Self {
        // Single source of truth for the capability schema the LLM sees
        let schemas = serde_json::json!([
            {
                "type": "function",
                "function": {
                    "name": MEASURE_CO2,
                    "description":
                        "Reads the current ambient CO2 concentration in ppm \
                         from the connected serial sensor. Takes a couple of \
                         seconds while the sensor responds.",
                    "parameters": {
                        "type": "object",
                        "properties": {},
                        "required": []
                    }
                }
            },
            {
                "type": "function",
                "function": {
                    "name": DETERMINE_VENTILATION_STATUS,
                    "description":
                        "Classifies a CO2 concentration into a ventilation \
                         recommendation (OK / ELEVATED / HIGH). If ppm is \
                         omitted, the reading from an immediately preceding \
                         measure_co2 call is used.",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "ppm": {
                                "type": "number",
                                "description":
                                    "CO2 concentration in parts per million"
                            }
                        },
                        "required": []
                    }
                }
            }
        ]);
        Self { schemas }
    }

    pub fn schemas(&self) -> &Value {
        &self.schemas
    }

    pub fn resolve(&self, name: &str) -> Result<Capability, UnknownCapability> {
        match name {
            MEASURE_CO2 => Ok(Capability::MeasureCo2),
            DETERMINE_VENTILATION_STATUS => Ok(Capability::DetermineVentilationStatus),
            other => Err(UnknownCapability(other.to_string())),
        }
    }
}
