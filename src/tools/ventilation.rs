use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const ELEVATED_THRESHOLD_PPM: u32 = 800;
pub const HIGH_THRESHOLD_PPM: u32 = 1000;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VentilationTier {
    Ok,
    Elevated,
    High,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct VentilationStatus {
    pub ppm: u32,
    pub status: VentilationTier,
    pub message: &'static str,
}

impl VentilationStatus {
    // JSON rendering used as tool-result content
    pub fn to_content(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{} ppm: {}", self.ppm, self.message))
    }
}

#[derive(Debug, Error)]
#[error("invalid ppm value {given}: supply the CO2 concentration as a whole number of ppm")]
pub struct InvalidInput {
    given: String,
}

// Pure tier mapping. 800 and 1000 both land in ELEVATED.
pub fn classify(ppm: u32) -> VentilationStatus {
    let (status, message) = if ppm < ELEVATED_THRESHOLD_PPM {
        (VentilationTier::Ok, "CO2 level adequate, no ventilation needed")
    } else if ppm <= HIGH_THRESHOLD_PPM {
        (VentilationTier::Elevated, "ventilation recommended")
    } else {
        (VentilationTier::High, "immediate ventilation required")
    };
    VentilationStatus {
        ppm,
        status,
        message,
    }
}

// Adapts a model-supplied argument object. Anything that is not a
// non-negative integer comes back as InvalidInput, worded so the model
// resupplies a numeric ppm value.
pub fn classify_arg(args: &Value) -> Result<VentilationStatus, InvalidInput> {
    let ppm = args.get("ppm").ok_or_else(|| InvalidInput {
        given: "<missing>".to_string(),
    })?;
    let ppm = ppm
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| InvalidInput {
            given: ppm.to_string(),
        })?;
    Ok(classify(ppm))
}
