use serde_json::{json, Value};

use super::vital_signs::VitalSigns;

/// Renders the diagnosis prompt for one patient.
pub fn render(patient_id: &str, vitals: &VitalSigns) -> String {
    format!(
        "You are an AI assistant helping doctors by suggesting potential diagnoses and risk factors based on patient data.\n\
         \n\
         Analyze the patient's historical vital signs and consultation records to suggest potential diagnoses or risk factors.\n\
         \n\
         Patient ID: {patient_id}\n\
         Current Vital Signs: Heart rate: {} bpm, Temperature: {} °C, Oxygen saturation: {} %\n\
         \n\
         Provide a list of potential diagnoses or risk factors that the doctor should consider. Return the answer in one paragraph.\n",
        vitals.heart_rate, vitals.temperature_celsius, vitals.oxygen_saturation,
    )
}

/// Response schema: a single required string, `suggestedDiagnoses`.
pub fn output_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "suggestedDiagnoses": {
                "type": "STRING",
                "description": "A list of potential diagnoses or risk factors for the patient."
            }
        },
        "required": ["suggestedDiagnoses"]
    })
}
