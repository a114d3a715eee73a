use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use ward_core::config::{
    generation_config_from_env_values, store_backend_from_env_values,
    vital_signs_mode_from_env_value, StoreBackend,
};
use ward_core::validation::{validate_diagnosis_request, validate_status, validate_vital};
use ward_core::{
    CoreConfig, DocumentStore, FileStore, PatientService, Services, VitalQuery, VitalService,
};

#[derive(Parser)]
#[command(name = "ward")]
#[command(about = "Ward patient dashboard CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    ListPatients,
    /// Show one patient and their visits
    ShowPatient {
        /// Patient ID
        patient_id: String,
    },
    /// Set a patient's status (e.g. "En espera", "De alta")
    SetStatus {
        /// Patient ID
        patient_id: String,
        /// Status label
        status: String,
    },
    /// Record a vital-sign reading
    RecordVital {
        /// Patient ID
        patient_id: String,
        /// Vital type (heart-rate, oxygen-saturation, temperature, blood-pressure, glucose)
        kind: String,
        /// Measured value
        value: f64,
        /// Measurement time in epoch milliseconds (defaults to now)
        #[arg(long)]
        at: Option<i64>,
    },
    /// List vitals, optionally filtered by patient and time range
    ListVitals {
        /// Patient ID
        #[arg(long)]
        patient_id: Option<String>,
        /// Inclusive lower bound, epoch milliseconds
        #[arg(long)]
        from: Option<i64>,
        /// Inclusive upper bound, epoch milliseconds
        #[arg(long)]
        to: Option<i64>,
    },
    /// Ask the model for diagnosis suggestions for a patient
    Suggest {
        /// Patient ID
        patient_id: String,
    },
}

/// Resolves the root of the file store the server uses. The CLI never runs against the memory
/// store.
fn data_root() -> Result<PathBuf, Box<dyn std::error::Error>> {
    match store_backend_from_env_values(None, std::env::var("PATIENT_DATA_DIR").ok())? {
        StoreBackend::File(root) => Ok(root),
        StoreBackend::Memory => Err("the CLI requires the file store".into()),
    }
}

fn millis(value: Option<i64>) -> Result<Option<chrono::DateTime<chrono::Utc>>, String> {
    value
        .map(|ms| {
            chrono::DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| format!("{} is not a valid timestamp", ms))
        })
        .transpose()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'ward --help' for commands");
        return Ok(());
    };
    let root = data_root()?;
    let store: Arc<dyn DocumentStore> = Arc::new(FileStore::open(&root)?);

    match command {
        Commands::ListPatients => match PatientService::new(store).list().await {
            Ok(patients) if patients.is_empty() => println!("No patients found."),
            Ok(patients) => {
                for patient in patients {
                    println!(
                        "ID: {}, Name: {}, Born: {}, Status: {}",
                        patient.patient_id, patient.full_name, patient.birth_year, patient.status
                    );
                }
            }
            Err(e) => eprintln!("Error listing patients: {}", e),
        },
        Commands::ShowPatient { patient_id } => {
            match PatientService::new(store).get_with_visits(&patient_id).await {
                Ok(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                Err(e) => eprintln!("Error reading patient: {}", e),
            }
        }
        Commands::SetStatus { patient_id, status } => {
            let status = validate_status(&status)?;
            match PatientService::new(store)
                .update_status(&patient_id, status)
                .await
            {
                Ok(patient) => println!(
                    "Patient {} is now '{}'",
                    patient.patient_id, patient.status
                ),
                Err(e) => eprintln!("Error updating status: {}", e),
            }
        }
        Commands::RecordVital {
            patient_id,
            kind,
            value,
            at,
        } => {
            let timestamp = at.unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
            let new = validate_vital(&json!({
                "patientId": patient_id,
                "type": kind,
                "value": value,
                "timestamp": timestamp,
            }))?;
            match VitalService::new(store).create(new).await {
                Ok(vital) => println!("Recorded vital with ID: {}", vital.id),
                Err(e) => eprintln!("Error recording vital: {}", e),
            }
        }
        Commands::ListVitals {
            patient_id,
            from,
            to,
        } => {
            let query = VitalQuery {
                patient_id,
                from: millis(from)?,
                to: millis(to)?,
            };
            match VitalService::new(store).query(&query).await {
                Ok(vitals) if vitals.is_empty() => println!("No vitals found."),
                Ok(vitals) => {
                    for vital in vitals {
                        println!(
                            "{} {} {}={} (patient {})",
                            vital.timestamp.to_rfc3339(),
                            vital.id,
                            vital.kind,
                            vital.value,
                            vital.patient_id
                        );
                    }
                }
                Err(e) => eprintln!("Error listing vitals: {}", e),
            }
        }
        Commands::Suggest { patient_id } => {
            let patient_id = validate_diagnosis_request(&json!({ "patientId": patient_id }))?;
            let generation = generation_config_from_env_values(
                std::env::var("GEMINI_API_KEY").ok(),
                std::env::var("WARD_MODEL").ok(),
                std::env::var("WARD_GENERATION_URL").ok(),
            )?;
            let vital_signs =
                vital_signs_mode_from_env_value(std::env::var("WARD_VITALS_SOURCE").ok())?;
            let config = CoreConfig::new(StoreBackend::File(root), vital_signs, generation);
            let services = Services::from_config(&config)?;

            match services.diagnosis.suggest(&patient_id).await {
                Ok(res) => println!("{}", res.suggested_diagnoses),
                Err(e) => eprintln!("Error suggesting diagnoses: {}", e),
            }
        }
    }

    Ok(())
}
