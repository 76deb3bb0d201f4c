pub mod commands;
mod error;

pub use commands::{
    get_clinic_status, get_recent_reports, has_recent_report, new_device_id, submit_report,
    ClinicStatus, SubmitReportRequest,
};
pub use error::ReportError;
