mod nav;
mod patient_guard;

pub use nav::Nav;
pub use patient_guard::PatientGuard;
