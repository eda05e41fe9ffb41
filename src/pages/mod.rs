mod confirm_email;
mod home;
mod patient_access;
mod patient_home;

pub use confirm_email::ConfirmEmailPage;
pub use home::HomePage;
pub use patient_access::PatientAccessPage;
pub use patient_home::PatientHomePage;
