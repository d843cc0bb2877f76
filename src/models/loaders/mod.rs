pub mod bank_loader;
pub mod request_loader;

pub use bank_loader::{find_subject_file, load_subject, load_subject_file};
pub use request_loader::{load_all_requests, load_paper_request};
