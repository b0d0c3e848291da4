//! MIA Core Library
//!
//! Domain models, validation rules and the error taxonomy shared by the
//! Medical Imaging Assistant client crates.

pub mod analysis;
pub mod error;
pub mod image;
pub mod patient;
pub mod report;
pub mod session;

pub use analysis::model::{
    AnalysisRequest, AnalysisResult, ImageFile, RequestId, ResultOrigin, StudyType,
};
pub use error::{MiaError, MiaResult};
pub use session::model::{Credentials, NewUser, Session, UserProfile, UserRole};
