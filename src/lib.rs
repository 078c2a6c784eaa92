pub mod classifier;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod host;
pub mod notification;
pub mod selection;
pub mod settings;
pub mod workflow;
pub mod writer;

pub use classifier::{Classifier, HttpClassifier};
pub use error::{ClassifierError, Result};
pub use notification::{Notification, NotificationController, NotificationView, Severity};
pub use selection::Role;
pub use workflow::{RunOutcome, WorkflowOrchestrator, WorkflowState};
