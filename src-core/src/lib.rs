pub mod db;

pub mod goals;
pub mod notifications;

pub mod errors;
pub mod schema;

pub use errors::{Error, Result};
pub use goals::{Goal, GoalRepository, GoalService, Stage, Task};
pub use notifications::{NotificationRepository, NotificationSettings, ReminderFrequency};
