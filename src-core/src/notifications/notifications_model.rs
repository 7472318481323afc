use chrono::NaiveTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::goals::GoalDb;

use super::notifications_errors::{NotificationError, Result};

/// How often a goal reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReminderFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl ReminderFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderFrequency::Daily => "daily",
            ReminderFrequency::Weekly => "weekly",
            ReminderFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for ReminderFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderFrequency {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(ReminderFrequency::Daily),
            "weekly" => Ok(ReminderFrequency::Weekly),
            "monthly" => Ok(ReminderFrequency::Monthly),
            other => Err(NotificationError::InvalidData(format!(
                "Unknown reminder frequency '{}'",
                other
            ))),
        }
    }
}

/// Domain model for a goal's reminder settings, one row per goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub id: Option<i32>,
    pub goal_id: i32,
    pub enabled: bool,
    pub reminder_time: String,
    pub frequency: ReminderFrequency,
}

impl NotificationSettings {
    /// Default settings for a goal: enabled, 09:00, daily.
    pub fn for_goal(goal_id: i32) -> Self {
        NotificationSettings {
            id: None,
            goal_id,
            enabled: true,
            reminder_time: "09:00".to_string(),
            frequency: ReminderFrequency::Daily,
        }
    }

    /// Validates the settings before they are persisted.
    pub fn validate(&self) -> Result<()> {
        NaiveTime::parse_from_str(&self.reminder_time, "%H:%M").map_err(|_| {
            NotificationError::InvalidData(format!(
                "Reminder time '{}' is not a valid HH:MM value",
                self.reminder_time
            ))
        })?;
        Ok(())
    }
}

/// Database model for notification settings
#[derive(
    Queryable,
    Identifiable,
    Associations,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(belongs_to(GoalDb, foreign_key = goal_id))]
#[diesel(table_name = crate::schema::notification_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NotificationSettingsDb {
    pub id: i32,
    pub goal_id: i32,
    pub enabled: bool,
    pub reminder_time: String,
    pub frequency: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::notification_settings)]
pub struct NewNotificationSettingsDb {
    pub goal_id: i32,
    pub enabled: bool,
    pub reminder_time: String,
    pub frequency: String,
}

impl TryFrom<NotificationSettingsDb> for NotificationSettings {
    type Error = NotificationError;

    fn try_from(db: NotificationSettingsDb) -> Result<Self> {
        Ok(NotificationSettings {
            id: Some(db.id),
            goal_id: db.goal_id,
            enabled: db.enabled,
            reminder_time: db.reminder_time,
            frequency: db.frequency.parse()?,
        })
    }
}

impl From<&NotificationSettings> for NewNotificationSettingsDb {
    fn from(domain: &NotificationSettings) -> Self {
        NewNotificationSettingsDb {
            goal_id: domain.goal_id,
            enabled: domain.enabled,
            reminder_time: domain.reminder_time.clone(),
            frequency: domain.frequency.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_schema_defaults() {
        let settings = NotificationSettings::for_goal(4);
        assert!(settings.enabled);
        assert_eq!(settings.reminder_time, "09:00");
        assert_eq!(settings.frequency, ReminderFrequency::Daily);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_reminder_time() {
        let mut settings = NotificationSettings::for_goal(4);
        settings.reminder_time = "9 o'clock".to_string();
        assert!(matches!(
            settings.validate(),
            Err(NotificationError::InvalidData(_))
        ));
    }

    #[test]
    fn frequency_round_trips_through_text() {
        for frequency in [
            ReminderFrequency::Daily,
            ReminderFrequency::Weekly,
            ReminderFrequency::Monthly,
        ] {
            assert_eq!(frequency.as_str().parse::<ReminderFrequency>().unwrap(), frequency);
        }
        assert!("hourly".parse::<ReminderFrequency>().is_err());
    }
}
