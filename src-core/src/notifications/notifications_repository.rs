use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::schema::notification_settings;

use super::notifications_errors::{NotificationError, Result};
use super::notifications_model::{
    NewNotificationSettingsDb, NotificationSettings, NotificationSettingsDb,
};

/// Repository for per-goal reminder settings.
pub struct NotificationRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl NotificationRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        NotificationRepository { pool }
    }

    fn connection(&self) -> Result<crate::db::DbConnection> {
        get_connection(&self.pool).map_err(|e| NotificationError::DatabaseError(e.to_string()))
    }

    /// Returns the settings for a goal, or `None` if none were saved yet.
    pub fn get_for_goal(&self, goal_id: i32) -> Result<Option<NotificationSettings>> {
        let mut conn = self.connection()?;

        let row = notification_settings::table
            .filter(notification_settings::goal_id.eq(goal_id))
            .first::<NotificationSettingsDb>(&mut conn)
            .optional()?;

        row.map(NotificationSettings::try_from).transpose()
    }

    /// Inserts or updates the settings row keyed by the unique goal id.
    pub fn upsert(&self, settings: &NotificationSettings) -> Result<NotificationSettings> {
        settings.validate()?;
        let mut conn = self.connection()?;

        let values = NewNotificationSettingsDb::from(settings);
        let row: NotificationSettingsDb = diesel::insert_into(notification_settings::table)
            .values(&values)
            .on_conflict(notification_settings::goal_id)
            .do_update()
            .set((
                notification_settings::enabled.eq(&values.enabled),
                notification_settings::reminder_time.eq(&values.reminder_time),
                notification_settings::frequency.eq(&values.frequency),
            ))
            .returning(NotificationSettingsDb::as_returning())
            .get_result(&mut conn)?;

        NotificationSettings::try_from(row)
    }

    /// Removes the settings row for a goal, returning the deleted count.
    pub fn delete_for_goal(&self, goal_id: i32) -> Result<usize> {
        let mut conn = self.connection()?;

        Ok(diesel::delete(
            notification_settings::table.filter(notification_settings::goal_id.eq(goal_id)),
        )
        .execute(&mut conn)?)
    }
}
