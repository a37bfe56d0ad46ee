//! Embedded SQL migrations
//!
//! Migrations are embedded at compile time using include_str!

const TABLE_PLACEHOLDER: &str = "{{table}}";

/// Migration metadata
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
    pub down: &'static str,
}

impl Migration {
    /// Forward SQL for `table`
    pub fn render_up(&self, table: &str) -> String {
        self.up.replace(TABLE_PLACEHOLDER, table)
    }

    /// Reverse SQL for `table`
    pub fn render_down(&self, table: &str) -> String {
        self.down.replace(TABLE_PLACEHOLDER, table)
    }
}

/// Get all embedded migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_create_model_preferences",
        up: include_str!("../../migrations/001_create_model_preferences.up.sql"),
        down: include_str!("../../migrations/001_create_model_preferences.down.sql"),
    }]
}
