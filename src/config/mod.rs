//! Configuration for sqlgate.
//!
//! Settings only supply defaults for requests: the row ceiling, the schema
//! used to qualify bare table names, and the SQL dialect.

mod settings;

pub use settings::{
    expand_env_vars, LimitSettings, Settings, SettingsError, SqlSettings, TableSettings,
};
