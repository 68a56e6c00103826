/// Options that control how a live catalog is captured.
#[derive(Debug, Clone, Default)]
pub struct IntrospectOptions {
    pub include_system_schemas: bool,
    /// Capture views and materialized views alongside tables.
    pub include_views: bool,
    /// Restrict capture to these schemas.
    pub schemas: Option<Vec<String>>,
}
