/// Read-only view of the settings a fetch run needs.
pub trait ConfigProvider: Send + Sync {
    fn file_id(&self) -> &str;
    fn fields(&self) -> &[String];
    fn base_url(&self) -> &str;
}
