// src/embed/context.rs

/// Per-request render state. Created fresh for every page so nothing leaks
/// between requests.
#[derive(Debug, Default)]
pub struct RenderContext {
    containers: Vec<String>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, container_id: impl Into<String>) {
        self.containers.push(container_id.into());
    }

    pub fn shortcode_used(&self) -> bool {
        !self.containers.is_empty()
    }

    /// The container the vendor script is pointed at.
    pub fn primary_container(&self) -> Option<&str> {
        self.containers.first().map(String::as_str)
    }

    pub fn containers(&self) -> &[String] {
        &self.containers
    }
}
