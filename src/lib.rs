// Export modules for use in tests
pub mod app;
pub mod cache;
pub mod document;
pub mod reload;
pub mod viewport;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export the main app component
pub use app::ViewerApp;
