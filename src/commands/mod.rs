// Command handlers module
pub mod configure;
pub mod info;
pub mod menu;
pub mod monitor;

// Re-exports for cleaner imports
pub use configure::ConfigureArgs;
