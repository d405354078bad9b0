pub mod ai_modal;
pub mod components;
pub mod dashboard;
pub mod format;
pub mod project_detail;
pub mod project_wizard;
pub mod theme;
