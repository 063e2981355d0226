pub mod chart_section;
pub mod document;
