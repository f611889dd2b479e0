pub mod add;
pub mod calendar;
pub mod compact;
pub mod delete;
pub mod edit;
pub mod list;
pub mod occurrence;
pub mod section;
