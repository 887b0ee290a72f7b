pub mod profile_page;
pub mod toast;
