pub mod interaction_event;
pub mod member_add_event;
pub mod member_remove_event;
pub mod ready_event;
pub mod route;
