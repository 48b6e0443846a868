pub mod approval;
pub mod budget;
pub mod event;
pub mod snapshot;
pub mod summarize_events;
pub mod time_of_day;
pub mod timing;
pub mod wages;
