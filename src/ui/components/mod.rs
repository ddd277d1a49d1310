pub mod lookup_popup;
pub mod progress_bar;
pub mod question_set;
pub mod report_view;
pub mod stats_view;
