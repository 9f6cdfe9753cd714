pub mod reset_button;
pub mod workout_form;
pub mod workout_list;
