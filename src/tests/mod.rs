mod config_tests;
mod picker_tests;
