mod support;

mod config_tests;
mod probe_tests;
