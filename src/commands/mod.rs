pub mod env;
pub mod list;
pub mod run;

#[cfg(test)]
#[path = "../commands_test.rs"]
mod commands_test;
