mod database_test;
mod log_test;
