pub mod event_log_parser;
