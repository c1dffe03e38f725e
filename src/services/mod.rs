pub mod anthropic;
pub mod completion;
pub mod exchange_log;
pub mod validator;
