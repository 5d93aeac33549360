pub mod loader;
pub mod settings;
pub mod validator;
