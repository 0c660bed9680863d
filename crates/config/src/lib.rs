pub mod settings;

pub use settings::{
    AppSettings, AuthSettings, DatabaseSettings, PushSettings, Settings,
};
