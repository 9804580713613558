mod settings;

pub use settings::{
    DataConfig, ProviderConfig, ProviderKind, RagConfig, ServerConfig, Settings,
};
