#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// No binding matched and there is no default agent to fall back to.
    #[error("no agents configured and no binding matched provider \"{provider}\"")]
    NoAgents { provider: String },
}

pub type Result<T> = std::result::Result<T, RouteError>;
