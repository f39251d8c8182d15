pub mod agent;
pub mod data;
pub mod error;
pub mod gym;
mod macros;
pub mod math;
pub mod report;

pub use agent::{Agent, AgentIdentifier};
pub use data::{
    config::{FeatureConfig, SeriesSchema},
    domain::{Price, Quantity},
    features::FeaturePipeline,
    series::MarketSeries,
};
pub use error::{AgentError, DataError, EnvError, GymError, GymResult, IoError};
pub use gym::{
    EnvStatus, Reward, StepOutcome,
    trading::{
        Env,
        action::Action,
        action_space::{ActionSpace, ObservationSpace},
        config::{EnvConfig, RiskFraction},
        env::{StepInfo, TradingEnv},
        ledger::{Position, PositionKind, TradeType},
        observation::Observation,
    },
};
pub use report::{EpisodeReport, Leaderboard, LeaderboardEntry};
