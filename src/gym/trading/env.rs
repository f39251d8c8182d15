use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::iter::ParallelIterator;
use serde::Serialize;

use crate::{
    agent::Agent,
    data::series::MarketSeries,
    error::{EnvError, GymError, GymResult},
    gym::{
        EnvStatus, Reward, StepOutcome,
        trading::{
            Env,
            action::Action,
            action_space::ObservationSpace,
            config::EnvConfig,
            ledger::{Ledger, PositionKind},
            observation::Observation,
        },
    },
    report::{EpisodeReport, Leaderboard, LeaderboardEntry},
};

/// Auxiliary diagnostics returned by every `step`, mirroring the info
/// mapping of gym-style environments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepInfo {
    /// Mark-to-market account value after the step was processed.
    pub portfolio_value: f64,
    /// Direction of the position after the step was processed.
    pub position: PositionKind,
}

/// The trading environment state machine.
///
/// Owns one [`Ledger`] and one cursor into a shared, read-only
/// [`MarketSeries`]. `step` is synchronous and never blocks: execution,
/// valuation, and reward all derive from the close price at the cursor.
/// Termination is purely data-driven; the episode ends when the advanced
/// cursor reaches the last row.
///
/// Parallel evaluation clones the environment per worker, so concurrent
/// episodes each own an independent ledger and cursor while sharing the
/// series allocation.
#[derive(Debug, Clone)]
pub struct TradingEnv {
    cfg: EnvConfig,
    series: Arc<MarketSeries>,
    ledger: Ledger,
    cursor: usize,
    env_status: EnvStatus,
    observation_space: ObservationSpace,
}

impl TradingEnv {
    /// Builds an environment over a validated series. Fails fast on an
    /// invalid configuration; schema problems are caught when the series
    /// itself is constructed.
    pub fn new(series: Arc<MarketSeries>, cfg: EnvConfig) -> GymResult<Self> {
        cfg.validate()?;
        Ok(Self {
            observation_space: ObservationSpace::new(series.n_features()),
            ledger: Ledger::new(&cfg),
            cursor: 0,
            env_status: EnvStatus::Ready,
            series,
            cfg,
        })
    }

    pub fn status(&self) -> EnvStatus {
        self.env_status
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn observation_space(&self) -> ObservationSpace {
        self.observation_space
    }

    /// Mark-to-market valuations since the last reset, seeded with the
    /// initial capital: `valuations()[i]` is the account value right after
    /// step `i` was processed.
    pub fn valuations(&self) -> &[f64] {
        self.ledger.valuations()
    }

    pub fn report(&self) -> EpisodeReport {
        EpisodeReport::new(self.cfg.initial_capital, self.ledger.valuations())
    }

    /// Runs one full episode with `agent`, resetting first.
    #[tracing::instrument(skip(self, agent), fields(agent = %agent.identifier()))]
    pub fn evaluate_agent<T: Agent>(&mut self, agent: &mut T) -> GymResult<EpisodeReport> {
        let mut obs = self.reset()?;
        loop {
            let action = agent.act(&obs)?;
            let (next_obs, _, outcome, _) = self.step(action)?;
            obs = next_obs;
            if outcome.is_done() {
                break;
            }
        }
        agent.reset();

        let report = self.report();
        tracing::info!(
            final_value = report.final_value,
            total_return = report.total_return,
            "Episode complete"
        );
        Ok(report)
    }

    /// Evaluates a stream of agents in parallel, returning the top `top_k`
    /// by total return.
    ///
    /// Each rayon worker clones the environment (cheap: the market series is
    /// shared) and runs its agents to completion. `stream_len` only sizes
    /// the progress bar, since parallel iterators may not know their bounds.
    pub fn evaluate_agents<T>(
        &self,
        agents: impl ParallelIterator<Item = (usize, T)>,
        top_k: usize,
        stream_len: u64,
    ) -> GymResult<Leaderboard>
    where
        T: Agent + Send,
    {
        let pb = progress_bar(stream_len)?;
        pb.set_message("Running evaluation...");

        let board = agents
            .try_fold(
                || Leaderboard::new(top_k),
                |mut board, (uid, mut agent)| {
                    let mut env = self.clone();
                    let report = env.evaluate_agent(&mut agent)?;
                    board.record(LeaderboardEntry {
                        agent_uid: uid as u64,
                        identifier: agent.identifier(),
                        final_value: report.final_value,
                        total_return: report.total_return,
                    });
                    pb.inc(1);
                    Ok(board)
                },
            )
            .try_reduce(
                || Leaderboard::new(top_k),
                |a, b| Ok::<_, GymError>(a.merge(b)),
            )?;

        pb.finish_with_message("Evaluation complete.");
        Ok(board)
    }
}

impl Env for TradingEnv {
    #[tracing::instrument(skip(self))]
    fn reset(&mut self) -> GymResult<Observation> {
        self.cursor = 0;
        self.ledger.reset();
        self.env_status = EnvStatus::Ready;
        tracing::debug!(rows = self.series.len(), "Environment reset");

        Observation::from_series(&self.series, 0)
    }

    fn step(
        &mut self,
        action: Action,
    ) -> GymResult<(Observation, Reward, StepOutcome, StepInfo)> {
        self.check_step_status()?;

        // 1. Execution price: primary close at the cursor.
        let price = self.series.close(self.cursor)?;

        // 2. Apply the action (closes-before-opens; invalid re-entries are
        //    documented no-ops inside the ledger).
        self.ledger.apply(action, price);

        // 3. Mark to market, append to the valuation history, compute the
        //    fractional-change reward.
        let (portfolio_value, reward) = self.ledger.record_valuation(price)?;

        // 4. Advance time. The cursor never passes the last row: reaching it
        //    makes the episode terminal, and stepping a terminal episode is
        //    rejected above, so the terminal observation reads the last
        //    valid row.
        self.cursor += 1;
        let outcome = if self.cursor == self.series.len() - 1 {
            StepOutcome::Done
        } else {
            StepOutcome::InProgress
        };
        self.env_status = match outcome {
            StepOutcome::Done => EnvStatus::Done,
            StepOutcome::InProgress => EnvStatus::Running,
        };

        // 5. Observe the post-advance row.
        let obs = Observation::from_series(&self.series, self.cursor)?;
        let info = StepInfo {
            portfolio_value,
            position: self.ledger.position().kind(),
        };

        Ok((obs, reward, outcome, info))
    }
}

impl TradingEnv {
    fn check_step_status(&self) -> GymResult<()> {
        match self.env_status {
            EnvStatus::Ready | EnvStatus::Running => Ok(()),
            EnvStatus::Done => Err(EnvError::InvalidState(
                "Episode is done. Call `reset()` before stepping.".to_string(),
            )
            .into()),
        }
    }
}

// ================================================================================================
// Helper Functions
// ================================================================================================
fn progress_bar(capacity: u64) -> GymResult<ProgressBar> {
    let bar = ProgressBar::new(capacity);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta_precise}) {msg}")
            .map_err(EnvError::ProgressBar)?
            .progress_chars("#>-"));
    Ok(bar)
}
