//! Execution plan handed to the engine, and the stage capability query

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A hook as placed in a plan
#[derive(Clone, Debug)]
pub struct HookWrapper<H> {
    /// Code of the module providing the hook
    pub module: String,
    /// Code of the hook implementation within the module
    pub code: String,
    pub hook: H,
}

impl<H> HookWrapper<H> {
    pub fn new(module: impl Into<String>, code: impl Into<String>, hook: H) -> Self {
        Self {
            module: module.into(),
            code: code.into(),
            hook,
        }
    }
}

/// Hooks executed in parallel under one shared timeout
#[derive(Clone, Debug)]
pub struct Group<H> {
    pub timeout: Duration,
    pub hooks: Vec<HookWrapper<H>>,
}

impl<H> Group<H> {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            hooks: Vec::new(),
        }
    }

    pub fn with_hook(mut self, hook: HookWrapper<H>) -> Self {
        self.hooks.push(hook);
        self
    }
}

/// Groups of a stage, executed in order
pub type Plan<H> = Vec<Group<H>>;

/// Answers whether hooks may reject the request on a given stage
pub trait StageCapabilities: Send + Sync {
    fn is_rejectable(&self, stage: &str) -> bool;
}

impl<F> StageCapabilities for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_rejectable(&self, stage: &str) -> bool {
        self(stage)
    }
}

/// Well-known request pipeline stages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Entrypoint,
    RawAuctionRequest,
    ProcessedAuctionRequest,
    BidderRequest,
    RawBidderResponse,
    AllProcessedBidResponses,
    AuctionResponse,
    Exitpoint,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Entrypoint,
        Stage::RawAuctionRequest,
        Stage::ProcessedAuctionRequest,
        Stage::BidderRequest,
        Stage::RawBidderResponse,
        Stage::AllProcessedBidResponses,
        Stage::AuctionResponse,
        Stage::Exitpoint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Entrypoint => "entrypoint",
            Stage::RawAuctionRequest => "raw_auction_request",
            Stage::ProcessedAuctionRequest => "processed_auction_request",
            Stage::BidderRequest => "bidder_request",
            Stage::RawBidderResponse => "raw_bidder_response",
            Stage::AllProcessedBidResponses => "all_processed_bid_responses",
            Stage::AuctionResponse => "auction_response",
            Stage::Exitpoint => "exitpoint",
        }
    }

    /// Whether a hook may abort the request at this stage
    pub fn is_rejectable(&self) -> bool {
        !matches!(
            self,
            Stage::AllProcessedBidResponses | Stage::AuctionResponse | Stage::Exitpoint
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("unknown stage: {}", s))
    }
}

/// Capabilities of the well-known stages; unknown stage names are rejectable
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultStages;

impl StageCapabilities for DefaultStages {
    fn is_rejectable(&self, stage: &str) -> bool {
        stage
            .parse::<Stage>()
            .map(|stage| stage.is_rejectable())
            .unwrap_or(true)
    }
}
